use thiserror::Error;

/// Failure reported by a parse session.
///
/// The context latches the first error it sees; later failures in the same
/// session never replace it.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The arena has no free slot left, or an output buffer is too small.
    #[error("out of memory")]
    OutOfMemory,
    /// A token did not match any production valid in the current parser state.
    #[error("unexpected token at byte {offset}")]
    UnexpectedToken { offset: usize },
    /// Input ended while a structure was still open.
    #[error("unexpected end of input")]
    UnexpectedEof,
    /// A traversal reached a slot that does not hold a live node.
    #[error("unexpected node {index}")]
    UnexpectedNode { index: usize },
    /// The context already holds a document; call `clear` first.
    #[error("context already holds a document")]
    ContextInUse,
}

impl Error {
    /// Numeric status code, `0` being reserved for success.
    pub fn code(&self) -> u32 {
        match self {
            Error::OutOfMemory => 1,
            Error::UnexpectedToken { .. } => 2,
            Error::UnexpectedEof => 3,
            Error::UnexpectedNode { .. } => 4,
            Error::ContextInUse => 5,
        }
    }
}
