//! Allocation-free JSON tokenizer, parser and serializer.
//!
//! A document is parsed into a tree of fixed-size nodes that live in storage
//! the caller hands over, linked by integer indices instead of pointers.
//! Node text is never copied: every node refers back into the input buffer.
#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]
#![cfg_attr(not(feature = "tracing"), allow(unused_variables))]

pub mod arena;
pub mod constants;
mod context;
pub mod decode;
pub mod encode;
pub mod error;
mod log;
pub mod options;
mod query;
#[cfg(feature = "serde")]
pub mod serde;

pub use crate::arena::{Arena, DefaultIndex, Node, NodeId, NodeIndex, NodeKind, Slot, Span};
pub use crate::context::{Children, Context};
pub use crate::error::Error;
pub use crate::options::{DuplicateKeys, ParseOptions};

pub type Result<T> = core::result::Result<T, Error>;

/// Parses `input` into `slots` with default options.
pub fn parse<'m, 'a, I: NodeIndex>(
    slots: &'m mut [Slot<I>],
    input: &'a [u8],
) -> Result<Context<'m, 'a, I>> {
    parse_with_options(slots, input, ParseOptions::default())
}

pub fn parse_with_options<'m, 'a, I: NodeIndex>(
    slots: &'m mut [Slot<I>],
    input: &'a [u8],
    options: ParseOptions,
) -> Result<Context<'m, 'a, I>> {
    let mut ctx = Context::new(slots)?.with_options(options);
    ctx.parse(input)?;
    Ok(ctx)
}

/// Re-serializes `input` without insignificant whitespace into `out`,
/// using `slots` as scratch storage. Returns the number of bytes written.
pub fn minify<I: NodeIndex>(slots: &mut [Slot<I>], input: &[u8], out: &mut [u8]) -> Result<usize> {
    parse(slots, input)?.serialize(out)
}
