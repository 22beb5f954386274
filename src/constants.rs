pub const TRUE: &[u8] = b"true";
pub const FALSE: &[u8] = b"false";
pub const NULL: &[u8] = b"null";

/// Default slot count used by callers that size their pool from a budget.
pub const DEFAULT_CAPACITY: usize = 4096;

#[inline]
pub fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n')
}
