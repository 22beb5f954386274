use core::mem;

use crate::arena::{Arena, DefaultIndex, Node, NodeId, NodeIndex, NodeKind, Slot};
use crate::log::debug;
use crate::{Error, ParseOptions, Result};

/// One parse session over caller-provided node storage.
///
/// The tree lives in `'m` storage and refers to text in the `'a` input, which
/// must outlive it. The first error of the session is latched in
/// [`Context::status`] and never replaced.
///
/// ```
/// use fixed_json::{Context, Slot};
///
/// let mut slots = [Slot::<u16>::VACANT; 16];
/// let mut ctx = Context::new(&mut slots)?;
/// ctx.parse(br#"{"name":"demo","tags":[1,2]}"#)?;
///
/// let root = ctx.root().unwrap();
/// let tags = ctx.get_member(root, b"tags").unwrap();
/// let second = ctx.get_element(tags, 1).unwrap();
/// assert_eq!(ctx.text(second), Some(&b"2"[..]));
///
/// let mut out = [0u8; 64];
/// let written = ctx.serialize(&mut out)?;
/// assert_eq!(&out[..written], br#"{"name":"demo","tags":[1,2]}"#);
/// # Ok::<(), fixed_json::Error>(())
/// ```
#[derive(Debug)]
pub struct Context<'m, 'a, I: NodeIndex = DefaultIndex> {
    pub(crate) arena: Arena<'m, I>,
    pub(crate) input: &'a [u8],
    pub(crate) options: ParseOptions,
    pub(crate) cursor: Option<NodeId<I>>,
    pub(crate) status: Option<Error>,
}

impl<'m, 'a, I: NodeIndex> Context<'m, 'a, I> {
    /// Fails with [`Error::OutOfMemory`] if `slots` cannot hold a single node.
    pub fn new(slots: &'m mut [Slot<I>]) -> Result<Self> {
        let arena = Arena::new(slots);
        if arena.capacity() == 0 {
            return Err(Error::OutOfMemory);
        }
        debug!(capacity = arena.capacity(), "arena ready");
        Ok(Self {
            arena,
            input: &[],
            options: ParseOptions::default(),
            cursor: None,
            status: None,
        })
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Number of slots a block of `bytes` bytes can hold.
    pub const fn slots_for(bytes: usize) -> usize {
        bytes / mem::size_of::<Slot<I>>()
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// First error of the session, if any.
    pub fn status(&self) -> Option<Error> {
        self.status
    }

    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Live nodes.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn arena(&self) -> &Arena<'m, I> {
        &self.arena
    }

    pub fn input(&self) -> &'a [u8] {
        self.input
    }

    pub fn root(&self) -> Option<NodeId<I>> {
        self.arena.root()
    }

    pub fn cursor(&self) -> Option<NodeId<I>> {
        self.cursor
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = self.arena.root();
    }

    /// Drops the tree and the latched status so the storage can host a new
    /// document.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.input = &[];
        self.cursor = None;
        self.status = None;
    }

    /// Latches `error` unless an earlier one is already held; returns the
    /// error that ends up latched.
    pub(crate) fn latch(&mut self, error: Error) -> Error {
        *self.status.get_or_insert(error)
    }

    pub fn node(&self, id: NodeId<I>) -> Option<&Node<I>> {
        self.arena.get(id)
    }

    pub fn kind(&self, id: NodeId<I>) -> Option<NodeKind> {
        self.node(id).map(|node| node.kind)
    }

    /// Raw text of a node, without quotes and with escapes left as written.
    pub fn text(&self, id: NodeId<I>) -> Option<&'a [u8]> {
        let span = self.node(id)?.text;
        self.input.get(span.offset..span.end())
    }

    pub fn text_str(&self, id: NodeId<I>) -> Option<&'a str> {
        core::str::from_utf8(self.text(id)?).ok()
    }

    pub fn parent(&self, id: NodeId<I>) -> Option<NodeId<I>> {
        self.arena.parent(id)
    }

    pub fn sibling(&self, id: NodeId<I>) -> Option<NodeId<I>> {
        self.arena.sibling(id)
    }

    pub fn child(&self, id: NodeId<I>) -> Option<NodeId<I>> {
        self.arena.child(id)
    }

    pub fn parent_of_kind(&self, id: NodeId<I>, kind: NodeKind) -> Option<NodeId<I>> {
        self.arena.parent_of_kind(id, kind)
    }

    pub fn structural_parent(&self, id: NodeId<I>) -> Option<NodeId<I>> {
        self.arena.structural_parent(id)
    }

    pub fn children(&self, id: NodeId<I>) -> Children<'_, 'm, I> {
        Children {
            arena: &self.arena,
            next: self.arena.child(id),
        }
    }
}

/// Iterator over a node's child chain.
pub struct Children<'c, 'm, I: NodeIndex> {
    arena: &'c Arena<'m, I>,
    next: Option<NodeId<I>>,
}

impl<'c, 'm, I: NodeIndex> Iterator for Children<'c, 'm, I> {
    type Item = NodeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.arena.sibling(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    fn test_empty_storage_is_rejected() {
        let mut slots: [Slot<u16>; 0] = [];
        assert_eq!(Context::new(&mut slots).err(), Some(Error::OutOfMemory));
    }

    #[rstest::rstest]
    fn test_slots_for_budget() {
        let size = mem::size_of::<Slot<u16>>();
        assert_eq!(Context::<u16>::slots_for(size * 10 + size - 1), 10);
        assert_eq!(Context::<u32>::slots_for(0), 0);
    }

    #[rstest::rstest]
    fn test_latch_keeps_first_error() {
        let mut slots = [Slot::<u16>::VACANT; 1];
        let mut ctx = Context::new(&mut slots).unwrap();
        assert_eq!(ctx.latch(Error::UnexpectedEof), Error::UnexpectedEof);
        assert_eq!(ctx.latch(Error::OutOfMemory), Error::UnexpectedEof);
        assert_eq!(ctx.status(), Some(Error::UnexpectedEof));
        ctx.clear();
        assert_eq!(ctx.status(), None);
    }
}
