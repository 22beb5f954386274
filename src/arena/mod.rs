mod index;
mod links;

pub use index::{DefaultIndex, NodeId, NodeIndex};

use crate::log::trace;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Object,
    Array,
    Key,
    String,
    Number,
    True,
    False,
    Null,
}

impl NodeKind {
    /// Objects and arrays.
    #[inline]
    pub fn is_structural(self) -> bool {
        matches!(self, NodeKind::Object | NodeKind::Array)
    }
}

/// Byte range inside the parsed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub offset: usize,
    pub length: usize,
}

impl Span {
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node<I: NodeIndex = DefaultIndex> {
    pub kind: NodeKind,
    pub text: Span,
    pub(crate) parent: I,
    pub(crate) sibling: I,
    pub(crate) first_child: I,
    pub(crate) last_child: I,
}

impl<I: NodeIndex> Node<I> {
    fn new(kind: NodeKind, text: Span) -> Self {
        Self {
            kind,
            text,
            parent: I::NONE,
            sibling: I::NONE,
            first_child: I::NONE,
            last_child: I::NONE,
        }
    }

    pub fn parent(&self) -> Option<NodeId<I>> {
        NodeId::from_link(self.parent)
    }

    pub fn sibling(&self) -> Option<NodeId<I>> {
        NodeId::from_link(self.sibling)
    }

    pub fn first_child(&self) -> Option<NodeId<I>> {
        NodeId::from_link(self.first_child)
    }

    pub fn last_child(&self) -> Option<NodeId<I>> {
        NodeId::from_link(self.last_child)
    }
}

/// One cell of caller-provided storage: a live node or a free-list link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot<I: NodeIndex = DefaultIndex> {
    Vacant { next: I },
    Occupied(Node<I>),
}

impl<I: NodeIndex> Slot<I> {
    pub const VACANT: Self = Slot::Vacant { next: I::NONE };
}

impl<I: NodeIndex> Default for Slot<I> {
    fn default() -> Self {
        Self::VACANT
    }
}

/// Fixed-capacity node storage over a borrowed slot slice.
///
/// Slots below `cursor` have been handed out at least once; freed ones are
/// chained through `Slot::Vacant` starting at `free` and reused LIFO before
/// the cursor advances. The slice is never grown.
#[derive(Debug)]
pub struct Arena<'m, I: NodeIndex = DefaultIndex> {
    slots: &'m mut [Slot<I>],
    capacity: usize,
    count: usize,
    cursor: usize,
    free: I,
    root: Option<NodeId<I>>,
}

impl<'m, I: NodeIndex> Arena<'m, I> {
    pub fn new(slots: &'m mut [Slot<I>]) -> Self {
        let capacity = slots.len().min(I::MAX_CAPACITY);
        Self {
            slots,
            capacity,
            count: 0,
            cursor: 0,
            free: I::NONE,
            root: None,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Live nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn root(&self) -> Option<NodeId<I>> {
        self.root
    }

    /// Forgets every node at once.
    pub fn clear(&mut self) {
        self.count = 0;
        self.cursor = 0;
        self.free = I::NONE;
        self.root = None;
    }

    pub(crate) fn allocate(&mut self, kind: NodeKind, text: Span) -> Result<NodeId<I>> {
        if self.count >= self.capacity {
            return Err(Error::OutOfMemory);
        }

        let index = if self.free.is_none() {
            let index = self.cursor;
            self.cursor += 1;
            index
        } else {
            let index = self.free.to_usize();
            match self.slots[index] {
                Slot::Vacant { next } => self.free = next,
                Slot::Occupied(_) => return Err(Error::UnexpectedNode { index }),
            }
            index
        };

        self.slots[index] = Slot::Occupied(Node::new(kind, text));
        self.count += 1;
        Ok(NodeId(I::from_usize(index)))
    }

    /// Returns a slot to the free list. Nothing may still link to it.
    pub(crate) fn free(&mut self, id: NodeId<I>) -> Result<()> {
        if !self.validate(id) {
            return Err(Error::UnexpectedNode { index: id.index() });
        }
        self.slots[id.index()] = Slot::Vacant { next: self.free };
        self.free = id.0;
        self.count -= 1;
        trace!(node = id.index(), live = self.count, "freed node");
        Ok(())
    }

    /// True if `id` names a slot that has been handed out and is still live.
    #[inline]
    pub fn validate(&self, id: NodeId<I>) -> bool {
        let index = id.index();
        index < self.cursor && matches!(self.slots.get(index), Some(Slot::Occupied(_)))
    }

    #[inline]
    pub fn get(&self, id: NodeId<I>) -> Option<&Node<I>> {
        if id.index() >= self.cursor {
            return None;
        }
        match self.slots.get(id.index()) {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId<I>) -> Option<&mut Node<I>> {
        if id.index() >= self.cursor {
            return None;
        }
        match self.slots.get_mut(id.index()) {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        }
    }

    /// Like `get`, for links the tree itself vouches for.
    #[inline]
    pub(crate) fn node(&self, id: NodeId<I>) -> Result<&Node<I>> {
        self.get(id).ok_or(Error::UnexpectedNode { index: id.index() })
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId<I>) -> Result<&mut Node<I>> {
        self.get_mut(id)
            .ok_or(Error::UnexpectedNode { index: id.index() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text() -> Span {
        Span::new(0, 0)
    }

    #[rstest::rstest]
    fn test_capacity_is_capped_by_index_width() {
        let mut slots = vec![Slot::<u16>::VACANT; 70_000];
        let arena = Arena::new(&mut slots);
        assert_eq!(arena.capacity(), 65_534);
    }

    #[rstest::rstest]
    fn test_allocate_fails_when_full() {
        let mut slots = [Slot::<u16>::VACANT; 2];
        let mut arena = Arena::new(&mut slots);
        arena.allocate(NodeKind::Null, text()).unwrap();
        arena.allocate(NodeKind::Null, text()).unwrap();
        assert_eq!(arena.allocate(NodeKind::Null, text()), Err(Error::OutOfMemory));
        assert_eq!(arena.len(), 2);
    }

    #[rstest::rstest]
    fn test_fresh_node_has_no_links() {
        let mut slots = [Slot::<u32>::VACANT; 1];
        let mut arena = Arena::new(&mut slots);
        let id = arena.allocate(NodeKind::Object, text()).unwrap();
        let node = arena.get(id).unwrap();
        assert_eq!(node.parent(), None);
        assert_eq!(node.sibling(), None);
        assert_eq!(node.first_child(), None);
        assert_eq!(node.last_child(), None);
    }

    #[rstest::rstest]
    fn test_free_list_is_lifo() {
        let mut slots = [Slot::<u16>::VACANT; 4];
        let mut arena = Arena::new(&mut slots);
        let a = arena.allocate(NodeKind::Null, text()).unwrap();
        let b = arena.allocate(NodeKind::Null, text()).unwrap();
        let c = arena.allocate(NodeKind::Null, text()).unwrap();
        arena.free(a).unwrap();
        arena.free(c).unwrap();
        assert_eq!(arena.len(), 1);

        assert_eq!(arena.allocate(NodeKind::True, text()).unwrap(), c);
        assert_eq!(arena.allocate(NodeKind::True, text()).unwrap(), a);
        let fresh = arena.allocate(NodeKind::True, text()).unwrap();
        assert_eq!(fresh.index(), 3);
        assert!(arena.validate(b));
    }

    #[rstest::rstest]
    fn test_free_slot_can_be_reused_when_full() {
        let mut slots = [Slot::<u16>::VACANT; 1];
        let mut arena = Arena::new(&mut slots);
        let a = arena.allocate(NodeKind::Null, text()).unwrap();
        arena.free(a).unwrap();
        assert_eq!(arena.allocate(NodeKind::Null, text()), Ok(a));
    }

    #[rstest::rstest]
    fn test_validate_rejects_unused_and_freed_slots() {
        let mut slots = [Slot::<u16>::VACANT; 4];
        let mut arena = Arena::new(&mut slots);
        let a = arena.allocate(NodeKind::Null, text()).unwrap();
        assert!(arena.validate(a));
        assert!(!arena.validate(NodeId(2)));
        assert!(!arena.validate(NodeId(u16::MAX)));
        arena.free(a).unwrap();
        assert!(!arena.validate(a));
        assert_eq!(arena.free(a), Err(Error::UnexpectedNode { index: 0 }));
    }

    #[rstest::rstest]
    fn test_clear_forgets_everything() {
        let mut slots = [Slot::<u16>::VACANT; 2];
        let mut arena = Arena::new(&mut slots);
        let a = arena.allocate(NodeKind::Null, text()).unwrap();
        arena.clear();
        assert!(arena.is_empty());
        assert!(!arena.validate(a));
        assert_eq!(arena.allocate(NodeKind::Null, text()), Ok(a));
    }
}
