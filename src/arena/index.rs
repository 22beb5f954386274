use core::fmt;

mod sealed {
    pub trait Sealed {}

    impl Sealed for u16 {}
    impl Sealed for u32 {}
}

/// Integer type used for node links.
///
/// The maximum value of the type is reserved as the "absent" sentinel, so a
/// `u16` arena holds at most 65534 nodes and a `u32` arena 2^32 - 2.
pub trait NodeIndex: Copy + Eq + fmt::Debug + sealed::Sealed {
    const NONE: Self;
    const MAX_CAPACITY: usize;

    /// Callers guarantee `index < MAX_CAPACITY`.
    fn from_usize(index: usize) -> Self;

    fn to_usize(self) -> usize;

    #[inline]
    fn is_none(self) -> bool {
        self == Self::NONE
    }
}

impl NodeIndex for u16 {
    const NONE: Self = u16::MAX;
    const MAX_CAPACITY: usize = u16::MAX as usize - 1;

    #[inline]
    fn from_usize(index: usize) -> Self {
        debug_assert!(index < Self::MAX_CAPACITY);
        index as u16
    }

    #[inline]
    fn to_usize(self) -> usize {
        self as usize
    }
}

impl NodeIndex for u32 {
    const NONE: Self = u32::MAX;
    const MAX_CAPACITY: usize = (u32::MAX - 1) as usize;

    #[inline]
    fn from_usize(index: usize) -> Self {
        debug_assert!(index < Self::MAX_CAPACITY);
        index as u32
    }

    #[inline]
    fn to_usize(self) -> usize {
        self as usize
    }
}

#[cfg(not(feature = "wide-index"))]
pub type DefaultIndex = u16;

#[cfg(feature = "wide-index")]
pub type DefaultIndex = u32;

/// Handle to a live node inside an arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId<I: NodeIndex = DefaultIndex>(pub(crate) I);

impl<I: NodeIndex> NodeId<I> {
    #[inline]
    pub fn index(self) -> usize {
        self.0.to_usize()
    }

    /// Converts a raw link, mapping the sentinel to `None`.
    #[inline]
    pub(crate) fn from_link(link: I) -> Option<Self> {
        if link.is_none() {
            None
        } else {
            Some(Self(link))
        }
    }

    #[inline]
    pub(crate) fn link(id: Option<Self>) -> I {
        id.map_or(I::NONE, |id| id.0)
    }
}

impl<I: NodeIndex> fmt::Debug for NodeId<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index())
    }
}
