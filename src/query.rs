use crate::arena::{NodeId, NodeIndex, NodeKind};
use crate::Context;

impl<'m, 'a, I: NodeIndex> Context<'m, 'a, I> {
    /// Value of the first member of `object` whose key text equals `key`.
    ///
    /// Keys compare by raw text, so escapes must be spelled the way the input
    /// spells them.
    pub fn get_member(&self, object: NodeId<I>, key: &[u8]) -> Option<NodeId<I>> {
        if self.kind(object)? != NodeKind::Object {
            return None;
        }
        self.children(object)
            .find(|&candidate| self.text(candidate) == Some(key))
            .and_then(|found| self.child(found))
    }

    /// Element `index` of `array`, counting from zero.
    pub fn get_element(&self, array: NodeId<I>, index: usize) -> Option<NodeId<I>> {
        if self.kind(array)? != NodeKind::Array {
            return None;
        }
        self.children(array).nth(index)
    }

    /// Follows a `/`-separated path from `from`. Segments name object members;
    /// inside arrays a segment is parsed as an index. An empty path returns
    /// `from` itself.
    pub fn get_path(&self, from: NodeId<I>, path: &str) -> Option<NodeId<I>> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(from, |node, segment| match self.kind(node)? {
                NodeKind::Array => self.get_element(node, segment.parse().ok()?),
                _ => self.get_member(node, segment.as_bytes()),
            })
    }
}
