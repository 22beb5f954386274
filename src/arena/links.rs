use crate::log::trace;
use crate::{Error, Result};

use super::{Arena, NodeId, NodeIndex, NodeKind, Span};

impl<'m, I: NodeIndex> Arena<'m, I> {
    pub fn parent(&self, id: NodeId<I>) -> Option<NodeId<I>> {
        self.get(id)?.parent()
    }

    pub fn sibling(&self, id: NodeId<I>) -> Option<NodeId<I>> {
        self.get(id)?.sibling()
    }

    pub fn child(&self, id: NodeId<I>) -> Option<NodeId<I>> {
        self.get(id)?.first_child()
    }

    /// Nearest proper ancestor of the given kind.
    pub fn parent_of_kind(&self, id: NodeId<I>, kind: NodeKind) -> Option<NodeId<I>> {
        let mut iter = self.parent(id);
        while let Some(ancestor) = iter {
            let node = self.get(ancestor)?;
            if node.kind == kind {
                return Some(ancestor);
            }
            iter = node.parent();
        }
        None
    }

    /// Nearest proper ancestor that is an object or an array.
    pub fn structural_parent(&self, id: NodeId<I>) -> Option<NodeId<I>> {
        let mut iter = self.parent(id);
        while let Some(ancestor) = iter {
            let node = self.get(ancestor)?;
            if node.kind.is_structural() {
                return Some(ancestor);
            }
            iter = node.parent();
        }
        None
    }

    /// Allocates a node and appends it as the last child of `parent`, or
    /// installs it as the root when `parent` is `None`.
    pub(crate) fn add_element(
        &mut self,
        parent: Option<NodeId<I>>,
        kind: NodeKind,
        text: Span,
    ) -> Result<NodeId<I>> {
        let Some(parent) = parent else {
            if let Some(root) = self.root {
                return Err(Error::UnexpectedNode { index: root.index() });
            }
            let id = self.allocate(kind, text)?;
            self.root = Some(id);
            trace!(node = id.index(), ?kind, "linked root");
            return Ok(id);
        };

        let tail = self.node(parent)?.last_child();
        let id = self.allocate(kind, text)?;
        self.node_mut(id)?.parent = parent.0;
        match tail {
            Some(tail) => self.node_mut(tail)?.sibling = id.0,
            None => self.node_mut(parent)?.first_child = id.0,
        }
        self.node_mut(parent)?.last_child = id.0;
        trace!(node = id.index(), ?kind, parent = parent.index(), "linked node");
        Ok(id)
    }

    /// Frees `target` and all of its descendants and unlinks it from its
    /// parent. Nodes outside the subtree are left untouched. Returns the
    /// number of slots released.
    pub(crate) fn delete_subtree(&mut self, target: NodeId<I>) -> Result<usize> {
        if !self.validate(target) {
            return Err(Error::UnexpectedNode { index: target.index() });
        }

        let mut freed = 0;
        loop {
            let mut leaf = target;
            while let Some(child) = self.node(leaf)?.first_child() {
                leaf = child;
            }

            if leaf == target {
                self.unlink(target)?;
                self.free(target)?;
                return Ok(freed + 1);
            }

            // A deepest first child is always the head of its parent's chain.
            let node = *self.node(leaf)?;
            let parent = self.node_mut(NodeId(node.parent))?;
            parent.first_child = node.sibling;
            if node.sibling.is_none() {
                parent.last_child = I::NONE;
            }
            self.free(leaf)?;
            freed += 1;
        }
    }

    fn unlink(&mut self, id: NodeId<I>) -> Result<()> {
        let node = *self.node(id)?;
        let Some(parent) = node.parent() else {
            if self.root == Some(id) {
                self.root = None;
            }
            return Ok(());
        };

        let mut prev = None;
        let mut iter = self.node(parent)?.first_child();
        while let Some(current) = iter {
            if current == id {
                break;
            }
            prev = Some(current);
            iter = self.node(current)?.sibling();
        }
        if iter.is_none() {
            return Err(Error::UnexpectedNode { index: id.index() });
        }

        match prev {
            Some(prev) => self.node_mut(prev)?.sibling = node.sibling,
            None => self.node_mut(parent)?.first_child = node.sibling,
        }
        let parent_node = self.node_mut(parent)?;
        if parent_node.last_child == id.0 {
            parent_node.last_child = NodeId::link(prev);
        }
        Ok(())
    }
}
