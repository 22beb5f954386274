mod writer;

use crate::arena::{Node, NodeIndex, NodeKind};
use crate::{Context, Error, Result};

use writer::{Counter, Sink, SliceWriter};

impl<'m, 'a, I: NodeIndex> Context<'m, 'a, I> {
    /// Bytes [`Context::serialize`] needs for the current tree.
    pub fn dump_size(&self) -> Result<usize> {
        if let Some(error) = self.status {
            return Err(error);
        }
        let mut counter = Counter::default();
        self.walk(&mut counter)?;
        Ok(counter.total)
    }

    /// Writes the tree as compact JSON into `buffer` and returns the number
    /// of bytes written. A buffer shorter than [`Context::dump_size`] latches
    /// [`Error::OutOfMemory`] and nothing is written.
    pub fn serialize(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let required = self.dump_size()?;
        if buffer.len() < required {
            return Err(self.latch(Error::OutOfMemory));
        }

        let mut writer = SliceWriter::new(buffer);
        if let Err(error) = self.walk(&mut writer) {
            return Err(self.latch(error));
        }
        self.reset_cursor();
        Ok(writer.written())
    }

    #[cfg(feature = "std")]
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.dump_size()?);
        self.walk(&mut out)?;
        Ok(out)
    }

    #[cfg(feature = "std")]
    pub fn to_writer<W: std::io::Write>(&self, mut writer: W) -> std::io::Result<usize> {
        let bytes = self.to_vec().map_err(std::io::Error::other)?;
        writer.write_all(&bytes)?;
        Ok(bytes.len())
    }

    // Pre-order walk. Openers and scalars are written on entry; a node without
    // children is closed at once, and on the way back up every ancestor left
    // behind is closed until one with a next sibling turns up.
    fn walk<S: Sink>(&self, sink: &mut S) -> Result<()> {
        let Some(mut iter) = self.arena.root() else {
            return Ok(());
        };

        loop {
            let node = self.arena.node(iter)?;
            self.open(node, sink)?;

            if let Some(child) = node.first_child() {
                iter = child;
                continue;
            }
            close(node.kind, sink)?;

            let mut current = node;
            loop {
                if let Some(sibling) = current.sibling() {
                    sink.put(b",")?;
                    iter = sibling;
                    break;
                }
                let Some(parent) = current.parent() else {
                    return Ok(());
                };
                current = self.arena.node(parent)?;
                close(current.kind, sink)?;
            }
        }
    }

    fn open<S: Sink>(&self, node: &Node<I>, sink: &mut S) -> Result<()> {
        match node.kind {
            NodeKind::Object => sink.put(b"{"),
            NodeKind::Array => sink.put(b"["),
            NodeKind::Key => {
                sink.put(b"\"")?;
                sink.put(self.span_text(node)?)?;
                sink.put(b"\":")
            }
            NodeKind::String => {
                sink.put(b"\"")?;
                sink.put(self.span_text(node)?)?;
                sink.put(b"\"")
            }
            NodeKind::Number | NodeKind::True | NodeKind::False | NodeKind::Null => {
                sink.put(self.span_text(node)?)
            }
        }
    }

    fn span_text(&self, node: &Node<I>) -> Result<&'a [u8]> {
        self.input
            .get(node.text.offset..node.text.end())
            .ok_or(Error::UnexpectedNode {
                index: node.text.offset,
            })
    }
}

fn close<S: Sink>(kind: NodeKind, sink: &mut S) -> Result<()> {
    match kind {
        NodeKind::Object => sink.put(b"}"),
        NodeKind::Array => sink.put(b"]"),
        _ => Ok(()),
    }
}
