use std::borrow::Cow;
use std::fmt;

use ::serde::ser::{Error as _, SerializeMap, SerializeSeq};
use ::serde::{Serialize, Serializer};

use crate::arena::{NodeId, NodeIndex, NodeKind};
use crate::Context;

/// A node viewed as a `serde` value.
///
/// Strings are unescaped and numbers go through `serde_json::Number`, so the
/// view can feed any serializer, `serde_json::Value` included.
pub struct ValueRef<'c, 'm, 'a, I: NodeIndex> {
    ctx: &'c Context<'m, 'a, I>,
    id: NodeId<I>,
}

impl<'m, 'a, I: NodeIndex> Context<'m, 'a, I> {
    pub fn value(&self, id: NodeId<I>) -> ValueRef<'_, 'm, 'a, I> {
        ValueRef { ctx: self, id }
    }

    /// Converts the subtree under `id` into an owned `serde_json::Value`.
    pub fn to_value(&self, id: NodeId<I>) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self.value(id))
    }

    /// Decoded text of a string or key node.
    pub fn unescape(&self, id: NodeId<I>) -> Option<Cow<'a, str>> {
        let raw = self.text(id)?;
        if !raw.contains(&b'\\') {
            return std::str::from_utf8(raw).ok().map(Cow::Borrowed);
        }
        let span = self.node(id)?.text;
        let quoted = self.input.get(span.offset.checked_sub(1)?..span.end() + 1)?;
        serde_json::from_slice::<String>(quoted).ok().map(Cow::Owned)
    }
}

impl<I: NodeIndex> fmt::Debug for ValueRef<'_, '_, '_, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueRef").field("id", &self.id).finish()
    }
}

impl<I: NodeIndex> Serialize for ValueRef<'_, '_, '_, I> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let ctx = self.ctx;
        let node = ctx
            .node(self.id)
            .ok_or_else(|| S::Error::custom(format!("no live node {:?}", self.id)))?;

        match node.kind {
            NodeKind::Object => {
                let mut map = serializer.serialize_map(None)?;
                for key in ctx.children(self.id) {
                    let name = string_of::<S, I>(ctx, key)?;
                    let value = ctx
                        .child(key)
                        .ok_or_else(|| S::Error::custom(format!("key {name:?} has no value")))?;
                    map.serialize_entry(&name, &ctx.value(value))?;
                }
                map.end()
            }
            NodeKind::Array => {
                let mut seq = serializer.serialize_seq(None)?;
                for element in ctx.children(self.id) {
                    seq.serialize_element(&ctx.value(element))?;
                }
                seq.end()
            }
            NodeKind::Key => Err(S::Error::custom("key outside of an object")),
            NodeKind::String => serializer.serialize_str(&string_of::<S, I>(ctx, self.id)?),
            NodeKind::Number => {
                let text = ctx
                    .text_str(self.id)
                    .ok_or_else(|| S::Error::custom("number is not utf-8"))?;
                let number: serde_json::Number = text.parse().map_err(S::Error::custom)?;
                number.serialize(serializer)
            }
            NodeKind::True => serializer.serialize_bool(true),
            NodeKind::False => serializer.serialize_bool(false),
            NodeKind::Null => serializer.serialize_unit(),
        }
    }
}

fn string_of<'a, S: Serializer, I: NodeIndex>(
    ctx: &Context<'_, 'a, I>,
    id: NodeId<I>,
) -> Result<Cow<'a, str>, S::Error> {
    ctx.unescape(id)
        .ok_or_else(|| S::Error::custom(format!("invalid string at node {id:?}")))
}
