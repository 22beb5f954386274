use crate::arena::{NodeId, NodeIndex, NodeKind};
use crate::log::{debug, trace};
use crate::{Context, DuplicateKeys, Error, Result};

use super::scanner::{Scanner, Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    WantKey,
    WantValue,
    WantArray,
    PropertyEnd,
    ValueEnd,
    StructureEnd,
}

/// Token-driven state machine that links nodes into the context's arena.
///
/// The cursor always names the most recently completed node. Accepting a
/// value token appends a child of the cursor and moves onto it; accepting
/// `}` `]` or `,` creates nothing and moves the cursor back up to the
/// container the next token belongs to.
pub(crate) struct Parser<'c, 'm, 'a, I: NodeIndex> {
    ctx: &'c mut Context<'m, 'a, I>,
    scanner: Scanner<'a>,
    token: Token,
    state: State,
}

impl<'c, 'm, 'a, I: NodeIndex> Parser<'c, 'm, 'a, I> {
    pub(crate) fn new(ctx: &'c mut Context<'m, 'a, I>) -> Self {
        let mut scanner = Scanner::new(ctx.input).with_exponents(ctx.options.exponents);
        let token = scanner.next_token();
        Self {
            ctx,
            scanner,
            token,
            state: State::Start,
        }
    }

    pub(crate) fn run(mut self) -> Result<()> {
        while self.token.kind != TokenKind::Eof {
            self.step();
            if self.ctx.cursor.is_none() || self.ctx.status.is_some() {
                break;
            }
        }

        if self.ctx.status.is_none() {
            if self.token.kind != TokenKind::Eof {
                self.unexpected();
            } else if self.ctx.cursor.is_some() || self.ctx.arena.root().is_none() {
                self.ctx.latch(Error::UnexpectedEof);
            }
        }

        self.ctx.reset_cursor();
        match self.ctx.status {
            Some(error) => {
                debug!(%error, state = ?self.state, "parse failed");
                Err(error)
            }
            None => Ok(()),
        }
    }

    fn step(&mut self) {
        match self.state {
            State::Start => {
                if !self.accept(TokenKind::LeftBracket, Some(NodeKind::Array), State::WantArray) {
                    self.expect(TokenKind::LeftBrace, Some(NodeKind::Object), State::WantKey);
                }
            }
            State::WantKey => {
                if self.closer_allowed() && self.accept(TokenKind::RightBrace, None, State::StructureEnd)
                {
                    return;
                }
                if self.expect(TokenKind::String, Some(NodeKind::Key), State::WantValue) {
                    self.expect(TokenKind::Colon, None, State::WantValue);
                }
            }
            State::WantValue => {
                if !self.accept_value(State::PropertyEnd) {
                    self.expect(TokenKind::LeftBracket, Some(NodeKind::Array), State::WantArray);
                }
            }
            State::WantArray => {
                if self.accept_value(State::ValueEnd)
                    || self.accept(TokenKind::LeftBracket, Some(NodeKind::Array), State::WantArray)
                {
                    return;
                }
                if self.closer_allowed() {
                    self.expect(TokenKind::RightBracket, None, State::StructureEnd);
                } else {
                    self.unexpected();
                }
            }
            State::PropertyEnd => {
                if !self.accept(TokenKind::Comma, None, State::WantKey) {
                    self.expect(TokenKind::RightBrace, None, State::StructureEnd);
                }
            }
            State::ValueEnd => {
                if !self.accept(TokenKind::Comma, None, State::WantArray) {
                    self.expect(TokenKind::RightBracket, None, State::StructureEnd);
                }
            }
            State::StructureEnd => match self.cursor_kind() {
                Some(NodeKind::Object) => {
                    if !self.accept(TokenKind::RightBrace, None, State::StructureEnd) {
                        self.expect(TokenKind::Comma, None, State::WantKey);
                    }
                }
                Some(NodeKind::Array) => {
                    if !self.accept(TokenKind::RightBracket, None, State::StructureEnd) {
                        self.expect(TokenKind::Comma, None, State::WantArray);
                    }
                }
                _ => self.unexpected(),
            },
        }
    }

    /// Scalars, and `{` opening a nested object.
    fn accept_value(&mut self, next: State) -> bool {
        self.accept(TokenKind::String, Some(NodeKind::String), next)
            || self.accept(TokenKind::Number, Some(NodeKind::Number), next)
            || self.accept(TokenKind::True, Some(NodeKind::True), next)
            || self.accept(TokenKind::False, Some(NodeKind::False), next)
            || self.accept(TokenKind::Null, Some(NodeKind::Null), next)
            || self.accept(TokenKind::LeftBrace, Some(NodeKind::Object), State::WantKey)
    }

    /// If the lookahead is `kind`, apply it and advance. `element` is the node
    /// to create; `None` re-anchors the cursor instead.
    fn accept(&mut self, kind: TokenKind, element: Option<NodeKind>, next: State) -> bool {
        if self.token.kind != kind {
            return false;
        }

        match element {
            Some(NodeKind::Key) => self.insert_key(),
            Some(element) => self.insert(element),
            None => self.reanchor(kind),
        }
        if self.ctx.status.is_some() {
            return true;
        }

        trace!(from = ?self.state, to = ?next, "transition");
        self.state = next;
        self.token = self.scanner.next_token();
        true
    }

    fn expect(&mut self, kind: TokenKind, element: Option<NodeKind>, next: State) -> bool {
        if self.accept(kind, element, next) {
            return true;
        }
        self.unexpected();
        false
    }

    fn unexpected(&mut self) {
        if self.ctx.status.is_none() {
            debug!(
                token = ?self.token.kind,
                offset = self.token.span.offset,
                state = ?self.state,
                "unexpected token"
            );
        }
        self.ctx.latch(Error::UnexpectedToken {
            offset: self.token.span.offset,
        });
    }

    fn cursor_kind(&self) -> Option<NodeKind> {
        self.ctx.cursor.and_then(|cursor| self.ctx.kind(cursor))
    }

    /// A closer right after a comma is a trailing comma; only an empty
    /// container may be closed from the item-wanting states.
    fn closer_allowed(&self) -> bool {
        self.ctx.options.trailing_commas
            || !self
                .ctx
                .cursor
                .is_some_and(|cursor| self.ctx.child(cursor).is_some())
    }

    fn insert(&mut self, kind: NodeKind) {
        match self.ctx.arena.add_element(self.ctx.cursor, kind, self.token.span) {
            Ok(id) => self.ctx.cursor = Some(id),
            Err(error) => {
                self.ctx.latch(error);
            }
        }
    }

    fn insert_key(&mut self) {
        if self.ctx.options.duplicate_keys == DuplicateKeys::OverwriteLast {
            if let Some(existing) = self.find_duplicate_key() {
                if let Err(error) = self.drop_value(existing) {
                    self.ctx.latch(error);
                    return;
                }
                self.ctx.cursor = Some(existing);
                return;
            }
        }
        self.insert(NodeKind::Key);
    }

    fn drop_value(&mut self, key: NodeId<I>) -> Result<()> {
        if let Some(value) = self.ctx.child(key) {
            let freed = self.ctx.arena.delete_subtree(value)?;
            debug!(key = key.index(), freed, "overwrote duplicate key");
        }
        Ok(())
    }

    fn find_duplicate_key(&self) -> Option<NodeId<I>> {
        let object = self.ctx.cursor?;
        if self.ctx.kind(object) != Some(NodeKind::Object) {
            return None;
        }
        let span = self.token.span;
        let candidate = self.ctx.input.get(span.offset..span.end())?;
        self.ctx
            .children(object)
            .find(|&key| self.ctx.text(key) == Some(candidate))
    }

    fn reanchor(&mut self, kind: TokenKind) {
        let Some(cursor) = self.ctx.cursor else {
            return;
        };
        let arena = &self.ctx.arena;
        let cursor_kind = arena.get(cursor).map(|node| node.kind);

        self.ctx.cursor = match kind {
            TokenKind::RightBrace => {
                let scope = if cursor_kind == Some(NodeKind::Object) {
                    Some(cursor)
                } else {
                    arena.parent_of_kind(cursor, NodeKind::Object)
                };
                scope.and_then(|scope| arena.structural_parent(scope))
            }
            TokenKind::RightBracket => {
                let scope = if cursor_kind == Some(NodeKind::Array) {
                    Some(cursor)
                } else {
                    arena.parent_of_kind(cursor, NodeKind::Array)
                };
                scope.and_then(|scope| arena.structural_parent(scope))
            }
            TokenKind::Comma if !cursor_kind.is_some_and(NodeKind::is_structural) => {
                arena.structural_parent(cursor)
            }
            _ => Some(cursor),
        };
    }
}
