mod parser;
pub mod scanner;

use crate::arena::NodeIndex;
use crate::{Context, Error, Result};

use parser::Parser;

impl<'m, 'a, I: NodeIndex> Context<'m, 'a, I> {
    /// Parses `input` into the arena. On success the cursor names the root.
    ///
    /// A session that already failed returns its latched error; a session
    /// that already holds a document returns [`Error::ContextInUse`] until
    /// [`Context::clear`] is called.
    pub fn parse(&mut self, input: &'a [u8]) -> Result<()> {
        if let Some(error) = self.status {
            return Err(error);
        }
        if self.arena.root().is_some() {
            return Err(Error::ContextInUse);
        }
        self.input = input;
        self.cursor = None;
        Parser::new(self).run()
    }

    pub fn parse_str(&mut self, input: &'a str) -> Result<()> {
        self.parse(input.as_bytes())
    }
}
