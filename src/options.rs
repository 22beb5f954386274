/// What happens when an object repeats a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateKeys {
    /// Every occurrence stays in the tree, in input order.
    #[default]
    KeepAll,
    /// The earlier value is freed and the last occurrence wins.
    OverwriteLast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    pub duplicate_keys: DuplicateKeys,
    pub trailing_commas: bool,
    pub exponents: bool,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duplicate_keys(mut self, duplicate_keys: DuplicateKeys) -> Self {
        self.duplicate_keys = duplicate_keys;
        self
    }

    /// Accept `{"a":1,}` and `[1,]`.
    pub fn with_trailing_commas(mut self, trailing_commas: bool) -> Self {
        self.trailing_commas = trailing_commas;
        self
    }

    /// Accept `1e5`, `2.5E-3` and friends as numbers.
    pub fn with_exponents(mut self, exponents: bool) -> Self {
        self.exponents = exponents;
        self
    }
}
