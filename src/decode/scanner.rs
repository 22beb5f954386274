use memchr::memchr3;

use crate::arena::Span;
use crate::constants::{is_space, FALSE, NULL, TRUE};
use crate::log::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Colon,
    Comma,
    String,
    Number,
    True,
    False,
    Null,
    Invalid,
    Eof,
}

/// One lexical token. String spans exclude the surrounding quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    fn new(kind: TokenKind, offset: usize, length: usize) -> Self {
        Self {
            kind,
            span: Span::new(offset, length),
        }
    }
}

/// Zero-copy tokenizer. A NUL byte ends the input just like running off the
/// end of the slice does.
pub struct Scanner<'a> {
    input: &'a [u8],
    position: usize,
    exponents: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            position: 0,
            exponents: false,
        }
    }

    pub fn with_exponents(mut self, exponents: bool) -> Self {
        self.exponents = exponents;
        self
    }

    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.peek_at(self.position)
    }

    #[inline]
    fn peek_at(&self, index: usize) -> Option<u8> {
        match self.input.get(index) {
            Some(0) | None => None,
            Some(&byte) => Some(byte),
        }
    }

    #[inline]
    fn digit_at(&self, index: usize) -> bool {
        matches!(self.peek_at(index), Some(b'0'..=b'9'))
    }

    pub fn next_token(&mut self) -> Token {
        while matches!(self.peek(), Some(byte) if is_space(byte)) {
            self.position += 1;
        }

        let start = self.position;
        let token = match self.peek() {
            None => Token::new(TokenKind::Eof, start, 0),
            Some(b'{') => self.single(TokenKind::LeftBrace),
            Some(b'}') => self.single(TokenKind::RightBrace),
            Some(b'[') => self.single(TokenKind::LeftBracket),
            Some(b']') => self.single(TokenKind::RightBracket),
            Some(b':') => self.single(TokenKind::Colon),
            Some(b',') => self.single(TokenKind::Comma),
            Some(b'"') => self.scan_string(),
            Some(b'-' | b'0'..=b'9') => self.scan_number(),
            Some(b't') => self.scan_literal(TRUE, TokenKind::True),
            Some(b'f') => self.scan_literal(FALSE, TokenKind::False),
            Some(b'n') => self.scan_literal(NULL, TokenKind::Null),
            Some(_) => self.single(TokenKind::Invalid),
        };

        trace!(
            kind = ?token.kind,
            offset = token.span.offset,
            length = token.span.length,
            "token"
        );
        token
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let token = Token::new(kind, self.position, 1);
        self.position += 1;
        token
    }

    fn scan_string(&mut self) -> Token {
        let start = self.position + 1;
        let mut cursor = start;
        loop {
            let found = self
                .input
                .get(cursor..)
                .and_then(|rest| memchr3(b'"', b'\\', 0, rest));
            let Some(found) = found else {
                self.position = self.input.len();
                return Token::new(TokenKind::Invalid, start, self.input.len() - start);
            };
            let index = cursor + found;
            match self.input[index] {
                b'"' => {
                    self.position = index + 1;
                    return Token::new(TokenKind::String, start, index - start);
                }
                b'\\' if self.peek_at(index + 1).is_some() => cursor = index + 2,
                _ => {
                    self.position = index;
                    return Token::new(TokenKind::Invalid, start, index - start);
                }
            }
        }
    }

    fn skip_digits(&mut self) {
        while self.digit_at(self.position) {
            self.position += 1;
        }
    }

    // -?digit+(.digit+)? and, with exponents on, ([eE][+-]?digit+)?. The scan
    // stops at the first byte outside that shape and leaves it for the next
    // token.
    fn scan_number(&mut self) -> Token {
        let start = self.position;
        if self.peek() == Some(b'-') {
            self.position += 1;
            if !self.digit_at(self.position) {
                return Token::new(TokenKind::Invalid, start, 1);
            }
        }
        self.skip_digits();

        if self.peek() == Some(b'.') {
            self.position += 1;
            if !self.digit_at(self.position) {
                return Token::new(TokenKind::Invalid, start, self.position - start);
            }
            self.skip_digits();
        }

        if self.exponents && matches!(self.peek(), Some(b'e' | b'E')) {
            self.position += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.position += 1;
            }
            if !self.digit_at(self.position) {
                return Token::new(TokenKind::Invalid, start, self.position - start);
            }
            self.skip_digits();
        }

        Token::new(TokenKind::Number, start, self.position - start)
    }

    fn scan_literal(&mut self, keyword: &[u8], kind: TokenKind) -> Token {
        let start = self.position;
        let mut matched = true;
        for &expected in keyword {
            match self.peek() {
                Some(byte) => {
                    matched &= byte == expected;
                    self.position += 1;
                }
                None => return Token::new(TokenKind::Invalid, start, self.position - start),
            }
        }
        let kind = if matched { kind } else { TokenKind::Invalid };
        Token::new(kind, start, keyword.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn kinds(input: &str, exponents: bool) -> Vec<TokenKind> {
        let mut scanner = Scanner::new(input.as_bytes()).with_exponents(exponents);
        let mut out = Vec::new();
        loop {
            let token = scanner.next_token();
            out.push(token.kind);
            if token.kind == TokenKind::Eof {
                return out;
            }
        }
    }

    fn first(input: &str) -> (TokenKind, String) {
        let token = Scanner::new(input.as_bytes()).next_token();
        let text = &input.as_bytes()[token.span.offset..token.span.end()];
        (token.kind, String::from_utf8_lossy(text).into_owned())
    }

    #[rstest]
    fn test_structural_tokens() {
        use TokenKind::*;
        assert_eq!(
            kinds(" { } [ ] : , ", false),
            vec![LeftBrace, RightBrace, LeftBracket, RightBracket, Colon, Comma, Eof]
        );
    }

    #[rstest]
    #[case("\"abc\"", TokenKind::String, "abc")]
    #[case("\"\"", TokenKind::String, "")]
    #[case(r#""a\"b""#, TokenKind::String, r#"a\"b"#)]
    #[case(r#""a\\""#, TokenKind::String, r#"a\\"#)]
    #[case(r#""é\n""#, TokenKind::String, r#"é\n"#)]
    #[case("\"abc", TokenKind::Invalid, "abc")]
    #[case("\"ab\\", TokenKind::Invalid, "ab")]
    fn test_strings(#[case] input: &str, #[case] kind: TokenKind, #[case] text: &str) {
        assert_eq!(first(input), (kind, text.to_string()));
    }

    #[rstest]
    #[case("0", TokenKind::Number, "0")]
    #[case("42,", TokenKind::Number, "42")]
    #[case("-7}", TokenKind::Number, "-7")]
    #[case("3.25]", TokenKind::Number, "3.25")]
    #[case("10 ", TokenKind::Number, "10")]
    #[case("12e5", TokenKind::Number, "12")]
    #[case("1.2.3", TokenKind::Number, "1.2")]
    #[case("-", TokenKind::Invalid, "-")]
    #[case("-x", TokenKind::Invalid, "-")]
    #[case("1.", TokenKind::Invalid, "1.")]
    #[case("1.}", TokenKind::Invalid, "1.")]
    fn test_numbers(#[case] input: &str, #[case] kind: TokenKind, #[case] text: &str) {
        assert_eq!(first(input), (kind, text.to_string()));
    }

    #[rstest]
    fn test_exponent_is_left_for_the_next_token() {
        use TokenKind::*;
        assert_eq!(kinds("1e5", false), vec![Number, Invalid, Number, Eof]);
    }

    #[rstest]
    #[case("1e5", vec![TokenKind::Number, TokenKind::Eof])]
    #[case("-2.5E-3", vec![TokenKind::Number, TokenKind::Eof])]
    #[case("6e+1,", vec![TokenKind::Number, TokenKind::Comma, TokenKind::Eof])]
    #[case("1e", vec![TokenKind::Invalid, TokenKind::Eof])]
    #[case("1e+", vec![TokenKind::Invalid, TokenKind::Eof])]
    fn test_exponents_when_enabled(#[case] input: &str, #[case] expected: Vec<TokenKind>) {
        assert_eq!(kinds(input, true), expected);
    }

    #[rstest]
    #[case("true", TokenKind::True)]
    #[case("false", TokenKind::False)]
    #[case("null", TokenKind::Null)]
    #[case("tru}", TokenKind::Invalid)]
    #[case("nul", TokenKind::Invalid)]
    #[case("fals", TokenKind::Invalid)]
    #[case("nope", TokenKind::Invalid)]
    fn test_literals(#[case] input: &str, #[case] kind: TokenKind) {
        assert_eq!(first(input).0, kind);
    }

    #[rstest]
    fn test_literal_followed_by_garbage() {
        use TokenKind::*;
        assert_eq!(kinds("truex", false), vec![True, Invalid, Eof]);
    }

    #[rstest]
    fn test_unknown_byte_is_invalid() {
        assert_eq!(first("@"), (TokenKind::Invalid, "@".to_string()));
    }

    #[rstest]
    #[case("")]
    #[case("  \t\r\n ")]
    #[case("\0{}")]
    fn test_end_of_input(#[case] input: &str) {
        assert_eq!(first(input).0, TokenKind::Eof);
    }

    #[rstest]
    fn test_nul_terminates_string() {
        assert_eq!(first("\"ab\0\"").0, TokenKind::Invalid);
    }

    #[rstest]
    fn test_position_always_advances() {
        let input = b"{\"a\":[1,-,tru,\"x\"]}@";
        let mut scanner = Scanner::new(input);
        let mut last = 0;
        loop {
            let token = scanner.next_token();
            if token.kind == TokenKind::Eof {
                break;
            }
            assert!(scanner.position() > last);
            last = scanner.position();
        }
        assert_eq!(last, input.len());
    }
}
