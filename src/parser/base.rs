//! Token stream navigation shared by the clause parsers.

use crate::lexer::token::{Token, TokenKind};

use super::{ParseError, ParseResult};

/// Cursor over lexed tokens.
///
/// The slice ends with the lexer's EOF token and the cursor never moves past it,
/// so `current` is always defined.
pub struct TokenStream<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> TokenStream<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        debug_assert!(matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)));
        Self { tokens, pos: 0 }
    }

    pub fn current(&self) -> &'a Token {
        &self.tokens[self.pos]
    }

    /// Tokens from the cursor on, for multi-token operator lookahead.
    pub fn rest(&self) -> &'a [Token] {
        &self.tokens[self.pos..]
    }

    /// Consumes the current token. At EOF the cursor stays put.
    pub fn bump(&mut self) -> &'a Token {
        let token = self.current();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub fn check(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    /// Consumes the current token when it is `kind`.
    pub fn eat(&mut self, kind: &TokenKind) -> Option<&'a Token> {
        if self.check(kind) {
            Some(self.bump())
        } else {
            None
        }
    }

    /// Consumes `kind` or fails with "expected {kind} {context}, found ...".
    pub fn expect(&mut self, kind: TokenKind, context: &str) -> ParseResult<&'a Token> {
        match self.eat(&kind) {
            Some(token) => Ok(token),
            None => Err(self.error_here(format!(
                "expected {kind} {context}, found {}",
                self.current().kind
            ))),
        }
    }

    pub fn at_end(&self) -> bool {
        self.check(&TokenKind::Eof)
    }

    pub fn error_here(&self, message: impl Into<String>) -> ParseError {
        ParseError::syntax(message, self.current().span.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    #[test]
    fn bump_stops_at_eof() {
        let tokens = tokenize("SELECT").tokens;
        let mut stream = TokenStream::new(&tokens);
        assert_eq!(stream.bump().kind, TokenKind::Select);
        assert!(stream.at_end());
        assert_eq!(stream.bump().kind, TokenKind::Eof);
        assert!(stream.at_end());
    }

    #[test]
    fn eat_and_expect() {
        let tokens = tokenize("ORDER BY").tokens;
        let mut stream = TokenStream::new(&tokens);
        assert!(stream.eat(&TokenKind::By).is_none());
        assert!(stream.eat(&TokenKind::Order).is_some());
        assert_eq!(stream.expect(TokenKind::By, "after ORDER").map(|t| t.span.clone()), Ok(6..8));
        let error = stream.expect(TokenKind::By, "after ORDER").unwrap_err();
        assert_eq!(error.message, "expected BY after ORDER, found end of input");
    }
}
