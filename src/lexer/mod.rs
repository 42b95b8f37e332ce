//! Lexical analysis for GAQL.
//!
//! The lexer is error tolerant: characters no terminal matches are collected into
//! [`TokenKind::Invalid`] tokens and an unclosed quote becomes
//! [`TokenKind::UnterminatedString`]. Both are also reported as diagnostics so the
//! parser can fail at the first offending token with a precise position.

pub mod token;

use crate::diag::Diag;
use logos::Logos;
use token::{Token, TokenKind};

/// Tokens of one query, plus a diagnostic per invalid or unterminated token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerResult {
    /// Always ends with [`TokenKind::Eof`].
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diag>,
}

/// A lexical analyzer for GAQL query text.
pub struct Lexer<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    diagnostics: Vec<Diag>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> LexerResult {
        let mut inner = TokenKind::lexer(self.source);
        while let Some(next) = inner.next() {
            let span = inner.span();
            match next {
                Ok(TokenKind::UnterminatedString) => {
                    self.diagnostics.push(
                        Diag::error("unterminated string literal")
                            .with_primary_label(span.clone(), "string starts here")
                            .with_code("L002"),
                    );
                    self.push(TokenKind::UnterminatedString, span);
                }
                Ok(kind) => self.push(kind, span),
                Err(()) => self.push_invalid(span),
            }
        }

        let eof_pos = self.source.len();
        self.tokens
            .push(Token::new(TokenKind::Eof, eof_pos..eof_pos, ""));

        for token in &self.tokens {
            if let TokenKind::Invalid(text) = &token.kind {
                self.diagnostics.push(
                    Diag::error(format!("invalid character sequence '{text}'"))
                        .with_primary_label(token.span.clone(), "here")
                        .with_code("L001"),
                );
            }
        }

        LexerResult {
            tokens: self.tokens,
            diagnostics: self.diagnostics,
        }
    }

    fn push(&mut self, kind: TokenKind, span: std::ops::Range<usize>) {
        let text = &self.source[span.clone()];
        self.tokens.push(Token::new(kind, span, text));
    }

    /// Extends a directly preceding invalid token, or starts a new one.
    fn push_invalid(&mut self, span: std::ops::Range<usize>) {
        if let Some(last) = self.tokens.last_mut() {
            if matches!(last.kind, TokenKind::Invalid(_)) && last.span.end == span.start {
                last.span.end = span.end;
                let text = &self.source[last.span.clone()];
                last.kind = TokenKind::Invalid(text.into());
                last.text = text.into();
                return;
            }
        }
        let text = &self.source[span.clone()];
        self.tokens
            .push(Token::new(TokenKind::Invalid(text.into()), span, text));
    }
}

/// Lexes `source` in one call.
pub fn tokenize(source: &str) -> LexerResult {
    Lexer::new(source).tokenize()
}
