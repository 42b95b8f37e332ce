//! Token types and representations for GAQL lexical analysis.
//!
//! The terminal patterns live on [`TokenKind`] as `logos` attributes. Keywords
//! are case-insensitive. Dotted names lex as one identifier token.

use crate::ast::Span;
use logos::Logos;
use smol_str::SmolStr;
use std::fmt;

/// The kind of a lexical token in GAQL.
#[derive(Logos, Debug, Clone, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"--[^\n]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
pub enum TokenKind {
    // Clause keywords
    #[token("SELECT", ignore(ascii_case))]
    Select,
    #[token("FROM", ignore(ascii_case))]
    From,
    #[token("WHERE", ignore(ascii_case))]
    Where,
    #[token("ORDER", ignore(ascii_case))]
    Order,
    #[token("BY", ignore(ascii_case))]
    By,
    #[token("LIMIT", ignore(ascii_case))]
    Limit,
    #[token("PARAMETERS", ignore(ascii_case))]
    Parameters,

    // Connectives and directions
    #[token("AND", ignore(ascii_case))]
    And,
    #[token("OR", ignore(ascii_case))]
    Or,
    #[token("ASC", ignore(ascii_case))]
    Asc,
    #[token("DESC", ignore(ascii_case))]
    Desc,

    // Operator keywords
    #[token("LIKE", ignore(ascii_case))]
    Like,
    #[token("NOT", ignore(ascii_case))]
    Not,
    #[token("IN", ignore(ascii_case))]
    In,
    #[token("CONTAINS", ignore(ascii_case))]
    Contains,
    #[token("ANY", ignore(ascii_case))]
    Any,
    #[token("ALL", ignore(ascii_case))]
    All,
    #[token("NONE", ignore(ascii_case))]
    NoneKeyword,
    #[token("IS", ignore(ascii_case))]
    Is,
    #[token("NULL", ignore(ascii_case))]
    Null,
    #[token("BETWEEN", ignore(ascii_case))]
    Between,
    #[token("DURING", ignore(ascii_case))]
    During,
    #[token("REGEXP_MATCH", ignore(ascii_case))]
    RegexpMatch,

    // Boolean literals
    #[token("TRUE", ignore(ascii_case))]
    True,
    #[token("FALSE", ignore(ascii_case))]
    False,

    // Identifiers (field, resource, parameter names and date range constants)
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*", |lex| SmolStr::new(lex.slice()))]
    Identifier(SmolStr),

    // Literals. A single-quoted string may hold `"` verbatim and vice versa.
    #[regex(r#"'([^'\\\n]|\\.)*'"#, unquote)]
    #[regex(r#""([^"\\\n]|\\.)*""#, unquote)]
    StringLiteral(SmolStr),
    #[regex(r#"'([^'\\\n]|\\.)*"#)]
    #[regex(r#""([^"\\\n]|\\.)*"#)]
    UnterminatedString,
    #[regex(r"-?[0-9]+", |lex| SmolStr::new(lex.slice()))]
    IntegerLiteral(SmolStr),
    #[regex(r"-?[0-9]+\.[0-9]+", |lex| SmolStr::new(lex.slice()))]
    FloatLiteral(SmolStr),

    // Comparison operators
    #[token("=")]
    Eq,
    #[token("!=")]
    #[token("<>")]
    NotEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,

    // Punctuation
    #[token(",")]
    Comma,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,

    // Special
    /// A run of characters no terminal matches.
    Invalid(SmolStr),
    Eof,
}

/// Strips the quotes from a string literal and resolves backslash escapes.
fn unquote(lex: &mut logos::Lexer<TokenKind>) -> SmolStr {
    let slice = lex.slice();
    let inner = &slice[1..slice.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    SmolStr::new(out)
}

impl TokenKind {
    /// Returns true if this token kind opens a clause.
    pub fn is_clause_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Select
                | TokenKind::From
                | TokenKind::Where
                | TokenKind::Order
                | TokenKind::Limit
                | TokenKind::Parameters
        )
    }

    /// Returns true if this token kind is a keyword.
    pub fn is_keyword(&self) -> bool {
        self.is_clause_keyword()
            || matches!(
                self,
                TokenKind::By
                    | TokenKind::And
                    | TokenKind::Or
                    | TokenKind::Asc
                    | TokenKind::Desc
                    | TokenKind::Like
                    | TokenKind::Not
                    | TokenKind::In
                    | TokenKind::Contains
                    | TokenKind::Any
                    | TokenKind::All
                    | TokenKind::NoneKeyword
                    | TokenKind::Is
                    | TokenKind::Null
                    | TokenKind::Between
                    | TokenKind::During
                    | TokenKind::RegexpMatch
                    | TokenKind::True
                    | TokenKind::False
            )
    }

    /// Returns true if this token kind is a literal.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::StringLiteral(_)
                | TokenKind::IntegerLiteral(_)
                | TokenKind::FloatLiteral(_)
                | TokenKind::True
                | TokenKind::False
        )
    }

    /// Returns true if this token can begin an operator.
    pub fn starts_operator(&self) -> bool {
        matches!(
            self,
            TokenKind::Eq
                | TokenKind::NotEq
                | TokenKind::Gt
                | TokenKind::GtEq
                | TokenKind::Lt
                | TokenKind::LtEq
                | TokenKind::Like
                | TokenKind::Not
                | TokenKind::In
                | TokenKind::Contains
                | TokenKind::Is
                | TokenKind::Between
                | TokenKind::During
                | TokenKind::RegexpMatch
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Select => write!(f, "SELECT"),
            TokenKind::From => write!(f, "FROM"),
            TokenKind::Where => write!(f, "WHERE"),
            TokenKind::Order => write!(f, "ORDER"),
            TokenKind::By => write!(f, "BY"),
            TokenKind::Limit => write!(f, "LIMIT"),
            TokenKind::Parameters => write!(f, "PARAMETERS"),
            TokenKind::And => write!(f, "AND"),
            TokenKind::Or => write!(f, "OR"),
            TokenKind::Asc => write!(f, "ASC"),
            TokenKind::Desc => write!(f, "DESC"),
            TokenKind::Like => write!(f, "LIKE"),
            TokenKind::Not => write!(f, "NOT"),
            TokenKind::In => write!(f, "IN"),
            TokenKind::Contains => write!(f, "CONTAINS"),
            TokenKind::Any => write!(f, "ANY"),
            TokenKind::All => write!(f, "ALL"),
            TokenKind::NoneKeyword => write!(f, "NONE"),
            TokenKind::Is => write!(f, "IS"),
            TokenKind::Null => write!(f, "NULL"),
            TokenKind::Between => write!(f, "BETWEEN"),
            TokenKind::During => write!(f, "DURING"),
            TokenKind::RegexpMatch => write!(f, "REGEXP_MATCH"),
            TokenKind::True => write!(f, "TRUE"),
            TokenKind::False => write!(f, "FALSE"),
            TokenKind::Identifier(name) => write!(f, "identifier '{name}'"),
            TokenKind::StringLiteral(_) => write!(f, "string literal"),
            TokenKind::UnterminatedString => write!(f, "unterminated string literal"),
            TokenKind::IntegerLiteral(text) => write!(f, "integer '{text}'"),
            TokenKind::FloatLiteral(text) => write!(f, "number '{text}'"),
            TokenKind::Eq => write!(f, "'='"),
            TokenKind::NotEq => write!(f, "'!='"),
            TokenKind::Gt => write!(f, "'>'"),
            TokenKind::GtEq => write!(f, "'>='"),
            TokenKind::Lt => write!(f, "'<'"),
            TokenKind::LtEq => write!(f, "'<='"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::Invalid(text) => write!(f, "'{text}'"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// A token with its kind, source span, and original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// The exact source slice, used by lexical repairs.
    pub text: SmolStr,
}

impl Token {
    /// Creates a new token.
    pub fn new(kind: TokenKind, span: Span, text: impl Into<SmolStr>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_classification() {
        assert!(TokenKind::Select.is_keyword());
        assert!(TokenKind::Select.is_clause_keyword());
        assert!(TokenKind::During.is_keyword());
        assert!(!TokenKind::During.is_clause_keyword());
        assert!(!TokenKind::Identifier("campaign".into()).is_keyword());
    }

    #[test]
    fn literal_classification() {
        assert!(TokenKind::StringLiteral("x".into()).is_literal());
        assert!(TokenKind::True.is_literal());
        assert!(!TokenKind::Identifier("ENABLED".into()).is_literal());
    }

    #[test]
    fn display_is_human_readable() {
        assert_eq!(TokenKind::RegexpMatch.to_string(), "REGEXP_MATCH");
        assert_eq!(TokenKind::Eof.to_string(), "end of input");
        assert_eq!(
            TokenKind::Identifier("campaing".into()).to_string(),
            "identifier 'campaing'"
        );
    }
}
