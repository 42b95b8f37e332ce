//! Validator and auto-fixer for Google Ads Query Language (GAQL) queries.
//!
//! Query text goes through four stages:
//!
//! - [`lexer`] turns text into tokens with `logos`
//! - [`parser`] builds a concrete parse tree over the [`grammar`] and reduces it
//!   to a [`Query`]
//! - [`semantic`] checks the query against [`ReferenceTables`]
//! - [`fixer`] corrects what it can by approximate matching
//!
//! Every failure can be rendered with source context through [`diag`].
//!
//! # Example
//!
//! ```
//! use gaql_validator::{fix, validate};
//!
//! let result = validate("SELECT campaign.id FROM campaign LIMIT 10", false).unwrap();
//! assert!(result.valid);
//!
//! let fixed = fix("SELECT campaign.id FROM campaing LIMIT 10");
//! assert!(fixed.success);
//! assert_eq!(
//!     fixed.fixed_text.as_deref(),
//!     Some("SELECT campaign.id FROM campaign LIMIT 10")
//! );
//! ```

pub mod ast;
pub mod diag;
pub mod error;
pub mod fixer;
pub mod format;
pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod semantic;

pub use ast::{Condition, Literal, Operator, Query, Span, Spanned, Value};
pub use diag::{Diag, DiagLabel, DiagSeverity, LabelRole, QuerySource};
pub use error::GaqlError;
pub use fixer::{CorrectionRecord, FixResult, Fixer, FixerConfig};
pub use lexer::token::{Token, TokenKind};
pub use lexer::{Lexer, LexerResult, tokenize};
pub use parser::{ParseError, ParseResult, parse};
pub use semantic::{
    Finding, FindingKind, Location, ReferenceTables, Target, Validation, ValidationConfig,
    Validator,
};

/// Validates `text` against the embedded GAQL tables.
///
/// With `strict` the first problem is returned as an error; otherwise every
/// problem is collected into the [`Validation`].
pub fn validate(text: &str, strict: bool) -> Result<Validation, GaqlError> {
    Validator::new().validate(text, strict)
}

/// Fixes `text` against the embedded GAQL tables with the default threshold.
pub fn fix(text: &str) -> FixResult {
    Fixer::new().fix(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_validation_returns_typed_error() {
        let error = validate("SELECT campaign.id FROM campaign WHERE campaign.id DURING LAST_7_DAYS", true)
            .unwrap_err();
        assert!(matches!(error, GaqlError::Operator(_)));
        assert_eq!(error.kind(), FindingKind::Operator);
    }

    #[test]
    fn non_strict_validation_collects_everything() {
        let result = validate(
            "SELECT campain.id FROM campaing PARAMETERS include_draft = true",
            false,
        )
        .unwrap();
        assert!(!result.valid);
        let kinds: Vec<FindingKind> = result.errors.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![FindingKind::Resource, FindingKind::Field, FindingKind::Parameter]
        );
    }
}
