//! Shared helpers for the integration tests.
//!
//! - [`parse_cleanly`] - parse text, panicking with the rendered error on failure
//! - [`assert_syntax_error_containing`] - parsing must fail with a matching message
//! - [`assert_valid`] - validation must report no findings
//! - [`kinds_of`] - the finding kinds of a non-strict validation, in order

#![allow(dead_code)]

use gaql_validator::diag::QuerySource;
use gaql_validator::{FindingKind, ParseError, Query, Validation, parse, validate};

/// Renders a parse error against its source for assertion messages.
pub fn render_parse_error(text: &str, error: &ParseError) -> String {
    format!("{:?}", error.to_diag().to_report(&QuerySource::new(text)))
}

/// Parses `text`, panicking with the rendered diagnostic if it fails.
pub fn parse_cleanly(text: &str) -> Query {
    match parse(text) {
        Ok(query) => query,
        Err(error) => panic!(
            "expected `{text}` to parse:\n{}",
            render_parse_error(text, &error)
        ),
    }
}

/// Asserts that `text` fails to parse with a syntax-class error whose message
/// contains `needle`. Returns the error for further checks.
pub fn assert_syntax_error_containing(text: &str, needle: &str) -> ParseError {
    let error = match parse(text) {
        Ok(query) => panic!("expected `{text}` to fail, parsed as `{query}`"),
        Err(error) => error,
    };
    assert!(
        error.kind.is_syntax(),
        "expected a syntax error for `{text}`, got {}",
        error.kind
    );
    assert!(
        error.message.contains(needle),
        "expected `{needle}` in error for `{text}`:\n{}",
        render_parse_error(text, &error)
    );
    error
}

/// Runs a non-strict validation.
pub fn validation(text: &str) -> Validation {
    match validate(text, false) {
        Ok(validation) => validation,
        Err(error) => panic!("non-strict validation of `{text}` returned an error: {error}"),
    }
}

/// Asserts that `text` is a valid query.
pub fn assert_valid(text: &str) {
    let result = validation(text);
    assert!(
        result.valid && result.errors.is_empty(),
        "expected `{text}` to be valid, found:\n{}",
        result
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Finding kinds reported for `text`, in pass order.
pub fn kinds_of(text: &str) -> Vec<FindingKind> {
    validation(text).errors.iter().map(|finding| finding.kind).collect()
}
