//! Parser for GAQL query text.
//!
//! Parsing runs in two steps. The token stream from the lexer is walked by a
//! recursive-descent parser that follows [`crate::grammar`] and builds a
//! concrete [`ParseTree`]. The tree is then reduced to a [`Query`] by
//! [`transform`]. Either step ends at the first error; no partial query is
//! ever returned.

mod base;
mod clauses;
mod transform;
mod tree;

use std::fmt;

use smol_str::SmolStr;
use tracing::debug;

use crate::ast::{Query, Span};
use crate::diag::Diag;
use crate::lexer::tokenize;
use crate::semantic::{Finding, FindingKind, Location};

pub use base::TokenStream;
pub use transform::transform;
pub use tree::{ParseNode, ParseTree};

/// Default upper bound on query text length, in bytes.
pub const DEFAULT_MAX_QUERY_LEN: usize = 64 * 1024;

/// A syntax failure: grammar, lexical or clause-order violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// [`FindingKind::Syntax`] or [`FindingKind::ClauseOrder`].
    pub kind: FindingKind,
    pub message: String,
    pub span: Span,
    /// Source text under `span`, filled in once the error leaves the parser.
    pub offending: SmolStr,
}

/// Common result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

impl ParseError {
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::new(FindingKind::Syntax, message, span)
    }

    pub fn clause_order(message: impl Into<String>, span: Span) -> Self {
        Self::new(FindingKind::ClauseOrder, message, span)
    }

    fn new(kind: FindingKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
            offending: SmolStr::default(),
        }
    }

    fn located_in(mut self, source: &str) -> Self {
        if let Some(text) = source.get(self.span.clone()) {
            self.offending = text.into();
        }
        self
    }

    pub fn into_finding(self) -> Finding {
        Finding::new(
            self.kind,
            self.message,
            Location::query(Some(self.span)),
            self.offending,
        )
    }

    pub fn to_diag(&self) -> Diag {
        self.clone().into_finding().to_diag()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Parses query text into a [`Query`].
pub fn parse(text: &str) -> ParseResult<Query> {
    parse_with_limit(text, DEFAULT_MAX_QUERY_LEN)
}

/// Parses query text, rejecting input longer than `max_len` bytes.
pub fn parse_with_limit(text: &str, max_len: usize) -> ParseResult<Query> {
    let result = parse_tree_with_limit(text, max_len).and_then(|tree| transform(&tree));
    result.map_err(|error| {
        debug!(kind = %error.kind, message = %error.message, span = ?error.span, "parse failed");
        error.located_in(text)
    })
}

/// Parses query text into its concrete parse tree.
pub fn parse_tree(text: &str) -> ParseResult<ParseTree> {
    parse_tree_with_limit(text, DEFAULT_MAX_QUERY_LEN)
}

fn parse_tree_with_limit(text: &str, max_len: usize) -> ParseResult<ParseTree> {
    if text.len() > max_len {
        return Err(ParseError::syntax(
            format!("query exceeds maximum length of {max_len} bytes"),
            max_len..text.len(),
        ));
    }
    let lexed = tokenize(text);
    let mut stream = TokenStream::new(&lexed.tokens);
    clauses::parse_query(&mut stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{DateRange, Literal, Operator, Value};
    use crate::grammar::Rule;

    fn syntax_error(text: &str) -> ParseError {
        match parse(text) {
            Ok(query) => panic!("expected a syntax error, parsed {query}"),
            Err(error) => error,
        }
    }

    #[test]
    fn parse_minimal_query() {
        let query = parse("SELECT campaign.id FROM campaign LIMIT 10").unwrap();
        assert_eq!(query.select[0].node, "campaign.id");
        assert_eq!(query.resource.node, "campaign");
        assert_eq!(query.limit.map(|l| l.node), Some(10));
    }

    #[test]
    fn keywords_ignore_case_and_layout() {
        let query = parse(
            "select campaign.id,\n       campaign.name\n  from campaign -- all of them\n where campaign.status = 'ENABLED'",
        )
        .unwrap();
        assert_eq!(query.select.len(), 2);
        assert_eq!(query.conditions.len(), 1);
    }

    #[test]
    fn missing_from_is_a_syntax_error() {
        let error = syntax_error("SELECT campaign.id LIMIT 10");
        assert_eq!(error.kind, FindingKind::Syntax);
        assert_eq!(error.message, "FROM clause is required");
        assert_eq!(error.offending, "LIMIT");
    }

    #[test]
    fn query_must_start_with_select() {
        let error = syntax_error("FROM campaign SELECT campaign.id LIMIT 10");
        assert_eq!(error.kind, FindingKind::ClauseOrder);
        assert!(error.message.starts_with("clause order"));
    }

    #[test]
    fn clauses_out_of_order() {
        let error = syntax_error("SELECT campaign.id FROM campaign LIMIT 10 WHERE campaign.id = 1");
        assert_eq!(error.kind, FindingKind::ClauseOrder);
        assert_eq!(error.message, "clause order: WHERE must come before LIMIT");
    }

    #[test]
    fn duplicate_clause() {
        let error = syntax_error("SELECT campaign.id FROM campaign LIMIT 1 LIMIT 2");
        assert_eq!(error.message, "duplicate LIMIT clause");
    }

    #[test]
    fn unknown_operator_token() {
        let error =
            syntax_error("SELECT campaign.id FROM campaign WHERE campaign.status ^^ 'ENABLED'");
        assert_eq!(error.message, "invalid operator '^^'");
        assert_eq!(error.offending, "^^");
    }

    #[test]
    fn unterminated_string() {
        let error = syntax_error("SELECT campaign.id FROM campaign WHERE campaign.name = 'abc");
        assert_eq!(error.message, "unterminated string literal");
    }

    #[test]
    fn trailing_tokens() {
        let error = syntax_error("SELECT campaign.id FROM campaign extra");
        assert!(error.message.contains("after end of query"));
        let error = syntax_error(
            "SELECT campaign.id FROM campaign WHERE campaign.id = 1 OR campaign.id = 2",
        );
        assert!(error.message.starts_with("OR is not supported"));
    }

    #[test]
    fn unquoted_string_value() {
        let error = syntax_error("SELECT campaign.id FROM campaign WHERE campaign.status = ENABLED");
        assert!(error.message.starts_with("unquoted string value 'ENABLED'"));
    }

    #[test]
    fn empty_input() {
        assert_eq!(syntax_error("").message, "empty query");
        assert_eq!(syntax_error("  -- nothing\n").message, "empty query");
    }

    #[test]
    fn oversized_input() {
        let text = format!("SELECT campaign.id FROM campaign WHERE campaign.name = '{}'", "x".repeat(100));
        assert!(parse_with_limit(&text, 200).is_ok());
        let error = parse_with_limit(&text, 50).unwrap_err();
        assert!(error.message.contains("maximum length"));
    }

    #[test]
    fn all_operators_parse() {
        let cases = [
            ("campaign.name LIKE '%x%'", Operator::Like),
            ("campaign.name NOT LIKE '%x%'", Operator::NotLike),
            ("campaign.id NOT IN (1, 2)", Operator::NotIn),
            ("campaign.labels CONTAINS ANY ('a')", Operator::ContainsAny),
            ("campaign.labels CONTAINS ALL ('a')", Operator::ContainsAll),
            ("campaign.labels CONTAINS NONE ('a')", Operator::ContainsNone),
            ("campaign.end_date IS NULL", Operator::IsNull),
            ("campaign.name REGEXP_MATCH '.*'", Operator::RegexpMatch),
            ("campaign.name NOT REGEXP_MATCH '.*'", Operator::NotRegexpMatch),
            ("campaign.id <> 3", Operator::NotEq),
            ("metrics.clicks >= 3", Operator::GtEq),
        ];
        for (condition, operator) in cases {
            let query = parse(&format!("SELECT campaign.id FROM campaign WHERE {condition}"))
                .unwrap_or_else(|e| panic!("{condition}: {e}"));
            assert_eq!(query.conditions[0].operator.node, operator, "{condition}");
        }
    }

    #[test]
    fn during_takes_a_named_range() {
        let query =
            parse("SELECT campaign.id FROM campaign WHERE segments.date DURING last_30_days")
                .unwrap();
        assert_eq!(
            query.conditions[0].value.node,
            Value::DateRange(DateRange::Last30Days)
        );
    }

    #[test]
    fn nested_quotes_in_strings() {
        let query =
            parse(r#"SELECT campaign.id FROM campaign WHERE campaign.name = "'Quirky' Interiors""#)
                .unwrap();
        assert_eq!(
            query.conditions[0].value.node,
            Value::Scalar(Literal::String("'Quirky' Interiors".into()))
        );
    }

    #[test]
    fn parse_tree_shape() {
        let tree = parse_tree("SELECT campaign.id FROM campaign ORDER BY campaign.id DESC").unwrap();
        assert_eq!(tree.rule, Rule::Query);
        let rules: Vec<Rule> = tree.subtrees().map(|t| t.rule).collect();
        assert_eq!(
            rules,
            vec![Rule::SelectClause, Rule::FromClause, Rule::OrderByClause]
        );
        assert!(tree.to_string().contains("ordering"));
    }

    #[test]
    fn errors_become_findings() {
        let finding = syntax_error("SELECT FROM campaign").into_finding();
        assert_eq!(finding.kind, FindingKind::Syntax);
        assert_eq!(finding.message, "expected field name after SELECT, found FROM");
        assert_eq!(finding.location.span, Some(7..11));
        assert_eq!(parse("SELECT FROM campaign").unwrap_err().to_diag().code.as_deref(), Some("gaql::syntax"));
    }
}
