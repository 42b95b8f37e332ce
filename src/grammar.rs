//! The GAQL grammar, declared as data.
//!
//! Nothing here parses. The parser walks these declarations: [`Clause`] fixes
//! the clause order, [`Rule`] is the closed set of concrete parse-node kinds, and
//! [`OPERATOR_SYNTAX`] maps keyword sequences to operators.
//!
//! ```text
//! query            = select_clause from_clause [where_clause] [order_by_clause]
//!                    [limit_clause] [parameters_clause] EOF ;
//! select_clause    = "SELECT" field_list ;
//! from_clause      = "FROM" resource ;
//! where_clause     = "WHERE" condition { "AND" condition } ;
//! order_by_clause  = "ORDER" "BY" ordering { "," ordering } ;
//! limit_clause     = "LIMIT" INTEGER ;
//! parameters_clause= "PARAMETERS" parameter { "," parameter } ;
//!
//! field_list       = field { "," field } ;
//! field            = IDENT ;                       (* dotted: prefix.attribute *)
//! resource         = IDENT ;
//! condition        = field operator [operand] ;
//! operator         = "=" | "!=" | "<>" | ">" | ">=" | "<" | "<="
//!                  | "LIKE" | "NOT" "LIKE" | "IN" | "NOT" "IN"
//!                  | "CONTAINS" ("ANY" | "ALL" | "NONE")
//!                  | "IS" "NULL" | "IS" "NOT" "NULL"
//!                  | "BETWEEN" | "DURING" | "REGEXP_MATCH" | "NOT" "REGEXP_MATCH" ;
//! operand          = literal_list | between_range | date_range | literal ;
//! literal_list     = "(" literal { "," literal } ")" ;
//! between_range    = literal "AND" literal ;
//! date_range       = IDENT ;                       (* one of the DURING constants *)
//! literal          = STRING | INTEGER | FLOAT | "TRUE" | "FALSE" ;
//! ordering         = field [ "ASC" | "DESC" ] ;
//! parameter        = IDENT "=" literal ;
//! ```
//!
//! Keywords are case-insensitive. Strings are single- or double-quoted and may
//! contain the other quote character verbatim. Whitespace and `//`, `--` and
//! `/* */` comments are insignificant.

use std::fmt;

use crate::ast::{Arity, Operator};
use crate::lexer::token::TokenKind;

/// A top-level clause, declared in the only order the grammar accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Clause {
    Select,
    From,
    Where,
    OrderBy,
    Limit,
    Parameters,
}

impl Clause {
    /// Every clause in required order.
    pub const ALL: [Clause; 6] = [
        Clause::Select,
        Clause::From,
        Clause::Where,
        Clause::OrderBy,
        Clause::Limit,
        Clause::Parameters,
    ];

    /// The keyword text that opens this clause.
    pub fn keyword(self) -> &'static str {
        match self {
            Clause::Select => "SELECT",
            Clause::From => "FROM",
            Clause::Where => "WHERE",
            Clause::OrderBy => "ORDER BY",
            Clause::Limit => "LIMIT",
            Clause::Parameters => "PARAMETERS",
        }
    }

    /// Maps an opening keyword token to its clause.
    pub fn from_token(kind: &TokenKind) -> Option<Clause> {
        match kind {
            TokenKind::Select => Some(Clause::Select),
            TokenKind::From => Some(Clause::From),
            TokenKind::Where => Some(Clause::Where),
            TokenKind::Order => Some(Clause::OrderBy),
            TokenKind::Limit => Some(Clause::Limit),
            TokenKind::Parameters => Some(Clause::Parameters),
            _ => None,
        }
    }

    /// Whether the query is invalid without this clause.
    pub fn is_required(self) -> bool {
        matches!(self, Clause::Select | Clause::From)
    }

    /// The parse-node kind this clause produces.
    pub fn rule(self) -> Rule {
        match self {
            Clause::Select => Rule::SelectClause,
            Clause::From => Rule::FromClause,
            Clause::Where => Rule::WhereClause,
            Clause::OrderBy => Rule::OrderByClause,
            Clause::Limit => Rule::LimitClause,
            Clause::Parameters => Rule::ParametersClause,
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Production names of the concrete parse tree.
///
/// The transformer matches on this enum exhaustively, so adding a rule without
/// a reduction is a compile error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Query,
    SelectClause,
    FromClause,
    WhereClause,
    OrderByClause,
    LimitClause,
    ParametersClause,
    FieldList,
    Field,
    Resource,
    Condition,
    Operator,
    Operand,
    LiteralList,
    BetweenRange,
    DateRange,
    Literal,
    Ordering,
    Parameter,
}

impl Rule {
    /// The production name as written in the EBNF above.
    pub fn name(self) -> &'static str {
        match self {
            Rule::Query => "query",
            Rule::SelectClause => "select_clause",
            Rule::FromClause => "from_clause",
            Rule::WhereClause => "where_clause",
            Rule::OrderByClause => "order_by_clause",
            Rule::LimitClause => "limit_clause",
            Rule::ParametersClause => "parameters_clause",
            Rule::FieldList => "field_list",
            Rule::Field => "field",
            Rule::Resource => "resource",
            Rule::Condition => "condition",
            Rule::Operator => "operator",
            Rule::Operand => "operand",
            Rule::LiteralList => "literal_list",
            Rule::BetweenRange => "between_range",
            Rule::DateRange => "date_range",
            Rule::Literal => "literal",
            Rule::Ordering => "ordering",
            Rule::Parameter => "parameter",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Keyword sequences that spell each operator.
///
/// Longer sequences come first so a first-match scan is also the longest match
/// (`IS NOT NULL` before `IS NULL`, `NOT LIKE` before a bare `NOT`).
pub const OPERATOR_SYNTAX: &[(&[TokenKind], Operator)] = &[
    (&[TokenKind::Is, TokenKind::Not, TokenKind::Null], Operator::IsNotNull),
    (&[TokenKind::Is, TokenKind::Null], Operator::IsNull),
    (&[TokenKind::Not, TokenKind::Like], Operator::NotLike),
    (&[TokenKind::Not, TokenKind::In], Operator::NotIn),
    (&[TokenKind::Not, TokenKind::RegexpMatch], Operator::NotRegexpMatch),
    (&[TokenKind::Contains, TokenKind::Any], Operator::ContainsAny),
    (&[TokenKind::Contains, TokenKind::All], Operator::ContainsAll),
    (&[TokenKind::Contains, TokenKind::NoneKeyword], Operator::ContainsNone),
    (&[TokenKind::Eq], Operator::Eq),
    (&[TokenKind::NotEq], Operator::NotEq),
    (&[TokenKind::GtEq], Operator::GtEq),
    (&[TokenKind::Gt], Operator::Gt),
    (&[TokenKind::LtEq], Operator::LtEq),
    (&[TokenKind::Lt], Operator::Lt),
    (&[TokenKind::Like], Operator::Like),
    (&[TokenKind::In], Operator::In),
    (&[TokenKind::Between], Operator::Between),
    (&[TokenKind::During], Operator::During),
    (&[TokenKind::RegexpMatch], Operator::RegexpMatch),
];

/// Finds the operator spelled at the start of `kinds`.
///
/// Returns the operator and the number of tokens it spans.
pub fn match_operator<'a, I>(kinds: I) -> Option<(Operator, usize)>
where
    I: IntoIterator<Item = &'a TokenKind>,
{
    let window: Vec<&TokenKind> = kinds.into_iter().take(3).collect();
    OPERATOR_SYNTAX.iter().find_map(|(sequence, operator)| {
        let matches = sequence.len() <= window.len()
            && sequence.iter().zip(&window).all(|(want, got)| want == *got);
        matches.then_some((*operator, sequence.len()))
    })
}

/// Describes the operand an arity expects, for error messages.
pub fn describe_arity(arity: Arity) -> &'static str {
    match arity {
        Arity::Nullary => "no value",
        Arity::Scalar => "a single literal",
        Arity::List => "a parenthesized list of literals",
        Arity::Range => "two literals joined by AND",
        Arity::DateRange => "a date range constant such as LAST_7_DAYS",
    }
}
