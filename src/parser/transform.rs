//! Reduction of the concrete parse tree into a [`Query`].
//!
//! Every [`Rule`] has exactly one arm in [`reduce`]. Checks the grammar cannot
//! express (operand shape, positive LIMIT, boolean parameters, unique parameter
//! keys, integer range) happen here and fail with a syntax error.

use std::collections::BTreeSet;
use std::num::IntErrorKind;

use chrono::NaiveDate;
use smol_str::SmolStr;

use crate::ast::{
    Condition, DateRange, Direction, FieldName, Literal, Operator, Ordering, Parameter, Query,
    Spanned, Value,
};
use crate::grammar::{Rule, describe_arity, match_operator};
use crate::lexer::token::{Token, TokenKind};

use super::tree::ParseTree;
use super::{ParseError, ParseResult};

/// The reduced form of one parse-tree node.
#[derive(Debug)]
enum Fragment {
    Query(Query),
    Fields(Vec<Spanned<FieldName>>),
    Field(Spanned<FieldName>),
    Resource(Spanned<SmolStr>),
    Conditions(Vec<Condition>),
    Condition(Condition),
    Operator(Spanned<Operator>),
    Value(Spanned<Value>),
    Literal(Spanned<Literal>),
    Orderings(Vec<Ordering>),
    Ordering(Ordering),
    Limit(Spanned<u64>),
    Parameters(Vec<Parameter>),
    Parameter(Parameter),
}

/// Reduces a `query` parse tree to a [`Query`].
pub fn transform(tree: &ParseTree) -> ParseResult<Query> {
    match reduce(tree)? {
        Fragment::Query(query) => Ok(query),
        _ => Err(malformed(tree)),
    }
}

fn reduce(tree: &ParseTree) -> ParseResult<Fragment> {
    match tree.rule {
        Rule::Query => reduce_query(tree).map(Fragment::Query),
        Rule::SelectClause => single(tree, Rule::FieldList),
        Rule::FromClause => single(tree, Rule::Resource),
        Rule::WhereClause => collect(tree, as_condition).map(Fragment::Conditions),
        Rule::OrderByClause => collect(tree, as_ordering).map(Fragment::Orderings),
        Rule::LimitClause => reduce_limit(tree).map(Fragment::Limit),
        Rule::ParametersClause => reduce_parameters(tree).map(Fragment::Parameters),
        Rule::FieldList => collect(tree, as_field).map(Fragment::Fields),
        Rule::Field => {
            let token = only_token(tree)?;
            Ok(Fragment::Field(Spanned::new(
                token.text.clone(),
                token.span.clone(),
            )))
        }
        Rule::Resource => {
            let token = only_token(tree)?;
            Ok(Fragment::Resource(Spanned::new(
                token.text.clone(),
                token.span.clone(),
            )))
        }
        Rule::Condition => reduce_condition(tree).map(Fragment::Condition),
        Rule::Operator => {
            let kinds = tree.tokens().map(|token| &token.kind);
            match match_operator(kinds) {
                Some((operator, _)) => Ok(Fragment::Operator(Spanned::new(
                    operator,
                    tree.span.clone(),
                ))),
                None => Err(malformed(tree)),
            }
        }
        Rule::Operand => {
            let inner = tree.subtrees().next().ok_or_else(|| malformed(tree))?;
            reduce(inner)
        }
        Rule::LiteralList => {
            let items = collect(tree, as_literal)?
                .into_iter()
                .map(Spanned::into_inner)
                .collect();
            Ok(Fragment::Value(Spanned::new(
                Value::List(items),
                tree.span.clone(),
            )))
        }
        Rule::BetweenRange => {
            let mut bounds = collect(tree, as_literal)?.into_iter();
            match (bounds.next(), bounds.next()) {
                (Some(low), Some(high)) => Ok(Fragment::Value(Spanned::new(
                    Value::Range(low.node, high.node),
                    tree.span.clone(),
                ))),
                _ => Err(malformed(tree)),
            }
        }
        Rule::DateRange => {
            let token = only_token(tree)?;
            let range = DateRange::from_name(&token.text).ok_or_else(|| malformed(tree))?;
            Ok(Fragment::Value(Spanned::new(
                Value::DateRange(range),
                tree.span.clone(),
            )))
        }
        Rule::Literal => reduce_literal(only_token(tree)?).map(Fragment::Literal),
        Rule::Ordering => reduce_ordering(tree).map(Fragment::Ordering),
        Rule::Parameter => reduce_parameter(tree).map(Fragment::Parameter),
    }
}

fn reduce_query(tree: &ParseTree) -> ParseResult<Query> {
    let mut select = None;
    let mut resource = None;
    let mut query = Query {
        select: Vec::new(),
        resource: Spanned::synthetic(SmolStr::default()),
        conditions: Vec::new(),
        ordering: Vec::new(),
        limit: None,
        parameters: Vec::new(),
    };

    for clause in tree.subtrees() {
        match reduce(clause)? {
            Fragment::Fields(fields) => select = Some(fields),
            Fragment::Resource(name) => resource = Some(name),
            Fragment::Conditions(conditions) => query.conditions = conditions,
            Fragment::Orderings(ordering) => query.ordering = ordering,
            Fragment::Limit(limit) => query.limit = Some(limit),
            Fragment::Parameters(parameters) => query.parameters = parameters,
            _ => return Err(malformed(clause)),
        }
    }

    query.select = select.ok_or_else(|| {
        ParseError::syntax("SELECT clause is required", tree.span.start..tree.span.start)
    })?;
    query.resource = resource
        .ok_or_else(|| ParseError::syntax("FROM clause is required", tree.span.end..tree.span.end))?;
    Ok(query)
}

fn reduce_condition(tree: &ParseTree) -> ParseResult<Condition> {
    let mut parts = tree.subtrees();
    let field = match parts.next().map(reduce).transpose()? {
        Some(Fragment::Field(field)) => field,
        _ => return Err(malformed(tree)),
    };
    let operator = match parts.next().map(reduce).transpose()? {
        Some(Fragment::Operator(operator)) => operator,
        _ => return Err(malformed(tree)),
    };
    let value = match parts.next().map(reduce).transpose()? {
        Some(Fragment::Value(value)) => value,
        Some(Fragment::Literal(literal)) => literal.map(Value::Scalar),
        None => Spanned::new(Value::None, operator.span.end..operator.span.end),
        Some(_) => return Err(malformed(tree)),
    };

    let expected = operator.node.arity();
    let found = value.node.arity();
    if expected != found {
        return Err(ParseError::syntax(
            format!(
                "operator {} expects {}, found {}",
                operator.node,
                describe_arity(expected),
                describe_arity(found)
            ),
            value.span.clone(),
        ));
    }

    Ok(Condition {
        field,
        operator,
        value,
    })
}

fn reduce_limit(tree: &ParseTree) -> ParseResult<Spanned<u64>> {
    let token = tree
        .tokens()
        .find(|token| matches!(token.kind, TokenKind::IntegerLiteral(_)))
        .ok_or_else(|| malformed(tree))?;
    match token.text.parse::<u64>() {
        Ok(value) if value > 0 => Ok(Spanned::new(value, token.span.clone())),
        Err(error) if *error.kind() == IntErrorKind::PosOverflow => Err(ParseError::syntax(
            format!("LIMIT value {} is out of range", token.text),
            token.span.clone(),
        )),
        _ => Err(ParseError::syntax(
            format!("LIMIT must be a positive integer, found {}", token.text),
            token.span.clone(),
        )),
    }
}

fn reduce_parameters(tree: &ParseTree) -> ParseResult<Vec<Parameter>> {
    let parameters = collect(tree, as_parameter)?;
    let mut seen = BTreeSet::new();
    for parameter in &parameters {
        if !seen.insert(parameter.name.node.clone()) {
            return Err(ParseError::syntax(
                format!("duplicate parameter '{}'", parameter.name.node),
                parameter.name.span.clone(),
            ));
        }
    }
    Ok(parameters)
}

fn reduce_parameter(tree: &ParseTree) -> ParseResult<Parameter> {
    let name = tree.tokens().next().ok_or_else(|| malformed(tree))?;
    let value = match tree.child(Rule::Literal).map(reduce).transpose()? {
        Some(Fragment::Literal(value)) => value,
        _ => return Err(malformed(tree)),
    };
    let flag = match &value.node {
        Literal::Boolean(flag) => *flag,
        other => {
            return Err(ParseError::syntax(
                format!("parameter '{}' must be TRUE or FALSE, found {other}", name.text),
                value.span.clone(),
            ));
        }
    };
    Ok(Parameter {
        name: Spanned::new(name.text.clone(), name.span.clone()),
        value: Spanned::new(flag, value.span),
    })
}

fn reduce_ordering(tree: &ParseTree) -> ParseResult<Ordering> {
    let field = match tree.subtrees().next().map(reduce).transpose()? {
        Some(Fragment::Field(field)) => field,
        _ => return Err(malformed(tree)),
    };
    let direction = match tree.tokens().next().map(|token| &token.kind) {
        Some(TokenKind::Desc) => Direction::Desc,
        _ => Direction::Asc,
    };
    Ok(Ordering { field, direction })
}

fn reduce_literal(token: &Token) -> ParseResult<Spanned<Literal>> {
    let literal = match &token.kind {
        TokenKind::StringLiteral(text) => match calendar_date(text) {
            Some(date) => Literal::Date(date),
            None => Literal::String(text.clone()),
        },
        TokenKind::IntegerLiteral(text) => {
            let value = text.parse::<i64>().map_err(|_| {
                ParseError::syntax(
                    format!("integer literal {text} is out of range"),
                    token.span.clone(),
                )
            })?;
            Literal::Integer(value)
        }
        TokenKind::FloatLiteral(text) => Literal::Float(text.clone()),
        TokenKind::True => Literal::Boolean(true),
        TokenKind::False => Literal::Boolean(false),
        other => {
            return Err(ParseError::syntax(
                format!("expected a literal, found {other}"),
                token.span.clone(),
            ));
        }
    };
    Ok(Spanned::new(literal, token.span.clone()))
}

/// Parses `YYYY-MM-DD` when it names a real calendar day.
fn calendar_date(text: &str) -> Option<NaiveDate> {
    let bytes = text.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

/// Reduces the one subtree of `rule` under `tree`.
fn single(tree: &ParseTree, rule: Rule) -> ParseResult<Fragment> {
    let child = tree.child(rule).ok_or_else(|| malformed(tree))?;
    reduce(child)
}

/// Reduces every subtree and unpacks the expected fragment from each.
fn collect<T>(tree: &ParseTree, unpack: fn(Fragment) -> Option<T>) -> ParseResult<Vec<T>> {
    tree.subtrees()
        .map(|child| {
            let fragment = reduce(child)?;
            unpack(fragment).ok_or_else(|| malformed(child))
        })
        .collect()
}

fn as_field(fragment: Fragment) -> Option<Spanned<FieldName>> {
    match fragment {
        Fragment::Field(field) => Some(field),
        _ => None,
    }
}

fn as_condition(fragment: Fragment) -> Option<Condition> {
    match fragment {
        Fragment::Condition(condition) => Some(condition),
        _ => None,
    }
}

fn as_literal(fragment: Fragment) -> Option<Spanned<Literal>> {
    match fragment {
        Fragment::Literal(literal) => Some(literal),
        _ => None,
    }
}

fn as_ordering(fragment: Fragment) -> Option<Ordering> {
    match fragment {
        Fragment::Ordering(ordering) => Some(ordering),
        _ => None,
    }
}

fn as_parameter(fragment: Fragment) -> Option<Parameter> {
    match fragment {
        Fragment::Parameter(parameter) => Some(parameter),
        _ => None,
    }
}

fn only_token(tree: &ParseTree) -> ParseResult<&Token> {
    let mut tokens = tree.tokens();
    match (tokens.next(), tokens.next()) {
        (Some(token), None) => Ok(token),
        _ => Err(malformed(tree)),
    }
}

/// A tree that does not have the shape its rule promises.
fn malformed(tree: &ParseTree) -> ParseError {
    ParseError::syntax(format!("malformed {} node", tree.rule), tree.span.clone())
}
