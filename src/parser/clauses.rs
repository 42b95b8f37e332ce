//! Recursive-descent walk of the grammar, producing the concrete parse tree.
//!
//! Each function consumes exactly one production and returns its [`ParseTree`]
//! node. The first token that does not fit ends the parse with a [`ParseError`].

use std::collections::BTreeSet;

use crate::ast::{Arity, DateRange, Operator};
use crate::grammar::{Clause, Rule, match_operator};
use crate::lexer::token::{Token, TokenKind};

use super::base::TokenStream;
use super::tree::{ParseNode, ParseTree};
use super::{ParseError, ParseResult};

fn leaf(token: &Token) -> ParseNode {
    ParseNode::Token(token.clone())
}

fn node(tree: ParseTree) -> ParseNode {
    ParseNode::Tree(tree)
}

/// `query = select_clause from_clause [where_clause] ... EOF`
pub(super) fn parse_query(stream: &mut TokenStream<'_>) -> ParseResult<ParseTree> {
    let first = stream.current();
    match Clause::from_token(&first.kind) {
        Some(Clause::Select) => {}
        Some(other) => {
            return Err(ParseError::clause_order(
                format!("clause order: query must begin with SELECT, found {other}"),
                first.span.clone(),
            ));
        }
        None if stream.at_end() => return Err(stream.error_here("empty query")),
        None => {
            return Err(stream.error_here(format!(
                "expected SELECT at start of query, found {}",
                first.kind
            )));
        }
    }

    let mut children = Vec::new();
    let mut seen: BTreeSet<Clause> = BTreeSet::new();
    let mut missing_from_at = None;

    while let Some(clause) = Clause::from_token(&stream.current().kind) {
        let keyword = stream.current().span.clone();
        if seen.contains(&clause) {
            return Err(ParseError::syntax(
                format!("duplicate {clause} clause"),
                keyword,
            ));
        }
        if let Some(later) = seen.iter().copied().find(|prev| *prev > clause) {
            return Err(ParseError::clause_order(
                format!("clause order: {clause} must come before {later}"),
                keyword,
            ));
        }
        if clause > Clause::From && !seen.contains(&Clause::From) && missing_from_at.is_none() {
            missing_from_at = Some(keyword.clone());
        }
        seen.insert(clause);
        children.push(node(parse_clause(stream, clause)?));
    }

    if !stream.at_end() {
        return Err(unexpected(stream, "after end of query"));
    }
    if !seen.contains(&Clause::From) {
        let span = missing_from_at.unwrap_or_else(|| stream.current().span.clone());
        return Err(ParseError::syntax("FROM clause is required", span));
    }

    Ok(ParseTree::new(Rule::Query, children))
}

fn parse_clause(stream: &mut TokenStream<'_>, clause: Clause) -> ParseResult<ParseTree> {
    let keyword = leaf(stream.bump());
    let mut children = vec![keyword];
    match clause {
        Clause::Select => children.push(node(parse_field_list(stream)?)),
        Clause::From => children.push(node(parse_resource(stream)?)),
        Clause::Where => {
            children.push(node(parse_condition(stream)?));
            while let Some(and) = stream.eat(&TokenKind::And) {
                children.push(leaf(and));
                children.push(node(parse_condition(stream)?));
            }
        }
        Clause::OrderBy => {
            children.push(leaf(stream.expect(TokenKind::By, "after ORDER")?));
            children.push(node(parse_ordering(stream)?));
            while let Some(comma) = stream.eat(&TokenKind::Comma) {
                children.push(leaf(comma));
                children.push(node(parse_ordering(stream)?));
            }
        }
        Clause::Limit => match &stream.current().kind {
            TokenKind::IntegerLiteral(_) => children.push(leaf(stream.bump())),
            other => {
                return Err(
                    stream.error_here(format!("LIMIT must be a positive integer, found {other}"))
                );
            }
        },
        Clause::Parameters => {
            children.push(node(parse_parameter(stream)?));
            while let Some(comma) = stream.eat(&TokenKind::Comma) {
                children.push(leaf(comma));
                children.push(node(parse_parameter(stream)?));
            }
        }
    }
    Ok(ParseTree::new(clause.rule(), children))
}

/// `field_list = field { "," field }`
fn parse_field_list(stream: &mut TokenStream<'_>) -> ParseResult<ParseTree> {
    let mut children = vec![node(parse_field(stream, "after SELECT")?)];
    while let Some(comma) = stream.eat(&TokenKind::Comma) {
        children.push(leaf(comma));
        children.push(node(parse_field(stream, "after ','")?));
    }
    Ok(ParseTree::new(Rule::FieldList, children))
}

fn parse_field(stream: &mut TokenStream<'_>, context: &str) -> ParseResult<ParseTree> {
    match &stream.current().kind {
        TokenKind::Identifier(_) => Ok(ParseTree::new(Rule::Field, vec![leaf(stream.bump())])),
        other => Err(stream.error_here(format!("expected field name {context}, found {other}"))),
    }
}

fn parse_resource(stream: &mut TokenStream<'_>) -> ParseResult<ParseTree> {
    match &stream.current().kind {
        TokenKind::Identifier(_) => Ok(ParseTree::new(Rule::Resource, vec![leaf(stream.bump())])),
        other => Err(stream.error_here(format!("expected resource name after FROM, found {other}"))),
    }
}

/// `condition = field operator [operand]`
fn parse_condition(stream: &mut TokenStream<'_>) -> ParseResult<ParseTree> {
    let field = parse_field(stream, "in WHERE condition")?;
    let (operator_tree, operator) = parse_operator(stream)?;
    let mut children = vec![node(field), node(operator_tree)];
    if operator.arity() != Arity::Nullary {
        children.push(node(parse_operand(stream, operator)?));
    }
    Ok(ParseTree::new(Rule::Condition, children))
}

fn parse_operator(stream: &mut TokenStream<'_>) -> ParseResult<(ParseTree, Operator)> {
    let kinds = stream.rest().iter().map(|token| &token.kind);
    let Some((operator, len)) = match_operator(kinds) else {
        let current = stream.current();
        return Err(match &current.kind {
            TokenKind::Invalid(_)
            | TokenKind::Identifier(_)
            | TokenKind::Not
            | TokenKind::Is
            | TokenKind::Contains => {
                stream.error_here(format!("invalid operator '{}'", current.text))
            }
            other => stream.error_here(format!("expected operator, found {other}")),
        });
    };
    let children = (0..len).map(|_| leaf(stream.bump())).collect();
    Ok((ParseTree::new(Rule::Operator, children), operator))
}

/// `operand = literal_list | between_range | date_range | literal`
///
/// BETWEEN is the only operator whose operand spans an `AND`, so its operand
/// shape is chosen by the operator. Every other operand is parsed by its
/// leading token and checked against the operator during the transform.
fn parse_operand(stream: &mut TokenStream<'_>, operator: Operator) -> ParseResult<ParseTree> {
    let inner = if operator == Operator::Between {
        let low = parse_literal(stream)?;
        let and = stream.expect(TokenKind::And, "between BETWEEN bounds")?;
        let high = parse_literal(stream)?;
        ParseTree::new(Rule::BetweenRange, vec![node(low), leaf(and), node(high)])
    } else {
        match &stream.current().kind {
            TokenKind::LParen => parse_literal_list(stream)?,
            TokenKind::Identifier(name) if DateRange::from_name(name).is_some() => {
                ParseTree::new(Rule::DateRange, vec![leaf(stream.bump())])
            }
            _ => parse_literal(stream)?,
        }
    };
    Ok(ParseTree::new(Rule::Operand, vec![node(inner)]))
}

/// `literal_list = "(" literal { "," literal } ")"`
fn parse_literal_list(stream: &mut TokenStream<'_>) -> ParseResult<ParseTree> {
    let mut children = vec![leaf(stream.expect(TokenKind::LParen, "to open value list")?)];
    if stream.check(&TokenKind::RParen) {
        return Err(stream.error_here("empty value list"));
    }
    children.push(node(parse_literal(stream)?));
    while let Some(comma) = stream.eat(&TokenKind::Comma) {
        children.push(leaf(comma));
        children.push(node(parse_literal(stream)?));
    }
    children.push(leaf(stream.expect(TokenKind::RParen, "to close value list")?));
    Ok(ParseTree::new(Rule::LiteralList, children))
}

fn parse_literal(stream: &mut TokenStream<'_>) -> ParseResult<ParseTree> {
    let current = stream.current();
    if current.kind.is_literal() {
        return Ok(ParseTree::new(Rule::Literal, vec![leaf(stream.bump())]));
    }
    Err(match &current.kind {
        TokenKind::Identifier(name) => stream.error_here(format!(
            "unquoted string value '{name}'; string values must be quoted"
        )),
        _ => unexpected(stream, "where a value was expected"),
    })
}

/// `ordering = field [ "ASC" | "DESC" ]`
fn parse_ordering(stream: &mut TokenStream<'_>) -> ParseResult<ParseTree> {
    let mut children = vec![node(parse_field(stream, "in ORDER BY")?)];
    if matches!(stream.current().kind, TokenKind::Asc | TokenKind::Desc) {
        children.push(leaf(stream.bump()));
    }
    Ok(ParseTree::new(Rule::Ordering, children))
}

/// `parameter = IDENT "=" literal`
fn parse_parameter(stream: &mut TokenStream<'_>) -> ParseResult<ParseTree> {
    let name = match &stream.current().kind {
        TokenKind::Identifier(_) => stream.bump(),
        other => {
            return Err(stream.error_here(format!("expected parameter name, found {other}")));
        }
    };
    let eq = stream.expect(TokenKind::Eq, "after parameter name")?;
    let value = parse_literal(stream)?;
    Ok(ParseTree::new(
        Rule::Parameter,
        vec![leaf(name), leaf(eq), node(value)],
    ))
}

/// Error for a token that fits nowhere in the grammar.
fn unexpected(stream: &TokenStream<'_>, context: &str) -> ParseError {
    let current = stream.current();
    match &current.kind {
        TokenKind::UnterminatedString => stream.error_here("unterminated string literal"),
        TokenKind::Invalid(text) => {
            stream.error_here(format!("invalid character sequence '{text}'"))
        }
        TokenKind::Or => stream.error_here("OR is not supported; join conditions with AND"),
        other => stream.error_here(format!("unexpected {other} {context}")),
    }
}
