//! StructuredQuery types produced by the transformer.
//!
//! A [`Query`] is built once per parse call and is never mutated by the
//! validator. The fixer produces corrected copies. `Display` on every node is the
//! deterministic serializer: clauses in fixed order, fields in source order.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use smol_str::SmolStr;

use super::Spanned;

/// A dotted field name such as `campaign.id`.
pub type FieldName = SmolStr;

/// A parsed GAQL query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    /// SELECT fields, in source order. Never empty.
    pub select: Vec<Spanned<FieldName>>,
    /// The single FROM resource.
    pub resource: Spanned<SmolStr>,
    /// WHERE conditions, joined by AND.
    pub conditions: Vec<Condition>,
    /// ORDER BY items.
    pub ordering: Vec<Ordering>,
    /// LIMIT value, always positive.
    pub limit: Option<Spanned<u64>>,
    /// PARAMETERS entries; names are unique.
    pub parameters: Vec<Parameter>,
}

impl Query {
    /// Looks up a parameter value by name.
    pub fn parameter(&self, name: &str) -> Option<bool> {
        self.parameters
            .iter()
            .find(|p| p.name.node == name)
            .map(|p| p.value.node)
    }
}

/// A single WHERE comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Condition {
    pub field: Spanned<FieldName>,
    pub operator: Spanned<Operator>,
    pub value: Spanned<Value>,
}

/// An ORDER BY item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ordering {
    pub field: Spanned<FieldName>,
    pub direction: Direction,
}

/// Sort direction. Omitted directions parse as ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// A PARAMETERS entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: Spanned<SmolStr>,
    pub value: Spanned<bool>,
}

/// Comparison operators accepted in WHERE conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Operator {
    Eq,
    NotEq,
    Gt,
    GtEq,
    Lt,
    LtEq,
    Like,
    NotLike,
    In,
    NotIn,
    ContainsAny,
    ContainsAll,
    ContainsNone,
    IsNull,
    IsNotNull,
    Between,
    During,
    RegexpMatch,
    NotRegexpMatch,
}

/// The value shape an operator requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Arity {
    /// No operand (`IS NULL`).
    Nullary,
    /// A single literal.
    Scalar,
    /// A parenthesized, non-empty literal list.
    List,
    /// Two literals joined by AND.
    Range,
    /// A named date range constant.
    DateRange,
}

impl Operator {
    /// Every operator, in declaration order.
    pub const ALL: [Operator; 19] = [
        Operator::Eq,
        Operator::NotEq,
        Operator::Gt,
        Operator::GtEq,
        Operator::Lt,
        Operator::LtEq,
        Operator::Like,
        Operator::NotLike,
        Operator::In,
        Operator::NotIn,
        Operator::ContainsAny,
        Operator::ContainsAll,
        Operator::ContainsNone,
        Operator::IsNull,
        Operator::IsNotNull,
        Operator::Between,
        Operator::During,
        Operator::RegexpMatch,
        Operator::NotRegexpMatch,
    ];

    /// Canonical query text for this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Gt => ">",
            Operator::GtEq => ">=",
            Operator::Lt => "<",
            Operator::LtEq => "<=",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::ContainsAny => "CONTAINS ANY",
            Operator::ContainsAll => "CONTAINS ALL",
            Operator::ContainsNone => "CONTAINS NONE",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
            Operator::Between => "BETWEEN",
            Operator::During => "DURING",
            Operator::RegexpMatch => "REGEXP_MATCH",
            Operator::NotRegexpMatch => "NOT REGEXP_MATCH",
        }
    }

    /// The value shape this operator accepts.
    pub fn arity(self) -> Arity {
        match self {
            Operator::IsNull | Operator::IsNotNull => Arity::Nullary,
            Operator::In
            | Operator::NotIn
            | Operator::ContainsAny
            | Operator::ContainsAll
            | Operator::ContainsNone => Arity::List,
            Operator::Between => Arity::Range,
            Operator::During => Arity::DateRange,
            Operator::Eq
            | Operator::NotEq
            | Operator::Gt
            | Operator::GtEq
            | Operator::Lt
            | Operator::LtEq
            | Operator::Like
            | Operator::NotLike
            | Operator::RegexpMatch
            | Operator::NotRegexpMatch => Arity::Scalar,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The right-hand side of a condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Value {
    None,
    Scalar(Literal),
    List(Vec<Literal>),
    Range(Literal, Literal),
    DateRange(DateRange),
}

impl Value {
    /// The shape of this value, comparable with [`Operator::arity`].
    pub fn arity(&self) -> Arity {
        match self {
            Value::None => Arity::Nullary,
            Value::Scalar(_) => Arity::Scalar,
            Value::List(_) => Arity::List,
            Value::Range(_, _) => Arity::Range,
            Value::DateRange(_) => Arity::DateRange,
        }
    }
}

/// A literal value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Literal {
    /// Unescaped string contents.
    String(SmolStr),
    Integer(i64),
    /// Float literals keep their source text.
    Float(SmolStr),
    Boolean(bool),
    /// A quoted `YYYY-MM-DD` calendar date.
    Date(NaiveDate),
}

/// Named date range constants usable with `DURING`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DateRange {
    Today,
    Yesterday,
    Last7Days,
    Last14Days,
    Last30Days,
    LastBusinessWeek,
    ThisMonth,
    LastMonth,
    ThisWeekSunToday,
    ThisWeekMonToday,
    LastWeekSunSat,
    LastWeekMonSun,
}

impl DateRange {
    pub const ALL: [DateRange; 12] = [
        DateRange::Today,
        DateRange::Yesterday,
        DateRange::Last7Days,
        DateRange::Last14Days,
        DateRange::Last30Days,
        DateRange::LastBusinessWeek,
        DateRange::ThisMonth,
        DateRange::LastMonth,
        DateRange::ThisWeekSunToday,
        DateRange::ThisWeekMonToday,
        DateRange::LastWeekSunSat,
        DateRange::LastWeekMonSun,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DateRange::Today => "TODAY",
            DateRange::Yesterday => "YESTERDAY",
            DateRange::Last7Days => "LAST_7_DAYS",
            DateRange::Last14Days => "LAST_14_DAYS",
            DateRange::Last30Days => "LAST_30_DAYS",
            DateRange::LastBusinessWeek => "LAST_BUSINESS_WEEK",
            DateRange::ThisMonth => "THIS_MONTH",
            DateRange::LastMonth => "LAST_MONTH",
            DateRange::ThisWeekSunToday => "THIS_WEEK_SUN_TODAY",
            DateRange::ThisWeekMonToday => "THIS_WEEK_MON_TODAY",
            DateRange::LastWeekSunSat => "LAST_WEEK_SUN_SAT",
            DateRange::LastWeekMonSun => "LAST_WEEK_MON_SUN",
        }
    }

    /// Looks up a constant by name (case-insensitive).
    pub fn from_name(name: &str) -> Option<DateRange> {
        Self::ALL
            .into_iter()
            .find(|range| range.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Splits a dotted field into `(prefix, attribute)`.
///
/// Returns `None` when the name has no dot or either side is empty.
pub fn split_field(name: &str) -> Option<(&str, &str)> {
    let (prefix, attribute) = name.split_once('.')?;
    if prefix.is_empty() || attribute.is_empty() {
        None
    } else {
        Some((prefix, attribute))
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        let fields: Vec<&str> = self.select.iter().map(|s| s.node.as_str()).collect();
        write_list(f, &fields)?;
        write!(f, " FROM {}", self.resource.node)?;

        if !self.conditions.is_empty() {
            f.write_str(" WHERE ")?;
            for (i, condition) in self.conditions.iter().enumerate() {
                if i > 0 {
                    f.write_str(" AND ")?;
                }
                write!(f, "{condition}")?;
            }
        }

        if !self.ordering.is_empty() {
            f.write_str(" ORDER BY ")?;
            write_list(f, &self.ordering)?;
        }

        if let Some(limit) = &self.limit {
            write!(f, " LIMIT {}", limit.node)?;
        }

        if !self.parameters.is_empty() {
            f.write_str(" PARAMETERS ")?;
            write_list(f, &self.parameters)?;
        }
        Ok(())
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field.node, self.operator.node)?;
        match &self.value.node {
            Value::None => Ok(()),
            Value::Scalar(literal) => write!(f, " {literal}"),
            Value::List(items) => {
                f.write_str(" (")?;
                write_list(f, items)?;
                f.write_str(")")
            }
            Value::Range(low, high) => write!(f, " {low} AND {high}"),
            Value::DateRange(range) => write!(f, " {range}"),
        }
    }
}

impl fmt::Display for Ordering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field.node, self.direction)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => f.write_str("ASC"),
            Direction::Desc => f.write_str("DESC"),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name.node, self.value.node)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(text) => write_quoted(f, text),
            Literal::Integer(value) => write!(f, "{value}"),
            Literal::Float(text) => f.write_str(text),
            Literal::Boolean(true) => f.write_str("TRUE"),
            Literal::Boolean(false) => f.write_str("FALSE"),
            Literal::Date(date) => write!(f, "'{}'", date.format("%Y-%m-%d")),
        }
    }
}

/// Quotes string contents so the lexer reads them back unchanged.
///
/// Double quotes are used when the text holds a single quote and nothing that
/// needs escaping; otherwise single quotes with backslash escapes.
fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    let needs_escape = |ch: char| matches!(ch, '"' | '\\' | '\n' | '\r' | '\t');
    if text.contains('\'') && !text.chars().any(needs_escape) {
        return write!(f, "\"{text}\"");
    }
    f.write_str("'")?;
    for ch in text.chars() {
        match ch {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            _ => write!(f, "{ch}")?,
        }
    }
    f.write_str("'")
}
