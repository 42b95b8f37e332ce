//! Validation findings.
//!
//! A [`Finding`] is one reported problem: its kind, a human-readable message, and
//! a best-effort location. Findings are value objects produced fresh by each
//! parse or validation call.

use std::fmt;

use serde::Serialize;
use smol_str::SmolStr;

use crate::ast::{Operator, Span};
use crate::diag::Diag;

/// Categories of findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum FindingKind {
    /// Grammar or lexical violation.
    Syntax,
    /// Clauses out of the SELECT, FROM, WHERE, ORDER BY, LIMIT, PARAMETERS order.
    ClauseOrder,
    /// Unknown FROM resource.
    Resource,
    /// Unknown field prefix or attribute.
    Field,
    /// Operator not allowed for the condition's field.
    Operator,
    /// Unknown PARAMETERS key.
    Parameter,
}

impl FindingKind {
    /// Returns a human-readable name for this finding kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Syntax => "SyntaxError",
            Self::ClauseOrder => "ClauseOrderError",
            Self::Resource => "ResourceError",
            Self::Field => "FieldError",
            Self::Operator => "OperatorError",
            Self::Parameter => "ParameterError",
        }
    }

    /// Stable diagnostic code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Syntax => "gaql::syntax",
            Self::ClauseOrder => "gaql::clause_order",
            Self::Resource => "gaql::resource",
            Self::Field => "gaql::field",
            Self::Operator => "gaql::operator",
            Self::Parameter => "gaql::parameter",
        }
    }

    /// Syntax-phase kinds end a parse attempt; the rest are accumulated.
    pub fn is_syntax(self) -> bool {
        matches!(self, Self::Syntax | Self::ClauseOrder)
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The query element a finding points at.
///
/// Indices refer to positions in the corresponding [`Query`](crate::ast::Query)
/// vector, which lets the fixer address the element without re-deriving it
/// from the span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Target {
    /// The query as a whole (syntax errors, missing clauses).
    Query,
    Resource,
    SelectField(usize),
    ConditionField(usize),
    ConditionOperator(usize),
    OrderingField(usize),
    Parameter(usize),
}

/// Where a finding applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub target: Target,
    /// Byte range in the validated text. `None` for synthesized queries.
    pub span: Option<Span>,
}

impl Location {
    pub fn new(target: Target, span: Span) -> Self {
        // Synthetic nodes carry an empty span at zero.
        let span = (!span.is_empty()).then_some(span);
        Self { target, span }
    }

    pub fn query(span: Option<Span>) -> Self {
        Self {
            target: Target::Query,
            span,
        }
    }
}

/// A single validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub message: String,
    pub location: Location,
    /// The offending token text, empty when there is none.
    pub offending: SmolStr,
}

impl Finding {
    /// Creates a new finding.
    pub fn new(
        kind: FindingKind,
        message: impl Into<String>,
        location: Location,
        offending: impl Into<SmolStr>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            location,
            offending: offending.into(),
        }
    }

    /// Converts this finding into a diagnostic for rendering.
    pub fn to_diag(&self) -> Diag {
        let mut diag = Diag::error(self.message.clone()).with_code(self.kind.code());
        if let Some(span) = &self.location.span {
            diag = diag.with_primary_label(span.clone(), self.label());
        }
        if self.kind == FindingKind::ClauseOrder {
            diag = diag.with_help(
                "clauses must appear as SELECT, FROM, WHERE, ORDER BY, LIMIT, PARAMETERS",
            );
        }
        diag
    }

    fn label(&self) -> &'static str {
        match self.kind {
            FindingKind::Syntax => "here",
            FindingKind::ClauseOrder => "out of order",
            FindingKind::Resource => "unknown resource",
            FindingKind::Field => "unknown field",
            FindingKind::Operator => "operator not allowed here",
            FindingKind::Parameter => "unknown parameter",
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Helper constructors for the semantic findings.
impl Finding {
    pub fn invalid_resource(name: &str, span: Span) -> Self {
        Self::new(
            FindingKind::Resource,
            format!("invalid resource '{name}'"),
            Location::new(Target::Resource, span),
            name,
        )
    }

    pub fn invalid_field(name: &str, reason: &str, target: Target, span: Span) -> Self {
        Self::new(
            FindingKind::Field,
            format!("invalid field '{name}': {reason}"),
            Location::new(target, span),
            name,
        )
    }

    pub fn incompatible_operator(operator: Operator, field: &str, index: usize, span: Span) -> Self {
        Self::new(
            FindingKind::Operator,
            format!("operator {operator} cannot be used with field {field}"),
            Location::new(Target::ConditionOperator(index), span),
            operator.as_str(),
        )
    }

    pub fn invalid_parameter(name: &str, index: usize, span: Span) -> Self {
        Self::new(
            FindingKind::Parameter,
            format!("invalid parameter '{name}'"),
            Location::new(Target::Parameter(index), span),
            name,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::LabelRole;

    #[test]
    fn kind_names_and_codes() {
        assert_eq!(FindingKind::Syntax.to_string(), "SyntaxError");
        assert_eq!(FindingKind::Operator.code(), "gaql::operator");
        assert!(FindingKind::ClauseOrder.is_syntax());
        assert!(!FindingKind::Field.is_syntax());
    }

    #[test]
    fn synthetic_spans_are_dropped() {
        assert_eq!(Location::new(Target::Resource, 0..0).span, None);
        assert_eq!(Location::new(Target::Resource, 5..9).span, Some(5..9));
    }

    #[test]
    fn finding_to_diag() {
        let finding = Finding::invalid_resource("campaing", 24..32);
        let diag = finding.to_diag();
        assert_eq!(diag.message, "invalid resource 'campaing'");
        assert_eq!(diag.code.as_deref(), Some("gaql::resource"));
        assert_eq!(diag.labels.len(), 1);
        assert_eq!(diag.labels[0].span, 24..32);
        assert_eq!(diag.labels[0].role, LabelRole::Primary);
    }

    #[test]
    fn operator_message() {
        let finding = Finding::incompatible_operator(Operator::During, "campaign.id", 0, 40..46);
        assert!(finding.message.contains("cannot be used with"));
        assert_eq!(finding.offending, "DURING");
        assert_eq!(finding.location.target, Target::ConditionOperator(0));
    }

    #[test]
    fn display_prefixes_kind() {
        let finding = Finding::invalid_parameter("include_draft", 0, 0..0);
        assert_eq!(
            finding.to_string(),
            "ParameterError: invalid parameter 'include_draft'"
        );
    }
}
