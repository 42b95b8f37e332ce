//! Diagnostic model shared by the lexer, parser and validator, and its
//! rendering through miette.

use crate::ast::Span;
use miette::{Diagnostic, LabeledSpan, NamedSource, Report, Severity};
use std::fmt;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagSeverity {
    Error,
    Warning,
}

impl fmt::Display for DiagSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiagSeverity::Error => "error",
            DiagSeverity::Warning => "warning",
        })
    }
}

/// Whether a label marks the offending text or supporting context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelRole {
    Primary,
    Secondary,
}

/// A labeled span within a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagLabel {
    pub span: Span,
    pub message: String,
    pub role: LabelRole,
}

/// A structured diagnostic message.
///
/// Lexer diagnostics, parse errors and validation findings all convert to
/// this before being rendered against the query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diag {
    pub severity: DiagSeverity,
    pub message: String,
    pub labels: Vec<DiagLabel>,
    pub help: Option<String>,
    /// Stable code such as `L001` or `gaql::resource`.
    pub code: Option<String>,
}

impl Diag {
    pub fn new(severity: DiagSeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            labels: Vec::new(),
            help: None,
            code: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(DiagSeverity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(DiagSeverity::Warning, message)
    }

    pub fn with_primary_label(self, span: Span, message: impl Into<String>) -> Self {
        self.with_label(span, message, LabelRole::Primary)
    }

    pub fn with_secondary_label(self, span: Span, message: impl Into<String>) -> Self {
        self.with_label(span, message, LabelRole::Secondary)
    }

    fn with_label(mut self, span: Span, message: impl Into<String>, role: LabelRole) -> Self {
        self.labels.push(DiagLabel {
            span,
            message: message.into(),
            role,
        });
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Renders this diagnostic against the query it was produced from.
    pub fn to_report(&self, source: &QuerySource) -> Report {
        let rendered = Rendered {
            message: self.message.clone(),
            severity: match self.severity {
                DiagSeverity::Error => Severity::Error,
                DiagSeverity::Warning => Severity::Warning,
            },
            code: self.code.clone(),
            help: self.help.clone(),
            labels: self
                .labels
                .iter()
                .map(|label| source.labeled_span(label))
                .collect(),
        };
        let report = Report::new(rendered);
        match source.name() {
            Some(name) => report.with_source_code(NamedSource::new(name, source.text().to_string())),
            None => report.with_source_code(source.text().to_string()),
        }
    }
}

/// Query text that diagnostics are rendered against.
#[derive(Debug, Clone)]
pub struct QuerySource {
    text: String,
    name: Option<String>,
}

impl QuerySource {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            name: None,
        }
    }

    /// Names the source, usually after the file the query was read from.
    pub fn named(text: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            name: Some(name.into()),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Restricts `span` to the text, so stale spans never panic the renderer.
    pub fn clamp(&self, span: &Span) -> Span {
        let len = self.text.len();
        let start = span.start.min(len);
        start..span.end.clamp(start, len)
    }

    fn labeled_span(&self, label: &DiagLabel) -> LabeledSpan {
        let span = self.clamp(&label.span);
        let at = (span.start, span.len());
        let text = Some(label.message.clone());
        match label.role {
            LabelRole::Primary => LabeledSpan::new_primary_with_span(text, at),
            LabelRole::Secondary => LabeledSpan::new_with_span(text, at),
        }
    }
}

/// Renders every diagnostic against `source`.
pub fn to_reports(diagnostics: &[Diag], source: &QuerySource) -> Vec<Report> {
    diagnostics.iter().map(|diag| diag.to_report(source)).collect()
}

#[derive(Debug)]
struct Rendered {
    message: String,
    severity: Severity,
    code: Option<String>,
    help: Option<String>,
    labels: Vec<LabeledSpan>,
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Rendered {}

impl Diagnostic for Rendered {
    fn severity(&self) -> Option<Severity> {
        Some(self.severity)
    }

    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.code
            .as_ref()
            .map(|code| Box::new(code) as Box<dyn fmt::Display>)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|help| Box::new(help) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        if self.labels.is_empty() {
            return None;
        }
        Some(Box::new(self.labels.iter().cloned()))
    }
}
