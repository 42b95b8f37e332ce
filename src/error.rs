//! Error type surfaced by strict-mode validation.

use thiserror::Error;

use crate::diag::Diag;
use crate::parser::ParseError;
use crate::semantic::{Finding, FindingKind};

/// A validation failure raised instead of accumulated.
///
/// Each variant carries the finding that triggered it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GaqlError {
    #[error("syntax error: {}", .0.message)]
    Syntax(Finding),
    #[error("clause order error: {}", .0.message)]
    ClauseOrder(Finding),
    #[error("resource error: {}", .0.message)]
    Resource(Finding),
    #[error("field error: {}", .0.message)]
    Field(Finding),
    #[error("operator error: {}", .0.message)]
    Operator(Finding),
    #[error("parameter error: {}", .0.message)]
    Parameter(Finding),
}

impl GaqlError {
    pub fn finding(&self) -> &Finding {
        match self {
            GaqlError::Syntax(finding)
            | GaqlError::ClauseOrder(finding)
            | GaqlError::Resource(finding)
            | GaqlError::Field(finding)
            | GaqlError::Operator(finding)
            | GaqlError::Parameter(finding) => finding,
        }
    }

    pub fn into_finding(self) -> Finding {
        match self {
            GaqlError::Syntax(finding)
            | GaqlError::ClauseOrder(finding)
            | GaqlError::Resource(finding)
            | GaqlError::Field(finding)
            | GaqlError::Operator(finding)
            | GaqlError::Parameter(finding) => finding,
        }
    }

    pub fn kind(&self) -> FindingKind {
        self.finding().kind
    }

    pub fn to_diag(&self) -> Diag {
        self.finding().to_diag()
    }
}

impl From<Finding> for GaqlError {
    fn from(finding: Finding) -> Self {
        match finding.kind {
            FindingKind::Syntax => GaqlError::Syntax(finding),
            FindingKind::ClauseOrder => GaqlError::ClauseOrder(finding),
            FindingKind::Resource => GaqlError::Resource(finding),
            FindingKind::Field => GaqlError::Field(finding),
            FindingKind::Operator => GaqlError::Operator(finding),
            FindingKind::Parameter => GaqlError::Parameter(finding),
        }
    }
}

impl From<ParseError> for GaqlError {
    fn from(error: ParseError) -> Self {
        GaqlError::from(error.into_finding())
    }
}
