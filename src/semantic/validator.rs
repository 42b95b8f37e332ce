//! The validator and its passes.

use serde::Serialize;
use tracing::debug;

use crate::ast::{Query, split_field};
use crate::error::GaqlError;
use crate::parser::{DEFAULT_MAX_QUERY_LEN, parse_with_limit};

use super::finding::{Finding, FindingKind, Location, Target};
use super::reference::ReferenceTables;

/// Configuration for validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Raise the first finding as an error instead of accumulating findings.
    pub strict_mode: bool,

    /// Longest accepted query text, in bytes.
    pub max_query_len: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            strict_mode: false,
            max_query_len: DEFAULT_MAX_QUERY_LEN,
        }
    }
}

/// Outcome of a non-strict validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub valid: bool,
    /// Findings in pass order: structure, resource, fields, operators, parameters.
    pub errors: Vec<Finding>,
}

impl Validation {
    fn from_findings(errors: Vec<Finding>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Collects findings, or turns the first one into an error in strict mode.
struct FindingSink {
    strict: bool,
    findings: Vec<Finding>,
}

impl FindingSink {
    fn new(strict: bool) -> Self {
        Self {
            strict,
            findings: Vec::new(),
        }
    }

    fn push(&mut self, finding: Finding) -> Result<(), GaqlError> {
        if self.strict {
            return Err(GaqlError::from(finding));
        }
        self.findings.push(finding);
        Ok(())
    }
}

/// Semantic validator for parsed queries.
///
/// Holds a reference to the tables it checks against, so tests and embedders
/// can substitute their own [`ReferenceTables`].
#[derive(Debug, Clone)]
pub struct Validator<'t> {
    tables: &'t ReferenceTables,
    config: ValidationConfig,
}

impl Default for Validator<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator<'static> {
    /// Creates a validator over the embedded GAQL tables.
    pub fn new() -> Self {
        Self::with_tables(ReferenceTables::gaql())
    }
}

impl<'t> Validator<'t> {
    /// Creates a validator over custom reference tables.
    pub fn with_tables(tables: &'t ReferenceTables) -> Self {
        Self {
            tables,
            config: ValidationConfig::default(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: ValidationConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets strict mode.
    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.config.strict_mode = strict;
        self
    }

    /// Sets the maximum accepted query length.
    pub fn with_max_query_len(mut self, max_len: usize) -> Self {
        self.config.max_query_len = max_len;
        self
    }

    pub fn tables(&self) -> &'t ReferenceTables {
        self.tables
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validates query text using the configured strictness.
    pub fn validate_text(&self, text: &str) -> Result<Validation, GaqlError> {
        self.validate(text, self.config.strict_mode)
    }

    /// Parses and validates query text.
    ///
    /// A syntax error becomes the single finding in non-strict mode and the
    /// returned error in strict mode.
    pub fn validate(&self, text: &str, strict: bool) -> Result<Validation, GaqlError> {
        match parse_with_limit(text, self.config.max_query_len) {
            Ok(query) => self.validate_query(&query, strict),
            Err(error) if strict => Err(error.into()),
            Err(error) => Ok(Validation::from_findings(vec![error.into_finding()])),
        }
    }

    /// Validates a parsed query.
    ///
    /// Non-strict mode always returns `Ok`. Strict mode stops at the first
    /// finding and returns it as the error.
    pub fn validate_query(&self, query: &Query, strict: bool) -> Result<Validation, GaqlError> {
        let mut sink = FindingSink::new(strict);
        self.run_passes(query, &mut sink)?;

        debug!(
            resource = %query.resource.node,
            findings = sink.findings.len(),
            "validation complete"
        );
        Ok(Validation::from_findings(sink.findings))
    }

    /// Runs every pass and returns all findings.
    pub fn check(&self, query: &Query) -> Vec<Finding> {
        let mut sink = FindingSink::new(false);
        match self.run_passes(query, &mut sink) {
            Ok(()) => sink.findings,
            Err(error) => vec![error.into_finding()],
        }
    }

    fn run_passes(&self, query: &Query, sink: &mut FindingSink) -> Result<(), GaqlError> {
        self.check_structure(query, sink)?;
        self.check_resource(query, sink)?;
        self.check_fields(query, sink)?;
        self.check_operators(query, sink)?;
        self.check_parameters(query, sink)
    }

    /// Re-asserts the clauses the parser requires, for hand-built queries.
    fn check_structure(&self, query: &Query, sink: &mut FindingSink) -> Result<(), GaqlError> {
        if query.select.is_empty() {
            sink.push(Finding::new(
                FindingKind::Syntax,
                "SELECT clause requires at least one field",
                Location::query(None),
                "",
            ))?;
        }
        if query.resource.node.is_empty() {
            sink.push(Finding::new(
                FindingKind::Syntax,
                "FROM clause is required",
                Location::query(None),
                "",
            ))?;
        }
        Ok(())
    }

    fn check_resource(&self, query: &Query, sink: &mut FindingSink) -> Result<(), GaqlError> {
        let resource = &query.resource;
        if !resource.node.is_empty() && !self.tables.is_resource(&resource.node) {
            sink.push(Finding::invalid_resource(
                &resource.node,
                resource.span.clone(),
            ))?;
        }
        Ok(())
    }

    fn check_fields(&self, query: &Query, sink: &mut FindingSink) -> Result<(), GaqlError> {
        let select = query
            .select
            .iter()
            .enumerate()
            .map(|(i, field)| (Target::SelectField(i), field));
        let conditions = query
            .conditions
            .iter()
            .enumerate()
            .map(|(i, condition)| (Target::ConditionField(i), &condition.field));
        let ordering = query
            .ordering
            .iter()
            .enumerate()
            .map(|(i, ordering)| (Target::OrderingField(i), &ordering.field));

        for (target, field) in select.chain(conditions).chain(ordering) {
            if let Some(reason) = self.field_problem(&field.node) {
                sink.push(Finding::invalid_field(
                    &field.node,
                    &reason,
                    target,
                    field.span.clone(),
                ))?;
            }
        }
        Ok(())
    }

    /// Explains why a field name is not valid, if it is not.
    pub fn field_problem(&self, name: &str) -> Option<String> {
        let Some((prefix, attribute)) = split_field(name) else {
            return Some("field names take the form prefix.attribute".to_string());
        };
        if !self.tables.is_field_prefix(prefix) {
            return Some(format!("unknown prefix '{prefix}'"));
        }
        match self.tables.attributes(prefix) {
            Some(known) if !known.contains(attribute) => {
                Some(format!("'{prefix}' has no attribute '{attribute}'"))
            }
            _ => None,
        }
    }

    fn check_operators(&self, query: &Query, sink: &mut FindingSink) -> Result<(), GaqlError> {
        for (i, condition) in query.conditions.iter().enumerate() {
            let allowed = self.tables.allowed_operators(&condition.field.node);
            if !allowed.contains(&condition.operator.node) {
                sink.push(Finding::incompatible_operator(
                    condition.operator.node,
                    &condition.field.node,
                    i,
                    condition.operator.span.clone(),
                ))?;
            }
        }
        Ok(())
    }

    fn check_parameters(&self, query: &Query, sink: &mut FindingSink) -> Result<(), GaqlError> {
        for (i, parameter) in query.parameters.iter().enumerate() {
            if !self.tables.is_parameter(&parameter.name.node) {
                sink.push(Finding::invalid_parameter(
                    &parameter.name.node,
                    i,
                    parameter.name.span.clone(),
                ))?;
            }
        }
        Ok(())
    }
}
