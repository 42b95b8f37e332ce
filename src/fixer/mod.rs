//! Auto-correction of invalid queries.
//!
//! [`Fixer::fix`] parses the text (with one round of [lexical repairs](repair)
//! if parsing fails), validates the query, and corrects each finding at most
//! once:
//!
//! - resources, field prefixes, catalogued attributes and parameter names are
//!   replaced by their closest known name when exactly one candidate scores at
//!   or above the similarity threshold
//! - an operator is replaced only when a single allowed operator fits the
//!   condition's value
//!
//! Operator findings that only appear once a field name is corrected get one
//! attempt of their own after the first round.
//!
//! The corrected query is serialized and validated again; `success` means no
//! findings remain. Every correction builds a new [`Query`] and the input is
//! never modified.

pub mod repair;
pub mod similarity;

use std::collections::BTreeSet;

use serde::Serialize;
use smol_str::SmolStr;
use tracing::debug;

use crate::ast::{Operator, Query, split_field};
use crate::parser::parse_with_limit;
use crate::semantic::{Finding, FindingKind, ReferenceTables, Target, Validator};

use similarity::{DEFAULT_SIMILARITY_THRESHOLD, Suggestion, closest};

/// Configuration for the fixer.
#[derive(Debug, Clone, PartialEq)]
pub struct FixerConfig {
    /// Minimum similarity for a replacement to be applied (inclusive).
    pub similarity_threshold: f64,
}

impl Default for FixerConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

/// A correction the fixer applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrectionRecord {
    /// Kind of the finding (or syntax failure) the correction addresses.
    pub finding_kind: FindingKind,
    pub original: String,
    pub replacement: String,
    /// Similarity of `replacement` to `original`; `1.0` for rule-based repairs.
    pub confidence: f64,
}

/// Outcome of [`Fixer::fix`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixResult {
    /// Canonical text of the corrected query. `None` when the input could not
    /// be parsed even after lexical repair.
    pub fixed_text: Option<String>,
    #[serde(skip)]
    pub fixed_query: Option<Query>,
    pub applied: Vec<CorrectionRecord>,
    /// Findings left after correction. Locations point into `fixed_text`, or
    /// into the input when it could not be parsed.
    pub unresolved: Vec<Finding>,
    pub success: bool,
}

impl FixResult {
    fn unparsable(finding: Finding) -> Self {
        Self {
            fixed_text: None,
            fixed_query: None,
            applied: Vec::new(),
            unresolved: vec![finding],
            success: false,
        }
    }
}

/// What happened to one finding.
enum Outcome {
    Applied(Query, CorrectionRecord),
    /// An earlier correction already removed the cause.
    Resolved,
    Unresolved(&'static str),
}

/// Proposes and applies corrections to invalid queries.
#[derive(Debug, Clone)]
pub struct Fixer<'t> {
    validator: Validator<'t>,
    config: FixerConfig,
}

impl Default for Fixer<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixer<'static> {
    /// Creates a fixer over the embedded GAQL tables.
    pub fn new() -> Self {
        Self::with_validator(Validator::new())
    }
}

impl<'t> Fixer<'t> {
    /// Creates a fixer that validates with `validator` and corrects against
    /// its tables.
    pub fn with_validator(validator: Validator<'t>) -> Self {
        Self {
            validator,
            config: FixerConfig::default(),
        }
    }

    /// Creates a fixer over custom reference tables.
    pub fn with_tables(tables: &'t ReferenceTables) -> Self {
        Self::with_validator(Validator::with_tables(tables))
    }

    pub fn with_config(mut self, config: FixerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.config.similarity_threshold = threshold;
        self
    }

    fn tables(&self) -> &'t ReferenceTables {
        self.validator.tables()
    }

    /// Fixes query text.
    pub fn fix(&self, text: &str) -> FixResult {
        let max_len = self.validator.config().max_query_len;
        let mut applied = Vec::new();

        let parsed = match parse_with_limit(text, max_len) {
            Ok(query) => query,
            Err(error) => {
                let Some(repaired) = repair::repair(text, self.tables()) else {
                    debug!(message = %error.message, "no lexical repair applies");
                    return FixResult::unparsable(error.into_finding());
                };
                match parse_with_limit(&repaired.text, max_len) {
                    Ok(query) => {
                        applied.extend(repaired.records);
                        query
                    }
                    Err(retry) => {
                        debug!(message = %retry.message, "repaired text still does not parse");
                        return FixResult::unparsable(error.into_finding());
                    }
                }
            }
        };

        let mut current = parsed;
        let mut attempted = BTreeSet::new();
        for finding in self.validator.check(&current) {
            if let Target::ConditionOperator(i) = finding.location.target {
                attempted.insert(i);
            }
            self.apply(&mut current, &finding, &mut applied);
        }

        // A corrected field can bring in operator restrictions its misspelling hid.
        let exposed: Vec<Finding> = self
            .validator
            .check(&current)
            .into_iter()
            .filter(|finding| {
                finding.kind == FindingKind::Operator
                    && matches!(
                        finding.location.target,
                        Target::ConditionOperator(i) if !attempted.contains(&i)
                    )
            })
            .collect();
        for finding in &exposed {
            self.apply(&mut current, finding, &mut applied);
        }

        let fixed_text = current.to_string();
        let unresolved = match self.validator.validate(&fixed_text, false) {
            Ok(validation) => validation.errors,
            Err(error) => vec![error.into_finding()],
        };
        FixResult {
            fixed_text: Some(fixed_text),
            fixed_query: Some(current),
            applied,
            success: unresolved.is_empty(),
            unresolved,
        }
    }

    fn apply(&self, current: &mut Query, finding: &Finding, applied: &mut Vec<CorrectionRecord>) {
        match self.correct(current, finding) {
            Outcome::Applied(next, record) => {
                debug!(
                    kind = %record.finding_kind,
                    original = %record.original,
                    replacement = %record.replacement,
                    confidence = record.confidence,
                    "correction applied"
                );
                applied.push(record);
                *current = next;
            }
            Outcome::Resolved => {}
            Outcome::Unresolved(reason) => {
                debug!(kind = %finding.kind, message = %finding.message, reason, "finding left unresolved");
            }
        }
    }

    fn correct(&self, query: &Query, finding: &Finding) -> Outcome {
        match (finding.kind, finding.location.target) {
            (FindingKind::Resource, Target::Resource) => self.correct_resource(query),
            (FindingKind::Field, target) => self.correct_field(query, target),
            (FindingKind::Operator, Target::ConditionOperator(i)) => self.correct_operator(query, i),
            (FindingKind::Parameter, Target::Parameter(i)) => self.correct_parameter(query, i),
            _ => Outcome::Unresolved("no correction for this finding"),
        }
    }

    /// Applies the threshold and tie rules to a lookup.
    fn suggest<'a>(
        &self,
        target: &str,
        candidates: impl IntoIterator<Item = &'a str>,
    ) -> Result<(&'a str, f64), &'static str> {
        match closest(target, candidates, self.config.similarity_threshold) {
            Suggestion::Accepted { candidate, score } => Ok((candidate, score)),
            Suggestion::Ambiguous { .. } => Err("several candidates are equally close"),
            Suggestion::Rejected { .. } => Err("no candidate is close enough"),
        }
    }

    fn correct_resource(&self, query: &Query) -> Outcome {
        let original = &query.resource.node;
        match self.suggest(original, self.tables().resources()) {
            Ok((candidate, score)) => {
                let mut next = query.clone();
                next.resource = query.resource.replaced(candidate.into());
                Outcome::Applied(next, record(FindingKind::Resource, original, candidate, score))
            }
            Err(reason) => Outcome::Unresolved(reason),
        }
    }

    fn correct_field(&self, query: &Query, target: Target) -> Outcome {
        let slot = match target {
            Target::SelectField(i) => query.select.get(i),
            Target::ConditionField(i) => query.conditions.get(i).map(|c| &c.field),
            Target::OrderingField(i) => query.ordering.get(i).map(|o| &o.field),
            _ => None,
        };
        let Some(field) = slot else {
            return Outcome::Unresolved("finding does not point at a field");
        };
        if self.validator.field_problem(&field.node).is_none() {
            return Outcome::Resolved;
        }
        let Some((prefix, attribute)) = split_field(&field.node) else {
            return Outcome::Unresolved("field has no prefix");
        };

        let tables = self.tables();
        let (prefix, prefix_score) = if tables.is_field_prefix(prefix) {
            (prefix, 1.0)
        } else {
            match self.suggest(prefix, tables.field_prefixes()) {
                Ok(found) => found,
                Err(reason) => return Outcome::Unresolved(reason),
            }
        };
        let (attribute, attribute_score) = match tables.attributes(prefix) {
            Some(known) if !known.contains(attribute) => {
                match self.suggest(attribute, known.iter().map(SmolStr::as_str)) {
                    Ok(found) => found,
                    Err(reason) => return Outcome::Unresolved(reason),
                }
            }
            _ => (attribute, 1.0),
        };

        let replacement: SmolStr = format!("{prefix}.{attribute}").into();
        let confidence = f64::min(prefix_score, attribute_score);
        let record = record(FindingKind::Field, &field.node, &replacement, confidence);
        let mut next = query.clone();
        let slot = match target {
            Target::SelectField(i) => next.select.get_mut(i),
            Target::ConditionField(i) => next.conditions.get_mut(i).map(|c| &mut c.field),
            Target::OrderingField(i) => next.ordering.get_mut(i).map(|o| &mut o.field),
            _ => None,
        };
        match slot {
            Some(slot) => {
                *slot = slot.replaced(replacement);
                Outcome::Applied(next, record)
            }
            None => Outcome::Unresolved("finding does not point at a field"),
        }
    }

    fn correct_operator(&self, query: &Query, index: usize) -> Outcome {
        let Some(condition) = query.conditions.get(index) else {
            return Outcome::Unresolved("finding does not point at a condition");
        };
        let allowed = self.tables().allowed_operators(&condition.field.node);
        if allowed.contains(&condition.operator.node) {
            return Outcome::Resolved;
        }
        let shape = condition.value.node.arity();
        let fitting: Vec<Operator> = allowed
            .iter()
            .copied()
            .filter(|operator| operator.arity() == shape)
            .collect();
        let [replacement] = fitting.as_slice() else {
            return Outcome::Unresolved(if fitting.is_empty() {
                "no allowed operator fits the value"
            } else {
                "several allowed operators fit the value"
            });
        };

        let mut next = query.clone();
        next.conditions[index].operator = condition.operator.replaced(*replacement);
        Outcome::Applied(
            next,
            record(
                FindingKind::Operator,
                condition.operator.node.as_str(),
                replacement.as_str(),
                1.0,
            ),
        )
    }

    fn correct_parameter(&self, query: &Query, index: usize) -> Outcome {
        let Some(parameter) = query.parameters.get(index) else {
            return Outcome::Unresolved("finding does not point at a parameter");
        };
        let original = &parameter.name.node;
        let (candidate, score) = match self.suggest(original, self.tables().parameters()) {
            Ok(found) => found,
            Err(reason) => return Outcome::Unresolved(reason),
        };
        if query.parameters.iter().any(|p| p.name.node == candidate) {
            return Outcome::Unresolved("correction would duplicate a parameter");
        }

        let mut next = query.clone();
        next.parameters[index].name = parameter.name.replaced(candidate.into());
        Outcome::Applied(next, record(FindingKind::Parameter, original, candidate, score))
    }
}

fn record(kind: FindingKind, original: &str, replacement: &str, confidence: f64) -> CorrectionRecord {
    CorrectionRecord {
        finding_kind: kind,
        original: original.to_string(),
        replacement: replacement.to_string(),
        confidence,
    }
}
