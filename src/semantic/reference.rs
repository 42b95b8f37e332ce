//! Static reference tables for semantic validation.
//!
//! [`ReferenceTables`] is an immutable value. Build custom tables with
//! [`ReferenceTables::builder`]; [`ReferenceTables::gaql`] returns the embedded
//! defaults, constructed once per process.

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use smol_str::SmolStr;

use crate::ast::{Operator, split_field};

/// Operators allowed on date segment fields.
pub const DATE_FIELD_OPERATORS: [Operator; 2] = [Operator::Eq, Operator::During];

/// Known resources, field prefixes, operator restrictions and parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceTables {
    resources: BTreeSet<SmolStr>,
    field_prefixes: BTreeSet<SmolStr>,
    date_fields: BTreeSet<SmolStr>,
    restrictions: BTreeMap<SmolStr, BTreeSet<Operator>>,
    default_operators: BTreeSet<Operator>,
    parameters: BTreeSet<SmolStr>,
    attributes: BTreeMap<SmolStr, BTreeSet<SmolStr>>,
}

impl ReferenceTables {
    /// Starts an empty table set.
    pub fn builder() -> ReferenceTablesBuilder {
        ReferenceTablesBuilder::default()
    }

    /// The embedded GAQL tables.
    pub fn gaql() -> &'static ReferenceTables {
        &GAQL_TABLES
    }

    pub fn is_resource(&self, name: &str) -> bool {
        self.resources.contains(name)
    }

    pub fn is_field_prefix(&self, prefix: &str) -> bool {
        self.field_prefixes.contains(prefix)
    }

    pub fn is_date_field(&self, field: &str) -> bool {
        self.date_fields.contains(field)
    }

    pub fn is_parameter(&self, name: &str) -> bool {
        self.parameters.contains(name)
    }

    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.resources.iter().map(SmolStr::as_str)
    }

    pub fn field_prefixes(&self) -> impl Iterator<Item = &str> {
        self.field_prefixes.iter().map(SmolStr::as_str)
    }

    pub fn date_fields(&self) -> impl Iterator<Item = &str> {
        self.date_fields.iter().map(SmolStr::as_str)
    }

    pub fn parameters(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(SmolStr::as_str)
    }

    /// Known attributes of a prefix, when the prefix has a catalogue.
    ///
    /// Prefixes without a catalogue accept any attribute.
    pub fn attributes(&self, prefix: &str) -> Option<&BTreeSet<SmolStr>> {
        self.attributes.get(prefix)
    }

    /// Operators allowed for `field`.
    ///
    /// Looks up the exact field first, then its prefix, then falls back to the
    /// permissive default set.
    pub fn allowed_operators(&self, field: &str) -> &BTreeSet<Operator> {
        if let Some(allowed) = self.restrictions.get(field) {
            return allowed;
        }
        split_field(field)
            .and_then(|(prefix, _)| self.restrictions.get(prefix))
            .unwrap_or(&self.default_operators)
    }
}

/// Builder for [`ReferenceTables`].
#[derive(Debug, Clone, Default)]
pub struct ReferenceTablesBuilder {
    tables: ReferenceTables,
}

impl Default for ReferenceTables {
    /// Empty tables with every operator except `DURING` permitted by default.
    fn default() -> Self {
        Self {
            resources: BTreeSet::new(),
            field_prefixes: BTreeSet::new(),
            date_fields: BTreeSet::new(),
            restrictions: BTreeMap::new(),
            default_operators: Operator::ALL
                .into_iter()
                .filter(|op| *op != Operator::During)
                .collect(),
            parameters: BTreeSet::new(),
            attributes: BTreeMap::new(),
        }
    }
}

impl ReferenceTablesBuilder {
    /// Adds a resource. Every resource is also a field prefix.
    pub fn resource(mut self, name: &str) -> Self {
        self.tables.resources.insert(name.into());
        self.tables.field_prefixes.insert(name.into());
        self
    }

    pub fn resources<'a>(self, names: impl IntoIterator<Item = &'a str>) -> Self {
        names.into_iter().fold(self, Self::resource)
    }

    /// Adds a field prefix that is not a resource (`metrics`, `segments`).
    pub fn field_prefix(mut self, prefix: &str) -> Self {
        self.tables.field_prefixes.insert(prefix.into());
        self
    }

    /// Adds a date field. Date fields are restricted to [`DATE_FIELD_OPERATORS`].
    pub fn date_field(mut self, field: &str) -> Self {
        self.tables.date_fields.insert(field.into());
        self.restrict(field, DATE_FIELD_OPERATORS)
    }

    /// Restricts a field or a field prefix to the given operators.
    pub fn restrict(
        mut self,
        field_or_prefix: &str,
        operators: impl IntoIterator<Item = Operator>,
    ) -> Self {
        self.tables
            .restrictions
            .insert(field_or_prefix.into(), operators.into_iter().collect());
        self
    }

    /// Replaces the operators allowed for unrestricted fields.
    pub fn default_operators(mut self, operators: impl IntoIterator<Item = Operator>) -> Self {
        self.tables.default_operators = operators.into_iter().collect();
        self
    }

    pub fn parameter(mut self, name: &str) -> Self {
        self.tables.parameters.insert(name.into());
        self
    }

    /// Declares the full attribute catalogue of a prefix.
    pub fn attributes<'a>(
        mut self,
        prefix: &str,
        attributes: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        self.tables
            .attributes
            .entry(prefix.into())
            .or_default()
            .extend(attributes.into_iter().map(SmolStr::new));
        self
    }

    pub fn build(self) -> ReferenceTables {
        self.tables
    }
}

const RESOURCES: &[&str] = &[
    "accessible_bidding_strategy",
    "ad_group",
    "ad_group_ad",
    "ad_group_ad_asset_view",
    "ad_group_asset",
    "ad_group_audience_view",
    "ad_group_bid_modifier",
    "ad_group_criterion",
    "ad_group_label",
    "ad_schedule_view",
    "age_range_view",
    "asset",
    "asset_group",
    "asset_group_asset",
    "bidding_strategy",
    "campaign",
    "campaign_asset",
    "campaign_budget",
    "campaign_criterion",
    "campaign_label",
    "change_event",
    "click_view",
    "conversion_action",
    "customer",
    "customer_client",
    "display_keyword_view",
    "gender_view",
    "geographic_view",
    "keyword_view",
    "label",
    "landing_page_view",
    "search_term_view",
    "shopping_performance_view",
    "user_list",
    "video",
];

const COMPARISON_OPERATORS: [Operator; 11] = [
    Operator::Eq,
    Operator::NotEq,
    Operator::Gt,
    Operator::GtEq,
    Operator::Lt,
    Operator::LtEq,
    Operator::In,
    Operator::NotIn,
    Operator::Between,
    Operator::IsNull,
    Operator::IsNotNull,
];

static GAQL_TABLES: Lazy<ReferenceTables> = Lazy::new(|| {
    ReferenceTables::builder()
        .resources(RESOURCES.iter().copied())
        .field_prefix("metrics")
        .field_prefix("segments")
        .date_field("segments.date")
        .date_field("segments.week")
        .date_field("segments.month")
        .date_field("segments.quarter")
        .restrict("metrics", COMPARISON_OPERATORS)
        .parameter("include_drafts")
        .parameter("omit_unselected_resource_names")
        .attributes(
            "campaign",
            [
                "advertising_channel_sub_type",
                "advertising_channel_type",
                "bidding_strategy",
                "bidding_strategy_type",
                "campaign_budget",
                "end_date",
                "id",
                "labels",
                "name",
                "optimization_score",
                "resource_name",
                "serving_status",
                "start_date",
                "status",
            ],
        )
        .attributes(
            "ad_group",
            [
                "campaign",
                "cpc_bid_micros",
                "cpm_bid_micros",
                "id",
                "labels",
                "name",
                "resource_name",
                "status",
                "type",
            ],
        )
        .build()
});
