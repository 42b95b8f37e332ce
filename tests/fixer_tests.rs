mod common;

use common::assert_valid;
use gaql_validator::ast::Operator;
use gaql_validator::fixer::FixerConfig;
use gaql_validator::{FindingKind, Fixer, ReferenceTables, fix};

#[test]
fn misspelled_resource_is_corrected() {
    let result = fix("SELECT campaign.id FROM campaing LIMIT 10");
    assert!(result.success);
    assert_eq!(result.applied.len(), 1);
    assert_eq!(result.applied[0].finding_kind, FindingKind::Resource);
    assert_eq!(result.applied[0].replacement, "campaign");
    assert_valid(result.fixed_text.as_deref().unwrap());
}

#[test]
fn resource_with_several_typos() {
    let result = fix("SELECT ad_group.id FROM adgroups");
    assert!(result.success, "{:?}", result.unresolved);
    assert_eq!(
        result.fixed_text.as_deref(),
        Some("SELECT ad_group.id FROM ad_group")
    );
}

#[test]
fn every_kind_in_one_pass() {
    let result = fix(
        "SELECT campain.id, ad_group.statuss FROM ad_grup \
         WHERE metrics.clicks LIKE 5 \
         PARAMETERS include_draft = true",
    );
    let kinds: Vec<FindingKind> = result.applied.iter().map(|r| r.finding_kind).collect();
    assert_eq!(
        kinds,
        vec![FindingKind::Resource, FindingKind::Field, FindingKind::Field, FindingKind::Parameter]
    );
    // `metrics` allows several single-value operators, so LIKE stays.
    assert!(!result.success);
    assert_eq!(result.unresolved.len(), 1);
    assert_eq!(result.unresolved[0].kind, FindingKind::Operator);
    assert_eq!(
        result.fixed_text.as_deref(),
        Some(
            "SELECT campaign.id, ad_group.status FROM ad_group WHERE metrics.clicks LIKE 5 \
             PARAMETERS include_drafts=true"
        )
    );
}

#[test]
fn lexical_repairs_before_validation() {
    let result = fix("SELECT campaign.id FROM campaign WHERE segments.date EQUALS LAST_7_DAYS ORDER BY campaign.id DESCENDING");
    assert!(result.success, "{:?}", result.unresolved);
    assert_eq!(
        result.fixed_text.as_deref(),
        Some("SELECT campaign.id FROM campaign WHERE segments.date DURING LAST_7_DAYS ORDER BY campaign.id DESC")
    );
    assert!(result.applied.iter().all(|r| r.finding_kind == FindingKind::Syntax));
}

#[test]
fn operator_restriction_exposed_by_field_fix() {
    let result = fix("SELECT campaign.id FROM campaign WHERE segmnts.date > '2024-01-01'");
    assert!(result.success, "{:?}", result.unresolved);
    assert_eq!(
        result.fixed_text.as_deref(),
        Some("SELECT campaign.id FROM campaign WHERE segments.date = '2024-01-01'")
    );
    let kinds: Vec<FindingKind> = result.applied.iter().map(|r| r.finding_kind).collect();
    assert_eq!(kinds, vec![FindingKind::Field, FindingKind::Operator]);

    let again = fix(result.fixed_text.as_deref().unwrap());
    assert!(again.applied.is_empty());
    assert_eq!(again.fixed_text, result.fixed_text);
}

#[test]
fn keyword_shaped_values_are_quoted() {
    let result = fix("SELECT campaign.id FROM campaign WHERE campaign.status = NONE");
    assert!(result.success, "{:?}", result.unresolved);
    assert_eq!(
        result.fixed_text.as_deref(),
        Some("SELECT campaign.id FROM campaign WHERE campaign.status = 'NONE'")
    );
    assert_eq!(result.applied[0].finding_kind, FindingKind::Syntax);
}

#[test]
fn clause_order_is_repaired() {
    let result = fix("FROM campaign SELECT campaign.id LIMIT 10");
    assert!(result.success);
    assert_eq!(result.applied[0].finding_kind, FindingKind::ClauseOrder);
    assert_eq!(
        result.fixed_text.as_deref(),
        Some("SELECT campaign.id FROM campaign LIMIT 10")
    );
}

#[test]
fn missing_from_is_inferred() {
    let result = fix("SELECT campaign.id, campaign.name LIMIT 10");
    assert!(result.success);
    assert_eq!(
        result.fixed_text.as_deref(),
        Some("SELECT campaign.id, campaign.name FROM campaign LIMIT 10")
    );
}

#[test]
fn unparsable_input_is_reported_against_the_input() {
    let text = "SELECT campaign.id FROM campaign WHERE (";
    let result = fix(text);
    assert!(!result.success);
    assert!(result.fixed_text.is_none());
    assert!(result.fixed_query.is_none());
    assert_eq!(result.unresolved.len(), 1);
    assert!(result.unresolved[0].kind.is_syntax());
    let span = result.unresolved[0].location.span.clone().unwrap();
    assert!(span.end <= text.len());
}

#[test]
fn ties_stay_unresolved() {
    let tables = ReferenceTables::builder()
        .resource("alpha_1")
        .resource("alpha_2")
        .build();
    let result = Fixer::with_tables(&tables).fix("SELECT alpha_1.id FROM alpha_3");
    assert!(!result.success);
    assert!(result.applied.is_empty());
    assert_eq!(result.unresolved[0].kind, FindingKind::Resource);
}

#[test]
fn single_fitting_operator_with_custom_tables() {
    let tables = ReferenceTables::builder()
        .resource("campaign")
        .restrict("campaign.status", [Operator::In, Operator::Eq, Operator::IsNull])
        .build();
    let result = Fixer::with_tables(&tables)
        .fix("SELECT campaign.id FROM campaign WHERE campaign.status NOT IN ('ENABLED')");
    assert!(result.success, "{:?}", result.unresolved);
    assert_eq!(
        result.fixed_text.as_deref(),
        Some("SELECT campaign.id FROM campaign WHERE campaign.status IN ('ENABLED')")
    );
}

#[test]
fn input_is_never_required_to_change() {
    let text = "SELECT campaign.id FROM campaign WHERE campaign.status = 'ENABLED'";
    let result = fix(text);
    assert!(result.success);
    assert!(result.applied.is_empty());
    assert_eq!(result.fixed_text.as_deref(), Some(text));
}

#[test]
fn stricter_threshold_declines_more() {
    let fixer = Fixer::new().with_config(FixerConfig {
        similarity_threshold: 0.8,
    });
    let result = fixer.fix("SELECT campaign.id FROM campaing");
    assert!(!result.success);
    assert_eq!(result.unresolved[0].kind, FindingKind::Resource);
}

#[test]
fn json_shape() {
    let result = fix("SELECT campaign.id FROM campaing");
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["fixed_text"], "SELECT campaign.id FROM campaign");
    assert_eq!(json["applied"][0]["finding_kind"], "Resource");
    assert!(json.get("fixed_query").is_none());
}
