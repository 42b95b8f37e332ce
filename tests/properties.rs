//! Properties that hold across many inputs: clause ordering, serializer
//! round-trips, validation purity and fix idempotence.

mod common;

use common::{assert_valid, parse_cleanly, validation};
use gaql_validator::{FindingKind, fix, parse, validate};

const CLAUSES: [&str; 6] = [
    "SELECT campaign.id, campaign.name",
    "FROM campaign",
    "WHERE campaign.status = 'ENABLED'",
    "ORDER BY campaign.name DESC",
    "LIMIT 5",
    "PARAMETERS include_drafts = false",
];

const CORPUS: &[&str] = &[
    "SELECT campaign.id FROM campaign",
    "SELECT campaign.id FROM campaign LIMIT 10",
    "SELECT ad_group.name FROM ad_group WHERE ad_group.name REGEXP_MATCH '.*Sale.*'",
    "SELECT campaign.id, metrics.cost_micros FROM campaign WHERE metrics.cost_micros BETWEEN 1.5 AND 20 ORDER BY metrics.cost_micros",
    "SELECT campaign.id FROM campaign WHERE campaign.id NOT IN (1, 2, 3) AND campaign.end_date IS NULL",
    "SELECT campaign.id FROM campaign WHERE campaign.name = \"Bob's\" AND campaign.name != 'a\\\\b'",
    "SELECT segments.date, metrics.clicks FROM customer WHERE segments.date DURING THIS_MONTH",
    "SELECT campaign.id FROM campaign WHERE segments.date = '2024-01-31' PARAMETERS include_drafts = true, omit_unselected_resource_names = false",
    "SELECT campaign.id FROM campaign WHERE campaign.labels CONTAINS NONE ('x') AND campaign.name NOT LIKE '%test%'",
];

fn permutations(items: &[usize]) -> Vec<Vec<usize>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut out = Vec::new();
    for (i, first) in items.iter().enumerate() {
        let mut rest = items.to_vec();
        rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, *first);
            out.push(tail);
        }
    }
    out
}

#[test]
fn only_the_canonical_clause_order_parses() {
    let indices: Vec<usize> = (0..CLAUSES.len()).collect();
    let orders = permutations(&indices);
    assert_eq!(orders.len(), 720);

    for order in orders {
        let text = order
            .iter()
            .map(|&i| CLAUSES[i])
            .collect::<Vec<_>>()
            .join(" ");
        let canonical = order.windows(2).all(|pair| pair[0] < pair[1]);
        match parse(&text) {
            Ok(_) => assert!(canonical, "out-of-order clauses parsed: {text}"),
            Err(error) => {
                assert!(!canonical, "canonical query failed: {text}: {error}");
                assert_eq!(error.kind, FindingKind::ClauseOrder, "{text}");
            }
        }
    }
}

#[test]
fn serialized_queries_parse_back_equal() {
    for text in CORPUS {
        let query = parse_cleanly(text);
        let serialized = query.to_string();
        assert_eq!(parse_cleanly(&serialized), query, "round trip of `{text}`");
        assert_eq!(parse_cleanly(&serialized).to_string(), serialized);
    }
}

#[test]
fn corpus_is_valid() {
    for text in CORPUS {
        assert_valid(text);
    }
}

#[test]
fn validation_is_pure() {
    let inputs = [
        "SELECT campain.id FROM campaing WHERE campaign.id DURING LAST_7_DAYS PARAMETERS x = true",
        "SELECT campaign.id LIMIT 10",
        "SELECT campaign.id FROM campaign",
    ];
    for text in inputs {
        let first = validation(text);
        let second = validation(text);
        assert_eq!(first, second, "`{text}`");
        assert_eq!(
            validate(text, true).map_err(|e| e.into_finding()),
            validate(text, true).map_err(|e| e.into_finding())
        );
    }
}

#[test]
fn fixing_is_idempotent() {
    let inputs = [
        "SELECT campaign.id FROM campaing LIMIT 10",
        "SELECT campain.id, campaign.statuss FROM campaign",
        "SELECT campaign.id FROM campaign WHERE campaign.status = ENABLED",
        "FROM campaign SELECT campaign.id",
        "SELECT campaign.id FROM campaign PARAMETERS include_draft = true",
        "SELECT campaign.id FROM campaign WHERE segments.date > '2024-01-01'",
    ];
    for text in inputs {
        let once = fix(text);
        assert!(once.success, "`{text}`: {:?}", once.unresolved);
        let fixed = once.fixed_text.clone().unwrap();
        let twice = fix(&fixed);
        assert!(twice.success);
        assert!(twice.applied.is_empty(), "`{fixed}` changed again");
        assert_eq!(twice.fixed_text, once.fixed_text);
    }
}

#[test]
fn fixed_text_always_parses() {
    let inputs = [
        "SELECT campaign.id FROM zzzz",
        "SELECT campaign.id FROM campaign WHERE campaign.id DURING LAST_7_DAYS",
        "SELECT campaign.id FROM campaign WHERE metrics.clicks LIKE 5",
    ];
    for text in inputs {
        let result = fix(text);
        let fixed = result.fixed_text.unwrap();
        assert_eq!(parse_cleanly(&fixed), result.fixed_query.unwrap());
    }
}
