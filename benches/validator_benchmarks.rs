//! Benchmarks for the lexer, parser, validator and fixer.
//!
//! ```bash
//! cargo bench
//! cargo bench parse
//! cargo bench fix
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use gaql_validator::{Fixer, Validator, parse, tokenize};

const QUERIES: &[(&str, &str)] = &[
    ("minimal", "SELECT campaign.id FROM campaign"),
    ("with_limit", "SELECT campaign.id, campaign.name FROM campaign LIMIT 10"),
    (
        "reporting",
        "SELECT campaign.id, campaign.name, metrics.impressions, metrics.clicks, segments.date \
         FROM campaign \
         WHERE segments.date DURING LAST_30_DAYS AND campaign.status IN ('ENABLED', 'PAUSED') \
         ORDER BY metrics.clicks DESC \
         LIMIT 100 \
         PARAMETERS include_drafts = true",
    ),
    (
        "between_and_regexp",
        "SELECT ad_group.name FROM ad_group \
         WHERE ad_group.name REGEXP_MATCH '.*Sale.*' AND metrics.cost_micros BETWEEN 1000 AND 50000",
    ),
];

const BROKEN: &[(&str, &str)] = &[
    ("resource_typo", "SELECT campaign.id FROM campaing LIMIT 10"),
    (
        "every_kind",
        "SELECT campain.id, ad_group.statuss FROM ad_grup \
         WHERE segments.date > '2024-01-01' PARAMETERS include_draft = true",
    ),
    (
        "lexical_repair",
        "FROM campaign SELECT campaign.id WHERE campaign.status = ENABLED ORDER BY campaign.id DESCENDING",
    ),
];

// ============================================================================
// Front end
// ============================================================================

fn bench_lexer(c: &mut Criterion) {
    let mut group = c.benchmark_group("lex");
    for (name, query) in QUERIES {
        group.throughput(Throughput::Bytes(query.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), query, |b, q| {
            b.iter(|| tokenize(black_box(q)));
        });
    }
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (name, query) in QUERIES {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(name), query, |b, q| {
            b.iter(|| parse(black_box(q)));
        });
    }
    group.finish();
}

fn bench_wide_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("wide_select");
    for width in [10usize, 100, 1000] {
        let fields: Vec<String> = (0..width).map(|i| format!("metrics.m{i}")).collect();
        let query = format!("SELECT {} FROM campaign", fields.join(", "));
        group.throughput(Throughput::Bytes(query.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(width), &query, |b, q| {
            b.iter(|| parse(black_box(q)));
        });
    }
    group.finish();
}

// ============================================================================
// Validation and correction
// ============================================================================

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");
    let validator = Validator::new();
    for (name, query) in QUERIES.iter().chain(BROKEN) {
        group.bench_with_input(BenchmarkId::from_parameter(name), query, |b, q| {
            b.iter(|| validator.validate(black_box(q), false));
        });
    }
    group.finish();
}

fn bench_fix(c: &mut Criterion) {
    let mut group = c.benchmark_group("fix");
    let fixer = Fixer::new();
    for (name, query) in BROKEN {
        group.bench_with_input(BenchmarkId::from_parameter(name), query, |b, q| {
            b.iter(|| fixer.fix(black_box(q)));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_lexer,
    bench_parse,
    bench_wide_select,
    bench_validate,
    bench_fix,
);

criterion_main!(benches);
