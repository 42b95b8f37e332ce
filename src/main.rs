//! `gaql` command line.
//!
//! ```bash
//! # Validate a query
//! gaql "SELECT campaign.id FROM campaign LIMIT 10"
//!
//! # Fail on the first problem
//! gaql --strict --file query.gaql
//!
//! # Correct what can be corrected and write it back formatted
//! gaql --fix --format --file query.gaql --output fixed.gaql
//!
//! # Machine-readable result
//! echo "SELECT campaign.id FROM campaing" | gaql --fix --json
//! ```
//!
//! Exits with 0 when the query is valid (or was fixed), 1 otherwise.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use miette::{Context, IntoDiagnostic};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use gaql_validator::diag::{Diag, QuerySource};
use gaql_validator::{Finding, Fixer, Validation, Validator, format, parse};

#[derive(Parser)]
#[command(name = "gaql")]
#[command(version)]
#[command(about = "Validate and fix Google Ads Query Language (GAQL) queries")]
struct Cli {
    /// Query text (reads --file, or stdin, when omitted)
    #[arg(conflicts_with = "file")]
    query: Option<String>,

    /// File containing the query
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Stop at the first problem
    #[arg(long)]
    strict: bool,

    /// Correct invalid resources, fields, operators and parameters
    #[arg(long)]
    fix: bool,

    /// Print the query one clause per line
    #[arg(long)]
    format: bool,

    /// Write the resulting query here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Log parser, validator and fixer decisions to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(report) => {
            eprintln!("{report:?}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("gaql_validator=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> miette::Result<bool> {
    let source = read_query(cli)?;
    if cli.fix {
        fix(cli, &source)
    } else {
        validate(cli, &source)
    }
}

fn read_query(cli: &Cli) -> miette::Result<QuerySource> {
    if let Some(query) = &cli.query {
        return Ok(QuerySource::new(query.as_str()));
    }
    if let Some(path) = &cli.file {
        let text = fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        return Ok(QuerySource::named(text.trim(), path.display().to_string()));
    }
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .into_diagnostic()
        .wrap_err("failed to read query from stdin")?;
    Ok(QuerySource::new(text.trim()))
}

fn validate(cli: &Cli, source: &QuerySource) -> miette::Result<bool> {
    let validator = Validator::new();
    let validation = match validator.validate(source.text(), cli.strict) {
        Ok(validation) => validation,
        Err(error) => Validation {
            valid: false,
            errors: vec![error.into_finding()],
        },
    };

    if cli.json {
        print_json(&validation)?;
        return Ok(validation.valid);
    }
    if !validation.valid {
        eprintln!("Invalid GAQL query");
        render(&validation.errors, source);
        return Ok(false);
    }

    if cli.format {
        let query = parse(source.text()).map_err(|error| error.to_diag().to_report(source))?;
        emit(cli, &format::pretty(&query))?;
    } else {
        eprintln!("Valid GAQL query");
    }
    Ok(true)
}

fn fix(cli: &Cli, source: &QuerySource) -> miette::Result<bool> {
    let result = Fixer::new().fix(source.text());

    if cli.json {
        print_json(&result)?;
        return Ok(result.success);
    }

    for record in &result.applied {
        eprintln!(
            "fixed {}: '{}' -> '{}' ({:.2})",
            record.finding_kind, record.original, record.replacement, record.confidence
        );
    }
    if !result.unresolved.is_empty() {
        let rendered_against = match &result.fixed_text {
            Some(text) => QuerySource::new(text.as_str()),
            None => source.clone(),
        };
        render(&result.unresolved, &rendered_against);
    }

    let text = match (&result.fixed_query, cli.format) {
        (Some(query), true) => Some(format::pretty(query)),
        (Some(_), false) => result.fixed_text.clone(),
        (None, _) => None,
    };
    if let Some(text) = text {
        emit(cli, &text)?;
    }
    Ok(result.success)
}

fn render(findings: &[Finding], source: &QuerySource) {
    let diagnostics: Vec<Diag> = findings.iter().map(Finding::to_diag).collect();
    for report in gaql_validator::diag::to_reports(&diagnostics, source) {
        eprintln!("{report:?}");
    }
}

fn emit(cli: &Cli, text: &str) -> miette::Result<()> {
    match &cli.output {
        Some(path) => fs::write(path, format!("{text}\n"))
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to write {}", path.display())),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> miette::Result<()> {
    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{json}");
    Ok(())
}
