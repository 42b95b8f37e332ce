//! Multi-line rendering of a parsed query.
//!
//! Each clause starts on its own line. SELECT fields and WHERE conditions go
//! one per indented line once there is more than one of them. The output parses
//! back to the same [`Query`].

use crate::ast::Query;

pub const DEFAULT_INDENT: usize = 2;

/// Formats `query` with the default indent.
pub fn pretty(query: &Query) -> String {
    pretty_with_indent(query, DEFAULT_INDENT)
}

/// Formats `query`, indenting list items by `indent` spaces.
pub fn pretty_with_indent(query: &Query, indent: usize) -> String {
    let pad = " ".repeat(indent);
    let mut out = String::new();

    let fields: Vec<&str> = query.select.iter().map(|field| field.node.as_str()).collect();
    push_list(&mut out, "SELECT", &fields, ",", &pad);
    push_line(&mut out, &format!("FROM {}", query.resource.node));

    if !query.conditions.is_empty() {
        let conditions: Vec<String> = query.conditions.iter().map(ToString::to_string).collect();
        let conditions: Vec<&str> = conditions.iter().map(String::as_str).collect();
        push_list(&mut out, "WHERE", &conditions, " AND", &pad);
    }
    if !query.ordering.is_empty() {
        let ordering: Vec<String> = query.ordering.iter().map(ToString::to_string).collect();
        push_line(&mut out, &format!("ORDER BY {}", ordering.join(", ")));
    }
    if let Some(limit) = &query.limit {
        push_line(&mut out, &format!("LIMIT {}", limit.node));
    }
    if !query.parameters.is_empty() {
        let parameters: Vec<String> = query.parameters.iter().map(ToString::to_string).collect();
        push_line(&mut out, &format!("PARAMETERS {}", parameters.join(", ")));
    }
    out
}

fn push_line(out: &mut String, line: &str) {
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(line);
}

/// Writes `keyword item` for a single item, otherwise the keyword alone
/// followed by one indented item per line with `separator` after all but the
/// last.
fn push_list(out: &mut String, keyword: &str, items: &[&str], separator: &str, pad: &str) {
    if let [only] = items {
        push_line(out, &format!("{keyword} {only}"));
        return;
    }
    push_line(out, keyword);
    let last = items.len().saturating_sub(1);
    for (i, item) in items.iter().enumerate() {
        let tail = if i < last { separator } else { "" };
        out.push_str(&format!("\n{pad}{item}{tail}"));
    }
}
