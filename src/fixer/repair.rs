//! Deterministic token-level repairs for text that does not parse.
//!
//! Repairs run once, all together, on the token stream of the failed input:
//!
//! - `ASCENDING` / `DESCENDING` become `ASC` / `DESC`
//! - `EQUALS` / `EQUAL` after a field become `=`
//! - a comparison operator followed by a date range constant becomes `DURING`
//! - bare words in value position are quoted
//! - clauses that each appear once are put in order
//! - a missing FROM is inserted when every selected field shares one resource
//!   prefix
//!
//! The repaired text is the token texts joined by single spaces, so comments
//! and layout do not survive.

use smol_str::SmolStr;
use tracing::trace;

use crate::ast::{DateRange, Literal, split_field};
use crate::grammar::Clause;
use crate::lexer::token::TokenKind;
use crate::lexer::tokenize;
use crate::semantic::{FindingKind, ReferenceTables};

use super::CorrectionRecord;

/// Text produced by the lexical repairs, with a record per repair.
#[derive(Debug, Clone, PartialEq)]
pub struct Repaired {
    pub text: String,
    pub records: Vec<CorrectionRecord>,
}

#[derive(Debug, Clone)]
struct Piece {
    kind: TokenKind,
    text: SmolStr,
}

impl Piece {
    fn new(kind: TokenKind, text: impl Into<SmolStr>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

#[derive(Debug)]
struct Segment {
    clause: Clause,
    pieces: Vec<Piece>,
}

/// Applies every repair to `text`. Returns `None` when nothing changed.
pub fn repair(text: &str, tables: &ReferenceTables) -> Option<Repaired> {
    let mut pieces: Vec<Piece> = tokenize(text)
        .tokens
        .into_iter()
        .filter(|token| token.kind != TokenKind::Eof)
        .map(|token| Piece::new(token.kind, token.text))
        .collect();
    let mut records = Vec::new();

    normalize_keywords(&mut pieces, &mut records);
    during_for_date_ranges(&mut pieces, &mut records);
    quote_bare_values(&mut pieces, &mut records);
    let pieces = match split_clauses(pieces) {
        Ok(mut segments) => {
            reorder_clauses(&mut segments, &mut records);
            insert_missing_from(&mut segments, tables, &mut records);
            segments.into_iter().flat_map(|segment| segment.pieces).collect()
        }
        Err(pieces) => pieces,
    };

    if records.is_empty() {
        return None;
    }
    let text = pieces
        .iter()
        .map(|piece| piece.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    trace!(repairs = records.len(), %text, "lexical repairs applied");
    Some(Repaired { text, records })
}

fn record(
    records: &mut Vec<CorrectionRecord>,
    kind: FindingKind,
    original: impl Into<String>,
    replacement: impl Into<String>,
) {
    let record = CorrectionRecord {
        finding_kind: kind,
        original: original.into(),
        replacement: replacement.into(),
        confidence: 1.0,
    };
    trace!(original = %record.original, replacement = %record.replacement, "lexical repair");
    records.push(record);
}

fn normalize_keywords(pieces: &mut [Piece], records: &mut Vec<CorrectionRecord>) {
    for i in 0..pieces.len() {
        let TokenKind::Identifier(name) = &pieces[i].kind else {
            continue;
        };
        let after_field = i > 0 && matches!(pieces[i - 1].kind, TokenKind::Identifier(_));
        let replacement = if name.eq_ignore_ascii_case("ASCENDING") {
            Piece::new(TokenKind::Asc, "ASC")
        } else if name.eq_ignore_ascii_case("DESCENDING") {
            Piece::new(TokenKind::Desc, "DESC")
        } else if after_field
            && (name.eq_ignore_ascii_case("EQUALS") || name.eq_ignore_ascii_case("EQUAL"))
        {
            Piece::new(TokenKind::Eq, "=")
        } else {
            continue;
        };
        record(
            records,
            FindingKind::Syntax,
            pieces[i].text.as_str(),
            replacement.text.as_str(),
        );
        pieces[i] = replacement;
    }
}

fn during_for_date_ranges(pieces: &mut [Piece], records: &mut Vec<CorrectionRecord>) {
    for i in 0..pieces.len().saturating_sub(1) {
        let comparison = matches!(
            pieces[i].kind,
            TokenKind::Eq | TokenKind::Gt | TokenKind::GtEq | TokenKind::Lt | TokenKind::LtEq
        );
        let date_range = matches!(
            &pieces[i + 1].kind,
            TokenKind::Identifier(name) if DateRange::from_name(name).is_some()
        );
        if comparison && date_range {
            record(records, FindingKind::Syntax, pieces[i].text.as_str(), "DURING");
            pieces[i] = Piece::new(TokenKind::During, "DURING");
        }
    }
}

fn quote_bare_values(pieces: &mut [Piece], records: &mut Vec<CorrectionRecord>) {
    let mut in_list = false;
    for i in 0..pieces.len() {
        let previous = i.checked_sub(1).map(|j| pieces[j].kind.clone());
        let bare = match &pieces[i].kind {
            TokenKind::LParen => {
                in_list = true;
                continue;
            }
            TokenKind::RParen => {
                in_list = false;
                continue;
            }
            TokenKind::Identifier(name) if DateRange::from_name(name).is_none() => name.clone(),
            // Enum values that collide with keywords, e.g. `status = NONE`.
            TokenKind::NoneKeyword | TokenKind::Any | TokenKind::All => pieces[i].text.clone(),
            _ => continue,
        };
        let after_operator = matches!(
            previous,
            Some(
                TokenKind::Eq
                    | TokenKind::NotEq
                    | TokenKind::Gt
                    | TokenKind::GtEq
                    | TokenKind::Lt
                    | TokenKind::LtEq
                    | TokenKind::Like
                    | TokenKind::RegexpMatch
            )
        );
        let list_item = in_list && matches!(previous, Some(TokenKind::LParen | TokenKind::Comma));
        if after_operator || list_item {
            let quoted = Literal::String(bare.clone()).to_string();
            record(records, FindingKind::Syntax, bare.as_str(), quoted.as_str());
            pieces[i] = Piece::new(TokenKind::StringLiteral(bare), quoted);
        }
    }
}

/// Splits pieces at clause keywords. Gives the pieces back unchanged when
/// they do not start with a clause keyword.
fn split_clauses(pieces: Vec<Piece>) -> Result<Vec<Segment>, Vec<Piece>> {
    if pieces
        .first()
        .and_then(|piece| Clause::from_token(&piece.kind))
        .is_none()
    {
        return Err(pieces);
    }
    let mut segments: Vec<Segment> = Vec::new();
    for piece in pieces {
        match (Clause::from_token(&piece.kind), segments.last_mut()) {
            (Some(clause), _) => segments.push(Segment {
                clause,
                pieces: vec![piece],
            }),
            (None, Some(segment)) => segment.pieces.push(piece),
            (None, None) => {}
        }
    }
    Ok(segments)
}

fn clause_list(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|segment| segment.clause.keyword())
        .collect::<Vec<_>>()
        .join(", ")
}

fn reorder_clauses(segments: &mut [Segment], records: &mut Vec<CorrectionRecord>) {
    let mut clauses: Vec<Clause> = segments.iter().map(|segment| segment.clause).collect();
    let in_order = clauses.windows(2).all(|pair| pair[0] < pair[1]);
    clauses.sort();
    clauses.dedup();
    if in_order || clauses.len() != segments.len() {
        return;
    }
    let before = clause_list(segments);
    segments.sort_by_key(|segment| segment.clause);
    record(records, FindingKind::ClauseOrder, before, clause_list(segments));
}

fn insert_missing_from(
    segments: &mut Vec<Segment>,
    tables: &ReferenceTables,
    records: &mut Vec<CorrectionRecord>,
) {
    if segments.iter().any(|segment| segment.clause == Clause::From) {
        return;
    }
    let Some(select_at) = segments
        .iter()
        .position(|segment| segment.clause == Clause::Select)
    else {
        return;
    };

    let mut prefixes = segments[select_at].pieces.iter().filter_map(|piece| match &piece.kind {
        TokenKind::Identifier(name) => Some(split_field(name).map(|(prefix, _)| prefix)),
        _ => None,
    });
    let Some(Some(resource)) = prefixes.next() else {
        return;
    };
    if !prefixes.all(|prefix| prefix == Some(resource)) || !tables.is_resource(resource) {
        return;
    }

    let resource = SmolStr::new(resource);
    let from = format!("FROM {resource}");
    segments.insert(
        select_at + 1,
        Segment {
            clause: Clause::From,
            pieces: vec![
                Piece::new(TokenKind::From, "FROM"),
                Piece::new(TokenKind::Identifier(resource.clone()), resource),
            ],
        },
    );
    record(records, FindingKind::Syntax, "", from);
}
