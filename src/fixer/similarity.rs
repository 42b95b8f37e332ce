//! Approximate matching against reference vocabularies.

/// Default acceptance threshold; scores at or above it are accepted.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;

/// Normalized Levenshtein similarity of two names, ignoring ASCII case.
///
/// `1.0` means identical, `0.0` means nothing in common.
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(&a.to_ascii_lowercase(), &b.to_ascii_lowercase())
}

/// Result of looking up the closest candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum Suggestion<'a> {
    /// A single best candidate scoring at or above the threshold.
    Accepted { candidate: &'a str, score: f64 },
    /// Several candidates share the best score; nothing is chosen.
    Ambiguous { candidates: Vec<&'a str>, score: f64 },
    /// The best candidate scores below the threshold (or there are none).
    Rejected { best: Option<(&'a str, f64)> },
}

/// Finds the candidate closest to `target`.
///
/// Candidates are scanned in the order given; callers pass sorted vocabularies
/// so results are deterministic.
pub fn closest<'a, I>(target: &str, candidates: I, threshold: f64) -> Suggestion<'a>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best_score = f64::NEG_INFINITY;
    let mut best: Vec<&'a str> = Vec::new();

    for candidate in candidates {
        let score = similarity(target, candidate);
        if score > best_score {
            best_score = score;
            best.clear();
            best.push(candidate);
        } else if score == best_score {
            best.push(candidate);
        }
    }

    match (best.first().copied(), best.len()) {
        (None, _) => Suggestion::Rejected { best: None },
        (Some(first), _) if best_score < threshold => Suggestion::Rejected {
            best: Some((first, best_score)),
        },
        (Some(only), 1) => Suggestion::Accepted {
            candidate: only,
            score: best_score,
        },
        _ => Suggestion::Ambiguous {
            candidates: best,
            score: best_score,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn similarity_is_case_insensitive() {
        assert_eq!(similarity("CAMPAIGN", "campaign"), 1.0);
        assert_eq!(similarity("abc", "xyz"), 0.0);
        assert!((similarity("campaing", "campaign") - 0.75).abs() < 1e-9);
    }

    #[test]
    fn accepts_single_best_above_threshold() {
        let vocabulary = ["ad_group", "campaign", "customer"];
        assert_eq!(
            closest("campaing", vocabulary, DEFAULT_SIMILARITY_THRESHOLD),
            Suggestion::Accepted {
                candidate: "campaign",
                score: 0.75
            }
        );
        assert!(matches!(
            closest("adgroups", vocabulary, DEFAULT_SIMILARITY_THRESHOLD),
            Suggestion::Accepted {
                candidate: "ad_group",
                ..
            }
        ));
    }

    #[test]
    fn threshold_is_inclusive() {
        // One edit in ten characters scores exactly 0.9.
        assert!(matches!(
            closest("abcdefghij", ["abcdefghix"], 0.9),
            Suggestion::Accepted { .. }
        ));
        assert!(matches!(
            closest("abcdefghij", ["abcdefghix"], 0.91),
            Suggestion::Rejected { best: Some(("abcdefghix", _)) }
        ));
    }

    #[test]
    fn ties_are_ambiguous() {
        match closest("cat", ["bat", "cab", "dog"], 0.5) {
            Suggestion::Ambiguous { candidates, .. } => assert_eq!(candidates, vec!["bat", "cab"]),
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn nothing_close_is_rejected() {
        assert!(matches!(
            closest("zzz", ["campaign"], DEFAULT_SIMILARITY_THRESHOLD),
            Suggestion::Rejected { .. }
        ));
        assert_eq!(
            closest("campaign", std::iter::empty(), DEFAULT_SIMILARITY_THRESHOLD),
            Suggestion::Rejected { best: None }
        );
    }
}
