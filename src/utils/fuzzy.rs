//! Fuzzy matching utilities for the selection prompt
//!
//! Lets a typed fragment pick an item, the way a fuzzy suggest list does.

use strsim::normalized_levenshtein;

/// Result of a fuzzy match with the matched value and score
#[derive(Debug, Clone)]
pub struct FuzzyMatch {
    pub value: String,
    pub score: f64,
}

/// Find matches in a list of candidates
///
/// Exact (case-insensitive) matches score 1.0, items containing the search
/// term score 0.9, the rest are scored by normalized Levenshtein distance.
/// Returns up to `n` matches with scores at or above `cutoff`, best first.
fn find_matches(
    search_term: &str,
    candidates: &[String],
    n: usize,
    cutoff: f64,
) -> Vec<FuzzyMatch> {
    let search_lower = search_term.trim().to_lowercase();
    if search_lower.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<FuzzyMatch> = candidates
        .iter()
        .filter_map(|candidate| {
            let candidate_lower = candidate.to_lowercase();
            let score = if candidate_lower == search_lower {
                1.0
            } else if candidate_lower.contains(&search_lower) {
                0.9
            } else {
                normalized_levenshtein(&search_lower, &candidate_lower)
            };
            (score >= cutoff).then(|| FuzzyMatch {
                value: candidate.clone(),
                score,
            })
        })
        .collect();

    // Stable sort keeps list order among equal scores
    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    matches.truncate(n);
    matches
}

/// Find the best match above a minimum score
///
/// Returns None if no match meets the cutoff
pub fn find_best_match(
    search_term: &str,
    candidates: &[String],
    cutoff: f64,
) -> Option<FuzzyMatch> {
    find_matches(search_term, candidates, 1, cutoff)
        .into_iter()
        .next()
}
