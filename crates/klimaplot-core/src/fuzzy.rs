//! Token-set similarity scoring.
//!
//! Compares two texts by word-token overlap on a 0-100 scale, insensitive to
//! token order and repetition. Used to recognize header rows whose phrasing
//! drifts across logger firmware versions.

use std::collections::BTreeSet;

use strsim::normalized_levenshtein;

/// Order- and duplicate-insensitive similarity between two strings, 0-100.
///
/// Both inputs are split into word tokens. The shared tokens and the two
/// remainders are rejoined into sorted strings and the best pairwise ratio of
/// the three combinations is kept, so a text whose token set contains the
/// other's scores 100 regardless of ordering or repetition.
pub fn token_set_ratio(left: &str, right: &str) -> u8 {
    let left_tokens: BTreeSet<&str> = left.split_whitespace().collect();
    let right_tokens: BTreeSet<&str> = right.split_whitespace().collect();

    if left_tokens.is_empty() || right_tokens.is_empty() {
        return if left_tokens == right_tokens { 100 } else { 0 };
    }

    let shared: Vec<&str> = left_tokens.intersection(&right_tokens).copied().collect();
    let left_rest: Vec<&str> = left_tokens.difference(&right_tokens).copied().collect();
    let right_rest: Vec<&str> = right_tokens.difference(&left_tokens).copied().collect();

    let base = shared.join(" ");
    let combined_left = join_parts(&base, &left_rest);
    let combined_right = join_parts(&base, &right_rest);

    [
        ratio(&base, &combined_left),
        ratio(&base, &combined_right),
        ratio(&combined_left, &combined_right),
    ]
    .into_iter()
    .max()
    .unwrap_or(0)
}

/// Best-scoring candidate for `needle` among `haystack`, with its score.
/// Comparison is case-insensitive.
pub fn find_best_match<'a>(needle: &str, haystack: &'a [String]) -> Option<(&'a str, u8)> {
    let needle = needle.to_lowercase();
    haystack
        .iter()
        .map(|candidate| {
            (
                candidate.as_str(),
                token_set_ratio(&needle, &candidate.to_lowercase()),
            )
        })
        .max_by_key(|(_, score)| *score)
}

fn join_parts(base: &str, rest: &[&str]) -> String {
    if rest.is_empty() {
        base.to_string()
    } else if base.is_empty() {
        rest.join(" ")
    } else {
        format!("{} {}", base, rest.join(" "))
    }
}

fn ratio(left: &str, right: &str) -> u8 {
    (normalized_levenshtein(left, right) * 100.0).round() as u8
}
