//! Order-insensitive fuzzy string similarity.
//!
//! [`token_set_ratio`] scores two strings on a 0-100 scale by comparing their
//! word sets, so word order and extra words in one string do not count
//! against a match as long as the shared words line up.

use rapidfuzz::fuzz;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?u)\W").expect("valid non-word pattern"));

/// Lowercase and replace punctuation with spaces.
fn normalize(text: &str) -> String {
    NON_WORD.replace_all(&text.to_lowercase(), " ").into_owned()
}

fn tokens(text: &str) -> BTreeSet<String> {
    normalize(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Normalised indel similarity of two strings, 0-100.
///
/// Halves round to even. Two empty strings score 0.
pub fn ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() && b.is_empty() {
        return 0;
    }
    (fuzz::ratio(a.chars(), b.chars()) * 100.0).round_ties_even() as u8
}

/// Token-set similarity of two strings, 0-100.
///
/// Both strings are split into sorted word sets. The shared words are
/// compared against each side's full word list and the best of those
/// comparisons is the score. A string whose words are all contained in the
/// other scores 100. Empty input (after stripping punctuation) scores 0.
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    let a = tokens(a);
    let b = tokens(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let join = |words: Vec<&String>| {
        words
            .into_iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    };
    let intersection = join(a.intersection(&b).collect());
    let only_a = join(a.difference(&b).collect());
    let only_b = join(b.difference(&a).collect());

    let combined = |rest: &str| match (intersection.is_empty(), rest.is_empty()) {
        (true, _) => rest.to_string(),
        (false, true) => intersection.clone(),
        (false, false) => format!("{intersection} {rest}"),
    };
    let with_a = combined(&only_a);
    let with_b = combined(&only_b);

    ratio(&intersection, &with_a)
        .max(ratio(&intersection, &with_b))
        .max(ratio(&with_a, &with_b))
}
