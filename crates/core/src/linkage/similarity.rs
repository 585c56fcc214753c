//! Pairwise similarity between normalized records.

use std::collections::BTreeSet;

use super::NormalizedRecord;

/// Score returned when two records share an ISBN.
pub const ISBN_MATCH_SCORE: f64 = 0.95;

const TITLE_WEIGHT: f64 = 0.7;
const AUTHOR_WEIGHT: f64 = 0.3;
const AUTHOR_MATCH_THRESHOLD: f64 = 0.8;

/// Similarity of two records in `[0, 1]`.
///
/// Equal ISBNs short-circuit to [`ISBN_MATCH_SCORE`]. Otherwise the score is a
/// weighted blend of title and author similarity.
pub fn score(a: &NormalizedRecord, b: &NormalizedRecord) -> f64 {
    if a.isbn.is_some() && a.isbn == b.isbn {
        return ISBN_MATCH_SCORE;
    }

    TITLE_WEIGHT * string_similarity(&a.title, &b.title) + AUTHOR_WEIGHT * author_similarity(&a.authors, &b.authors)
}

/// Edit-distance similarity: `(max_len - distance) / max_len`, 1.0 for two
/// empty strings.
pub fn string_similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 1.0;
    }
    (max_len - levenshtein(&a, &b)) as f64 / max_len as f64
}

/// Fraction of `a`'s authors with a close counterpart in `b`, over the larger
/// set size. Zero when either side has no authors.
fn author_similarity(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let matched = a
        .iter()
        .filter(|x| b.iter().any(|y| string_similarity(x, y) > AUTHOR_MATCH_THRESHOLD))
        .count();

    matched as f64 / a.len().max(b.len()) as f64
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
