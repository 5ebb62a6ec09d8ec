//! Fuzzy name matching against the reference corpus.
//!
//! Scores are integer percentages. The base measure is an indel edit ratio
//! over token-sorted strings, so word order, casing and punctuation do not
//! matter. An abbreviation pass lets contracted names such as `ar2023_en_book`
//! clear the cutoff against `annual_report_2023`.

use crate::config::MatchPolicy;
use crate::model::{MatchCandidate, ReferenceCorpus};
use crate::normalize::{sort_key, tokenize};

/// Rank `corpus` entries against `query` under `policy`.
///
/// Every returned score is `>= policy.cutoff`, at most `policy.limit` entries
/// are returned, ordered by descending score with ties kept in corpus order.
/// An empty query or corpus yields no candidates.
pub fn extract(query: &str, corpus: &ReferenceCorpus, policy: &MatchPolicy) -> Vec<MatchCandidate> {
    let query_tokens = tokenize(query);
    if query_tokens.is_empty() || corpus.is_empty() {
        return Vec::new();
    }

    let mut candidates: Vec<MatchCandidate> = corpus
        .names()
        .iter()
        .filter_map(|name| {
            let score = score_tokens(&query_tokens, &tokenize(name));
            (score >= policy.cutoff).then(|| MatchCandidate {
                reference_name: name.clone(),
                score,
            })
        })
        .collect();

    // sort_by is stable: equal scores keep corpus order
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates.truncate(policy.limit);
    candidates
}

/// Similarity of two raw names, 0-100.
pub fn score(a: &str, b: &str) -> u8 {
    score_tokens(&tokenize(a), &tokenize(b))
}

fn score_tokens(a: &[String], b: &[String]) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let sorted_a = sort_key(a);
    let sorted_b = sort_key(b);
    let base = ratio(&sorted_a, &sorted_b);
    let abbreviated = abbreviation_ratio(a, b, &sorted_b)
        .max(abbreviation_ratio(b, a, &sorted_a))
        .unwrap_or(0);
    base.max(abbreviated)
}

/// Indel ratio as a percentage: `round(200 * LCS / (|a| + |b|))`.
fn ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() && b.is_empty() {
        return 0;
    }
    let similarity = rapidfuzz::fuzz::ratio(a.chars(), b.chars());
    (similarity * 100.0).round().clamp(0.0, 100.0) as u8
}

// ---------------------------------------------------------------------------
// Abbreviations
// ---------------------------------------------------------------------------

/// Initials + date part of a fully spelled-out name.
#[derive(Debug, PartialEq, Eq)]
struct Contraction {
    initials: Vec<char>,
    digits: String,
}

/// `annual report 2023` contracts to initials `[a, r]` + digits `2023`.
/// Only names made of purely alphabetic and purely numeric tokens, with at
/// least two words, have a contraction.
fn contraction(tokens: &[String]) -> Option<Contraction> {
    let mut initials = Vec::new();
    let mut numbers: Vec<&str> = Vec::new();
    for token in tokens {
        if token.chars().all(char::is_alphabetic) {
            initials.push(token.chars().next()?);
        } else if token.chars().all(|c| c.is_ascii_digit()) {
            numbers.push(token);
        } else {
            return None;
        }
    }
    if initials.len() < 2 {
        return None;
    }
    initials.sort_unstable();
    numbers.sort_unstable();
    Some(Contraction {
        initials,
        digits: numbers.concat(),
    })
}

/// Does `token` (e.g. `ar2023`) spell out `c`? Letter order is ignored.
fn abbreviates(token: &str, c: &Contraction) -> bool {
    let split = token
        .find(|ch: char| ch.is_ascii_digit())
        .unwrap_or(token.len());
    let (letters, digits) = token.split_at(split);
    if letters.is_empty() || !letters.chars().all(char::is_alphabetic) || digits != c.digits {
        return false;
    }
    let mut letters: Vec<char> = letters.chars().collect();
    letters.sort_unstable();
    letters == c.initials
}

/// Score `long` collapsed to the matching abbreviation token of `short`.
fn abbreviation_ratio(long: &[String], short: &[String], short_sorted: &str) -> Option<u8> {
    let c = contraction(long)?;
    short
        .iter()
        .find(|t| abbreviates(t, &c))
        .map(|t| ratio(t, short_sorted))
}
