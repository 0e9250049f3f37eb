//! Fuzzy resolver: picks the best-named scheme among filtered candidates.
//!
//! Scores are token-order insensitive. Both names are lowercased, stripped of
//! punctuation and whitespace-collapsed, then compared two ways:
//!
//! - *token sort*: tokens sorted and rejoined, compared by normalized
//!   Levenshtein similarity;
//! - *token set*: the shared tokens compared against each side's remainder,
//!   so that a name which is a subset of the other still scores high.
//!
//! The final score is the larger of the token-sort ratio and 95% of the
//! token-set ratio, rounded to an integer in `0..=100`.

use std::collections::BTreeSet;

use crate::{
  Error, Result,
  scheme::{SchemeCandidate, SchemeData},
};

/// Score given to a candidate that was the only row left after filtering.
pub const STRUCTURAL_MATCH_SCORE: u8 = 100;

const TOKEN_SET_WEIGHT: f64 = 0.95;

/// Select the single best scheme for `target_name`.
///
/// A lone candidate is accepted unconditionally with
/// [`STRUCTURAL_MATCH_SCORE`]. Otherwise the highest-scoring candidate wins;
/// ties go to the earliest candidate, so callers control precedence through
/// ordering. Fails with [`Error::NoMatch`] when there are no candidates or
/// the winner scores below `min_score`.
pub fn resolve(
  target_name: &str,
  candidates: Vec<SchemeCandidate>,
  min_score: u8,
) -> Result<SchemeData> {
  if candidates.len() <= 1 {
    return candidates
      .into_iter()
      .next()
      .map(|only| SchemeData::from_candidate(only, STRUCTURAL_MATCH_SCORE))
      .ok_or(Error::NoMatch);
  }

  let mut best: Option<(SchemeCandidate, u8)> = None;
  for candidate in candidates {
    let candidate_score = score(target_name, &candidate.name);
    tracing::trace!(name = %candidate.name, score = candidate_score, "scored candidate");
    if best.as_ref().is_none_or(|(_, top)| candidate_score > *top) {
      best = Some((candidate, candidate_score));
    }
  }

  match best {
    Some((winner, winner_score)) if winner_score >= min_score => {
      tracing::debug!(name = %winner.name, score = winner_score, "fuzzy match accepted");
      Ok(SchemeData::from_candidate(winner, winner_score))
    }
    Some((winner, winner_score)) => {
      tracing::debug!(
        name = %winner.name,
        score = winner_score,
        min_score,
        "best fuzzy match below threshold"
      );
      Err(Error::NoMatch)
    }
    None => Err(Error::NoMatch),
  }
}

/// Similarity between two scheme names, `0..=100`.
pub fn score(a: &str, b: &str) -> u8 {
  let a = normalize(a);
  let b = normalize(b);
  let best = token_sort_ratio(&a, &b).max(TOKEN_SET_WEIGHT * token_set_ratio(&a, &b));
  best.round().clamp(0.0, 100.0) as u8
}

/// Lowercase, replace non-alphanumerics with spaces, collapse whitespace.
pub fn normalize(s: &str) -> String {
  s.chars()
    .flat_map(char::to_lowercase)
    .map(|c| if c.is_alphanumeric() { c } else { ' ' })
    .collect::<String>()
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
}

fn ratio(a: &str, b: &str) -> f64 {
  if a.is_empty() || b.is_empty() {
    return 0.0;
  }
  strsim::normalized_levenshtein(a, b) * 100.0
}

fn token_sort_ratio(a: &str, b: &str) -> f64 {
  let sorted = |s: &str| {
    let mut tokens: Vec<&str> = s.split(' ').filter(|t| !t.is_empty()).collect();
    tokens.sort_unstable();
    tokens.join(" ")
  };
  ratio(&sorted(a), &sorted(b))
}

fn token_set_ratio(a: &str, b: &str) -> f64 {
  let tokens_a: BTreeSet<&str> = a.split(' ').filter(|t| !t.is_empty()).collect();
  let tokens_b: BTreeSet<&str> = b.split(' ').filter(|t| !t.is_empty()).collect();

  let shared = join(tokens_a.intersection(&tokens_b));
  let only_a = join(tokens_a.difference(&tokens_b));
  let only_b = join(tokens_b.difference(&tokens_a));

  if !shared.is_empty() && (only_a.is_empty() || only_b.is_empty()) {
    return 100.0;
  }

  let with_a = concat(&shared, &only_a);
  let with_b = concat(&shared, &only_b);
  ratio(&shared, &with_a)
    .max(ratio(&shared, &with_b))
    .max(ratio(&with_a, &with_b))
}

fn join<'a, 'b: 'a>(tokens: impl Iterator<Item = &'a &'b str>) -> String {
  tokens.copied().collect::<Vec<_>>().join(" ")
}

fn concat(a: &str, b: &str) -> String {
  match (a.is_empty(), b.is_empty()) {
    (true, _) => b.to_owned(),
    (_, true) => a.to_owned(),
    _ => format!("{a} {b}"),
  }
}
