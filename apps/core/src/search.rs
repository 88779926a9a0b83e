use std::sync::Arc;

use crate::model::{normalize_for_search, CandidateItem};
use crate::ranking::{rank, RankedCandidate, SortMode};

// Each tier is one million wide; in-tier penalties never cross a boundary.
const EXACT_TIER: i64 = 4_000_000;
const PREFIX_TIER: i64 = 3_000_000;
const SUBSTRING_TIER: i64 = 2_000_000;
const SUBSEQUENCE_TIER: i64 = 1_000_000;
const MAJOR_STEP: i64 = 1_000;
const PENALTY_CAP: usize = 999;

/// Filters `candidates` by `query`, scores the survivors and orders them per
/// `sort_mode`. Non-matching candidates are dropped under every mode.
pub fn search(
    candidates: &[Arc<CandidateItem>],
    query: &str,
    sort_mode: SortMode,
) -> Vec<RankedCandidate> {
    let normalized_query = normalize_for_search(query.trim());

    let matched: Vec<RankedCandidate> = candidates
        .iter()
        .filter_map(|item| {
            score_normalized(item.normalized_name(), &normalized_query).map(|score| {
                RankedCandidate {
                    item: Arc::clone(item),
                    score,
                }
            })
        })
        .collect();

    rank(matched, sort_mode)
}

/// Case-insensitive subsequence match of `query` against `candidate_name`.
///
/// Returns `Some(0)` for an empty query and `None` when some query character
/// cannot be found in order. Higher is better.
pub fn match_score(query: &str, candidate_name: &str) -> Option<i64> {
    score_normalized(
        &normalize_for_search(candidate_name),
        &normalize_for_search(query.trim()),
    )
}

fn score_normalized(name: &str, query: &str) -> Option<i64> {
    if query.is_empty() {
        return Some(0);
    }
    if name.is_empty() {
        return None;
    }

    let name_len = name.chars().count();
    let query_len = query.chars().count();
    let extra = name_len.saturating_sub(query_len);

    if name == query {
        return Some(EXACT_TIER);
    }

    if name.starts_with(query) {
        return Some(PREFIX_TIER - extra.min(999_999) as i64);
    }

    if let Some(byte_position) = name.find(query) {
        let start = name[..byte_position].chars().count();
        return Some(SUBSTRING_TIER - capped(start) * MAJOR_STEP - capped(extra));
    }

    let haystack: Vec<char> = name.chars().collect();
    let needle: Vec<char> = query.chars().collect();
    let (start, span) = tightest_window(&haystack, &needle)?;
    let gap = span - needle.len();

    Some(SUBSEQUENCE_TIER - capped(gap) * MAJOR_STEP - capped(start))
}

fn capped(value: usize) -> i64 {
    value.min(PENALTY_CAP) as i64
}

/// Shortest window of `haystack` containing `needle` as a subsequence, as
/// `(start, span)`. Ties keep the earliest start.
fn tightest_window(haystack: &[char], needle: &[char]) -> Option<(usize, usize)> {
    let first = *needle.first()?;
    let mut best: Option<(usize, usize)> = None;

    for (start, hay_char) in haystack.iter().enumerate() {
        if *hay_char != first {
            continue;
        }

        // A start that cannot complete the needle rules out every later start.
        let Some(end) = subsequence_end(haystack, needle, start) else {
            break;
        };
        let span = end - start + 1;
        if best.map_or(true, |(_, best_span)| span < best_span) {
            best = Some((start, span));
        }
        if span == needle.len() {
            break;
        }
    }

    best
}

fn subsequence_end(haystack: &[char], needle: &[char], start: usize) -> Option<usize> {
    let mut cursor = start;
    let mut last = start;

    for needle_char in needle {
        let offset = haystack[cursor..]
            .iter()
            .position(|hay_char| hay_char == needle_char)?;
        last = cursor + offset;
        cursor = last + 1;
    }

    Some(last)
}
