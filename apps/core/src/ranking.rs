use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::CandidateItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    Alphabetical,
    AlphabeticalReverse,
    LineNumber,
    LineNumberReverse,
    Weight,
    WeightReverse,
    Fuzzy,
    FuzzyReverse,
}

/// A candidate that survived the query filter, with its per-query score.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub item: Arc<CandidateItem>,
    pub score: i64,
}

/// Orders `matched` per `mode`. The sort is stable, so equal keys keep their
/// input (load) order.
///
/// Line-number modes only order symbols: they are sorted among the slots
/// symbols already occupy, and every other candidate stays where it was.
pub fn rank(mut matched: Vec<RankedCandidate>, mode: SortMode) -> Vec<RankedCandidate> {
    match mode {
        SortMode::LineNumber => sort_symbol_slots(&mut matched, false),
        SortMode::LineNumberReverse => sort_symbol_slots(&mut matched, true),
        SortMode::Alphabetical
        | SortMode::AlphabeticalReverse
        | SortMode::Weight
        | SortMode::WeightReverse
        | SortMode::Fuzzy
        | SortMode::FuzzyReverse => matched.sort_by(|a, b| compare(mode, a, b)),
    }
    matched
}

/// Pairwise order for `mode`. [`rank`] does not use it for the line-number
/// modes, which keep non-symbols in place instead of grouping them.
pub fn compare(mode: SortMode, a: &RankedCandidate, b: &RankedCandidate) -> Ordering {
    match mode {
        SortMode::Alphabetical => alphabetical(&a.item, &b.item),
        SortMode::AlphabeticalReverse => alphabetical(&b.item, &a.item),
        SortMode::LineNumber => a.item.line().cmp(&b.item.line()),
        SortMode::LineNumberReverse => b.item.line().cmp(&a.item.line()),
        SortMode::Weight => weight(&a.item, &b.item),
        SortMode::WeightReverse => weight(&b.item, &a.item),
        SortMode::Fuzzy => fuzzy(a, b),
        SortMode::FuzzyReverse => fuzzy(b, a),
    }
}

fn alphabetical(a: &CandidateItem, b: &CandidateItem) -> Ordering {
    a.normalized_name().cmp(b.normalized_name())
}

fn sort_symbol_slots(matched: &mut [RankedCandidate], reverse: bool) {
    let slots: Vec<usize> = matched
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.item.line().is_some())
        .map(|(slot, _)| slot)
        .collect();

    let mut symbols: Vec<RankedCandidate> =
        slots.iter().map(|&slot| matched[slot].clone()).collect();
    symbols.sort_by(|a, b| {
        let (left, right) = if reverse { (b, a) } else { (a, b) };
        left.item.line().cmp(&right.item.line())
    });

    for (slot, entry) in slots.into_iter().zip(symbols) {
        matched[slot] = entry;
    }
}

fn weight(a: &CandidateItem, b: &CandidateItem) -> Ordering {
    a.weight.total_cmp(&b.weight)
}

// Best score first; ties fall back to name order.
fn fuzzy(a: &RankedCandidate, b: &RankedCandidate) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| alphabetical(&a.item, &b.item))
}
