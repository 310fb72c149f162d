// src/transform/breakdowns.rs
//! Ranked label/count lists for single-select and multi-select questions.

use crate::config::{BreakdownSpec, Rubric};
use crate::load::{Column, Dataset};
use crate::transform::{matches_token, parse_number, score, Keyed};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub label: String,
    pub value: u64,
}

pub fn build(
    dataset: &Dataset,
    specs: &[BreakdownSpec],
    rubric: &Rubric,
    scores: &[u32],
) -> Keyed<Vec<Entry>> {
    let mut out = Keyed::default();
    for spec in specs {
        let entries = match spec {
            BreakdownSpec::Single { column, top, .. } => single(dataset, column, *top),
            BreakdownSpec::Multi {
                column, top, codes, ..
            } => multi(dataset, column, *top, codes),
            BreakdownSpec::ScoreBins { .. } => score::bin(scores, &rubric.bins),
        };
        out.push(spec.name(), entries);
    }
    out
}

/// Count occurrences, rank by descending count. Ties keep first-seen order.
pub fn tally<'a, I>(values: I) -> Vec<Entry>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut order: Vec<Entry> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    for v in values {
        match index.get(v) {
            Some(&i) => order[i].value += 1,
            None => {
                index.insert(v, order.len());
                order.push(Entry {
                    label: v.to_string(),
                    value: 1,
                });
            }
        }
    }
    rank(&mut order);
    order
}

/// Stable sort by descending count.
fn rank(entries: &mut [Entry]) {
    entries.sort_by(|a, b| b.value.cmp(&a.value));
}

/// Ranked distribution of a single-select column, cut to `top`.
pub fn single(dataset: &Dataset, column: &str, top: usize) -> Vec<Entry> {
    let Some(col) = dataset.column(column) else {
        debug!(column, "column missing; empty breakdown");
        return Vec::new();
    };
    let mut entries = tally(col.values());
    entries.truncate(top);
    entries
}

/// Token tally of a multi-select question.
///
/// When the export carries one `<column>/<code>` flag column per code those
/// are summed; otherwise the composite column is split on whitespace. With a
/// declared `codes` universe the result holds exactly one entry per code and
/// ignores `top`.
pub fn multi(dataset: &Dataset, column: &str, top: usize, codes: &[String]) -> Vec<Entry> {
    let prefix = format!("{}/", column);
    let flags: Vec<(&str, Column<'_>)> = dataset.columns_with_prefix(&prefix).collect();

    let mut entries = if !flags.is_empty() {
        debug!(column, flag_columns = flags.len(), "summing per-code flag columns");
        let mut entries: Vec<Entry> = flags
            .iter()
            .map(|(code, col)| Entry {
                label: code.to_string(),
                value: col.values().filter(|v| is_truthy(v)).count() as u64,
            })
            .collect();
        rank(&mut entries);
        entries
    } else if let Some(col) = dataset.column(column) {
        tally(col.values().flat_map(row_tokens))
    } else {
        debug!(column, "column missing; empty multi-select tally");
        Vec::new()
    };

    if codes.is_empty() {
        entries.truncate(top);
        return entries;
    }
    complete_universe(entries, codes)
}

/// Distinct tokens of one answer, in the order written.
fn row_tokens(raw: &str) -> Vec<&str> {
    let mut seen = HashSet::new();
    raw.split_whitespace().filter(|t| seen.insert(*t)).collect()
}

fn is_truthy(value: &str) -> bool {
    match parse_number(value) {
        Some(n) => n > 0.0,
        None => ["true", "oui", "yes"]
            .iter()
            .any(|t| matches_token(value, t)),
    }
}

fn complete_universe(observed: Vec<Entry>, codes: &[String]) -> Vec<Entry> {
    let counts: HashMap<&str, u64> = observed
        .iter()
        .map(|e| (e.label.as_str(), e.value))
        .collect();
    let outside = observed
        .iter()
        .filter(|e| !codes.iter().any(|c| c == &e.label))
        .count();
    if outside > 0 {
        debug!(outside, "tokens outside the declared code list ignored");
    }
    let mut entries: Vec<Entry> = codes
        .iter()
        .map(|c| Entry {
            label: c.clone(),
            value: counts.get(c.as_str()).copied().unwrap_or(0),
        })
        .collect();
    rank(&mut entries);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SurveySchema;
    use crate::test_support::dataset;

    fn pairs(entries: &[Entry]) -> Vec<(&str, u64)> {
        entries.iter().map(|e| (e.label.as_str(), e.value)).collect()
    }

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn single_ranks_with_stable_ties() {
        let ds = dataset("fonction\nB\nA\nC\nA\nB\n\nnull\n");
        let entries = single(&ds, "fonction", 10);
        assert_eq!(pairs(&entries), vec![("B", 2), ("A", 2), ("C", 1)]);
        let total: u64 = entries.iter().map(|e| e.value).sum();
        assert_eq!(total, 5);
    }

    #[test]
    fn single_truncates_to_top() {
        let ds = dataset("x\na\nb\nb\nc\n");
        assert_eq!(pairs(&single(&ds, "x", 2)), vec![("b", 2), ("a", 1)]);
        assert!(single(&ds, "missing", 10).is_empty());
    }

    #[test]
    fn multi_universe_example() {
        let ds = dataset("obstacles\nobs1 obs3\nobs3\n");
        let entries = multi(&ds, "obstacles", 50, &codes(&["obs1", "obs2", "obs3"]));
        assert_eq!(pairs(&entries), vec![("obs3", 2), ("obs1", 1), ("obs2", 0)]);
    }

    #[test]
    fn multi_is_order_insensitive() {
        let a = multi(&dataset("o\nobs1 obs3\n"), "o", 50, &codes(&["obs1", "obs3"]));
        let b = multi(&dataset("o\nobs3 obs1\n"), "o", 50, &codes(&["obs1", "obs3"]));
        assert_eq!(a, b);
    }

    #[test]
    fn multi_open_vocabulary() {
        let ds = dataset("actions\nact2  act1\nact2\n\n");
        let entries = multi(&ds, "actions", 50, &[]);
        assert_eq!(pairs(&entries), vec![("act2", 2), ("act1", 1)]);
    }

    #[test]
    fn multi_repeated_token_counts_once_per_row() {
        let ds = dataset("o\nobs1 obs1\n");
        assert_eq!(pairs(&multi(&ds, "o", 50, &[])), vec![("obs1", 1)]);
    }

    #[test]
    fn flag_columns_take_precedence() {
        let ds = dataset(
            "obstacles,obstacles/obs1,obstacles/obs2,obstacles/obs3\n\
             obs1 obs2,1,0,0\n\
             obs2,0,1,1\n\
             obs2,1,1,\n",
        );
        let entries = multi(&ds, "obstacles", 50, &codes(&["obs1", "obs2", "obs3", "obs4"]));
        assert_eq!(
            pairs(&entries),
            vec![("obs1", 2), ("obs2", 2), ("obs3", 1), ("obs4", 0)]
        );
    }

    #[test]
    fn universe_is_complete_on_empty_input() {
        let entries = multi(&Dataset::empty(), "obstacles", 50, &codes(&["obs1", "obs2"]));
        assert_eq!(pairs(&entries), vec![("obs1", 0), ("obs2", 0)]);
    }

    #[test]
    fn build_keeps_configured_order() {
        let schema = SurveySchema::gender_survey();
        let out = build(&Dataset::empty(), &schema.breakdowns, &schema.rubric, &[]);
        let names: Vec<_> = out.0.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names.first(), Some(&"by_ministere"));
        assert_eq!(names.last(), Some(&"score_bins"));
        assert_eq!(out.get("obstacles").map(Vec::len), Some(8));
        assert_eq!(out.get("actions").map(Vec::len), Some(0));
        assert_eq!(out.get("score_bins").map(Vec::len), Some(5));
    }
}
