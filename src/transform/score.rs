// src/transform/score.rs
//! Knowledge score: a fixed, weighted rubric over a handful of answers,
//! scaled to 0–100 per respondent.

use crate::config::{Rubric, RubricItem, ScoreBin};
use crate::load::{Dataset, Row};
use crate::transform::{breakdowns::Entry, matches_token, round1};

/// Score of every row, in row order.
pub fn scores(dataset: &Dataset, rubric: &Rubric) -> Vec<u32> {
    dataset.rows().map(|row| score_row(row, rubric)).collect()
}

/// `round(points / total_points * 100)`; 0 for an empty rubric.
pub fn score_row(row: Row<'_>, rubric: &Rubric) -> u32 {
    let total: f64 = rubric.items.iter().map(|i| i.weight).sum();
    if total <= 0.0 {
        return 0;
    }
    let points: f64 = rubric.items.iter().map(|item| item_points(row, item)).sum();
    let score = (points / total * 100.0).round();
    score.clamp(0.0, 100.0) as u32
}

fn item_points(row: Row<'_>, item: &RubricItem) -> f64 {
    let Some(answer) = row.get(&item.column) else {
        return 0.0;
    };
    if item.full.iter().any(|t| matches_token(answer, t)) {
        item.weight
    } else if item.partial.iter().any(|t| matches_token(answer, t)) {
        item.partial_weight
    } else {
        0.0
    }
}

/// Mean respondent score to one decimal; 0.0 with no respondents.
pub fn mean(scores: &[u32]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let sum: u64 = scores.iter().map(|&s| s as u64).sum();
    round1(sum as f64 / scores.len() as f64)
}

/// One entry per bin, in bin order, zero-filled.
pub fn bin(scores: &[u32], bins: &[ScoreBin]) -> Vec<Entry> {
    let mut counts = vec![0u64; bins.len()];
    for &s in scores {
        if let Some(i) = bins.iter().position(|b| s <= b.max) {
            counts[i] += 1;
        }
    }
    bins.iter()
        .zip(counts)
        .map(|(b, value)| Entry {
            label: b.label.clone(),
            value,
        })
        .collect()
}
