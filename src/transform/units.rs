// src/transform/units.rs
//! Per-unit profiles (e.g. one line per ministry) for the ranking table.

use crate::config::{UnitConfig, UnitSignal};
use crate::load::{Dataset, Row};
use crate::transform::{matches_token, parse_number, pct};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitProfile {
    pub unit: String,
    pub respondents: u64,
    pub trained_pct: f64,
    /// Mean knowledge score of the unit's respondents, rounded.
    pub score: u32,
    pub focal_point: bool,
    pub integration: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UnitSummary {
    pub with_focal_point_pct: f64,
    pub with_integration_pct: f64,
    pub units: Vec<UnitProfile>,
}

#[derive(Default)]
struct Acc {
    respondents: u64,
    trained: u64,
    score_sum: u64,
    focal_point: bool,
    integration: bool,
}

/// `scores` holds one knowledge score per dataset row.
pub fn build(dataset: &Dataset, config: Option<&UnitConfig>, scores: &[u32]) -> UnitSummary {
    let Some(config) = config else {
        return UnitSummary::default();
    };
    if !dataset.has_column(&config.column) {
        debug!(column = %config.column, "unit column missing; no unit profiles");
        return UnitSummary::default();
    }

    let mut order: Vec<(&str, Acc)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for (i, row) in dataset.rows().enumerate() {
        let Some(unit) = row.get(&config.column) else {
            continue;
        };
        let slot = *index.entry(unit).or_insert_with(|| {
            order.push((unit, Acc::default()));
            order.len() - 1
        });
        let acc = &mut order[slot].1;
        acc.respondents += 1;
        if row
            .get(&config.trained.column)
            .is_some_and(|v| matches_token(v, &config.trained.value))
        {
            acc.trained += 1;
        }
        acc.score_sum += scores.get(i).copied().unwrap_or(0) as u64;
        acc.focal_point |= signal(row, &config.focal_point);
        acc.integration |= signal(row, &config.integration);
    }

    let mut units: Vec<UnitProfile> = order
        .into_iter()
        .map(|(unit, acc)| UnitProfile {
            unit: unit.to_string(),
            respondents: acc.respondents,
            trained_pct: pct(acc.trained, acc.respondents),
            score: (acc.score_sum as f64 / acc.respondents as f64).round() as u32,
            focal_point: acc.focal_point,
            integration: acc.integration,
        })
        .collect();
    units.sort_by(|a, b| b.score.cmp(&a.score));

    let n = units.len() as u64;
    UnitSummary {
        with_focal_point_pct: pct(units.iter().filter(|u| u.focal_point).count() as u64, n),
        with_integration_pct: pct(units.iter().filter(|u| u.integration).count() as u64, n),
        units,
    }
}

fn signal(row: Row<'_>, rule: &UnitSignal) -> bool {
    rule.flag_columns
        .iter()
        .any(|c| row.get(c).is_some_and(|v| matches_token(v, &rule.affirmative)))
        || rule
            .positive_columns
            .iter()
            .any(|c| row.get(c).and_then(parse_number).is_some_and(|n| n > 0.0))
}
