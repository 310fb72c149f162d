// src/transform/quality.rs
use crate::config::QualityConfig;
use crate::load::{Dataset, LoadReport};
use crate::transform::pct;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingRate {
    pub column: String,
    pub missing: u64,
    pub missing_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSample {
    pub name: String,
    pub examples: Vec<String>,
}

/// Load diagnostics, worst-filled columns and a small data dictionary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub input: LoadReport,
    pub missing: Vec<MissingRate>,
    pub dictionary: Vec<ColumnSample>,
}

pub fn build(dataset: &Dataset, report: &LoadReport, config: &QualityConfig) -> QualityReport {
    let total = dataset.len() as u64;

    let mut missing: Vec<MissingRate> = dataset
        .columns()
        .map(|col| {
            let absent = col.cells().filter(Option::is_none).count() as u64;
            MissingRate {
                column: col.name().to_string(),
                missing: absent,
                missing_pct: pct(absent, total),
            }
        })
        .collect();
    missing.sort_by(|a, b| b.missing.cmp(&a.missing));
    missing.truncate(config.top_missing);

    let dictionary = dataset
        .columns()
        .map(|col| ColumnSample {
            name: col.name().to_string(),
            examples: col
                .values()
                .take(config.dictionary_examples)
                .map(str::to_string)
                .collect(),
        })
        .collect();

    QualityReport {
        input: report.clone(),
        missing,
        dictionary,
    }
}
