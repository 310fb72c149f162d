// src/transform/mod.rs
//! Transform engine: cleaned dataset → dashboard artifacts.
//!
//! Every artifact is derived independently from the same [`Dataset`]. A
//! column the export lacks yields zeros or empty lists, never an error, so
//! the output shape is the same for every survey version.

pub mod breakdowns;
pub mod crosstab;
pub mod date_parser;
pub mod indicators;
pub mod quality;
pub mod score;
pub mod timeseries;
pub mod units;

use crate::config::SurveySchema;
use crate::load::{Dataset, LoadReport};
use serde::{ser::SerializeMap, Serialize, Serializer};
use tracing::{info, instrument};

pub use breakdowns::Entry;
pub use crosstab::Crosstab;
pub use indicators::{IndicatorValue, Scalar};
pub use quality::QualityReport;
pub use timeseries::DatePoint;
pub use units::UnitSummary;

/// Ordered name → value mapping, serialized as a JSON object in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyed<T>(pub Vec<(String, T)>);

impl<T> Default for Keyed<T> {
    fn default() -> Self {
        Keyed(Vec::new())
    }
}

impl<T> Keyed<T> {
    pub fn push(&mut self, key: impl Into<String>, value: T) {
        self.0.push((key.into(), value));
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T: Serialize> Serialize for Keyed<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// All artifacts of one run.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub indicators: Keyed<IndicatorValue>,
    pub breakdowns: Keyed<Vec<Entry>>,
    pub timeseries: Vec<DatePoint>,
    pub units: UnitSummary,
    pub crosstabs: Keyed<Crosstab>,
    pub quality: QualityReport,
}

#[instrument(level = "info", skip_all, fields(rows = dataset.len()))]
pub fn build(dataset: &Dataset, report: &LoadReport, schema: &SurveySchema) -> Artifacts {
    let scores = score::scores(dataset, &schema.rubric);

    let artifacts = Artifacts {
        indicators: indicators::build(dataset, &schema.indicators, &scores),
        breakdowns: breakdowns::build(dataset, &schema.breakdowns, &schema.rubric, &scores),
        timeseries: timeseries::build(dataset, schema.timestamp_column.as_deref()),
        units: units::build(dataset, schema.units.as_ref(), &scores),
        crosstabs: crosstab::build_all(dataset, &schema.crosstabs),
        quality: quality::build(dataset, report, &schema.quality),
    };

    info!(
        indicators = artifacts.indicators.len(),
        breakdowns = artifacts.breakdowns.len(),
        timeseries_points = artifacts.timeseries.len(),
        units = artifacts.units.units.len(),
        crosstabs = artifacts.crosstabs.len(),
        "built artifacts"
    );
    artifacts
}

/// `round(part / total * 100, 1)`, 0.0 when `total` is zero.
pub fn pct(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(part as f64 / total as f64 * 100.0)
}

/// Round half away from zero to one decimal; non-finite input becomes 0.0.
pub fn round1(x: f64) -> f64 {
    finite((x * 10.0).round() / 10.0)
}

pub fn finite(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

/// Case-insensitive comparison of a cleaned answer against a vocabulary token.
pub fn matches_token(value: &str, token: &str) -> bool {
    value == token || value.to_lowercase() == token.to_lowercase()
}

/// Numeric coercion; anything that is not a finite number is absent.
pub fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pct_handles_zero_total() {
        assert_eq!(pct(0, 0), 0.0);
        assert_eq!(pct(3, 0), 0.0);
    }

    #[test]
    fn pct_rounds_to_one_decimal() {
        assert_eq!(pct(3, 5), 60.0);
        assert_eq!(pct(1, 3), 33.3);
        assert_eq!(pct(2, 3), 66.7);
        assert_eq!(pct(5, 5), 100.0);
    }

    #[test]
    fn parse_number_rejects_non_finite() {
        assert_eq!(parse_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("douze"), None);
    }

    #[test]
    fn token_match_ignores_case() {
        assert!(matches_token("Féminin", "féminin"));
        assert!(matches_token("OUI", "oui"));
        assert!(!matches_token("oui ", "oui"));
    }

    #[test]
    fn keyed_serializes_in_order() {
        let mut k = Keyed::default();
        k.push("zeta", 1);
        k.push("alpha", 2);
        assert_eq!(serde_json::to_string(&k).unwrap(), r#"{"zeta":1,"alpha":2}"#);
    }
}
