// src/transform/indicators.rs
use crate::config::{Bucket, BucketRate, IndicatorSpec, Measure};
use crate::load::Dataset;
use crate::transform::{matches_token, parse_number, pct, round1, score, Keyed};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Count(u64),
    Rate(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IndicatorValue {
    Scalar(Scalar),
    Record(Keyed<Scalar>),
}

impl IndicatorValue {
    fn count(n: u64) -> Self {
        IndicatorValue::Scalar(Scalar::Count(n))
    }

    fn rate(r: f64) -> Self {
        IndicatorValue::Scalar(Scalar::Rate(r))
    }
}

/// Evaluate every configured indicator, in configuration order.
pub fn build(dataset: &Dataset, specs: &[IndicatorSpec], scores: &[u32]) -> Keyed<IndicatorValue> {
    let mut out = Keyed::default();
    for spec in specs {
        out.push(spec.name.clone(), evaluate(dataset, &spec.measure, scores));
    }
    out
}

pub fn evaluate(dataset: &Dataset, measure: &Measure, scores: &[u32]) -> IndicatorValue {
    let total = dataset.len() as u64;
    match measure {
        Measure::Total => IndicatorValue::count(total),
        Measure::Count { column, value } => {
            IndicatorValue::count(count_matching(dataset, column, std::slice::from_ref(value)))
        }
        Measure::Rate { column, value } => {
            let n = count_matching(dataset, column, std::slice::from_ref(value));
            IndicatorValue::rate(pct(n, total))
        }
        Measure::Buckets {
            column,
            buckets,
            rate,
        } => IndicatorValue::Record(buckets_record(dataset, column, buckets, rate.as_ref())),
        Measure::Numeric {
            column,
            present_key,
            absent_key,
            mean_key,
        } => {
            let summary = numeric_summary(dataset, column);
            let mut rec = Keyed::default();
            rec.push(present_key.clone(), Scalar::Count(summary.present));
            rec.push(absent_key.clone(), Scalar::Count(total - summary.present));
            rec.push(mean_key.clone(), Scalar::Rate(summary.mean));
            IndicatorValue::Record(rec)
        }
        Measure::Distinct { column } => IndicatorValue::count(distinct(dataset, column)),
        Measure::ScoreMean => IndicatorValue::rate(score::mean(scores)),
    }
}

/// Rows whose answer in `column` matches any of `tokens`.
pub fn count_matching(dataset: &Dataset, column: &str, tokens: &[String]) -> u64 {
    let Some(col) = dataset.column(column) else {
        debug!(column, "column missing; counting zero");
        return 0;
    };
    col.values()
        .filter(|v| tokens.iter().any(|t| matches_token(v, t)))
        .count() as u64
}

fn buckets_record(
    dataset: &Dataset,
    column: &str,
    buckets: &[Bucket],
    rate: Option<&BucketRate>,
) -> Keyed<Scalar> {
    let total = dataset.len() as u64;
    let mut rec = Keyed::default();
    let mut counts = Vec::with_capacity(buckets.len());
    for b in buckets {
        let n = count_matching(dataset, column, &b.values);
        counts.push((b.key.as_str(), n));
        rec.push(b.key.clone(), Scalar::Count(n));
    }
    if let Some(r) = rate {
        let n = counts
            .iter()
            .find(|(k, _)| *k == r.bucket)
            .map(|(_, n)| *n)
            .unwrap_or(0);
        rec.push(r.key.clone(), Scalar::Rate(pct(n, total)));
    }
    rec
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericSummary {
    pub present: u64,
    pub mean: f64,
}

/// Values that coerce to a finite number are present; everything else is absent.
pub fn numeric_summary(dataset: &Dataset, column: &str) -> NumericSummary {
    let Some(col) = dataset.column(column) else {
        return NumericSummary {
            present: 0,
            mean: 0.0,
        };
    };
    let (present, sum) = col
        .values()
        .filter_map(parse_number)
        .fold((0u64, 0.0f64), |(n, s), v| (n + 1, s + v));
    let mean = if present == 0 {
        0.0
    } else {
        round1(sum / present as f64)
    };
    NumericSummary { present, mean }
}

/// Number of distinct non-empty answers.
pub fn distinct(dataset: &Dataset, column: &str) -> u64 {
    dataset
        .column(column)
        .map(|col| col.values().collect::<HashSet<_>>().len() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SurveySchema;
    use crate::test_support::dataset;
    use anyhow::Result;

    fn rate_of(v: &IndicatorValue) -> f64 {
        match v {
            IndicatorValue::Scalar(Scalar::Rate(r)) => *r,
            other => panic!("not a rate: {:?}", other),
        }
    }

    #[test]
    fn sex_rates_match_example() {
        let ds = dataset(
            "sexe\nfeminin\nfeminin\nfeminin\nmasculin\nmasculin\n",
        );
        let schema = SurveySchema::gender_survey();
        let out = build(&ds, &schema.indicators, &[]);
        assert_eq!(
            out.get("total_responses"),
            Some(&IndicatorValue::Scalar(Scalar::Count(5)))
        );
        assert_eq!(rate_of(out.get("pct_female").unwrap()), 60.0);
        assert_eq!(rate_of(out.get("pct_male").unwrap()), 40.0);
        assert_eq!(
            out.get("female_respondents"),
            Some(&IndicatorValue::Scalar(Scalar::Count(3)))
        );
    }

    #[test]
    fn unknown_values_count_in_total_only() {
        let ds = dataset("formation_genre\noui\nnon\npeut-être\n\n");
        let m = Measure::Buckets {
            column: "formation_genre".into(),
            buckets: vec![
                Bucket {
                    key: "yes".into(),
                    values: vec!["oui".into()],
                },
                Bucket {
                    key: "no".into(),
                    values: vec!["non".into()],
                },
            ],
            rate: Some(BucketRate {
                key: "pct_yes".into(),
                bucket: "yes".into(),
            }),
        };
        let IndicatorValue::Record(rec) = evaluate(&ds, &m, &[]) else {
            panic!("expected record");
        };
        assert_eq!(rec.get("yes"), Some(&Scalar::Count(1)));
        assert_eq!(rec.get("no"), Some(&Scalar::Count(1)));
        assert_eq!(rec.get("pct_yes"), Some(&Scalar::Rate(33.3)));
    }

    #[test]
    fn numeric_coerces_and_averages() {
        let ds = dataset("budget\n10\nabc\n\n15.5\n");
        let s = numeric_summary(&ds, "budget");
        assert_eq!(s.present, 2);
        assert_eq!(s.mean, 12.8);
        assert_eq!(numeric_summary(&ds, "missing"), NumericSummary { present: 0, mean: 0.0 });
    }

    #[test]
    fn distinct_ignores_empty() {
        let ds = dataset("ministere\nSanté\nEducation\nSanté\n\n");
        assert_eq!(distinct(&ds, "ministere"), 2);
        assert_eq!(distinct(&ds, "absent"), 0);
    }

    #[test]
    fn empty_dataset_yields_zeroed_shape() -> Result<()> {
        let schema = SurveySchema::gender_survey();
        let out = build(&Dataset::empty(), &schema.indicators, &[]);
        assert_eq!(out.len(), schema.indicators.len());
        let json = serde_json::to_value(&out)?;
        assert_eq!(json["total_responses"], 0);
        assert_eq!(json["pct_female"], 0.0);
        assert_eq!(json["trained_on_gender"]["pct_yes"], 0.0);
        assert_eq!(json["gender_budget"]["without_budget"], 0);
        assert_eq!(json["gender_budget"]["avg_budget_pct"], 0.0);
        Ok(())
    }

    #[test]
    fn missing_budget_column_counts_all_absent() {
        let ds = dataset("sexe\nfeminin\nmasculin\n");
        let m = Measure::Numeric {
            column: "budget_genre_annuel".into(),
            present_key: "with_budget".into(),
            absent_key: "without_budget".into(),
            mean_key: "avg_budget_pct".into(),
        };
        let IndicatorValue::Record(rec) = evaluate(&ds, &m, &[]) else {
            panic!("expected record");
        };
        assert_eq!(rec.get("with_budget"), Some(&Scalar::Count(0)));
        assert_eq!(rec.get("without_budget"), Some(&Scalar::Count(2)));
    }
}
