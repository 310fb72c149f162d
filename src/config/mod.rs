// src/config/mod.rs
//! Survey schema: every column name, vocabulary, rubric weight and cap the
//! pipeline uses. Passed by reference into the loader and the transform so a
//! different survey only needs a different schema value.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

mod gender;

/// Full description of one survey export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SurveySchema {
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default)]
    pub consent: Option<ConsentRule>,
    #[serde(default)]
    pub timestamp_column: Option<String>,
    #[serde(default)]
    pub indicators: Vec<IndicatorSpec>,
    #[serde(default)]
    pub breakdowns: Vec<BreakdownSpec>,
    #[serde(default)]
    pub rubric: Rubric,
    #[serde(default)]
    pub units: Option<UnitConfig>,
    #[serde(default)]
    pub crosstabs: Vec<CrosstabSpec>,
    #[serde(default)]
    pub quality: QualityConfig,
}

impl Default for SurveySchema {
    fn default() -> Self {
        gender::gender_survey()
    }
}

impl SurveySchema {
    /// The built-in schema for the gender-mainstreaming survey export.
    pub fn gender_survey() -> Self {
        gender::gender_survey()
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let schema: SurveySchema =
            serde_yaml::from_str(text).context("parsing survey schema YAML")?;
        Ok(schema)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading survey schema {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("in {}", path.display()))
    }
}

/// Text encodings the loader may try, in the order listed in [`LoaderConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextEncoding {
    #[serde(rename = "utf-8")]
    Utf8,
    #[serde(rename = "utf-8-sig")]
    Utf8Sig,
    /// Decoded as windows-1252, which differs from ISO-8859-1 only in 0x80–0x9F.
    #[serde(rename = "latin-1")]
    Latin1,
}

impl TextEncoding {
    pub fn label(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf8Sig => "utf-8-sig",
            TextEncoding::Latin1 => "latin-1",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// Blobs shorter than this are treated as "no data".
    pub min_bytes: usize,
    /// How many leading bytes are searched for markup markers.
    pub sniff_bytes: usize,
    pub markup_markers: Vec<String>,
    pub encodings: Vec<TextEncoding>,
    pub delimiter: char,
    /// Cell values (case-insensitive) that mean "no answer".
    pub null_tokens: Vec<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            min_bytes: 5,
            sniff_bytes: 300,
            markup_markers: vec!["<html".into(), "<!doctype".into()],
            encodings: vec![
                TextEncoding::Utf8,
                TextEncoding::Utf8Sig,
                TextEncoding::Latin1,
            ],
            delimiter: ',',
            null_tokens: vec!["null".into(), "nan".into(), "none".into()],
        }
    }
}

/// Rows are kept only when `column` equals `affirmative` (trimmed, lower-cased).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsentRule {
    pub column: String,
    pub affirmative: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndicatorSpec {
    pub name: String,
    pub measure: Measure,
}

/// How one indicator is derived from the cleaned dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Measure {
    /// Number of cleaned rows.
    Total,
    /// Rows whose `column` matches `value`.
    Count { column: String, value: String },
    /// `round(100 * matches / total_rows, 1)`.
    Rate { column: String, value: String },
    /// One count per bucket, optionally with the rate of one bucket.
    Buckets {
        column: String,
        buckets: Vec<Bucket>,
        #[serde(default)]
        rate: Option<BucketRate>,
    },
    /// Numeric coercion: present/absent counts and the mean of present values.
    Numeric {
        column: String,
        #[serde(default = "default_present_key")]
        present_key: String,
        #[serde(default = "default_absent_key")]
        absent_key: String,
        #[serde(default = "default_mean_key")]
        mean_key: String,
    },
    /// Distinct non-empty values observed.
    Distinct { column: String },
    /// Mean knowledge score over the cleaned rows.
    ScoreMean,
}

fn default_present_key() -> String {
    "present".into()
}

fn default_absent_key() -> String {
    "absent".into()
}

fn default_mean_key() -> String {
    "mean".into()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Bucket {
    pub key: String,
    pub values: Vec<String>,
}

/// Emit `key = rate(bucket)` next to the bucket counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BucketRate {
    pub key: String,
    pub bucket: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BreakdownSpec {
    /// Ranked counts of a single-select column.
    Single {
        name: String,
        column: String,
        #[serde(default = "default_top")]
        top: usize,
    },
    /// Token tally of a multi-select column. An empty `codes` list means an
    /// open vocabulary.
    Multi {
        name: String,
        column: String,
        #[serde(default = "default_multi_top")]
        top: usize,
        #[serde(default)]
        codes: Vec<String>,
    },
    /// Distribution of respondent knowledge scores over the rubric bins.
    ScoreBins { name: String },
}

impl BreakdownSpec {
    pub fn name(&self) -> &str {
        match self {
            BreakdownSpec::Single { name, .. }
            | BreakdownSpec::Multi { name, .. }
            | BreakdownSpec::ScoreBins { name } => name,
        }
    }
}

fn default_top() -> usize {
    10
}

fn default_multi_top() -> usize {
    50
}

/// Knowledge-score rubric: each item is worth `weight`; `partial` answers earn
/// `partial_weight` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Rubric {
    pub items: Vec<RubricItem>,
    pub bins: Vec<ScoreBin>,
}

impl Default for Rubric {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            bins: default_score_bins(),
        }
    }
}

pub fn default_score_bins() -> Vec<ScoreBin> {
    [("0-20", 20), ("21-40", 40), ("41-60", 60), ("61-80", 80), ("81-100", 100)]
        .into_iter()
        .map(|(label, max)| ScoreBin {
            label: label.into(),
            max,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RubricItem {
    pub column: String,
    pub full: Vec<String>,
    #[serde(default)]
    pub partial: Vec<String>,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default = "default_partial_weight")]
    pub partial_weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

fn default_partial_weight() -> f64 {
    0.5
}

/// A score falls in the first bin whose `max` is >= the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoreBin {
    pub label: String,
    pub max: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitConfig {
    pub column: String,
    pub trained: MatchRule,
    pub focal_point: UnitSignal,
    pub integration: UnitSignal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchRule {
    pub column: String,
    pub value: String,
}

/// True for a unit when any of its rows has an affirmative flag column or a
/// positive numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitSignal {
    #[serde(default)]
    pub flag_columns: Vec<String>,
    #[serde(default)]
    pub positive_columns: Vec<String>,
    #[serde(default = "default_affirmative")]
    pub affirmative: String,
}

fn default_affirmative() -> String {
    "oui".into()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrosstabSpec {
    pub name: String,
    pub rows: String,
    pub cols: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QualityConfig {
    pub top_missing: usize,
    pub dictionary_examples: usize,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            top_missing: 15,
            dictionary_examples: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BUNDLED: &str = include_str!("../../config/gender_survey.yaml");

    #[test]
    fn bundled_yaml_matches_builtin_schema() -> Result<()> {
        let parsed = SurveySchema::from_yaml_str(BUNDLED)?;
        assert_eq!(parsed, SurveySchema::gender_survey());
        Ok(())
    }

    #[test]
    fn omitted_sections_take_defaults() -> Result<()> {
        let schema = SurveySchema::from_yaml_str(
            r#"
indicators:
  - name: total_responses
    measure: { kind: total }
"#,
        )?;
        assert_eq!(schema.loader, LoaderConfig::default());
        assert_eq!(schema.quality, QualityConfig::default());
        assert!(schema.consent.is_none());
        assert!(schema.breakdowns.is_empty());
        assert_eq!(schema.rubric.bins.len(), 5);
        assert_eq!(schema.indicators[0].measure, Measure::Total);
        Ok(())
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = SurveySchema::from_yaml_str("consent_column: consent\n").unwrap_err();
        assert!(format!("{:#}", err).contains("consent_column"));
    }

    #[test]
    fn numeric_measure_keys_default() -> Result<()> {
        let schema = SurveySchema::from_yaml_str(
            r#"
indicators:
  - name: budget
    measure: { kind: numeric, column: budget }
"#,
        )?;
        match &schema.indicators[0].measure {
            Measure::Numeric {
                present_key,
                absent_key,
                mean_key,
                ..
            } => {
                assert_eq!(present_key, "present");
                assert_eq!(absent_key, "absent");
                assert_eq!(mean_key, "mean");
            }
            other => panic!("unexpected measure {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn from_path_reads_file() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(b"timestamp_column: _submission_time\nloader: { delimiter: ';' }\n")?;
        let schema = SurveySchema::from_path(tmp.path())?;
        assert_eq!(schema.timestamp_column.as_deref(), Some("_submission_time"));
        assert_eq!(schema.loader.delimiter, ';');
        assert_eq!(schema.loader.min_bytes, 5);
        Ok(())
    }
}
