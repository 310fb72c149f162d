// src/pipeline.rs
use crate::config::{SurveySchema, TextEncoding};
use crate::{load, output, transform};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// One-line account of a run, logged at the end and returned to the caller.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub csv_exists: bool,
    pub csv_bytes: usize,
    pub encoding: Option<TextEncoding>,
    pub rows: usize,
    pub indicator_keys: Vec<String>,
    pub breakdown_keys: Vec<String>,
    pub timeseries_points: usize,
    pub files: Vec<PathBuf>,
}

/// Read `input`, build every artifact and write them under `out_dir`.
///
/// A missing input file is an empty export. Only I/O on the paths themselves
/// (input is a directory, output not writable) fails the run.
#[instrument(level = "info", skip_all, fields(input = %input.display(), out_dir = %out_dir.display()))]
pub fn run(input: &Path, out_dir: &Path, schema: &SurveySchema) -> Result<RunSummary> {
    let blob = load::read_input(input)?;
    let csv_exists = blob.is_some();
    let bytes = blob.unwrap_or_default();

    let loaded = load::load_bytes(&bytes, schema);
    let artifacts = transform::build(&loaded.dataset, &loaded.report, schema);
    let files = output::write_all(&artifacts, out_dir)?;

    let summary = RunSummary {
        csv_exists,
        csv_bytes: bytes.len(),
        encoding: loaded.report.encoding,
        rows: loaded.dataset.len(),
        indicator_keys: artifacts.indicators.0.iter().map(|(k, _)| k.clone()).collect(),
        breakdown_keys: artifacts.breakdowns.0.iter().map(|(k, _)| k.clone()).collect(),
        timeseries_points: artifacts.timeseries.len(),
        files,
    };
    info!(
        csv_exists,
        csv_bytes = summary.csv_bytes,
        encoding = summary.encoding.map(TextEncoding::label).unwrap_or("none"),
        rows = summary.rows,
        indicators = summary.indicator_keys.len(),
        breakdowns = summary.breakdown_keys.len(),
        timeseries_points = summary.timeseries_points,
        "run complete"
    );
    Ok(summary)
}
