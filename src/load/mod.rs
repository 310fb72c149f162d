// src/load/mod.rs
//! Loader: untrusted byte blob → cleaned [`Dataset`].
//!
//! Nothing in here fails on bad content. A blob that is too small, looks like
//! an HTML page, or cannot be tokenized degrades to an empty dataset and the
//! [`LoadReport`] says why.

pub mod clean;
pub mod dataset;
pub mod encoding;

use crate::config::{LoaderConfig, SurveySchema, TextEncoding};
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::{fs, io, path::Path};
use tracing::{info, instrument, warn};

pub use dataset::{Column, Dataset, RawTable, Row};

/// Why a blob was treated as "no data" before decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    TooSmall,
    Markup,
}

/// What the loader did with the blob.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub bytes: usize,
    /// Encoding that produced the table; `None` when the guard rejected the blob.
    pub encoding: Option<TextEncoding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected: Option<Rejection>,
    pub rows_read: usize,
    /// Rows with more fields than the header, or that did not parse.
    pub rows_skipped: usize,
    /// Short rows kept with empty cells filled in.
    pub rows_padded: usize,
    pub rows_dropped_consent: usize,
    pub rows: usize,
    pub columns: usize,
}

#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub dataset: Dataset,
    pub report: LoadReport,
}

/// Read the input file. A missing file is `Ok(None)`; a directory or an
/// unreadable path is an error.
pub fn read_input<P: AsRef<Path>>(path: P) -> Result<Option<Vec<u8>>> {
    let path = path.as_ref();
    match fs::metadata(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "input file missing; treating as empty export");
            Ok(None)
        }
        Err(e) => Err(e).with_context(|| format!("inspecting input {}", path.display())),
        Ok(meta) if meta.is_dir() => bail!("input {} is a directory", path.display()),
        Ok(_) => {
            let bytes =
                fs::read(path).with_context(|| format!("reading input {}", path.display()))?;
            Ok(Some(bytes))
        }
    }
}

/// Size and markup guard applied before any decoding.
pub fn screen(bytes: &[u8], config: &LoaderConfig) -> Option<Rejection> {
    if bytes.len() < config.min_bytes {
        return Some(Rejection::TooSmall);
    }
    let head = &bytes[..bytes.len().min(config.sniff_bytes)];
    let head = String::from_utf8_lossy(head).to_lowercase();
    if config
        .markup_markers
        .iter()
        .any(|m| head.contains(&m.to_lowercase()))
    {
        return Some(Rejection::Markup);
    }
    None
}

/// Turn a blob into a cleaned, consent-filtered dataset.
#[instrument(level = "info", skip_all, fields(bytes = bytes.len()))]
pub fn load_bytes(bytes: &[u8], schema: &SurveySchema) -> LoadOutcome {
    let mut report = LoadReport {
        bytes: bytes.len(),
        ..LoadReport::default()
    };

    if let Some(rejection) = screen(bytes, &schema.loader) {
        warn!(?rejection, "input is not tabular data; producing empty dataset");
        report.rejected = Some(rejection);
        return LoadOutcome {
            dataset: Dataset::empty(),
            report,
        };
    }

    let decoded = encoding::decode(bytes, &schema.loader);
    report.encoding = Some(decoded.encoding);
    report.rows_read = decoded.table.rows.len();
    report.rows_skipped = decoded.skipped;
    report.rows_padded = decoded.padded;

    let mut dataset = clean::normalize(decoded.table, &schema.loader.null_tokens);
    if let Some(rule) = &schema.consent {
        report.rows_dropped_consent = clean::apply_consent(&mut dataset, rule);
    }
    report.rows = dataset.len();
    report.columns = dataset.headers().len();

    info!(
        encoding = decoded.encoding.label(),
        rows_read = report.rows_read,
        rows_skipped = report.rows_skipped,
        rows_padded = report.rows_padded,
        rows_dropped_consent = report.rows_dropped_consent,
        rows = report.rows,
        columns = report.columns,
        "loaded export"
    );

    LoadOutcome { dataset, report }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn tiny_blob_is_empty() {
        let out = load_bytes(b"a,b", &SurveySchema::default());
        assert!(out.dataset.is_empty());
        assert_eq!(out.report.rejected, Some(Rejection::TooSmall));
        assert_eq!(out.report.encoding, None);
    }

    #[test]
    fn empty_blob_is_empty() {
        let out = load_bytes(b"", &SurveySchema::default());
        assert!(out.dataset.is_empty());
        assert!(out.dataset.headers().is_empty());
    }

    #[test]
    fn html_page_is_empty() {
        let page = b"<!DOCTYPE html>\n<html><body>Sign in</body></html>";
        let out = load_bytes(page, &SurveySchema::default());
        assert!(out.dataset.is_empty());
        assert_eq!(out.report.rejected, Some(Rejection::Markup));
    }

    #[test]
    fn consent_filter_applies() {
        let csv = "consent,sexe\noui,feminin\noui,feminin\noui,feminin\noui,masculin\noui,masculin\nnon,feminin\n";
        let out = load_bytes(csv.as_bytes(), &SurveySchema::default());
        assert_eq!(out.report.rows_read, 6);
        assert_eq!(out.report.rows_dropped_consent, 1);
        assert_eq!(out.dataset.len(), 5);
    }

    #[test]
    fn short_utf8_row_is_kept_with_labels_intact() {
        let csv = "consent,ministere,sexe\noui,Santé,feminin\noui,Santé\noui,Éducation,masculin\n";
        let out = load_bytes(csv.as_bytes(), &SurveySchema::default());
        assert_eq!(out.report.encoding, Some(TextEncoding::Utf8));
        assert_eq!(out.report.rows_padded, 1);
        assert_eq!(out.report.rows_skipped, 0);
        assert_eq!(out.dataset.len(), 3);
        let ministries: Vec<_> = out.dataset.column("ministere").unwrap().values().collect();
        assert_eq!(ministries, vec!["Santé", "Santé", "Éducation"]);
        assert_eq!(out.dataset.rows().nth(1).unwrap().get("sexe"), None);
    }

    #[test]
    fn read_input_missing_is_none() -> Result<()> {
        let dir = tempdir()?;
        assert!(read_input(dir.path().join("nope.csv"))?.is_none());
        Ok(())
    }

    #[test]
    fn read_input_directory_is_error() -> Result<()> {
        let dir = tempdir()?;
        assert!(read_input(dir.path()).is_err());
        Ok(())
    }

    #[test]
    fn read_input_returns_bytes() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("in.csv");
        fs::write(&path, b"a,b\n1,2\n")?;
        assert_eq!(read_input(&path)?, Some(b"a,b\n1,2\n".to_vec()));
        Ok(())
    }
}
