// src/output/mod.rs
use crate::transform::Artifacts;
use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::debug;

pub const INDICATORS_FILE: &str = "indicators.json";
pub const BREAKDOWNS_FILE: &str = "breakdowns.json";
pub const TIMESERIES_FILE: &str = "timeseries.json";
pub const UNITS_FILE: &str = "units.json";
pub const CROSSTABS_FILE: &str = "crosstabs.json";
pub const QUALITY_FILE: &str = "quality.json";

/// Write every artifact under `dir`, creating it if needed. Returns the paths written.
pub fn write_all<P: AsRef<Path>>(artifacts: &Artifacts, dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    Ok(vec![
        write_json(dir.join(INDICATORS_FILE), &artifacts.indicators)?,
        write_json(dir.join(BREAKDOWNS_FILE), &artifacts.breakdowns)?,
        write_json(dir.join(TIMESERIES_FILE), &artifacts.timeseries)?,
        write_json(dir.join(UNITS_FILE), &artifacts.units)?,
        write_json(dir.join(CROSSTABS_FILE), &artifacts.crosstabs)?,
        write_json(dir.join(QUALITY_FILE), &artifacts.quality)?,
    ])
}

/// Pretty-print `value` to `path` with a trailing newline.
///
/// Written to a hidden sibling first and renamed over the target, so a
/// reader never sees a half-written file.
pub fn write_json<T: Serialize + ?Sized>(path: PathBuf, value: &T) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "artifact.json".to_string());
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    {
        let file = fs::File::create(&tmp_path)
            .with_context(|| format!("creating {}", tmp_path.display()))?;
        let mut w = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut w, value)
            .with_context(|| format!("serializing {}", file_name))?;
        w.write_all(b"\n")?;
        w.flush()
            .with_context(|| format!("flushing {}", tmp_path.display()))?;
    }

    fs::rename(&tmp_path, &path)
        .with_context(|| format!("renaming {} -> {}", tmp_path.display(), path.display()))?;
    debug!(path = %path.display(), "wrote artifact");
    Ok(path)
}
