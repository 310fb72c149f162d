// src/load/clean.rs
use crate::config::ConsentRule;
use crate::load::dataset::{Dataset, RawTable};
use tracing::debug;

/// Trim whitespace (and a stray byte-order mark) from a header name.
pub fn clean_header(raw: &str) -> String {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
        .to_string()
}

/// Trim a cell; empty strings and null placeholders become `None`.
pub fn clean_cell(raw: &str, null_tokens: &[String]) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || null_tokens.iter().any(|t| t.eq_ignore_ascii_case(trimmed)) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Apply header and cell cleaning to a freshly tokenized table.
pub fn normalize(table: RawTable, null_tokens: &[String]) -> Dataset {
    let headers: Vec<String> = table.headers.iter().map(|h| clean_header(h)).collect();
    let rows = table
        .rows
        .into_iter()
        .map(|row| {
            row.iter()
                .map(|c| clean_cell(c, null_tokens))
                .collect::<Vec<_>>()
        })
        .collect();
    Dataset::new(headers, rows)
}

/// Drop rows whose consent answer is not the affirmative token. Datasets
/// without the consent column are left untouched. Returns the number dropped.
pub fn apply_consent(dataset: &mut Dataset, rule: &ConsentRule) -> usize {
    if !dataset.has_column(&rule.column) {
        debug!(column = %rule.column, "no consent column; keeping every row");
        return 0;
    }
    let affirmative = rule.affirmative.trim().to_lowercase();
    dataset.retain_rows(|row| {
        row.get(&rule.column)
            .map(|v| v.trim().to_lowercase() == affirmative)
            .unwrap_or(false)
    })
}
