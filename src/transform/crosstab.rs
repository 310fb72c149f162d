// src/transform/crosstab.rs
use crate::config::CrosstabSpec;
use crate::load::Dataset;
use crate::transform::Keyed;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Contingency table of two categorical columns. Row and column labels are
/// in order of first appearance among rows that answered both questions;
/// `counts[r][c]` is the number of such rows with labels `rows[r]`, `cols[c]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Crosstab {
    pub row_field: String,
    pub col_field: String,
    pub rows: Vec<String>,
    pub cols: Vec<String>,
    pub counts: Vec<Vec<u64>>,
}

pub fn build_all(dataset: &Dataset, specs: &[CrosstabSpec]) -> Keyed<Crosstab> {
    let mut out = Keyed::default();
    for spec in specs {
        out.push(spec.name.clone(), build(dataset, &spec.rows, &spec.cols));
    }
    out
}

pub fn build(dataset: &Dataset, row_field: &str, col_field: &str) -> Crosstab {
    let mut table = Crosstab {
        row_field: row_field.to_string(),
        col_field: col_field.to_string(),
        rows: Vec::new(),
        cols: Vec::new(),
        counts: Vec::new(),
    };
    if !dataset.has_column(row_field) || !dataset.has_column(col_field) {
        debug!(row_field, col_field, "crosstab column missing; empty table");
        return table;
    }

    let mut row_index: HashMap<&str, usize> = HashMap::new();
    let mut col_index: HashMap<&str, usize> = HashMap::new();
    let mut cells: Vec<(usize, usize)> = Vec::new();
    for row in dataset.rows() {
        let (Some(r), Some(c)) = (row.get(row_field), row.get(col_field)) else {
            continue;
        };
        let ri = *row_index.entry(r).or_insert_with(|| {
            table.rows.push(r.to_string());
            table.rows.len() - 1
        });
        let ci = *col_index.entry(c).or_insert_with(|| {
            table.cols.push(c.to_string());
            table.cols.len() - 1
        });
        cells.push((ri, ci));
    }

    table.counts = vec![vec![0; table.cols.len()]; table.rows.len()];
    for (r, c) in cells {
        table.counts[r][c] += 1;
    }
    table
}
