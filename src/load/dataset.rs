// src/load/dataset.rs
use std::collections::HashMap;

/// Tokenized CSV before any cleaning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Column names exactly as the header row spells them.
    pub headers: Vec<String>,
    /// Each data row, one string per header.
    pub rows: Vec<Vec<String>>,
}

/// Cleaned rows × named columns. Absent answers are `None`, never `""`.
///
/// Duplicate column names are kept in `headers`; lookups by name resolve to
/// the first occurrence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
    index: HashMap<String, usize>,
}

impl Dataset {
    /// Rows shorter or longer than `headers` are padded with `None` or cut.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let mut index = HashMap::with_capacity(headers.len());
        for (i, name) in headers.iter().enumerate() {
            index.entry(name.clone()).or_insert(i);
        }
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut r| {
                r.resize(width, None);
                r
            })
            .collect();
        Self {
            headers,
            rows,
            index,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// `None` when the export has no such column.
    pub fn column(&self, name: &str) -> Option<Column<'_>> {
        self.index.get(name).map(|&index| Column {
            name: &self.headers[index],
            index,
            rows: &self.rows,
        })
    }

    /// Every column, in header order, duplicates included.
    pub fn columns(&self) -> impl Iterator<Item = Column<'_>> + '_ {
        self.headers.iter().enumerate().map(move |(index, name)| Column {
            name,
            index,
            rows: &self.rows,
        })
    }

    /// Columns named `<prefix><suffix>`, paired with their non-empty suffix.
    pub fn columns_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, Column<'a>)> + 'a {
        self.columns().filter_map(move |col| {
            col.name()
                .strip_prefix(prefix)
                .filter(|suffix| !suffix.is_empty())
                .map(|suffix| (suffix, col))
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        self.rows.iter().map(move |cells| Row {
            dataset: self,
            cells,
        })
    }

    /// Keep only the rows for which `keep` returns true. Returns how many were dropped.
    pub fn retain_rows<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(Row<'_>) -> bool,
    {
        let before = self.rows.len();
        let rows = std::mem::take(&mut self.rows);
        let kept: Vec<_> = {
            let this: &Dataset = self;
            rows.into_iter()
                .filter(|cells| {
                    keep(Row {
                        dataset: this,
                        cells,
                    })
                })
                .collect()
        };
        self.rows = kept;
        before - self.rows.len()
    }
}

/// Read-only view of one column.
#[derive(Debug, Clone, Copy)]
pub struct Column<'a> {
    name: &'a str,
    index: usize,
    rows: &'a [Vec<Option<String>>],
}

impl<'a> Column<'a> {
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// One entry per row, `None` for an absent answer.
    pub fn cells(&self) -> impl Iterator<Item = Option<&'a str>> + 'a {
        let index = self.index;
        self.rows
            .iter()
            .map(move |r| r.get(index).and_then(|c| c.as_deref()))
    }

    /// Present answers only.
    pub fn values(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.cells().flatten()
    }
}

/// Read-only view of one row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    dataset: &'a Dataset,
    cells: &'a [Option<String>],
}

impl<'a> Row<'a> {
    /// `None` when the column is missing from the export or the answer is absent.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let index = *self.dataset.index.get(column)?;
        self.cells.get(index).and_then(|c| c.as_deref())
    }
}
