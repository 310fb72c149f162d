// src/load/encoding.rs
//! Ordered decode strategies: the first candidate encoding that decodes the
//! blob without error and yields a header with at least one named column wins.
//! Its text is tokenized leniently. When no candidate qualifies, the blob is
//! decoded as latin-1 anyway.

use crate::config::{LoaderConfig, TextEncoding};
use crate::load::dataset::RawTable;
use csv::ReaderBuilder;
use encoding_rs::{UTF_8, WINDOWS_1252};
use std::borrow::Cow;
use tracing::{debug, warn};

/// Outcome of decoding + tokenizing one blob.
#[derive(Debug)]
pub struct Decoded {
    pub encoding: TextEncoding,
    pub table: RawTable,
    /// Rows dropped because they had more fields than the header, or did not parse.
    pub skipped: usize,
    /// Short rows kept and padded with empty cells up to the header's width.
    pub padded: usize,
}

/// Decode `bytes` with the configured candidates. Never fails: the last
/// resort is latin-1, which accepts any byte sequence.
pub fn decode(bytes: &[u8], config: &LoaderConfig) -> Decoded {
    let delimiter = delimiter_byte(config.delimiter);

    for &encoding in &config.encodings {
        let Some(text) = decode_text(bytes, encoding) else {
            debug!(encoding = encoding.label(), "text decode rejected");
            continue;
        };
        match tokenize(&text, delimiter) {
            Some(tokenized) => {
                debug!(
                    encoding = encoding.label(),
                    columns = tokenized.table.headers.len(),
                    rows = tokenized.table.rows.len(),
                    skipped = tokenized.skipped,
                    padded = tokenized.padded,
                    "decode accepted"
                );
                return tokenized.into_decoded(encoding);
            }
            None => debug!(encoding = encoding.label(), "no readable header"),
        }
    }

    let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    let tokenized = tokenize(&text, delimiter).unwrap_or_default();
    warn!(
        skipped = tokenized.skipped,
        rows = tokenized.table.rows.len(),
        "no candidate encoding accepted; fell back to latin-1"
    );
    tokenized.into_decoded(TextEncoding::Latin1)
}

fn decode_text(bytes: &[u8], encoding: TextEncoding) -> Option<Cow<'_, str>> {
    match encoding {
        TextEncoding::Utf8 => UTF_8.decode_without_bom_handling_and_without_replacement(bytes),
        TextEncoding::Utf8Sig => {
            let (text, had_errors) = UTF_8.decode_with_bom_removal(bytes);
            (!had_errors).then_some(text)
        }
        TextEncoding::Latin1 => Some(WINDOWS_1252.decode_without_bom_handling(bytes).0),
    }
}

fn delimiter_byte(c: char) -> u8 {
    if c.is_ascii() {
        c as u8
    } else {
        warn!(delimiter = %c, "non-ASCII delimiter unsupported; using ','");
        b','
    }
}

fn has_named_column(headers: &[String]) -> bool {
    headers.iter().any(|h| !h.trim().is_empty())
}

#[derive(Debug, Default)]
struct Tokenized {
    table: RawTable,
    skipped: usize,
    padded: usize,
}

impl Tokenized {
    fn into_decoded(self, encoding: TextEncoding) -> Decoded {
        Decoded {
            encoding,
            table: self.table,
            skipped: self.skipped,
            padded: self.padded,
        }
    }
}

/// Tokenize with a flexible reader: short rows are padded with empty cells,
/// longer or unparsable rows are skipped and counted. `None` when the header
/// row is unreadable or has no named column.
fn tokenize(text: &str, delimiter: u8) -> Option<Tokenized> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match rdr.headers() {
        Ok(h) => h.iter().map(str::to_string).collect(),
        Err(e) => {
            debug!(error = %e, "header row unreadable");
            return None;
        }
    };
    if !has_named_column(&headers) {
        return None;
    }

    let width = headers.len();
    let mut out = Tokenized::default();
    for (idx, record) in rdr.records().enumerate() {
        match record {
            Ok(r) if r.len() > width => {
                debug!(record = idx, fields = r.len(), expected = width, "skipping long row");
                out.skipped += 1;
            }
            Ok(r) => {
                let mut row: Vec<String> = r.iter().map(str::to_string).collect();
                if row.len() < width {
                    out.padded += 1;
                    row.resize(width, String::new());
                }
                out.table.rows.push(row);
            }
            Err(e) => {
                debug!(record = idx, error = %e, "skipping unparsable row");
                out.skipped += 1;
            }
        }
    }
    out.table.headers = headers;
    Some(out)
}
