// src/transform/date_parser.rs
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const DAY_FIRST_DATETIME: &[&str] = &["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"];
const DAY_FIRST_DATE: &[&str] = &["%d/%m/%Y"];

const GENERIC_OFFSET: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%z"];
const GENERIC_NAIVE: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const GENERIC_DATE: &[&str] = &["%Y-%m-%d"];

/// Locale export format, e.g. `"10/02/2026 09:18"` → 2026-02-10.
pub fn parse_day_first(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    naive_date(s, DAY_FIRST_DATETIME, DAY_FIRST_DATE)
}

/// ISO-8601 / RFC 3339. Instants carrying an offset are moved to UTC before
/// the calendar date is taken; naive instants are read as UTC.
pub fn parse_generic(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    for fmt in GENERIC_OFFSET {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc).date_naive());
        }
    }
    naive_date(s, GENERIC_NAIVE, GENERIC_DATE)
}

fn naive_date(s: &str, datetime_formats: &[&str], date_formats: &[&str]) -> Option<NaiveDate> {
    datetime_formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            date_formats
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        })
}
