// src/transform/timeseries.rs
use crate::load::Dataset;
use crate::transform::date_parser::{parse_day_first, parse_generic};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatePoint {
    /// `YYYY-MM-DD`
    pub date: String,
    pub count: u64,
}

type DateParser = fn(&str) -> Option<NaiveDate>;

/// Column-level parse policies, tried in order; the first that parses at
/// least one value is used for the whole column.
const STRATEGIES: &[(&str, DateParser)] = &[
    ("day-first", parse_day_first),
    ("generic", parse_generic),
];

/// Submissions per calendar day, ascending. Unparsable timestamps are left
/// out; a missing column or no parsable value gives an empty series.
pub fn build(dataset: &Dataset, column: Option<&str>) -> Vec<DatePoint> {
    let Some(column) = column else {
        return Vec::new();
    };
    let Some(col) = dataset.column(column) else {
        debug!(column, "timestamp column missing; empty series");
        return Vec::new();
    };
    let raw: Vec<&str> = col.values().collect();
    if raw.is_empty() {
        return Vec::new();
    }

    for (name, parse) in STRATEGIES {
        let dates: Vec<NaiveDate> = raw.iter().filter_map(|s| parse(*s)).collect();
        if dates.is_empty() {
            debug!(strategy = *name, "no timestamp parsed");
            continue;
        }
        if dates.len() < raw.len() {
            warn!(
                strategy = *name,
                parsed = dates.len(),
                unparsed = raw.len() - dates.len(),
                "some timestamps could not be parsed"
            );
        }
        return group_by_day(dates);
    }

    warn!(column, values = raw.len(), "no timestamp parsed under any strategy");
    Vec::new()
}

fn group_by_day(dates: Vec<NaiveDate>) -> Vec<DatePoint> {
    let mut per_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for d in dates {
        *per_day.entry(d).or_default() += 1;
    }
    per_day
        .into_iter()
        .map(|(d, count)| DatePoint {
            date: d.format("%Y-%m-%d").to_string(),
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::dataset;

    fn points(series: &[DatePoint]) -> Vec<(&str, u64)> {
        series.iter().map(|p| (p.date.as_str(), p.count)).collect()
    }

    #[test]
    fn day_first_column() {
        let ds = dataset(
            "_submission_time\n11/02/2026 10:00\n10/02/2026 09:18\n10/02/2026 17:40\ngarbage\n",
        );
        let series = build(&ds, Some("_submission_time"));
        assert_eq!(points(&series), vec![("2026-02-10", 2), ("2026-02-11", 1)]);
    }

    #[test]
    fn iso_column_falls_back_to_generic() {
        let ds = dataset(
            "t\n2026-02-12T08:00:00\n2026-02-10T09:18:22.5+00:00\n2026-02-12T23:00:00\n\n",
        );
        let series = build(&ds, Some("t"));
        assert_eq!(points(&series), vec![("2026-02-10", 1), ("2026-02-12", 2)]);
        let total: u64 = series.iter().map(|p| p.count).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn day_first_wins_for_whole_column() {
        // ISO rows are dropped once the day-first policy has parsed something.
        let ds = dataset("t\n10/02/2026\n2026-02-11\n");
        assert_eq!(points(&build(&ds, Some("t"))), vec![("2026-02-10", 1)]);
    }

    #[test]
    fn dates_strictly_ascending() {
        let ds = dataset("t\n03/01/2026\n01/01/2026\n02/01/2026\n01/01/2026\n");
        let series = build(&ds, Some("t"));
        assert!(series.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn empty_cases() {
        let ds = dataset("t,x\nnope,1\n");
        assert!(build(&ds, Some("t")).is_empty());
        assert!(build(&ds, Some("missing")).is_empty());
        assert!(build(&ds, None).is_empty());
        assert!(build(&Dataset::empty(), Some("t")).is_empty());
    }
}
