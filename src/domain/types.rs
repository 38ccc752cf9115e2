//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the metrics layer and the TUI
//! - written to / read back from the CSV store
//! - exported for spreadsheets or downstream scripts

use std::path::PathBuf;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Default location of the persisted observation store.
pub const DEFAULT_STORE_PATH: &str = "data/labor_timeseries.csv";

/// Earliest year requested from the API when no flag overrides it.
pub const DEFAULT_START_YEAR: i32 = 2010;

/// The fixed series catalog: BLS series id -> human-readable name.
///
/// The order here is the fetch order; it is deterministic so repeated runs
/// against unchanged remote data produce byte-identical stores.
pub const SERIES_CATALOG: &[(&str, &str)] = &[
    ("CES0000000001", "Total Nonfarm Employment (thousands)"),
    ("LNS14000000", "Unemployment Rate (%)"),
    ("LNS11300000", "Labor Force Participation Rate (%)"),
    ("LNS12300000", "Employment-Population Ratio (%)"),
    ("CES0500000003", "Avg Hourly Earnings, Private ($)"),
];

/// Curated display order for the latest-month summary row, keyed on
/// `series_name`. Uses the catalog's own names so every catalog series
/// actually appears in the summary.
pub const SUMMARY_ORDER: &[&str] = &[
    "Total Nonfarm Employment (thousands)",
    "Avg Hourly Earnings, Private ($)",
    "Labor Force Participation Rate (%)",
    "Employment-Population Ratio (%)",
    "Unemployment Rate (%)",
];

/// One data point: a single series value for a single calendar month.
///
/// `date` is always the first day of the month; the `(series_id, date)` pair
/// is unique within a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub series_id: String,
    pub series_name: String,
    pub date: NaiveDate,
    pub value: f64,
}

/// A closed date interval selecting which observations are displayed.
///
/// Windows only constrain presentation; derived percent changes are always
/// computed from the full store first and filtered afterwards, so a window
/// boundary never turns an in-window change value undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Window spanning whole calendar years: Jan 1 of `start_year` through
    /// Dec 31 of `end_year`.
    pub fn from_years(start_year: i32, end_year: i32) -> Option<Self> {
        let (start_year, end_year) = if start_year <= end_year {
            (start_year, end_year)
        } else {
            (end_year, start_year)
        };
        Some(Self {
            start: NaiveDate::from_ymd_opt(start_year, 1, 1)?,
            end: NaiveDate::from_ymd_opt(end_year, 12, 31)?,
        })
    }

    /// Default window for a store whose newest observation falls in
    /// `last_year`: the last three calendar years, clamped to `first_year`.
    pub fn default_for_years(first_year: i32, last_year: i32) -> Option<Self> {
        Self::from_years(first_year.max(last_year - 2), last_year)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// A derived percent-change point (month-over-month or year-over-year).
///
/// Points whose lagged counterpart does not exist are never materialized, so
/// a `ChangePoint` sequence has no placeholder entries.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangePoint {
    pub series_id: String,
    pub series_name: String,
    pub date: NaiveDate,
    /// Percent change vs. the lagged period, e.g. `10.0` for +10%.
    pub pct: f64,
}

/// Summary statistics over a loaded store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreStats {
    pub rows: usize,
    pub series_count: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

impl StoreStats {
    pub fn from_observations(observations: &[Observation]) -> Option<Self> {
        let first_date = observations.iter().map(|o| o.date).min()?;
        let last_date = observations.iter().map(|o| o.date).max()?;
        let mut ids: Vec<&str> = observations.iter().map(|o| o.series_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        Some(Self {
            rows: observations.len(),
            series_count: ids.len(),
            first_date,
            last_date,
        })
    }
}

/// Configuration for one ingestion run, derived from CLI flags plus defaults.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub store_path: PathBuf,
    pub start_year: i32,
    /// Upper bound on each API request; guards against an indefinite hang.
    pub timeout_secs: u64,
}

/// First day of the month `months` before `date`.
///
/// `date` is a month-start date, so the subtraction is exact and only fails
/// outside chrono's representable range.
pub fn lag_month(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_sub_months(Months::new(months))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn window_from_years_spans_whole_years() {
        let w = DateWindow::from_years(2022, 2024).unwrap();
        assert_eq!(w.start, NaiveDate::from_ymd_opt(2022, 1, 1).unwrap());
        assert_eq!(w.end, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert!(w.contains(d(2022, 1)));
        assert!(w.contains(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()));
        assert!(!w.contains(d(2021, 12)));
        assert!(!w.contains(d(2025, 1)));
    }

    #[test]
    fn window_from_years_swaps_reversed_bounds() {
        let w = DateWindow::from_years(2024, 2022).unwrap();
        assert_eq!(w, DateWindow::from_years(2022, 2024).unwrap());
    }

    #[test]
    fn default_window_covers_last_three_years() {
        let w = DateWindow::default_for_years(2010, 2025).unwrap();
        assert_eq!(w, DateWindow::from_years(2023, 2025).unwrap());

        // A short store clamps to its first year.
        let w = DateWindow::default_for_years(2024, 2025).unwrap();
        assert_eq!(w, DateWindow::from_years(2024, 2025).unwrap());
    }

    #[test]
    fn lag_month_crosses_year_boundaries() {
        assert_eq!(lag_month(d(2024, 1), 1), Some(d(2023, 12)));
        assert_eq!(lag_month(d(2024, 3), 12), Some(d(2023, 3)));
    }

    #[test]
    fn catalog_and_summary_order_agree() {
        for name in SUMMARY_ORDER {
            assert!(
                SERIES_CATALOG.iter().any(|(_, n)| n == name),
                "summary order references unknown series name: {name}"
            );
        }
        assert_eq!(SUMMARY_ORDER.len(), SERIES_CATALOG.len());
    }
}
