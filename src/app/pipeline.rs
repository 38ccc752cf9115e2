//! Shared ingestion/metrics pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch -> merge -> persist, and load -> derive changes -> window -> snapshot.
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::path::Path;

use chrono::Datelike;

use crate::data::BlsClient;
use crate::domain::{
    ChangePoint, DateWindow, FetchConfig, Observation, SERIES_CATALOG, StoreStats,
};
use crate::error::AppError;
use crate::io::store;
use crate::metrics;

/// Result of one ingestion run.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// The merged, deduplicated, sorted store as persisted.
    pub observations: Vec<Observation>,
    pub fetched_rows: usize,
    pub existing_rows: usize,
}

/// Fetch every catalog series, merge with the existing store, and persist.
///
/// Any failure — transport error, non-2xx status, or a failure status in a
/// response body — aborts before the store file is touched, so a run either
/// fully replaces the store or leaves it unchanged. `progress` receives one
/// message per series (printed by the CLI, shown as status by the TUI).
pub fn run_fetch(
    config: &FetchConfig,
    mut progress: impl FnMut(&str),
) -> Result<FetchOutcome, AppError> {
    let client = BlsClient::from_env(config.timeout_secs)?;
    let end_year = chrono::Utc::now().date_naive().year();

    let mut fetched: Vec<Observation> = Vec::new();
    for (series_id, series_name) in SERIES_CATALOG {
        progress(&format!("Fetching {series_id} ..."));
        let rows = client.fetch_series(series_id, series_name, config.start_year, end_year)?;
        fetched.extend(rows);
    }

    let existing = store::read_store_or_empty(&config.store_path)?;
    let existing_rows = existing.len();
    let fetched_rows = fetched.len();

    let merged = store::merge_observations(existing, fetched);
    store::write_store(&config.store_path, &merged)?;

    Ok(FetchOutcome {
        observations: merged,
        fetched_rows,
        existing_rows,
    })
}

/// Everything the presentation layer needs for one window selection.
#[derive(Debug, Clone)]
pub struct DashboardData {
    /// The full store (read-only from here on).
    pub store: Vec<Observation>,
    pub stats: StoreStats,
    pub window: DateWindow,
    /// Observations inside the window, for direct display.
    pub windowed: Vec<Observation>,
    /// Month-over-month changes, full-set-derived then windowed.
    pub mom: Vec<ChangePoint>,
    /// Year-over-year changes, full-set-derived then windowed.
    pub yoy: Vec<ChangePoint>,
    /// Latest-month metrics in curated order (always from the full store).
    pub snapshot: Vec<Observation>,
}

/// Derive all windowed views from an already-loaded store.
///
/// Percent changes are computed over the full store before the window filter
/// is applied, so re-windowing never alters an in-window change value.
pub fn compute_views(
    observations: Vec<Observation>,
    window: Option<DateWindow>,
) -> Result<DashboardData, AppError> {
    let stats = StoreStats::from_observations(&observations)
        .ok_or_else(|| AppError::no_data("The store is empty. Run `labor fetch` first."))?;

    let window = match window {
        Some(w) => w,
        None => DateWindow::default_for_years(stats.first_date.year(), stats.last_date.year())
            .ok_or_else(|| AppError::config("Store dates are outside the supported range."))?,
    };

    let mom = metrics::window_changes(&metrics::month_over_month(&observations), window);
    let yoy = metrics::window_changes(&metrics::year_over_year(&observations), window);
    let windowed = metrics::window_observations(&observations, window);
    let snapshot = metrics::latest_snapshot(&observations);

    Ok(DashboardData {
        store: observations,
        stats,
        window,
        windowed,
        mom,
        yoy,
        snapshot,
    })
}

/// Load the store from disk and derive all views.
///
/// This is the explicit load-once-per-session entry point: callers hold the
/// returned value and pass it on; refreshing means calling this again.
pub fn load_dashboard(
    store_path: &Path,
    window: Option<DateWindow>,
) -> Result<DashboardData, AppError> {
    let observations = store::read_store_or_empty(store_path)?;
    compute_views(observations, window)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn series(series_id: &str, name: &str, start_year: i32, values: &[f64]) -> Vec<Observation> {
        let mut date = NaiveDate::from_ymd_opt(start_year, 1, 1).unwrap();
        let mut out = Vec::new();
        for &value in values {
            out.push(Observation {
                series_id: series_id.to_string(),
                series_name: name.to_string(),
                date,
                value,
            });
            date = date.checked_add_months(chrono::Months::new(1)).unwrap();
        }
        out
    }

    #[test]
    fn views_window_changes_after_full_set_derivation() {
        // 2023 + 2024 data, windowed to 2024: January's MoM change must exist
        // because December 2023 is in the full store.
        let values: Vec<f64> = (0..24).map(|i| 100.0 + i as f64).collect();
        let store = series("A", "A name", 2023, &values);

        let window = DateWindow::from_years(2024, 2024).unwrap();
        let data = compute_views(store, Some(window)).unwrap();

        assert_eq!(data.windowed.len(), 12);
        assert_eq!(data.mom.len(), 12);
        assert_eq!(
            data.mom[0].date,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(data.yoy.len(), 12);
    }

    #[test]
    fn views_default_window_is_last_three_years() {
        let values: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let store = series("A", "A name", 2020, &values);

        let data = compute_views(store, None).unwrap();
        assert_eq!(data.window, DateWindow::from_years(2022, 2024).unwrap());
    }

    #[test]
    fn views_reject_an_empty_store() {
        let err = compute_views(Vec::new(), None).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn snapshot_ignores_the_window() {
        // Window excludes the latest month; the snapshot must still use it.
        let store = series(
            "LNS14000000",
            "Unemployment Rate (%)",
            2024,
            &[4.0, 4.1, 4.2],
        );
        let window = DateWindow::from_years(2023, 2023).unwrap();
        let data = compute_views(store, Some(window)).unwrap();

        assert!(data.windowed.is_empty());
        assert_eq!(data.snapshot.len(), 1);
        assert_eq!(
            data.snapshot[0].date,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }
}
