//! Derived metrics over the observation store.
//!
//! Everything here is computed, never persisted. Percent changes are always
//! derived from the **full** store and only then filtered to a display
//! window: the change value for the first in-window month must use the value
//! of the month just before the window, not become undefined because that
//! month happens to fall outside it.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::{ChangePoint, DateWindow, Observation, SUMMARY_ORDER, lag_month};

/// Per-series percent change against the value `lag_months` earlier.
///
/// Lookups are by calendar month within the same series; a point whose lagged
/// month has no observation produces no output at all. Input order is
/// preserved, so a sorted store yields sorted changes.
pub fn percent_changes(observations: &[Observation], lag_months: u32) -> Vec<ChangePoint> {
    let mut by_series: HashMap<&str, HashMap<NaiveDate, f64>> = HashMap::new();
    for obs in observations {
        by_series
            .entry(obs.series_id.as_str())
            .or_default()
            .insert(obs.date, obs.value);
    }

    let mut out = Vec::new();
    for obs in observations {
        let Some(lagged_date) = lag_month(obs.date, lag_months) else {
            continue;
        };
        let Some(prev) = by_series
            .get(obs.series_id.as_str())
            .and_then(|values| values.get(&lagged_date))
        else {
            continue;
        };

        let pct = (obs.value / prev - 1.0) * 100.0;
        if !pct.is_finite() {
            continue;
        }
        out.push(ChangePoint {
            series_id: obs.series_id.clone(),
            series_name: obs.series_name.clone(),
            date: obs.date,
            pct,
        });
    }
    out
}

/// Month-over-month percent change.
pub fn month_over_month(observations: &[Observation]) -> Vec<ChangePoint> {
    percent_changes(observations, 1)
}

/// Year-over-year percent change (lag of exactly 12 months).
pub fn year_over_year(observations: &[Observation]) -> Vec<ChangePoint> {
    percent_changes(observations, 12)
}

/// Observations inside the closed window.
pub fn window_observations(observations: &[Observation], window: DateWindow) -> Vec<Observation> {
    observations
        .iter()
        .filter(|o| window.contains(o.date))
        .cloned()
        .collect()
}

/// Change points inside the closed window.
pub fn window_changes(changes: &[ChangePoint], window: DateWindow) -> Vec<ChangePoint> {
    changes
        .iter()
        .filter(|c| window.contains(c.date))
        .cloned()
        .collect()
}

/// Observations restricted to the given series names, preserving order.
pub fn select_series(observations: &[Observation], names: &[String]) -> Vec<Observation> {
    observations
        .iter()
        .filter(|o| names.iter().any(|n| *n == o.series_name))
        .cloned()
        .collect()
}

/// Distinct series names in order of first appearance.
///
/// The store is sorted by series id, so this order is stable across reloads.
pub fn series_names(observations: &[Observation]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for obs in observations {
        if !out.iter().any(|n| *n == obs.series_name) {
            out.push(obs.series_name.clone());
        }
    }
    out
}

/// Latest-month snapshot for the curated summary series.
///
/// The snapshot month is the maximum date of the **full** store, not of any
/// windowed subset, and rows come back in the fixed `SUMMARY_ORDER`.
pub fn latest_snapshot(observations: &[Observation]) -> Vec<Observation> {
    let Some(last_date) = observations.iter().map(|o| o.date).max() else {
        return Vec::new();
    };

    SUMMARY_ORDER
        .iter()
        .filter_map(|name| {
            observations
                .iter()
                .find(|o| o.date == last_date && o.series_name == *name)
                .cloned()
        })
        .collect()
}
