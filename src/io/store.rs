//! The CSV observation store.
//!
//! A store is a flat file with columns `series_id,series_name,date,value`,
//! one row per observation, sorted by `(series_id, date)`. The ingestion
//! pipeline owns it exclusively: each successful run rewrites the whole file
//! with the merged result, so a run either fully replaces the store or leaves
//! it untouched.
//!
//! Design goals:
//! - **Deterministic output**: identical input produces a byte-identical file,
//!   which makes repeated fetches idempotent.
//! - **No partial writes**: merging happens in memory; the file is only opened
//!   for writing once every series has been fetched.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;

use crate::domain::Observation;
use crate::error::AppError;

/// Read and date-parse a store file.
pub fn read_store(path: &Path) -> Result<Vec<Observation>, AppError> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| AppError::config(format!("Failed to open store '{}': {e}", path.display())))?;

    let mut out = Vec::new();
    for (idx, result) in reader.deserialize().enumerate() {
        // +2: line 1 is the header and CSV line numbers are 1-based.
        let line = idx + 2;
        let obs: Observation = result.map_err(|e| {
            AppError::config(format!(
                "Invalid row at line {line} of '{}': {e}",
                path.display()
            ))
        })?;
        out.push(obs);
    }
    Ok(out)
}

/// Read a store, treating a missing file as an empty store (first run).
pub fn read_store_or_empty(path: &Path) -> Result<Vec<Observation>, AppError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    read_store(path)
}

/// Merge freshly fetched observations into an existing store.
///
/// Deduplicates on `(series_id, date)` with the newly fetched value winning,
/// and returns the result sorted by `(series_id, date)` ascending. The
/// `BTreeMap` overlay gives both properties at once: later inserts replace
/// earlier ones, and iteration order is the sort order.
pub fn merge_observations(
    existing: Vec<Observation>,
    fetched: Vec<Observation>,
) -> Vec<Observation> {
    let mut merged: BTreeMap<(String, NaiveDate), Observation> = BTreeMap::new();
    for obs in existing.into_iter().chain(fetched) {
        merged.insert((obs.series_id.clone(), obs.date), obs);
    }
    merged.into_values().collect()
}

/// Rewrite the store file with the given observations.
///
/// Creates the parent directory on first run.
pub fn write_store(path: &Path, observations: &[Observation]) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::config(format!(
                    "Failed to create store directory '{}': {e}",
                    parent.display()
                ))
            })?;
        }
    }

    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::config(format!("Failed to create store '{}': {e}", path.display())))?;

    for obs in observations {
        writer
            .serialize(obs)
            .map_err(|e| AppError::config(format!("Failed to write store row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::config(format!("Failed to flush store '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use chrono::Datelike;

    use super::*;

    fn obs(series_id: &str, year: i32, month: u32, value: f64) -> Observation {
        Observation {
            series_id: series_id.to_string(),
            series_name: format!("{series_id} name"),
            date: NaiveDate::from_ymd_opt(year, month, 1).unwrap(),
            value,
        }
    }

    #[test]
    fn merge_is_idempotent() {
        let fetched = vec![obs("A", 2024, 1, 100.0), obs("A", 2024, 2, 105.0)];
        let once = merge_observations(Vec::new(), fetched.clone());
        let twice = merge_observations(once.clone(), fetched);
        assert_eq!(once, twice);
    }

    #[test]
    fn merge_keeps_latest_value_for_duplicate_keys() {
        let existing = vec![obs("A", 2024, 2, 105.0)];
        let fetched = vec![obs("A", 2024, 2, 106.0)];
        let merged = merge_observations(existing, fetched);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].value, 106.0);
    }

    #[test]
    fn merge_sorts_by_series_then_date() {
        let existing = vec![obs("B", 2024, 2, 1.0), obs("A", 2024, 3, 2.0)];
        let fetched = vec![obs("A", 2024, 1, 3.0), obs("B", 2023, 12, 4.0)];
        let merged = merge_observations(existing, fetched);
        let keys: Vec<(String, NaiveDate)> = merged
            .iter()
            .map(|o| (o.series_id.clone(), o.date))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn merge_overwrites_and_appends_end_to_end() {
        // Store: 2024-01=100, 2024-02=105. Fetch: 2024-02=106, 2024-03=108.
        let existing = vec![obs("X", 2024, 1, 100.0), obs("X", 2024, 2, 105.0)];
        let fetched = vec![obs("X", 2024, 2, 106.0), obs("X", 2024, 3, 108.0)];
        let merged = merge_observations(existing, fetched);
        let got: Vec<(u32, f64)> = merged.iter().map(|o| (o.date.month(), o.value)).collect();
        assert_eq!(got, vec![(1, 100.0), (2, 106.0), (3, 108.0)]);
    }

    #[test]
    fn store_round_trips_through_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labor_timeseries.csv");

        let observations = vec![obs("A", 2024, 1, 3.7), obs("B", 2024, 1, 157232.0)];
        write_store(&path, &observations).unwrap();

        let read_back = read_store(&path).unwrap();
        assert_eq!(read_back, observations);
    }

    #[test]
    fn rewriting_identical_data_is_byte_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.csv");

        let observations = vec![obs("A", 2024, 1, 3.7), obs("A", 2024, 2, 3.8)];
        write_store(&path, &observations).unwrap();
        let first = fs::read(&path).unwrap();

        let merged = merge_observations(read_store(&path).unwrap(), observations);
        write_store(&path, &merged).unwrap();
        let second = fs::read(&path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn missing_store_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        assert!(read_store_or_empty(&path).unwrap().is_empty());
    }

    #[test]
    fn write_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("store.csv");
        write_store(&path, &[obs("A", 2024, 1, 1.0)]).unwrap();
        assert!(path.exists());
    }
}
