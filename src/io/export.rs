//! Export the current windowed view to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts: one row per windowed observation with its derived change values
//! alongside. Cells for undefined changes are left empty.

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;

use crate::domain::{ChangePoint, Observation};
use crate::error::AppError;

/// Write windowed observations plus MoM/YoY columns to a CSV file.
pub fn write_window_csv(
    path: &Path,
    windowed: &[Observation],
    mom: &[ChangePoint],
    yoy: &[ChangePoint],
) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::config(format!(
            "Failed to create export CSV '{}': {e}",
            path.display()
        ))
    })?;

    writeln!(file, "series_id,series_name,date,value,mom_pct,yoy_pct")
        .map_err(|e| AppError::config(format!("Failed to write export CSV header: {e}")))?;

    let mom_by_key = change_lookup(mom);
    let yoy_by_key = change_lookup(yoy);

    for obs in windowed {
        let key = (obs.series_id.as_str(), obs.date);
        writeln!(
            file,
            "{},{},{},{},{},{}",
            obs.series_id,
            csv_quote(&obs.series_name),
            obs.date,
            obs.value,
            fmt_opt(mom_by_key.get(&key).copied()),
            fmt_opt(yoy_by_key.get(&key).copied()),
        )
        .map_err(|e| AppError::config(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

fn change_lookup(changes: &[ChangePoint]) -> HashMap<(&str, NaiveDate), f64> {
    changes
        .iter()
        .map(|c| ((c.series_id.as_str(), c.date), c.pct))
        .collect()
}

fn fmt_opt(pct: Option<f64>) -> String {
    pct.map(|p| format!("{p:.6}")).unwrap_or_default()
}

/// Series names contain commas and parentheses; quote them.
fn csv_quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_quotes_names_and_leaves_undefined_changes_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("window.csv");

        let windowed = vec![Observation {
            series_id: "CES0500000003".to_string(),
            series_name: "Avg Hourly Earnings, Private ($)".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            value: 34.5,
        }];

        write_window_csv(&path, &windowed, &[], &[]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();

        assert_eq!(
            lines.next().unwrap(),
            "series_id,series_name,date,value,mom_pct,yoy_pct"
        );
        assert_eq!(
            lines.next().unwrap(),
            "CES0500000003,\"Avg Hourly Earnings, Private ($)\",2024-01-01,34.5,,"
        );
    }

    #[test]
    fn export_includes_change_values_when_defined() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("window.csv");

        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let windowed = vec![Observation {
            series_id: "A".to_string(),
            series_name: "Alpha".to_string(),
            date,
            value: 110.0,
        }];
        let mom = vec![ChangePoint {
            series_id: "A".to_string(),
            series_name: "Alpha".to_string(),
            date,
            pct: 10.0,
        }];

        write_window_csv(&path, &windowed, &mom, &[]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.lines().nth(1).unwrap().contains("10.000000"));
    }
}
