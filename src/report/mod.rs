//! Reporting utilities: display rows and formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline/metrics code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::{ChangePoint, Observation};

pub mod format;

pub use format::*;

/// One row of the changes table: an observation joined with its derived
/// change values. Absent changes stay absent (`None`), they are never
/// rendered as zero.
#[derive(Debug, Clone)]
pub struct ChangeRow {
    pub series_name: String,
    pub date: NaiveDate,
    pub value: f64,
    pub mom: Option<f64>,
    pub yoy: Option<f64>,
}

/// Join windowed observations with their change points.
///
/// Rows are ordered by `(series_name, date)` — the display order of the
/// original data table.
pub fn change_rows(
    windowed: &[Observation],
    mom: &[ChangePoint],
    yoy: &[ChangePoint],
) -> Vec<ChangeRow> {
    let mom_by_key: HashMap<(&str, NaiveDate), f64> = mom
        .iter()
        .map(|c| ((c.series_id.as_str(), c.date), c.pct))
        .collect();
    let yoy_by_key: HashMap<(&str, NaiveDate), f64> = yoy
        .iter()
        .map(|c| ((c.series_id.as_str(), c.date), c.pct))
        .collect();

    let mut rows: Vec<ChangeRow> = windowed
        .iter()
        .map(|obs| ChangeRow {
            series_name: obs.series_name.clone(),
            date: obs.date,
            value: obs.value,
            mom: mom_by_key.get(&(obs.series_id.as_str(), obs.date)).copied(),
            yoy: yoy_by_key.get(&(obs.series_id.as_str(), obs.date)).copied(),
        })
        .collect();

    rows.sort_by(|a, b| (a.series_name.as_str(), a.date).cmp(&(b.series_name.as_str(), b.date)));
    rows
}

/// Format a metric value the way the summary header does: one decimal for
/// rates and small magnitudes, none for large counts.
pub fn format_value(value: f64) -> String {
    if value.abs() < 1000.0 {
        format!("{value:.1}")
    } else {
        format!("{value:.0}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(series_id: &str, name: &str, year: i32, month: u32, value: f64) -> Observation {
        Observation {
            series_id: series_id.to_string(),
            series_name: name.to_string(),
            date: NaiveDate::from_ymd_opt(year, month, 1).unwrap(),
            value,
        }
    }

    #[test]
    fn change_rows_join_on_series_and_date() {
        let windowed = vec![
            obs("A", "Alpha", 2024, 1, 100.0),
            obs("A", "Alpha", 2024, 2, 110.0),
        ];
        let mom = vec![ChangePoint {
            series_id: "A".to_string(),
            series_name: "Alpha".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            pct: 10.0,
        }];

        let rows = change_rows(&windowed, &mom, &[]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].mom, None);
        assert_eq!(rows[1].mom, Some(10.0));
        assert_eq!(rows[1].yoy, None);
    }

    #[test]
    fn change_rows_sort_by_name_then_date() {
        let windowed = vec![
            obs("B", "Beta", 2024, 1, 1.0),
            obs("A", "Alpha", 2024, 2, 2.0),
            obs("A", "Alpha", 2024, 1, 3.0),
        ];
        let rows = change_rows(&windowed, &[], &[]);
        let order: Vec<(String, u32)> = rows
            .iter()
            .map(|r| (r.series_name.clone(), chrono::Datelike::month(&r.date)))
            .collect();
        assert_eq!(
            order,
            vec![
                ("Alpha".to_string(), 1),
                ("Alpha".to_string(), 2),
                ("Beta".to_string(), 1)
            ]
        );
    }

    #[test]
    fn value_formatting_switches_at_one_thousand() {
        assert_eq!(format_value(3.65), "3.6");
        assert_eq!(format_value(62.3), "62.3");
        assert_eq!(format_value(157232.0), "157232");
        assert_eq!(format_value(999.94), "999.9");
    }
}
