//! Formatted terminal output for the CLI subcommands.

use crate::app::pipeline::DashboardData;
use crate::report::{ChangeRow, format_value};

/// Format the latest-month summary: store statistics plus the curated
/// metric row.
pub fn format_summary(data: &DashboardData) -> String {
    let mut out = String::new();

    out.push_str("=== labor - BLS Labor Dashboard ===\n");
    out.push_str(&format!("Store: {} rows | {} series\n", data.stats.rows, data.stats.series_count));
    out.push_str(&format!(
        "Coverage: {} .. {}\n",
        data.stats.first_date.format("%Y-%m"),
        data.stats.last_date.format("%Y-%m")
    ));
    out.push_str(&format!(
        "Window: {} .. {}\n",
        data.window.start.format("%Y-%m"),
        data.window.end.format("%Y-%m")
    ));

    out.push_str(&format!(
        "\nLatest month ({}):\n",
        data.stats.last_date.format("%Y-%m")
    ));
    if data.snapshot.is_empty() {
        out.push_str("  (no catalog series present in the store)\n");
    }
    for obs in &data.snapshot {
        out.push_str(&format!(
            "  {:<42} {:>10}\n",
            obs.series_name,
            format_value(obs.value)
        ));
    }

    out
}

/// Format the joined observations/changes table.
pub fn format_changes_table(rows: &[ChangeRow]) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{:<42} {:>8} {:>12} {:>8} {:>8}\n",
        "series", "month", "value", "MoM %", "YoY %"
    ));

    for row in rows {
        out.push_str(&format!(
            "{:<42} {:>8} {:>12} {:>8} {:>8}\n",
            row.series_name,
            row.date.format("%Y-%m"),
            format_value(row.value),
            fmt_pct(row.mom),
            fmt_pct(row.yoy),
        ));
    }

    out
}

/// Absent change values render as blanks, never as `0.00`.
fn fmt_pct(pct: Option<f64>) -> String {
    match pct {
        Some(p) => format!("{p:.2}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn absent_changes_render_blank() {
        let rows = vec![ChangeRow {
            series_name: "Unemployment Rate (%)".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            value: 3.7,
            mom: None,
            yoy: Some(0.5),
        }];
        let table = format_changes_table(&rows);
        let data_line = table.lines().nth(1).unwrap();
        assert!(data_line.contains("2024-01"));
        assert!(data_line.contains("0.50"));
        assert!(!data_line.contains("0.00"));
    }

    #[test]
    fn table_header_names_all_columns() {
        let table = format_changes_table(&[]);
        let header = table.lines().next().unwrap();
        for col in ["series", "month", "value", "MoM %", "YoY %"] {
            assert!(header.contains(col), "missing column {col}");
        }
    }
}
