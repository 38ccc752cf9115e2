//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Each series gets its own glyph; values between observations are linearly
//! interpolated per column so monthly data reads as a line, not a scatter.

use chrono::{Datelike, NaiveDate};

/// One named line on the chart.
pub struct AsciiSeries<'a> {
    pub name: &'a str,
    pub points: &'a [(NaiveDate, f64)],
}

/// Glyphs assigned to series in order (wrapping around past six).
const SERIES_GLYPHS: &[char] = &['o', 'x', '+', '*', '#', '@'];

/// Render the chart with a range header and a per-series legend.
pub fn render_ascii_chart(
    series: &[AsciiSeries],
    width: usize,
    height: usize,
    y_label: &str,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let drawable: Vec<&AsciiSeries> = series.iter().filter(|s| !s.points.is_empty()).collect();
    if drawable.is_empty() {
        return "No data to plot.\n".to_string();
    }

    let (x_min, x_max) = date_range(&drawable);
    let (y_min, y_max) = value_range(&drawable);
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let x0 = x_min.num_days_from_ce() as f64;
    let mut x1 = x_max.num_days_from_ce() as f64;
    if x1 <= x0 {
        // Single-month window: widen so the point lands on a real column.
        x1 = x0 + 1.0;
    }

    let mut grid = vec![vec![' '; width]; height];
    for (idx, s) in drawable.iter().enumerate() {
        let glyph = SERIES_GLYPHS[idx % SERIES_GLYPHS.len()];
        draw_series(&mut grid, s.points, glyph, x0, x1, y_min, y_max);
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {} .. {} | y=[{y_min:.2}, {y_max:.2}] {y_label}\n",
        x_min.format("%Y-%m"),
        x_max.format("%Y-%m")
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    for (idx, s) in drawable.iter().enumerate() {
        let glyph = SERIES_GLYPHS[idx % SERIES_GLYPHS.len()];
        out.push_str(&format!("  {glyph} {}\n", s.name));
    }

    out
}

/// Draw one series by sampling every column inside its own date span.
fn draw_series(
    grid: &mut [Vec<char>],
    points: &[(NaiveDate, f64)],
    glyph: char,
    x0: f64,
    x1: f64,
    y_min: f64,
    y_max: f64,
) {
    let height = grid.len();
    let width = grid[0].len();

    let mut sorted: Vec<(f64, f64)> = points
        .iter()
        .map(|&(d, v)| (d.num_days_from_ce() as f64, v))
        .collect();
    sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let first_x = sorted[0].0;
    let last_x = sorted[sorted.len() - 1].0;

    for col in 0..width {
        let x = x0 + (col as f64 / (width - 1).max(1) as f64) * (x1 - x0);
        if x < first_x || x > last_x {
            continue;
        }
        let Some(y) = interpolate(&sorted, x) else {
            continue;
        };
        if !y.is_finite() {
            continue;
        }
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = glyph;
    }
}

/// Linear interpolation between the bracketing observations.
fn interpolate(sorted: &[(f64, f64)], x: f64) -> Option<f64> {
    if sorted.len() == 1 {
        return Some(sorted[0].1);
    }
    let idx = sorted.partition_point(|&(px, _)| px <= x);
    if idx == 0 {
        return Some(sorted[0].1);
    }
    if idx >= sorted.len() {
        return Some(sorted[sorted.len() - 1].1);
    }
    let (xa, ya) = sorted[idx - 1];
    let (xb, yb) = sorted[idx];
    if xb <= xa {
        return Some(ya);
    }
    let t = (x - xa) / (xb - xa);
    Some(ya + t * (yb - ya))
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let clamped = y.clamp(y_min, y_max);
    let frac = (clamped - y_min) / (y_max - y_min);
    let row = ((1.0 - frac) * (height - 1) as f64).round() as usize;
    row.min(height - 1)
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    if !(min.is_finite() && max.is_finite()) {
        return (0.0, 1.0);
    }
    if (max - min).abs() < f64::EPSILON {
        return (min - 1.0, max + 1.0);
    }
    let pad = (max - min) * frac;
    (min - pad, max + pad)
}

fn date_range(series: &[&AsciiSeries]) -> (NaiveDate, NaiveDate) {
    let mut min = NaiveDate::MAX;
    let mut max = NaiveDate::MIN;
    for s in series {
        for &(d, _) in s.points {
            min = min.min(d);
            max = max.max(d);
        }
    }
    (min, max)
}

fn value_range(series: &[&AsciiSeries]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for s in series {
        for &(_, v) in s.points {
            if v.is_finite() {
                min = min.min(v);
                max = max.max(v);
            }
        }
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn chart_output_is_deterministic() {
        let points = vec![(d(2024, 1), 100.0), (d(2024, 6), 150.0), (d(2024, 12), 120.0)];
        let series = [AsciiSeries {
            name: "Alpha",
            points: &points,
        }];
        let a = render_ascii_chart(&series, 40, 10, "level");
        let b = render_ascii_chart(&series, 40, 10, "level");
        assert_eq!(a, b);
    }

    #[test]
    fn chart_has_header_grid_and_legend() {
        let points = vec![(d(2024, 1), 1.0), (d(2024, 12), 2.0)];
        let series = [AsciiSeries {
            name: "Unemployment Rate (%)",
            points: &points,
        }];
        let out = render_ascii_chart(&series, 40, 8, "level");
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 1 + 8 + 1);
        assert!(lines[0].starts_with("Plot: 2024-01 .. 2024-12"));
        assert!(lines[9].contains("Unemployment Rate (%)"));
        assert!(out.contains('o'));
    }

    #[test]
    fn a_rising_series_fills_corner_to_corner() {
        let points = vec![(d(2024, 1), 0.0), (d(2024, 12), 10.0)];
        let series = [AsciiSeries {
            name: "Alpha",
            points: &points,
        }];
        let out = render_ascii_chart(&series, 20, 6, "level");
        let lines: Vec<&str> = out.lines().collect();

        // First grid row holds the maximum (right edge), last holds the minimum.
        assert_eq!(lines[1].chars().filter(|c| *c == 'o').last(), Some('o'));
        assert!(lines[1].trim_end().ends_with('o'));
        assert!(lines[6].trim_start().starts_with('o'));
    }

    #[test]
    fn empty_series_render_a_placeholder() {
        let series = [AsciiSeries {
            name: "Alpha",
            points: &[],
        }];
        assert_eq!(render_ascii_chart(&series, 40, 10, "level"), "No data to plot.\n");
    }
}
