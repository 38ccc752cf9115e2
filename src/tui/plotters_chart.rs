//! Plotters-powered time-series chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - less manual work for ticks/labels
//! - easy to extend later (annotations, exportable PNG/SVG backends, etc.)
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use chrono::{Datelike, NaiveDate};
use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Line colors assigned to series by catalog position (wrapping past six).
///
/// Kept high-contrast for terminal readability; `SERIES_COLORS` in the TUI
/// module mirrors this order so list markers match their lines.
pub const PALETTE: &[RGBColor] = &[
    RGBColor(0, 255, 255), // cyan
    RGBColor(255, 255, 0), // yellow
    RGBColor(0, 255, 0),   // green
    RGBColor(255, 0, 255), // magenta
    RGBColor(255, 165, 0), // orange
    RGBColor(255, 0, 0),   // red
];

/// One line on the chart.
pub struct SeriesLine {
    pub name: String,
    pub color: RGBColor,
    /// `(day-number, value)` points sorted by date; see [`day_number`].
    pub points: Vec<(f64, f64)>,
}

/// Dates chart as `f64` day numbers so Plotters can use a plain cartesian
/// range; tick labels convert back for display.
pub fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// A lightweight, render-only chart description.
///
/// The widget is intentionally data-driven: all series and bounds are computed
/// outside the render call. This keeps `render()` focused on drawing and makes
/// it easy to test/benchmark the data prep separately.
pub struct TrendChart<'a> {
    pub series: &'a [SeriesLine],
    /// X bounds as day numbers.
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub y_label: String,
}

impl Widget for TrendChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a
        // chart. In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 6 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite())
            || x1 <= x0
            || y1 <= y0
        {
            return;
        }

        // `plotters-ratatui-backend` draws Plotters primitives via Ratatui's
        // `Canvas` widget, which ultimately writes to the terminal buffer.
        //
        // We delegate rendering to the crate-provided widget helper to avoid
        // coupling our code to its internal backend types.
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                // Small margins keep the chart readable without wasting space.
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Axes + tick labels.
            //
            // We disable the mesh lines to reduce visual clutter in
            // low-resolution terminal rendering; axes + labels are enough for
            // a dashboard read.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .y_desc(&self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| format_day_number(*v))
                .y_label_formatter(&|v| format!("{v:.1}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for series in self.series {
                chart.draw_series(LineSeries::new(
                    series.points.iter().copied(),
                    &series.color,
                ))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

fn format_day_number(days: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(days as i32)
        .map(|d| format!("{:04}-{:02}", d.year(), d.month()))
        .unwrap_or_default()
}
