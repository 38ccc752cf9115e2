//! Ratatui-based terminal dashboard.
//!
//! The TUI mirrors the classic labor dashboard layout: latest-month summary
//! metrics on top, a settings panel for the year window and series selection,
//! one chart area that cycles between levels and percent-change views, a
//! windowed data table, and a status line. All views come from the same
//! pipeline as the CLI subcommands; the TUI only does presentation.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Datelike;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::app::pipeline::{self, DashboardData};
use crate::cli::ViewArgs;
use crate::domain::{DEFAULT_START_YEAR, DateWindow, FetchConfig, Observation};
use crate::error::AppError;
use crate::metrics;
use crate::report::{change_rows, format_changes_table, format_value};

mod plotters_chart;

use plotters_chart::{PALETTE, SeriesLine, TrendChart, day_number};

/// Ratatui colors matching `plotters_chart::PALETTE` by index, so the series
/// list markers match their chart lines.
const SERIES_COLORS: &[Color] = &[
    Color::Cyan,
    Color::Yellow,
    Color::Green,
    Color::Magenta,
    Color::LightRed,
    Color::Red,
];

/// How many series start selected, matching the original dashboard default.
const DEFAULT_SELECTED: usize = 3;

/// Start the TUI.
pub fn run(args: ViewArgs) -> Result<(), AppError> {
    // Load before touching the terminal so startup errors print normally.
    let mut app = App::new(args)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::api(format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::api(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::api(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Which derived view the chart area shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChartMode {
    Levels,
    MonthOverMonth,
    YearOverYear,
}

impl ChartMode {
    fn next(self) -> Self {
        match self {
            ChartMode::Levels => ChartMode::MonthOverMonth,
            ChartMode::MonthOverMonth => ChartMode::YearOverYear,
            ChartMode::YearOverYear => ChartMode::Levels,
        }
    }

    fn title(self) -> &'static str {
        match self {
            ChartMode::Levels => "Levels",
            ChartMode::MonthOverMonth => "Month-over-month change (%)",
            ChartMode::YearOverYear => "Year-over-year change (%)",
        }
    }

    fn y_label(self) -> &'static str {
        match self {
            ChartMode::Levels => "level",
            ChartMode::MonthOverMonth => "MoM %",
            ChartMode::YearOverYear => "YoY %",
        }
    }
}

struct App {
    store_path: PathBuf,
    data: DashboardData,
    // Window selection and its bounds (from the store's coverage).
    start_year: i32,
    end_year: i32,
    min_year: i32,
    max_year: i32,
    // 0 = start year, 1 = end year, 2 = series list.
    selected_field: usize,
    series_names: Vec<String>,
    series_selected: Vec<bool>,
    series_cursor: usize,
    chart_mode: ChartMode,
    status: String,
}

impl App {
    fn new(args: ViewArgs) -> Result<Self, AppError> {
        let store_path = args.data.clone();
        let data = crate::app::load_view(&args)?;

        let series_names = metrics::series_names(&data.store);
        let series_selected = series_names
            .iter()
            .enumerate()
            .map(|(idx, _)| idx < DEFAULT_SELECTED)
            .collect();

        Ok(Self {
            start_year: data.window.start.year(),
            end_year: data.window.end.year(),
            min_year: data.stats.first_date.year(),
            max_year: data.stats.last_date.year(),
            selected_field: 0,
            series_names,
            series_selected,
            series_cursor: 0,
            chart_mode: ChartMode::Levels,
            status: format!(
                "Loaded {} rows. q quit | arrows adjust | space toggle | c chart | r reload | f fetch | e export",
                data.stats.rows
            ),
            store_path,
            data,
        })
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::api(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::api(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::api(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `Ok(true)` to quit.
    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Up => self.move_up(),
            KeyCode::Down => self.move_down(),
            KeyCode::Left => self.adjust_year(-1)?,
            KeyCode::Right => self.adjust_year(1)?,
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_series(),
            KeyCode::Char('a') => self.toggle_all_series(),
            KeyCode::Char('c') => {
                self.chart_mode = self.chart_mode.next();
                self.status = format!("Chart: {}", self.chart_mode.title());
            }
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('f') => self.fetch(),
            KeyCode::Char('e') => self.export(),
            _ => {}
        }
        Ok(false)
    }

    fn move_up(&mut self) {
        if self.selected_field == 2 && self.series_cursor > 0 {
            self.series_cursor -= 1;
        } else if self.selected_field > 0 {
            self.selected_field -= 1;
        }
    }

    fn move_down(&mut self) {
        if self.selected_field < 2 {
            self.selected_field += 1;
        } else if self.series_cursor + 1 < self.series_names.len() {
            self.series_cursor += 1;
        }
    }

    fn adjust_year(&mut self, delta: i32) -> Result<(), AppError> {
        match self.selected_field {
            0 => {
                self.start_year = (self.start_year + delta).clamp(self.min_year, self.end_year);
            }
            1 => {
                self.end_year = (self.end_year + delta).clamp(self.start_year, self.max_year);
            }
            _ => return Ok(()),
        }
        self.rewindow()?;
        self.status = format!("Window: {}..{}", self.start_year, self.end_year);
        Ok(())
    }

    fn toggle_series(&mut self) {
        if self.selected_field != 2 || self.series_names.is_empty() {
            return;
        }
        let idx = self.series_cursor.min(self.series_selected.len() - 1);
        self.series_selected[idx] = !self.series_selected[idx];
        self.status = format!(
            "{} {}",
            if self.series_selected[idx] { "Selected" } else { "Deselected" },
            self.series_names[idx]
        );
    }

    fn toggle_all_series(&mut self) {
        let all_on = self.series_selected.iter().all(|s| *s);
        for sel in &mut self.series_selected {
            *sel = !all_on;
        }
        self.status = if all_on {
            "Cleared series selection.".to_string()
        } else {
            "Selected all series.".to_string()
        };
    }

    /// Re-derive views for the current year range without re-reading disk.
    fn rewindow(&mut self) -> Result<(), AppError> {
        let window = DateWindow::from_years(self.start_year, self.end_year)
            .ok_or_else(|| AppError::config("Invalid year range."))?;
        self.data = pipeline::compute_views(self.data.store.clone(), Some(window))?;
        Ok(())
    }

    fn reload(&mut self) {
        let window = DateWindow::from_years(self.start_year, self.end_year);
        match pipeline::load_dashboard(&self.store_path, window) {
            Ok(data) => {
                self.refresh_from(data);
                self.status = format!("Reloaded {} rows from disk.", self.data.stats.rows);
            }
            Err(err) => {
                self.status = format!("Reload failed: {err}");
            }
        }
    }

    fn fetch(&mut self) {
        self.status = "Fetching from BLS API...".to_string();
        let config = FetchConfig {
            store_path: self.store_path.clone(),
            start_year: DEFAULT_START_YEAR,
            timeout_secs: 30,
        };
        // The fetch is synchronous; the UI blocks until it finishes, matching
        // the single-threaded pipeline model.
        match pipeline::run_fetch(&config, |_| {}) {
            Ok(outcome) => {
                let window = DateWindow::from_years(self.start_year, self.end_year);
                match pipeline::compute_views(outcome.observations, window) {
                    Ok(data) => {
                        self.refresh_from(data);
                        self.status = format!(
                            "Fetched {} rows; store now {} rows.",
                            outcome.fetched_rows, self.data.stats.rows
                        );
                    }
                    Err(err) => self.status = format!("Fetch succeeded but reload failed: {err}"),
                }
            }
            Err(err) => {
                // API failures leave the store untouched; keep showing the
                // previous data.
                self.status = format!("Fetch failed: {err}");
            }
        }
    }

    fn export(&mut self) {
        let windowed = self.selected_windowed();
        if windowed.is_empty() {
            self.status = "Nothing to export in the current selection.".to_string();
            return;
        }
        let path = PathBuf::from("labor_window.csv");
        match crate::io::export::write_window_csv(&path, &windowed, &self.data.mom, &self.data.yoy)
        {
            Ok(()) => {
                self.status = format!("Exported {} rows to {}", windowed.len(), path.display());
            }
            Err(err) => {
                self.status = format!("Export failed: {err}");
            }
        }
    }

    fn refresh_from(&mut self, data: DashboardData) {
        self.min_year = data.stats.first_date.year();
        self.max_year = data.stats.last_date.year();
        self.start_year = self.start_year.clamp(self.min_year, self.max_year);
        self.end_year = self.end_year.clamp(self.start_year, self.max_year);

        let names = metrics::series_names(&data.store);
        if names != self.series_names {
            self.series_selected = names
                .iter()
                .map(|n| {
                    self.series_names
                        .iter()
                        .position(|old| old == n)
                        .map(|idx| self.series_selected[idx])
                        .unwrap_or(false)
                })
                .collect();
            self.series_names = names;
            self.series_cursor = self.series_cursor.min(self.series_names.len().saturating_sub(1));
        }
        self.data = data;

        // If clamping moved the year selection off the loaded window,
        // re-derive the views so the panels match the settings panel.
        if let Some(wanted) = DateWindow::from_years(self.start_year, self.end_year) {
            if wanted != self.data.window {
                let _ = self.rewindow();
            }
        }
    }

    fn selected_names(&self) -> Vec<String> {
        self.series_names
            .iter()
            .zip(&self.series_selected)
            .filter(|(_, sel)| **sel)
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn selected_windowed(&self) -> Vec<Observation> {
        metrics::select_series(&self.data.windowed, &self.selected_names())
    }

    fn draw(&self, f: &mut ratatui::Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(4),
                Constraint::Min(10),
                Constraint::Length(8),
                Constraint::Length(1),
            ])
            .split(f.area());

        self.draw_title(f, chunks[0]);
        self.draw_metrics(f, chunks[1]);

        let main = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(44), Constraint::Min(20)])
            .split(chunks[2]);
        self.draw_settings(f, main[0]);
        self.draw_chart(f, main[1]);

        self.draw_table(f, chunks[3]);

        let status = Paragraph::new(self.status.as_str()).style(Style::default().fg(Color::Gray));
        f.render_widget(status, chunks[4]);
    }

    fn draw_title(&self, f: &mut ratatui::Frame, area: Rect) {
        let title = Line::from(vec![
            Span::styled(
                "labor — BLS Labor Dashboard",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(
                "  |  last data month: {}",
                self.data.stats.last_date.format("%Y-%m")
            )),
        ]);
        f.render_widget(Paragraph::new(title), area);
    }

    fn draw_metrics(&self, f: &mut ratatui::Frame, area: Rect) {
        if self.data.snapshot.is_empty() {
            let msg = Paragraph::new("No catalog series in the store.")
                .block(Block::default().borders(Borders::ALL).title("Latest month"));
            f.render_widget(msg, area);
            return;
        }

        let constraints: Vec<Constraint> = self
            .data
            .snapshot
            .iter()
            .map(|_| Constraint::Ratio(1, self.data.snapshot.len() as u32))
            .collect();
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(area);

        for (cell, obs) in cells.iter().zip(&self.data.snapshot) {
            let text = vec![
                Line::from(Span::styled(
                    short_name(&obs.series_name),
                    Style::default().fg(Color::Gray),
                )),
                Line::from(Span::styled(
                    format_value(obs.value),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
            ];
            let widget = Paragraph::new(text).block(Block::default().borders(Borders::ALL));
            f.render_widget(widget, *cell);
        }
    }

    fn draw_settings(&self, f: &mut ratatui::Frame, area: Rect) {
        let field_style = |field: usize| {
            if self.selected_field == field {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            }
        };

        let mut items = vec![
            ListItem::new(Line::from(Span::styled(
                format!("Start year  < {} >", self.start_year),
                field_style(0),
            ))),
            ListItem::new(Line::from(Span::styled(
                format!("End year    < {} >", self.end_year),
                field_style(1),
            ))),
            ListItem::new(Line::from(Span::raw(""))),
            ListItem::new(Line::from(Span::styled(
                "Series (space toggles, a = all):",
                Style::default().fg(Color::Gray),
            ))),
        ];

        for (idx, name) in self.series_names.iter().enumerate() {
            let mark = if self.series_selected[idx] { "[x]" } else { "[ ]" };
            let color = SERIES_COLORS[idx % SERIES_COLORS.len()];
            let mut style = Style::default().fg(color);
            if self.selected_field == 2 && self.series_cursor == idx {
                style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
            }
            items.push(ListItem::new(Line::from(Span::styled(
                format!("{mark} {name}"),
                style,
            ))));
        }

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Window & Series"));
        f.render_widget(list, area);
    }

    fn draw_chart(&self, f: &mut ratatui::Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.chart_mode.title());
        let inner = block.inner(area);
        f.render_widget(block, area);

        let selected = self.selected_names();
        if selected.is_empty() {
            let msg = Paragraph::new("Select at least one series to see the chart.")
                .style(Style::default().fg(Color::Yellow));
            f.render_widget(msg, inner);
            return;
        }

        let series = self.chart_series(&selected);
        if series.iter().all(|s| s.points.is_empty()) {
            let msg = Paragraph::new("No data in the selected year range. Adjust the window.")
                .style(Style::default().fg(Color::Yellow));
            f.render_widget(msg, inner);
            return;
        }

        let (x_bounds, y_bounds) = chart_bounds(&series);
        let chart = TrendChart {
            series: &series,
            x_bounds,
            y_bounds,
            y_label: self.chart_mode.y_label().to_string(),
        };
        f.render_widget(chart, inner);
    }

    /// Build the chart lines for the current mode.
    ///
    /// Colors are keyed on the series' catalog position, not its position in
    /// the current selection, so a series keeps its color when others are
    /// toggled.
    fn chart_series(&self, selected: &[String]) -> Vec<SeriesLine> {
        let mut out = Vec::with_capacity(selected.len());
        for name in selected {
            let color_idx = self
                .series_names
                .iter()
                .position(|n| n == name)
                .unwrap_or(0);
            let points: Vec<(f64, f64)> = match self.chart_mode {
                ChartMode::Levels => self
                    .data
                    .windowed
                    .iter()
                    .filter(|o| o.series_name == *name)
                    .map(|o| (day_number(o.date), o.value))
                    .collect(),
                ChartMode::MonthOverMonth => self
                    .data
                    .mom
                    .iter()
                    .filter(|c| c.series_name == *name)
                    .map(|c| (day_number(c.date), c.pct))
                    .collect(),
                ChartMode::YearOverYear => self
                    .data
                    .yoy
                    .iter()
                    .filter(|c| c.series_name == *name)
                    .map(|c| (day_number(c.date), c.pct))
                    .collect(),
            };
            out.push(SeriesLine {
                name: name.clone(),
                color: PALETTE[color_idx % PALETTE.len()],
                points,
            });
        }
        out
    }

    fn draw_table(&self, f: &mut ratatui::Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Data in window");
        let inner = block.inner(area);
        f.render_widget(block, area);

        let windowed = self.selected_windowed();
        if windowed.is_empty() {
            let msg = Paragraph::new("No rows in the selected window.")
                .style(Style::default().fg(Color::Yellow));
            f.render_widget(msg, inner);
            return;
        }

        let rows = change_rows(&windowed, &self.data.mom, &self.data.yoy);
        let table = format_changes_table(&rows);
        let mut lines: Vec<&str> = table.lines().collect();

        // Header plus the most recent rows that fit.
        let capacity = inner.height as usize;
        if lines.len() > capacity && capacity > 1 {
            let header = lines[0];
            let tail = lines.split_off(lines.len() - (capacity - 1));
            lines = std::iter::once(header).chain(tail).collect();
        }

        let text = lines.join("\n");
        f.render_widget(Paragraph::new(text), inner);
    }
}

fn short_name(name: &str) -> String {
    // Metric cells are narrow; drop the parenthesized unit.
    match name.split(" (").next() {
        Some(short) if !short.is_empty() => short.to_string(),
        _ => name.to_string(),
    }
}

/// Padded chart bounds over every visible point.
fn chart_bounds(series: &[SeriesLine]) -> ([f64; 2], [f64; 2]) {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;

    for s in series {
        for &(x, y) in &s.points {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }

    if x_max <= x_min {
        x_max = x_min + 1.0;
    }
    if (y_max - y_min).abs() < f64::EPSILON {
        y_min -= 1.0;
        y_max += 1.0;
    } else {
        let pad = (y_max - y_min) * 0.05;
        y_min -= pad;
        y_max += pad;
    }

    ([x_min, x_max], [y_min, y_max])
}
