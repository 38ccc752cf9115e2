//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the ingestion pipeline
//! - derives windowed views and change series
//! - prints summaries/tables/plots
//! - launches the TUI

use clap::Parser;

use crate::cli::{ChangesArgs, Command, FetchArgs, PlotArgs, PlotKind, ViewArgs};
use crate::domain::{DateWindow, FetchConfig};
use crate::error::AppError;

pub mod pipeline;

use pipeline::DashboardData;

/// Entry point for the `labor` binary.
pub fn run() -> Result<(), AppError> {
    // We want a bare `labor` to behave like `labor tui`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fetch(args) => handle_fetch(args),
        Command::Summary(args) => handle_summary(args),
        Command::Changes(args) => handle_changes(args),
        Command::Plot(args) => handle_plot(args),
        Command::Tui(args) => crate::tui::run(args),
    }
}

fn handle_fetch(args: FetchArgs) -> Result<(), AppError> {
    let config = fetch_config_from_args(&args);
    let outcome = pipeline::run_fetch(&config, |msg| println!("{msg}"))?;

    if outcome.existing_rows > 0 {
        println!(
            "Merged {} fetched rows with {} existing rows.",
            outcome.fetched_rows, outcome.existing_rows
        );
    }
    println!(
        "Saved {} rows to {}",
        outcome.observations.len(),
        config.store_path.display()
    );
    Ok(())
}

fn handle_summary(args: ViewArgs) -> Result<(), AppError> {
    let data = load_view(&args)?;
    print!("{}", crate::report::format_summary(&data));
    Ok(())
}

fn handle_changes(args: ChangesArgs) -> Result<(), AppError> {
    let data = load_view(&args.view)?;
    let selected = resolve_series_selection(&data, &args.series)?;

    let windowed = crate::metrics::select_series(&data.windowed, &selected);
    if windowed.is_empty() {
        // Recoverable empty state, not an error: the window simply has
        // nothing to show.
        println!("No observations in the selected window. Adjust --from/--to.");
        return Ok(());
    }

    let rows = crate::report::change_rows(&windowed, &data.mom, &data.yoy);
    print!("{}", crate::report::format_changes_table(&rows));

    if let Some(path) = &args.export {
        crate::io::export::write_window_csv(path, &windowed, &data.mom, &data.yoy)?;
        println!("Exported {} rows to {}", windowed.len(), path.display());
    }
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let data = load_view(&args.view)?;
    let selected = resolve_series_selection(&data, &args.series)?;

    let (series, y_label) = plot_series(&data, &selected, args.kind);
    if series.iter().all(|(_, points)| points.is_empty()) {
        println!("No observations in the selected window. Adjust --from/--to.");
        return Ok(());
    }

    let chart_series: Vec<crate::plot::AsciiSeries> = series
        .iter()
        .map(|(name, points)| crate::plot::AsciiSeries {
            name,
            points,
        })
        .collect();
    print!(
        "{}",
        crate::plot::render_ascii_chart(&chart_series, args.width, args.height, y_label)
    );
    Ok(())
}

/// Group the windowed view into per-series point lists for plotting.
fn plot_series(
    data: &DashboardData,
    selected: &[String],
    kind: PlotKind,
) -> (Vec<(String, Vec<(chrono::NaiveDate, f64)>)>, &'static str) {
    let mut out: Vec<(String, Vec<(chrono::NaiveDate, f64)>)> = Vec::new();
    match kind {
        PlotKind::Levels => {
            for name in selected {
                let points = data
                    .windowed
                    .iter()
                    .filter(|o| o.series_name == *name)
                    .map(|o| (o.date, o.value))
                    .collect();
                out.push((name.clone(), points));
            }
            (out, "level")
        }
        PlotKind::Mom | PlotKind::Yoy => {
            let changes = if kind == PlotKind::Mom {
                &data.mom
            } else {
                &data.yoy
            };
            for name in selected {
                let points = changes
                    .iter()
                    .filter(|c| c.series_name == *name)
                    .map(|c| (c.date, c.pct))
                    .collect();
                out.push((name.clone(), points));
            }
            (out, if kind == PlotKind::Mom { "MoM %" } else { "YoY %" })
        }
    }
}

/// Load the store and apply the year window from `--from`/`--to`.
///
/// Shared with the TUI, which starts from the same view arguments.
pub(crate) fn load_view(view: &ViewArgs) -> Result<DashboardData, AppError> {
    let data = pipeline::load_dashboard(&view.data, None)?;
    if view.from.is_none() && view.to.is_none() {
        return Ok(data);
    }

    let first = chrono::Datelike::year(&data.stats.first_date);
    let last = chrono::Datelike::year(&data.stats.last_date);
    let to = view.to.unwrap_or(last);
    let from = view.from.unwrap_or((to - 2).max(first));
    let window = DateWindow::from_years(from, to)
        .ok_or_else(|| AppError::config(format!("Invalid year range {from}..{to}.")))?;

    pipeline::compute_views(data.store, Some(window))
}

/// Validate `--series` selections against the store's series names.
///
/// An empty selection means "all series".
fn resolve_series_selection(
    data: &DashboardData,
    requested: &[String],
) -> Result<Vec<String>, AppError> {
    let known = crate::metrics::series_names(&data.store);
    if requested.is_empty() {
        return Ok(known);
    }
    for name in requested {
        if !known.iter().any(|k| k == name) {
            return Err(AppError::config(format!(
                "Unknown series name '{name}'. Known series: {}",
                known.join(", ")
            )));
        }
    }
    Ok(requested.to_vec())
}

pub fn fetch_config_from_args(args: &FetchArgs) -> FetchConfig {
    FetchConfig {
        store_path: args.data.clone(),
        start_year: args.start_year,
        timeout_secs: args.timeout_secs,
    }
}

/// Rewrite argv so `labor` defaults to `labor tui`.
///
/// Rules:
/// - `labor`                     -> `labor tui`
/// - `labor --data x.csv ...`    -> `labor tui --data x.csv ...`
/// - `labor --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "fetch" | "summary" | "changes" | "plot" | "tui"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_tui() {
        assert_eq!(rewrite_args(argv(&["labor"])), argv(&["labor", "tui"]));
    }

    #[test]
    fn leading_flags_route_to_tui() {
        assert_eq!(
            rewrite_args(argv(&["labor", "--data", "x.csv"])),
            argv(&["labor", "tui", "--data", "x.csv"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(
            rewrite_args(argv(&["labor", "fetch"])),
            argv(&["labor", "fetch"])
        );
        assert_eq!(
            rewrite_args(argv(&["labor", "--help"])),
            argv(&["labor", "--help"])
        );
    }
}
