//! Command-line parsing for the BLS labor dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the pipeline/metrics code.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::{DEFAULT_START_YEAR, DEFAULT_STORE_PATH};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "labor", version, about = "BLS labor-statistics fetcher and dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the series catalog from the BLS API and merge into the CSV store.
    Fetch(FetchArgs),
    /// Print latest-month summary metrics and store statistics.
    Summary(ViewArgs),
    /// Print month-over-month and year-over-year change tables.
    Changes(ChangesArgs),
    /// Render an ASCII chart of levels or changes in the terminal.
    Plot(PlotArgs),
    /// Launch the interactive TUI dashboard.
    ///
    /// This reads the same store and derives the same views as the CLI
    /// subcommands, but renders them in a terminal UI using Ratatui.
    Tui(ViewArgs),
}

/// Options for the ingestion pipeline.
#[derive(Debug, Parser, Clone)]
pub struct FetchArgs {
    /// Path of the CSV observation store.
    #[arg(long, default_value = DEFAULT_STORE_PATH)]
    pub data: PathBuf,

    /// Earliest year to request from the API.
    #[arg(long, default_value_t = DEFAULT_START_YEAR)]
    pub start_year: i32,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

/// Common options for read-only views over the store.
#[derive(Debug, Parser, Clone)]
pub struct ViewArgs {
    /// Path of the CSV observation store.
    #[arg(long, default_value = DEFAULT_STORE_PATH)]
    pub data: PathBuf,

    /// First year of the display window (default: two years before the last data year).
    #[arg(long, value_name = "YEAR")]
    pub from: Option<i32>,

    /// Last year of the display window (default: the last data year).
    #[arg(long, value_name = "YEAR")]
    pub to: Option<i32>,
}

/// Options for the change tables.
#[derive(Debug, Parser, Clone)]
pub struct ChangesArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Restrict output to these series names (repeatable; default: all series).
    #[arg(long = "series", value_name = "NAME")]
    pub series: Vec<String>,

    /// Export the windowed rows with change columns to a CSV file.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Options for the ASCII chart.
#[derive(Debug, Parser, Clone)]
pub struct PlotArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Restrict the chart to these series names (repeatable; default: all series).
    #[arg(long = "series", value_name = "NAME")]
    pub series: Vec<String>,

    /// What to plot.
    #[arg(long, value_enum, default_value_t = PlotKind::Levels)]
    pub kind: PlotKind,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Which derived view the ASCII chart renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlotKind {
    /// Raw series levels.
    Levels,
    /// Month-over-month percent change.
    Mom,
    /// Year-over-year percent change.
    Yoy,
}
