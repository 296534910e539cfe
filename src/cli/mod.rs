//! Command-line parsing for the implied policy-path tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the curve/meeting code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ipath", version, about = "Market-implied policy-rate path from rate futures")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the monthly curve and meeting path for one or more banks.
    Run(RunArgs),
    /// Plot a previously exported run JSON.
    Plot(PlotArgs),
    /// Write a synthetic quote sheet for a bank config.
    Sample(SampleArgs),
}

/// Options for `ipath run`.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Bank config file(s) (TOML). Several banks run in parallel.
    #[arg(short = 'c', long = "config", value_name = "TOML", required = true, num_args = 1..)]
    pub configs: Vec<PathBuf>,

    /// Quote sheet overriding `futures.quotes` (single config only).
    #[arg(long, value_name = "CSV")]
    pub quotes: Option<PathBuf>,

    /// As-of date (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    pub asof: Option<NaiveDate>,

    /// Skip linear interpolation of missing months.
    #[arg(long)]
    pub no_densify: bool,

    /// Replace the configured current rate with the latest FRED observation.
    #[arg(long)]
    pub fetch_current_rate: bool,

    /// Write monthly.csv, meetings.csv and run.json per bank under this directory.
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Render an ASCII plot of the curve and meeting path.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Write a markdown debug bundle per bank (into --export-dir or ./debug).
    #[arg(long)]
    pub debug: bool,
}

/// Options for plotting a saved run.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Run JSON file produced by `ipath run --export-dir`.
    #[arg(long, value_name = "JSON")]
    pub run: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for synthetic quote sheets.
#[derive(Debug, Parser)]
pub struct SampleArgs {
    /// Bank config file (TOML) providing meetings, grid and symbol root.
    #[arg(short = 'c', long = "config", value_name = "TOML")]
    pub config: PathBuf,

    /// Output CSV path.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,

    /// Random seed (combined with the bank config for reproducibility).
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// As-of date (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    pub asof: Option<NaiveDate>,

    /// Std dev of price noise, in basis points of rate.
    #[arg(long, default_value_t = 0.5)]
    pub noise_bp: f64,

    /// Probability that a month is missing from the sheet.
    #[arg(long, default_value_t = 0.0)]
    pub gap_prob: f64,

    /// Maximum extra (lower-volume) quotes per month.
    #[arg(long, default_value_t = 2)]
    pub max_duplicates: usize,
}
