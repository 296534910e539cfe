//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - runs the bank pipelines (in parallel when several configs are given)
//! - prints reports/plots
//! - writes optional exports and debug bundles
//! - generates synthetic quote sheets

use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, PlotArgs, RunArgs, SampleArgs};
use crate::data::{SampleSettings, generate_sample, write_sample_csv};
use crate::error::AppError;

pub mod pipeline;

use pipeline::{BankRun, RunOptions};

/// Entry point for the `ipath` binary.
pub fn run() -> Result<(), AppError> {
    // We want `ipath -c fed.toml` to behave like `ipath run -c fed.toml`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    init_tracing(cli.verbose);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Plot(args) => handle_plot(args),
        Command::Sample(args) => handle_sample(args),
    }
}

/// Log to stderr so stdout stays the report.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // A subscriber may already be installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    if args.quotes.is_some() && args.configs.len() > 1 {
        return Err(AppError::new(2, "--quotes can only be used with a single --config."));
    }

    let options = RunOptions {
        asof: args.asof.unwrap_or_else(|| Local::now().date_naive()),
        quotes: args.quotes.clone(),
        no_densify: args.no_densify,
        fetch_current_rate: args.fetch_current_rate,
    };

    // Banks are independent; collect keeps the order the configs were given.
    let results: Vec<Result<BankRun, AppError>> = args
        .configs
        .par_iter()
        .map(|path| pipeline::run_bank(path, &options))
        .collect();

    present_each(&args.configs, results, |run| present_run(run, &args))
}

/// Present every successful run; report failures without stopping.
///
/// Returns the first error, from either the pipeline or presentation.
fn present_each<T>(
    paths: &[PathBuf],
    results: Vec<Result<T, AppError>>,
    mut present: impl FnMut(&T) -> Result<(), AppError>,
) -> Result<(), AppError> {
    let mut first_err = None;
    for (path, result) in paths.iter().zip(results) {
        if let Err(err) = result.and_then(|run| present(&run)) {
            eprintln!("{}: {err}", path.display());
            first_err.get_or_insert(err);
        }
    }

    match first_err {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn present_run(run: &BankRun, args: &RunArgs) -> Result<(), AppError> {
    let file = run.to_run_file();

    print!("{}", crate::report::format_ingest_summary(&run.ingest));
    println!("{}", crate::report::format_run_report(&file));

    if args.plot {
        println!("{}", crate::plot::render_run_plot(&file, args.width, args.height));
    }

    if let Some(dir) = &args.export_dir {
        let bank_dir = dir.join(run.config.bank.code.to_lowercase());
        std::fs::create_dir_all(&bank_dir)
            .map_err(|e| AppError::new(4, format!("Failed to create export dir '{}': {e}", bank_dir.display())))?;
        crate::io::export::write_monthly_csv(&bank_dir.join("monthly.csv"), &run.monthly, &run.config.quality)?;
        crate::io::export::write_meetings_csv(&bank_dir.join("meetings.csv"), &run.meetings)?;
        crate::io::run::write_run_json(&bank_dir.join("run.json"), &file)?;
        println!("Exports written to {}", bank_dir.display());
    }

    if args.debug {
        let dir = args.export_dir.clone().unwrap_or_else(|| PathBuf::from("debug"));
        let path = crate::debug::write_debug_bundle(run, &dir)?;
        println!("Debug bundle: {}", path.display());
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let run = crate::io::run::read_run_json(&args.run)?;
    let plot = crate::plot::render_run_plot(&run, args.width, args.height);

    println!("{plot}");
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = crate::io::config::load_bank_config(&args.config)?;
    let settings = SampleSettings {
        seed: args.seed,
        asof: args.asof.unwrap_or_else(|| Local::now().date_naive()),
        noise_bp: args.noise_bp,
        gap_prob: args.gap_prob,
        max_duplicates: args.max_duplicates,
    };

    let sheet = generate_sample(&config, &settings)?;
    write_sample_csv(&args.out, &sheet.quotes)?;

    println!(
        "Wrote {} quotes ({} months) to {}",
        sheet.quotes.len(),
        sheet.monthly.len(),
        args.out.display()
    );
    println!("Sampled path from {:.4}:", sheet.start_rate);
    for step in &sheet.path {
        println!("  {} -> {:.4}", step.meeting_date, step.rate_after);
    }
    Ok(())
}

/// Rewrite argv so bare flags default to `ipath run`.
///
/// Rules:
/// - `ipath -c fed.toml ...`       -> `ipath run -c fed.toml ...`
/// - `ipath --help/--version/-h`   -> unchanged (show top-level help/version)
/// - `ipath` / `ipath <subcommand>` -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "run" | "plot" | "sample");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "run flags".
    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_flags_become_run() {
        assert_eq!(
            rewrite_args(args(&["ipath", "-c", "fed.toml"])),
            args(&["ipath", "run", "-c", "fed.toml"])
        );
        assert_eq!(rewrite_args(args(&["ipath", "-v", "-c", "x"]))[1], "run");
    }

    #[test]
    fn presentation_failure_does_not_skip_later_banks() {
        let paths: Vec<PathBuf> = ["a.toml", "b.toml", "c.toml"].iter().map(PathBuf::from).collect();
        let results = vec![Ok(1), Err(AppError::new(3, "no quotes")), Ok(3)];
        let mut presented = Vec::new();

        let err = present_each(&paths, results, |n: &i32| {
            presented.push(*n);
            if *n == 1 {
                Err(AppError::new(4, "disk full"))
            } else {
                Ok(())
            }
        })
        .unwrap_err();

        assert_eq!(presented, vec![1, 3]);
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        for v in [
            args(&["ipath"]),
            args(&["ipath", "--help"]),
            args(&["ipath", "plot", "--run", "r.json"]),
            args(&["ipath", "sample", "-c", "fed.toml", "--out", "q.csv"]),
        ] {
            assert_eq!(rewrite_args(v.clone()), v);
        }
    }
}
