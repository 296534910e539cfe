//! Shared pipeline logic used by every subcommand that needs a computed run.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! config -> (FRED current rate) -> ingest -> monthly curve -> densify ->
//! meeting path -> next-meeting summary
//!
//! The CLI handlers can then focus on presentation (printing vs exports).

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::curve::{build_curve, densify_linear, strip_past_months};
use crate::data::FredClient;
use crate::domain::{MeetingExpectation, MeetingSummary, MonthlyRatePoint, RunFile, YearMonth};
use crate::error::AppError;
use crate::io::config::{BankConfig, load_bank_config};
use crate::io::ingest::{IngestedQuotes, QuoteSpec, load_quotes};
use crate::meetings::compute_after_meeting_curve_with;
use crate::scenario::build_summary;

pub const TOOL_NAME: &str = "ipath";

/// Per-invocation overrides on top of the bank config.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub asof: NaiveDate,
    /// Replaces `futures.quotes` from the config.
    pub quotes: Option<PathBuf>,
    pub no_densify: bool,
    pub fetch_current_rate: bool,
}

/// Where the current policy rate came from.
#[derive(Debug, Clone, PartialEq)]
pub enum RateSource {
    Config,
    Fred { series: String, date: NaiveDate },
}

/// All computed outputs of one bank's run.
#[derive(Debug, Clone)]
pub struct BankRun {
    pub config: BankConfig,
    pub asof: NaiveDate,
    pub current_rate: f64,
    pub rate_source: RateSource,
    pub ingest: IngestedQuotes,
    pub monthly: Vec<MonthlyRatePoint>,
    pub meetings: Vec<MeetingExpectation>,
    /// Configured meeting dates before the as-of date.
    pub past_meetings: Vec<NaiveDate>,
    pub summary: Option<MeetingSummary>,
}

impl BankRun {
    pub fn to_run_file(&self) -> RunFile {
        RunFile {
            tool: TOOL_NAME.to_string(),
            bank: self.config.bank.code.clone(),
            bank_name: self.config.bank.name.clone(),
            asof_date: self.asof,
            current_rate: self.current_rate,
            increment_bp: self.config.policy.increment_bp,
            monthly: self.monthly.clone(),
            meetings: self.meetings.clone(),
            summary: self.summary.clone(),
        }
    }
}

/// Execute the full pipeline for one bank config file.
pub fn run_bank(config_path: &Path, options: &RunOptions) -> Result<BankRun, AppError> {
    let config = load_bank_config(config_path)?;

    let (current_rate, rate_source) = if options.fetch_current_rate {
        fetch_current_rate(&config, options.asof)?
    } else {
        (config.policy.current_rate, RateSource::Config)
    };

    let quotes_path = options
        .quotes
        .clone()
        .or_else(|| config.quotes_path())
        .ok_or_else(|| {
            AppError::new(
                2,
                format!("{}: no quote sheet (set futures.quotes or pass --quotes).", config_path.display()),
            )
        })?;
    let spec = QuoteSpec {
        symbol_root: config.futures.symbol_root.clone(),
        quality: config.quality,
    };
    let ingest = load_quotes(&quotes_path, &spec)?;

    let densify = config.futures.densify && !options.no_densify;
    run_with_quotes(config, ingest, current_rate, rate_source, options.asof, densify)
}

/// Execute the pipeline on already-ingested quotes.
pub fn run_with_quotes(
    config: BankConfig,
    ingest: IngestedQuotes,
    current_rate: f64,
    rate_source: RateSource,
    asof: NaiveDate,
    densify: bool,
) -> Result<BankRun, AppError> {
    let policy = &config.policy;

    // 1) One point per month, nothing before the as-of month.
    let curve = build_curve(&ingest.quotes, config.futures.price_formula);
    let curve = strip_past_months(&curve, YearMonth::from_date(asof));
    if curve.is_empty() {
        return Err(AppError::new(
            3,
            format!("{}: no quoted months on or after {asof}.", config.bank.code),
        ));
    }

    // 2) Optional gap filling.
    let monthly = if densify { densify_linear(&curve) } else { curve };

    // 3) Meeting path over upcoming decisions only.
    let (past_meetings, upcoming): (Vec<NaiveDate>, Vec<NaiveDate>) =
        config.meetings.dates.iter().copied().partition(|d| *d < asof);
    if !past_meetings.is_empty() {
        tracing::debug!(bank = %config.bank.code, skipped = past_meetings.len(), "ignoring meetings before as-of date");
    }
    let meetings = compute_after_meeting_curve_with(
        &monthly,
        &upcoming,
        current_rate,
        policy.increment_bp,
        &config.guards,
    )?;

    // 4) Next-meeting summary.
    let summary = build_summary(&meetings, current_rate, policy.increment_bp, policy.min_rate, policy.max_rate)?;

    tracing::info!(
        bank = %config.bank.code,
        months = monthly.len(),
        meetings = meetings.len(),
        "pipeline complete"
    );

    Ok(BankRun {
        config,
        asof,
        current_rate,
        rate_source,
        ingest,
        monthly,
        meetings,
        past_meetings,
        summary,
    })
}

fn fetch_current_rate(config: &BankConfig, asof: NaiveDate) -> Result<(f64, RateSource), AppError> {
    let series = config.policy.fred_series.clone().ok_or_else(|| {
        AppError::new(
            2,
            format!("{}: --fetch-current-rate needs policy.fred_series in the config.", config.bank.code),
        )
    })?;
    let client = FredClient::from_env()?;
    let obs = client.fetch_latest(&series, Some(asof))?;
    Ok((obs.value, RateSource::Fred { series, date: obs.date }))
}
