//! Synthetic futures quote sheets from a random meeting path.
//!
//! A sheet is generated in three steps:
//!
//! 1. walk the upcoming meeting dates, drawing a cut / hold / hike at each
//! 2. average the resulting daily policy rate over each calendar month
//! 3. quote one contract per month (plus noisy duplicates, minus gaps)
//!
//! With zero noise and no gaps the pipeline recovers the drawn path, which is
//! what the tests below check.

use std::collections::BTreeSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{FuturesQuote, PriceFormula, YearMonth};
use crate::error::AppError;
use crate::io::config::BankConfig;
use crate::io::symbols::month_to_symbol;
use crate::math::{policy_step, round_dp, snap_to_step};

const CUT_PROB: f64 = 0.35;
const HIKE_PROB: f64 = 0.15;
const PRICE_DECIMALS: i32 = 4;

/// Generator knobs (all exposed on `ipath sample`).
#[derive(Debug, Clone)]
pub struct SampleSettings {
    pub seed: u64,
    pub asof: NaiveDate,
    /// Std dev of the per-quote price noise, in basis points of rate.
    pub noise_bp: f64,
    /// Probability that a month has no quote at all.
    pub gap_prob: f64,
    /// Upper bound on extra lower-volume quotes per month.
    pub max_duplicates: usize,
}

/// The policy rate in force after one meeting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathStep {
    pub meeting_date: NaiveDate,
    pub rate_after: f64,
}

#[derive(Debug, Clone)]
pub struct SampleSheet {
    pub start_rate: f64,
    pub path: Vec<PathStep>,
    /// Exact day-weighted monthly averages, before noise.
    pub monthly: Vec<(YearMonth, f64)>,
    pub quotes: Vec<FuturesQuote>,
}

pub fn generate_sample(config: &BankConfig, settings: &SampleSettings) -> Result<SampleSheet, AppError> {
    if !(settings.noise_bp.is_finite() && settings.noise_bp >= 0.0) {
        return Err(AppError::new(2, "Noise (bp) must be finite and >= 0."));
    }
    if !(0.0..1.0).contains(&settings.gap_prob) {
        return Err(AppError::new(2, "Gap probability must be in [0, 1)."));
    }

    let policy = &config.policy;
    let step = policy_step(policy.increment_bp)?;
    let mut rng = StdRng::seed_from_u64(sample_seed(config, settings));
    let noise = Normal::new(0.0, settings.noise_bp / 100.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    // 1) Meeting path from the as-of date, starting at the current rate on the policy grid.
    let start_rate = snap_to_step(policy.current_rate, step).clamp(policy.min_rate, policy.max_rate);
    let dates: BTreeSet<NaiveDate> = config
        .meetings
        .dates
        .iter()
        .copied()
        .filter(|d| *d >= settings.asof)
        .collect();
    let mut path = Vec::with_capacity(dates.len());
    let mut rate = start_rate;
    for meeting_date in dates {
        rate = round_dp((rate + sample_move(&mut rng) * step).clamp(policy.min_rate, policy.max_rate), 6);
        path.push(PathStep { meeting_date, rate_after: rate });
    }

    // 2) Day-weighted monthly averages, two months past the last meeting.
    let first = YearMonth::from_date(settings.asof);
    let last = path
        .last()
        .map(|s| YearMonth::from_date(s.meeting_date).next().next())
        .unwrap_or(first)
        .max(first);
    let mut monthly = Vec::new();
    let mut month = first;
    while month <= last {
        monthly.push((month, monthly_average(month, start_rate, &path)));
        month = month.next();
    }

    // 3) Quotes.
    let formula = config.futures.price_formula;
    let mut quotes = Vec::new();
    for &(month, avg) in &monthly {
        if rng.r#gen::<f64>() < settings.gap_prob {
            continue;
        }
        let symbol = month_to_symbol(month, &config.futures.symbol_root);
        let volume = rng.gen_range(5_000..50_000_u64);
        quotes.push(FuturesQuote {
            symbol: symbol.clone(),
            month,
            price: quote_price(avg + noise.sample(&mut rng), formula),
            volume,
            open_interest: Some(volume * rng.gen_range(5..20_u64)),
            bid_ask_spread_bp: Some(0.5),
        });

        let duplicates = rng.gen_range(0..=settings.max_duplicates);
        for _ in 0..duplicates {
            quotes.push(FuturesQuote {
                symbol: symbol.clone(),
                month,
                price: quote_price(avg + 2.0 * noise.sample(&mut rng), formula),
                volume: rng.gen_range(0..volume),
                open_interest: None,
                bid_ask_spread_bp: None,
            });
        }
    }
    quotes.shuffle(&mut rng);

    tracing::info!(
        bank = %config.bank.code,
        meetings = path.len(),
        months = monthly.len(),
        quotes = quotes.len(),
        "generated synthetic quote sheet"
    );

    Ok(SampleSheet {
        start_rate,
        path,
        monthly,
        quotes,
    })
}

/// Write quotes as a Barchart-style CSV that `io::ingest` reads back.
pub fn write_sample_csv(path: &Path, quotes: &[FuturesQuote]) -> Result<(), AppError> {
    let file = std::fs::File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create sample CSV '{}': {e}", path.display())))?;
    write_quotes(file, quotes)
}

fn write_quotes<W: Write>(out: W, quotes: &[FuturesQuote]) -> Result<(), AppError> {
    let to_err = |e: csv::Error| AppError::new(4, format!("Failed to write sample CSV: {e}"));
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(["Symbol", "Month", "Latest", "Volume", "Open Int", "Spread_bp"])
        .map_err(to_err)?;
    for q in quotes {
        writer
            .write_record([
                q.symbol.clone(),
                q.month.to_string(),
                format!("{:.4}", q.price),
                q.volume.to_string(),
                q.open_interest.map(|v| v.to_string()).unwrap_or_default(),
                q.bid_ask_spread_bp.map(|v| format!("{v:.2}")).unwrap_or_default(),
            ])
            .map_err(to_err)?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to write sample CSV: {e}")))?;
    Ok(())
}

/// Mean of the daily policy rate over `month`.
///
/// A meeting's decision applies from the meeting day itself.
fn monthly_average(month: YearMonth, start_rate: f64, path: &[PathStep]) -> f64 {
    let dim = month.days_in_month();
    let first_day = month.first_day();
    let total: f64 = (0..dim)
        .map(|offset| {
            let day = first_day + chrono::Duration::days(i64::from(offset));
            rate_on(day, start_rate, path)
        })
        .sum();
    total / f64::from(dim)
}

fn rate_on(day: NaiveDate, start_rate: f64, path: &[PathStep]) -> f64 {
    path.iter()
        .take_while(|s| s.meeting_date <= day)
        .last()
        .map_or(start_rate, |s| s.rate_after)
}

fn quote_price(rate: f64, formula: PriceFormula) -> f64 {
    match formula {
        PriceFormula::PriceComplement => round_dp(100.0 - rate, PRICE_DECIMALS),
        PriceFormula::Direct => round_dp(rate, PRICE_DECIMALS),
    }
}

/// Draw a move in steps: -1 (cut), 0 (hold) or +1 (hike).
fn sample_move(rng: &mut StdRng) -> f64 {
    let roll: f64 = rng.r#gen();
    if roll < CUT_PROB {
        -1.0
    } else if roll < CUT_PROB + HIKE_PROB {
        1.0
    } else {
        0.0
    }
}

fn sample_seed(config: &BankConfig, settings: &SampleSettings) -> u64 {
    let mut hasher = DefaultHasher::new();
    config.bank.code.hash(&mut hasher);
    settings.seed.hash(&mut hasher);
    settings.asof.num_days_from_ce().hash(&mut hasher);
    config.policy.current_rate.to_bits().hash(&mut hasher);
    config.policy.increment_bp.hash(&mut hasher);
    hasher.finish()
}
