//! Liquidity tiering for individual quotes.
//!
//! Open interest and volume are mandatory criteria for a tier. The bid/ask
//! spread is optional: when a quote carries no spread it passes the spread
//! test only if `ignore_missing_spread` is set.

use serde::{Deserialize, Serialize};

use crate::domain::{FuturesQuote, QualityTier};

/// Minimums for one tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TierThresholds {
    pub min_open_interest: u64,
    pub min_daily_volume: u64,
    pub max_bid_ask_spread_bp: Option<f64>,
}

/// Tier thresholds plus the ingest cut-off.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityThresholds {
    pub high: TierThresholds,
    pub medium: TierThresholds,
    pub ignore_missing_spread: bool,
    /// Quotes below this tier are dropped at ingest.
    pub min_tier: QualityTier,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            high: TierThresholds::default(),
            medium: TierThresholds::default(),
            ignore_missing_spread: true,
            min_tier: QualityTier::Low,
        }
    }
}

/// Classify a quote as high / medium / low liquidity.
pub fn assess_quality(quote: &FuturesQuote, thresholds: &QualityThresholds) -> QualityTier {
    let oi = quote.open_interest.unwrap_or(0);
    let passes = |tier: &TierThresholds| {
        oi >= tier.min_open_interest
            && quote.volume >= tier.min_daily_volume
            && spread_ok(quote.bid_ask_spread_bp, tier.max_bid_ask_spread_bp, thresholds.ignore_missing_spread)
    };

    if passes(&thresholds.high) {
        QualityTier::High
    } else if passes(&thresholds.medium) {
        QualityTier::Medium
    } else {
        QualityTier::Low
    }
}

fn spread_ok(spread: Option<f64>, max: Option<f64>, ignore_missing: bool) -> bool {
    match (spread, max) {
        (None, _) => ignore_missing,
        (Some(_), None) => true,
        (Some(s), Some(m)) => s <= m,
    }
}
