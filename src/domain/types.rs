//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed by value between pipeline stages
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CurveError;

/// A calendar year-month (`YYYY-MM`).
///
/// Ordering is chronological. The linear month index (`year * 12 + month - 1`)
/// is what interpolation and "next month" arithmetic run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Build a year-month; `None` when `month` is outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn index(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    pub fn from_index(index: i64) -> Self {
        let year = index.div_euclid(12) as i32;
        let month = index.rem_euclid(12) as u32 + 1;
        Self { year, month }
    }

    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Number of months from `self` to `other` (negative if `other` is earlier).
    pub fn months_until(self, other: YearMonth) -> i64 {
        other.index() - self.index()
    }

    pub fn first_day(self) -> NaiveDate {
        // month is validated on construction, day 1 always exists.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn days_in_month(self) -> u32 {
        let first = self.first_day();
        let next_first = self.next().first_day();
        (next_first - first).num_days() as u32
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (y, m) = s
            .split_once('-')
            .ok_or_else(|| format!("Invalid year-month '{s}'. Expected YYYY-MM."))?;
        let year: i32 = y
            .parse()
            .map_err(|_| format!("Invalid year in '{s}'. Expected YYYY-MM."))?;
        let month: u32 = m
            .parse()
            .map_err(|_| format!("Invalid month in '{s}'. Expected YYYY-MM."))?;
        YearMonth::new(year, month).ok_or_else(|| format!("Month out of range in '{s}'."))
    }
}

impl TryFrom<String> for YearMonth {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// How a futures price maps to an implied rate (percent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PriceFormula {
    /// `rate = 100 - price` (IMM-style quotes such as 30-day Fed Funds).
    PriceComplement,
    /// `rate = price`.
    Direct,
}

impl PriceFormula {
    pub fn name(self) -> &'static str {
        match self {
            PriceFormula::PriceComplement => "priceComplement",
            PriceFormula::Direct => "direct",
        }
    }
}

impl FromStr for PriceFormula {
    type Err = CurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "priceComplement" | "price_complement" | "100_minus_rate" => Ok(PriceFormula::PriceComplement),
            "direct" | "rate_direct" => Ok(PriceFormula::Direct),
            other => Err(CurveError::UnknownPriceFormula(other.to_string())),
        }
    }
}

impl TryFrom<String> for PriceFormula {
    type Error = CurveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PriceFormula> for String {
    fn from(value: PriceFormula) -> Self {
        value.name().to_string()
    }
}

/// Liquidity tier of a single quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    #[default]
    Low,
    Medium,
    High,
}

impl QualityTier {
    pub fn label(self) -> &'static str {
        match self {
            QualityTier::Low => "low",
            QualityTier::Medium => "medium",
            QualityTier::High => "high",
        }
    }
}

/// One observed contract price for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuturesQuote {
    /// Contract code as quoted (empty when the sheet carried a month column).
    #[serde(default)]
    pub symbol: String,
    pub month: YearMonth,
    pub price: f64,
    /// Daily volume; unknown volume is read as zero.
    #[serde(default)]
    pub volume: u64,
    #[serde(default)]
    pub open_interest: Option<u64>,
    #[serde(default)]
    pub bid_ask_spread_bp: Option<f64>,
}

/// One rate observation per month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRatePoint {
    pub month: YearMonth,
    /// Implied rate in percent, rounded to 4 decimals.
    pub rate: f64,
    /// The quote the rate came from; absent for interpolated points.
    pub source_quote: Option<FuturesQuote>,
    pub is_synthetic: bool,
}

/// A policy substitution applied while deriving a meeting expectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    /// Meeting on the last day(s) of the month; the monthly rate was used as-is.
    MonthEnd,
    /// The meeting month had no observation; a later month's rate was used.
    LaterMonth,
    /// A stability guard fired; the following month's rate was substituted.
    FollowingMonth,
    /// A stability guard fired and no following month existed; the move was clamped.
    Clamped,
}

impl Adjustment {
    pub fn label(self) -> &'static str {
        match self {
            Adjustment::MonthEnd => "month_end",
            Adjustment::LaterMonth => "later_month",
            Adjustment::FollowingMonth => "following_month",
            Adjustment::Clamped => "clamped",
        }
    }
}

/// The rate expected to prevail immediately after one decision date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingExpectation {
    pub meeting_date: NaiveDate,
    /// Month containing `meeting_date`.
    pub month: YearMonth,
    /// Month whose monthly rate fed the back-solve.
    pub source_month: YearMonth,
    pub rate_after_raw: f64,
    pub rate_after: f64,
    pub move_raw_bp: f64,
    pub move_after_bp: f64,
    pub weight_before: f64,
    pub weight_after: f64,
    #[serde(default)]
    pub adjustments: Vec<Adjustment>,
}

/// Probability mass on one grid level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateLevel {
    pub rate: f64,
    pub probability: f64,
}

/// Discretized distribution over at most two adjacent grid levels, ascending by rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RateDistribution {
    pub levels: Vec<RateLevel>,
}

impl RateDistribution {
    pub fn total(&self) -> f64 {
        self.levels.iter().map(|l| l.probability).sum()
    }

    pub fn probability_of(&self, rate: f64) -> f64 {
        self.levels
            .iter()
            .filter(|l| (l.rate - rate).abs() < 1e-9)
            .map(|l| l.probability)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CutHoldHike {
    pub cut: f64,
    pub hold: f64,
    pub hike: f64,
}

impl CutHoldHike {
    pub fn total(&self) -> f64 {
        self.cut + self.hold + self.hike
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub rate: f64,
    pub probability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TopScenarios {
    pub main: Scenario,
    pub alt: Option<Scenario>,
}

/// Next-meeting view: expectation, distribution, cut/hold/hike and scenarios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingSummary {
    pub current_rate: f64,
    pub meeting: MeetingExpectation,
    pub expected_rate_after_raw: f64,
    pub expected_move_bp: f64,
    pub distribution: RateDistribution,
    pub probabilities: CutHoldHike,
    pub scenarios: TopScenarios,
}

/// Thresholds for the meeting engine's stability fallback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityGuards {
    /// Fewer days than this between the meeting and month-end trips the fallback.
    pub min_days_after: u32,
    /// A single-meeting move larger than this (bp) trips the fallback.
    pub max_move_bp: f64,
    /// Clamp half-width (percentage points) when no following month exists.
    pub clamp_pp: f64,
}

impl Default for StabilityGuards {
    fn default() -> Self {
        Self {
            min_days_after: 5,
            max_move_bp: 300.0,
            clamp_pp: 3.0,
        }
    }
}

/// Run JSON schema: everything needed to re-render a run without the inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFile {
    pub tool: String,
    pub bank: String,
    #[serde(default)]
    pub bank_name: String,
    pub asof_date: NaiveDate,
    pub current_rate: f64,
    pub increment_bp: i32,
    pub monthly: Vec<MonthlyRatePoint>,
    pub meetings: Vec<MeetingExpectation>,
    pub summary: Option<MeetingSummary>,
}
