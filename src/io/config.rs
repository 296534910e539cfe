//! Bank configuration files (TOML).
//!
//! One file per central bank: identity, futures conventions, policy-rate
//! grid, meeting calendar, and optional guard/quality overrides. See
//! `configs/fed.toml` for a complete example.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::curve::QualityThresholds;
use crate::domain::{PriceFormula, StabilityGuards};
use crate::error::{AppError, CurveError};
use crate::math::policy_step;
use crate::meetings::validate_guards;
use crate::scenario::distribution::validate_bounds;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankConfig {
    pub bank: BankInfo,
    pub futures: FuturesConfig,
    pub policy: PolicyConfig,
    #[serde(default)]
    pub guards: StabilityGuards,
    #[serde(default)]
    pub quality: QualityThresholds,
    pub meetings: MeetingsConfig,

    /// Directory of the config file; relative paths resolve against it.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankInfo {
    pub code: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuturesConfig {
    /// Quote sheet path (relative to the config file).
    #[serde(default)]
    pub quotes: Option<PathBuf>,
    /// Symbol root used to decode delivery months (e.g. `ZQ`).
    #[serde(default)]
    pub symbol_root: String,
    #[serde(default = "default_price_formula")]
    pub price_formula: PriceFormula,
    #[serde(default = "default_true")]
    pub densify: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub current_rate: f64,
    #[serde(default = "default_increment_bp")]
    pub increment_bp: i32,
    #[serde(default)]
    pub min_rate: f64,
    #[serde(default = "default_max_rate")]
    pub max_rate: f64,
    /// FRED series holding the policy rate (e.g. `DFEDTARU`).
    #[serde(default)]
    pub fred_series: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MeetingsConfig {
    #[serde(default)]
    pub dates: Vec<NaiveDate>,
}

fn default_price_formula() -> PriceFormula {
    PriceFormula::PriceComplement
}

fn default_true() -> bool {
    true
}

fn default_increment_bp() -> i32 {
    25
}

fn default_max_rate() -> f64 {
    10.0
}

impl BankConfig {
    /// Check the configuration-level invariants the core relies on.
    pub fn validate(&self) -> Result<(), CurveError> {
        policy_step(self.policy.increment_bp)?;
        validate_bounds(self.policy.min_rate, self.policy.max_rate)?;
        if !self.policy.current_rate.is_finite() {
            return Err(CurveError::NonFiniteInput("policy.current_rate"));
        }
        validate_guards(&self.guards)
    }

    /// Resolved quote sheet path, if the config names one.
    pub fn quotes_path(&self) -> Option<PathBuf> {
        self.futures.quotes.as_ref().map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                self.base_dir.join(p)
            }
        })
    }

    pub fn display_name(&self) -> &str {
        if self.bank.name.is_empty() {
            &self.bank.code
        } else {
            &self.bank.name
        }
    }
}

/// Parse and validate a bank config from TOML text.
pub fn parse_bank_config(text: &str) -> Result<BankConfig, AppError> {
    let config: BankConfig =
        toml::from_str(text).map_err(|e| AppError::new(2, format!("Invalid bank config: {e}")))?;
    config.validate()?;
    Ok(config)
}

/// Load a bank config from disk.
pub fn load_bank_config(path: &Path) -> Result<BankConfig, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to read config '{}': {e}", path.display())))?;
    let mut config = parse_bank_config(&text)
        .map_err(|e| AppError::new(e.exit_code(), format!("{}: {e}", path.display())))?;
    config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

    tracing::info!(
        bank = %config.bank.code,
        meetings = config.meetings.dates.len(),
        formula = config.futures.price_formula.name(),
        "loaded bank config"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::QualityTier;

    const FED: &str = r#"
[bank]
code = "FED"
name = "Federal Reserve"

[futures]
quotes = "fed_funds.csv"
symbol_root = "ZQ"
price_formula = "priceComplement"

[policy]
current_rate = 3.875
increment_bp = 25
fred_series = "DFEDTARU"

[quality]
min_tier = "medium"
medium = { min_open_interest = 1000, min_daily_volume = 100 }

[meetings]
dates = ["2026-01-28", "2026-03-18"]
"#;

    #[test]
    fn parses_full_config_with_defaults() {
        let cfg = parse_bank_config(FED).unwrap();
        assert_eq!(cfg.bank.code, "FED");
        assert_eq!(cfg.futures.price_formula, PriceFormula::PriceComplement);
        assert!(cfg.futures.densify);
        assert_eq!(cfg.policy.increment_bp, 25);
        assert_eq!(cfg.policy.min_rate, 0.0);
        assert_eq!(cfg.policy.max_rate, 10.0);
        assert_eq!(cfg.guards, StabilityGuards::default());
        assert_eq!(cfg.quality.min_tier, QualityTier::Medium);
        assert_eq!(cfg.quality.medium.min_daily_volume, 100);
        assert!(cfg.quality.ignore_missing_spread);
        assert_eq!(cfg.meetings.dates.len(), 2);
        assert_eq!(cfg.meetings.dates[0], NaiveDate::from_ymd_opt(2026, 1, 28).unwrap());
    }

    #[test]
    fn rejects_unknown_price_formula() {
        let text = FED.replace("\"priceComplement\"", "\"yield\"");
        let err = parse_bank_config(&text).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("Unknown price formula"));
    }

    #[test]
    fn rejects_non_positive_increment() {
        let text = FED.replace("increment_bp = 25", "increment_bp = 0");
        let err = parse_bank_config(&text).unwrap_err();
        assert!(err.message().contains("increment_bp"));
    }

    #[test]
    fn rejects_inverted_bounds() {
        let text = FED.replace("increment_bp = 25", "increment_bp = 25\nmin_rate = 5.0\nmax_rate = 1.0");
        assert!(parse_bank_config(&text).is_err());
    }

    #[test]
    fn rejects_negative_guards() {
        let text = format!("{FED}\n[guards]\nclamp_pp = -1.0\n");
        let err = parse_bank_config(&text).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("clamp_pp"));

        let text = format!("{FED}\n[guards]\nmax_move_bp = -5.0\n");
        assert!(parse_bank_config(&text).unwrap_err().message().contains("max_move_bp"));
    }

    #[test]
    fn quotes_path_resolves_relative_to_config() {
        let mut cfg = parse_bank_config(FED).unwrap();
        cfg.base_dir = PathBuf::from("configs");
        assert_eq!(cfg.quotes_path(), Some(PathBuf::from("configs").join("fed_funds.csv")));
    }
}
