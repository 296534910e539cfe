//! Quote-sheet ingest and normalization.
//!
//! This module is responsible for turning a futures quote CSV (a Barchart
//! export, or a plain `month,price,volume` sheet) into clean `FuturesQuote`s
//! that are safe to feed to the curve builder.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden randomness)
//! - **Separation of concerns**: no curve logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::curve::{QualityThresholds, assess_quality};
use crate::domain::{FuturesQuote, YearMonth};
use crate::error::AppError;
use crate::io::symbols::symbol_to_month;

const SYMBOL_COLUMNS: [&str; 2] = ["symbol", "contract"];
const MONTH_COLUMNS: [&str; 2] = ["month", "delivery_month"];
const PRICE_COLUMNS: [&str; 4] = ["price", "latest", "last", "settle"];
const VOLUME_COLUMNS: [&str; 1] = ["volume"];
const OPEN_INTEREST_COLUMNS: [&str; 5] = ["open_interest", "open_int", "open interest", "open int", "oi"];
const SPREAD_COLUMNS: [&str; 2] = ["bid_ask_spread_bp", "spread_bp"];

/// How to interpret a quote sheet.
#[derive(Debug, Clone, Default)]
pub struct QuoteSpec {
    /// Symbol root used to decode delivery months (e.g. `ZQ`).
    pub symbol_root: String,
    pub quality: QualityThresholds,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub symbol: Option<String>,
    pub message: String,
}

/// Ingest output: normalized quotes + row errors + counters.
#[derive(Debug, Clone, Default)]
pub struct IngestedQuotes {
    pub quotes: Vec<FuturesQuote>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    /// Rows dropped for falling below the configured quality tier.
    pub rows_filtered: usize,
}

impl IngestedQuotes {
    pub fn rows_used(&self) -> usize {
        self.quotes.len()
    }
}

/// Load and normalize a quote sheet from disk.
pub fn load_quotes(path: &Path, spec: &QuoteSpec) -> Result<IngestedQuotes, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open quotes CSV '{}': {e}", path.display())))?;
    let ingested = read_quotes(file, spec)?;

    tracing::info!(
        path = %path.display(),
        rows_read = ingested.rows_read,
        rows_used = ingested.rows_used(),
        row_errors = ingested.row_errors.len(),
        rows_filtered = ingested.rows_filtered,
        "ingested quotes"
    );
    Ok(ingested)
}

/// Normalize a quote sheet from any reader.
pub fn read_quotes<R: Read>(input: R, spec: &QuoteSpec) -> Result<IngestedQuotes, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let columns = Columns::resolve(&build_header_map(&headers))?;

    let mut out = IngestedQuotes::default();

    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1, records start at line 2.
        let line = idx + 2;
        out.rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                out.row_errors.push(RowError {
                    line,
                    symbol: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &columns, &spec.symbol_root) {
            Ok(quote) => {
                let tier = assess_quality(&quote, &spec.quality);
                if tier < spec.quality.min_tier {
                    tracing::debug!(symbol = %quote.symbol, tier = tier.label(), "quote below quality cut-off");
                    out.rows_filtered += 1;
                } else {
                    out.quotes.push(quote);
                }
            }
            Err(message) => out.row_errors.push(RowError {
                line,
                symbol: get(&record, columns.symbol).map(str::to_string),
                message,
            }),
        }
    }

    if out.quotes.is_empty() {
        return Err(AppError::new(3, "No valid quotes remain after normalization/filtering."));
    }

    Ok(out)
}

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy)]
struct Columns {
    symbol: Option<usize>,
    month: Option<usize>,
    price: usize,
    volume: Option<usize>,
    open_interest: Option<usize>,
    spread: Option<usize>,
    bid: Option<usize>,
    ask: Option<usize>,
}

impl Columns {
    fn resolve(header_map: &HashMap<String, usize>) -> Result<Self, AppError> {
        let find = |names: &[&str]| find_column(header_map, names);

        let price = find(&PRICE_COLUMNS[..]).ok_or_else(|| {
            AppError::new(2, "Missing required price column: one of `price`, `latest`, `last`, `settle`.")
        })?;
        let symbol = find(&SYMBOL_COLUMNS[..]);
        let month = find(&MONTH_COLUMNS[..]);
        if symbol.is_none() && month.is_none() {
            return Err(AppError::new(
                2,
                "Missing delivery month: the CSV needs a `month` column or a decodable `symbol` column.",
            ));
        }

        Ok(Self {
            symbol,
            month,
            price,
            volume: find(&VOLUME_COLUMNS[..]),
            open_interest: find(&OPEN_INTEREST_COLUMNS[..]),
            spread: find(&SPREAD_COLUMNS[..]),
            bid: header_map.get("bid").copied(),
            ask: header_map.get("ask").copied(),
        })
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins on duplicate headers.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn find_column(header_map: &HashMap<String, usize>, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|n| header_map.get(*n).copied())
}

fn normalize_header_name(name: &str) -> String {
    // Excel and Barchart exports sometimes carry a UTF-8 BOM on the first
    // header (e.g. "\u{feff}Symbol"); without stripping it the column is missed.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, columns: &Columns, symbol_root: &str) -> Result<FuturesQuote, String> {
    let symbol = get(record, columns.symbol).unwrap_or("").to_string();

    let month = match get(record, columns.month) {
        Some(raw) => raw.parse::<YearMonth>()?,
        None => symbol_to_month(&symbol, symbol_root)
            .ok_or_else(|| format!("Could not resolve delivery month from symbol '{symbol}'."))?,
    };

    let price = get(record, Some(columns.price))
        .and_then(parse_price)
        .ok_or_else(|| "Missing/invalid price.".to_string())?;

    let volume = get(record, columns.volume).and_then(parse_count).unwrap_or(0);
    let open_interest = get(record, columns.open_interest).and_then(parse_count);

    let bid_ask_spread_bp = get(record, columns.spread).and_then(parse_price).or_else(|| {
        let bid = get(record, columns.bid).and_then(parse_price)?;
        let ask = get(record, columns.ask).and_then(parse_price)?;
        Some((ask - bid) * 100.0)
    });

    Ok(FuturesQuote {
        symbol,
        month,
        price,
        volume,
        open_interest,
        bid_ask_spread_bp,
    })
}

fn get(record: &StringRecord, idx: Option<usize>) -> Option<&str> {
    record.get(idx?).map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a price, tolerating thousands separators and trailing flags
/// (Barchart marks settlement prices as `96.1350s`).
fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|&c| c != ',').collect();
    let cleaned = cleaned.trim_end_matches(|c: char| !(c.is_ascii_digit() || c == '.'));
    let v = cleaned.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

fn parse_count(raw: &str) -> Option<u64> {
    let cleaned: String = raw.chars().filter(|&c| c != ',').collect();
    if let Ok(v) = cleaned.parse::<u64>() {
        return Some(v);
    }
    let v = cleaned.parse::<f64>().ok()?;
    if v.is_finite() && v >= 0.0 { Some(v.round() as u64) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::TierThresholds;
    use crate::domain::QualityTier;

    fn zq() -> QuoteSpec {
        QuoteSpec {
            symbol_root: "ZQ".to_string(),
            quality: QualityThresholds::default(),
        }
    }

    #[test]
    fn reads_barchart_export() {
        let csv = "\u{feff}Symbol,Name,Latest,Change,%Change,Open,High,Low,Volume,Time\n\
                   ZQZ25,30-Day Fed Funds Dec '25,96.1350s,0.005,+0.01%,96.13,96.14,96.13,\"12,345\",12/01/25\n\
                   ZQF26,30-Day Fed Funds Jan '26,96.2900,0.01,+0.01%,96.28,96.30,96.27,8021,12/01/25\n\
                   \"Downloaded from Barchart.com as of 12-01-2025 05:00pm CST\"\n";
        let ingested = read_quotes(csv.as_bytes(), &zq()).unwrap();

        assert_eq!(ingested.rows_read, 3);
        assert_eq!(ingested.rows_used(), 2);
        assert_eq!(ingested.row_errors.len(), 1);
        assert_eq!(ingested.row_errors[0].line, 4);

        let q = &ingested.quotes[0];
        assert_eq!(q.symbol, "ZQZ25");
        assert_eq!(q.month, YearMonth::new(2025, 12).unwrap());
        assert_eq!(q.price, 96.135);
        assert_eq!(q.volume, 12_345);
        assert_eq!(ingested.quotes[1].month, YearMonth::new(2026, 1).unwrap());
    }

    #[test]
    fn reads_plain_month_sheet_with_spread() {
        let csv = "month,price,volume,open_interest,bid,ask\n\
                   2026-03,96.30,,1500,96.295,96.305\n";
        let ingested = read_quotes(csv.as_bytes(), &QuoteSpec::default()).unwrap();
        let q = &ingested.quotes[0];
        assert_eq!(q.month, YearMonth::new(2026, 3).unwrap());
        assert_eq!(q.volume, 0);
        assert_eq!(q.open_interest, Some(1500));
        assert!((q.bid_ask_spread_bp.unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn undecodable_symbols_are_row_errors() {
        let csv = "symbol,latest\nSR3H26,96.1\nZQH26,96.3\n";
        let ingested = read_quotes(csv.as_bytes(), &zq()).unwrap();
        assert_eq!(ingested.rows_used(), 1);
        assert_eq!(ingested.row_errors[0].symbol.as_deref(), Some("SR3H26"));
    }

    #[test]
    fn missing_price_column_is_fatal() {
        let err = read_quotes("symbol,volume\nZQH26,1\n".as_bytes(), &zq()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn empty_result_is_fatal() {
        let err = read_quotes("symbol,latest\nbogus,1\n".as_bytes(), &zq()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn quality_cut_off_filters_rows() {
        let mut spec = zq();
        spec.quality.medium = TierThresholds {
            min_open_interest: 0,
            min_daily_volume: 100,
            max_bid_ask_spread_bp: None,
        };
        spec.quality.high = TierThresholds {
            min_open_interest: 0,
            min_daily_volume: 10_000,
            max_bid_ask_spread_bp: None,
        };
        spec.quality.min_tier = QualityTier::Medium;

        let csv = "symbol,latest,volume\nZQH26,96.3,5\nZQJ26,96.4,500\n";
        let ingested = read_quotes(csv.as_bytes(), &spec).unwrap();
        assert_eq!(ingested.rows_used(), 1);
        assert_eq!(ingested.rows_filtered, 1);
        assert_eq!(ingested.quotes[0].symbol, "ZQJ26");
    }

    #[test]
    fn shipped_fed_sheet_loads() {
        let cfg = crate::io::config::load_bank_config(Path::new("configs/fed.toml")).unwrap();
        let spec = QuoteSpec {
            symbol_root: cfg.futures.symbol_root.clone(),
            quality: cfg.quality,
        };
        let ingested = load_quotes(&cfg.quotes_path().unwrap(), &spec).unwrap();

        assert_eq!(ingested.rows_read, 13);
        assert_eq!(ingested.rows_used(), 12);
        assert_eq!(ingested.row_errors.len(), 1);
        assert_eq!(ingested.quotes[0].open_interest, Some(2_474_070));
    }

    #[test]
    fn price_and_count_parsing() {
        assert_eq!(parse_price("96.1350s"), Some(96.135));
        assert_eq!(parse_price("1,096.5"), Some(1096.5));
        assert_eq!(parse_price("unch"), None);
        assert_eq!(parse_count("12,345"), Some(12_345));
        assert_eq!(parse_count("12.0"), Some(12));
        assert_eq!(parse_count("N/A"), None);
    }
}
