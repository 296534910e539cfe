//! Monthly curve construction from raw quotes.
//!
//! Quote sheets routinely carry several contracts (or several prints of the same
//! contract) for one delivery month. We keep exactly one quote per month, the
//! most traded one, and convert its price to an implied rate.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::domain::{FuturesQuote, MonthlyRatePoint, PriceFormula, YearMonth};
use crate::math::round_dp;

/// Decimals kept on monthly implied rates.
pub const RATE_DECIMALS: i32 = 4;

/// Convert a futures price to an implied rate (percent).
pub fn price_to_rate(price: f64, formula: PriceFormula) -> f64 {
    match formula {
        PriceFormula::PriceComplement => 100.0 - price,
        PriceFormula::Direct => price,
    }
}

/// Keep one quote per month: greatest volume wins.
///
/// Volume ties resolve to the lexicographically smallest symbol, then the
/// lowest price, so the result never depends on input order. Output is
/// ascending by month.
pub fn select_one_per_month(quotes: &[FuturesQuote]) -> Vec<FuturesQuote> {
    let mut best: BTreeMap<YearMonth, &FuturesQuote> = BTreeMap::new();
    for q in quotes {
        if !q.price.is_finite() {
            tracing::debug!(symbol = %q.symbol, month = %q.month, "skipping quote with non-finite price");
            continue;
        }
        best.entry(q.month)
            .and_modify(|cur| {
                if preference(q, *cur) == Ordering::Less {
                    *cur = q;
                }
            })
            .or_insert(q);
    }
    best.into_values().cloned().collect()
}

/// `Less` means `a` is preferred over `b`.
fn preference(a: &FuturesQuote, b: &FuturesQuote) -> Ordering {
    b.volume
        .cmp(&a.volume)
        .then_with(|| a.symbol.cmp(&b.symbol))
        .then_with(|| a.price.total_cmp(&b.price))
}

/// Build the monthly curve: select, convert, round to 4 decimals.
pub fn build_curve(quotes: &[FuturesQuote], formula: PriceFormula) -> Vec<MonthlyRatePoint> {
    select_one_per_month(quotes)
        .into_iter()
        .map(|q| MonthlyRatePoint {
            month: q.month,
            rate: round_dp(price_to_rate(q.price, formula), RATE_DECIMALS),
            source_quote: Some(q),
            is_synthetic: false,
        })
        .collect()
}

/// Drop points strictly before `now_month`.
pub fn strip_past_months(curve: &[MonthlyRatePoint], now_month: YearMonth) -> Vec<MonthlyRatePoint> {
    curve.iter().filter(|p| p.month >= now_month).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    fn quote(symbol: &str, month: &str, price: f64, volume: u64) -> FuturesQuote {
        FuturesQuote {
            symbol: symbol.to_string(),
            month: ym(month),
            price,
            volume,
            open_interest: None,
            bid_ask_spread_bp: None,
        }
    }

    #[test]
    fn price_complement_and_direct() {
        assert!((price_to_rate(96.1, PriceFormula::PriceComplement) - 3.9).abs() < 1e-12);
        assert_eq!(price_to_rate(3.9, PriceFormula::Direct), 3.9);
    }

    #[test]
    fn selection_keeps_highest_volume() {
        let quotes = vec![
            quote("ZQH26", "2026-03", 96.30, 100),
            quote("ZQH26", "2026-03", 96.35, 900),
            quote("ZQH26", "2026-03", 96.40, 50),
        ];
        let selected = select_one_per_month(&quotes);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].volume, 900);
        assert_eq!(selected[0].price, 96.35);
    }

    #[test]
    fn volume_ties_are_order_independent() {
        let a = quote("ZQH26", "2026-03", 96.30, 500);
        let b = quote("ZQH26.X", "2026-03", 96.10, 500);
        let c = quote("ZQH26", "2026-03", 96.25, 500);

        let forward = select_one_per_month(&[a.clone(), b.clone(), c.clone()]);
        let backward = select_one_per_month(&[c, b, a]);
        assert_eq!(forward, backward);
        // Same smallest symbol on two quotes, lower price wins.
        assert_eq!(forward[0].symbol, "ZQH26");
        assert_eq!(forward[0].price, 96.25);
    }

    #[test]
    fn selection_sorts_by_month() {
        let quotes = vec![
            quote("ZQM26", "2026-06", 96.5, 10),
            quote("ZQF26", "2026-01", 96.1, 10),
            quote("ZQH26", "2026-03", 96.3, 10),
        ];
        let months: Vec<String> = select_one_per_month(&quotes).iter().map(|q| q.month.to_string()).collect();
        assert_eq!(months, vec!["2026-01", "2026-03", "2026-06"]);
    }

    #[test]
    fn build_curve_rounds_to_four_decimals() {
        let curve = build_curve(&[quote("ZQF26", "2026-01", 96.12344, 1)], PriceFormula::PriceComplement);
        assert_eq!(curve.len(), 1);
        assert_eq!(curve[0].rate, 3.8766);
        assert!(!curve[0].is_synthetic);
        assert_eq!(curve[0].source_quote.as_ref().unwrap().symbol, "ZQF26");
    }

    #[test]
    fn strip_keeps_current_month() {
        let curve = build_curve(
            &[
                quote("ZQX25", "2025-11", 96.1, 1),
                quote("ZQZ25", "2025-12", 96.2, 1),
                quote("ZQF26", "2026-01", 96.3, 1),
            ],
            PriceFormula::PriceComplement,
        );
        let stripped = strip_past_months(&curve, ym("2025-12"));
        assert_eq!(stripped.len(), 2);
        assert_eq!(stripped[0].month, ym("2025-12"));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn quotes_strategy() -> impl Strategy<Value = Vec<FuturesQuote>> {
            prop::collection::vec((0i64..24, 90.0f64..100.0, 0u64..5, 0u8..3), 1..30).prop_map(|rows| {
                rows.into_iter()
                    .map(|(m, price, volume, tag)| FuturesQuote {
                        symbol: format!("ZQ{tag}"),
                        month: YearMonth::from_index(2026 * 12 + m),
                        price,
                        volume,
                        open_interest: None,
                        bid_ask_spread_bp: None,
                    })
                    .collect()
            })
        }

        proptest! {
            #[test]
            fn distinct_months_select_is_identity(months in prop::collection::btree_set(0i64..48, 1..20)) {
                let quotes: Vec<FuturesQuote> = months
                    .iter()
                    .map(|&m| FuturesQuote {
                        symbol: String::new(),
                        month: YearMonth::from_index(2026 * 12 + m),
                        price: 96.0,
                        volume: 1,
                        open_interest: None,
                        bid_ask_spread_bp: None,
                    })
                    .collect();
                let mut reversed = quotes.clone();
                reversed.reverse();
                prop_assert_eq!(select_one_per_month(&reversed), quotes);
            }

            #[test]
            fn selected_quote_has_max_volume(quotes in quotes_strategy()) {
                let selected = select_one_per_month(&quotes);
                for s in &selected {
                    let max_volume = quotes.iter().filter(|q| q.month == s.month).map(|q| q.volume).max().unwrap();
                    prop_assert_eq!(s.volume, max_volume);
                }
                let mut reversed = quotes.clone();
                reversed.reverse();
                prop_assert_eq!(select_one_per_month(&reversed), selected);
            }

            #[test]
            fn complement_round_trips_to_100(price in 80.0f64..101.0) {
                let rate = price_to_rate(price, PriceFormula::PriceComplement);
                prop_assert!((rate + price - 100.0).abs() < 1e-9);
            }
        }
    }
}
