//! Fill monthly coverage gaps by linear interpolation.
//!
//! Interpolation runs in month-index space (`year * 12 + month - 1`), not in
//! calendar days: a gap of three months gets fractions 1/3 and 2/3 whatever
//! the month lengths are.

use crate::curve::builder::RATE_DECIMALS;
use crate::domain::MonthlyRatePoint;
use crate::math::round_dp;

/// Insert synthetic points between consecutive points more than one month apart.
///
/// Existing points are copied unchanged. With fewer than two points the input
/// is returned as-is.
pub fn densify_linear(curve: &[MonthlyRatePoint]) -> Vec<MonthlyRatePoint> {
    if curve.len() < 2 {
        return curve.to_vec();
    }

    let mut out = Vec::with_capacity(curve.len());
    for pair in curve.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        out.push(a.clone());

        let gap = a.month.months_until(b.month);
        if gap <= 1 {
            continue;
        }
        for k in 1..gap {
            let t = k as f64 / gap as f64;
            let month = crate::domain::YearMonth::from_index(a.month.index() + k);
            out.push(MonthlyRatePoint {
                month,
                rate: round_dp(a.rate + (b.rate - a.rate) * t, RATE_DECIMALS),
                source_quote: None,
                is_synthetic: true,
            });
        }
        tracing::debug!(from = %a.month, to = %b.month, inserted = gap - 1, "densified gap");
    }
    if let Some(last) = curve.last() {
        out.push(last.clone());
    }
    out
}
