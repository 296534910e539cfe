//! Back-solve the rate expected after each policy meeting.
//!
//! A monthly futures rate averages the rate before and after any meeting held
//! during that month, weighted by calendar days:
//!
//! `R_month = w_before * R_before + w_after * R_after`
//!
//! so, knowing `R_before` (the previous meeting's outcome, or the current
//! policy rate for the first meeting):
//!
//! `R_after = (R_month - w_before * R_before) / w_after`
//!
//! The engine is a fold over the sorted meeting dates; the accumulator is the
//! anchor rate `R_before`. A date that cannot be resolved to any monthly
//! observation is skipped and leaves the anchor untouched.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};

use crate::domain::{Adjustment, MeetingExpectation, MonthlyRatePoint, StabilityGuards, YearMonth};
use crate::error::CurveError;
use crate::math::{policy_step, snap_to_step, to_bp};

/// Below this, `w_after` is treated as zero.
const WEIGHT_EPS: f64 = 1e-9;

/// Outcome of looking up the monthly rate for a meeting month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MonthLookup {
    /// `month` is the month actually used; it is later than the meeting
    /// month when the exact month had no observation.
    Found { month: YearMonth, rate: f64 },
    Unresolved,
}

/// Read-only month → rate index over a monthly curve.
#[derive(Debug, Clone, Default)]
pub struct MonthIndex {
    rates: BTreeMap<YearMonth, f64>,
}

impl MonthIndex {
    pub fn new(curve: &[MonthlyRatePoint]) -> Self {
        Self {
            rates: curve.iter().map(|p| (p.month, p.rate)).collect(),
        }
    }

    /// Exact month first, else the first available month after it.
    pub fn resolve(&self, month: YearMonth) -> MonthLookup {
        match self.rates.range(month..).next() {
            Some((&m, &rate)) => MonthLookup::Found { month: m, rate },
            None => MonthLookup::Unresolved,
        }
    }

    pub fn rate(&self, month: YearMonth) -> Option<f64> {
        self.rates.get(&month).copied()
    }
}

/// Compute the after-meeting curve with default stability guards.
pub fn compute_after_meeting_curve(
    monthly_curve: &[MonthlyRatePoint],
    meeting_dates: &[NaiveDate],
    current_rate: f64,
    increment_bp: i32,
) -> Result<Vec<MeetingExpectation>, CurveError> {
    compute_after_meeting_curve_with(
        monthly_curve,
        meeting_dates,
        current_rate,
        increment_bp,
        &StabilityGuards::default(),
    )
}

/// Compute the after-meeting curve with explicit stability guards.
///
/// Dates are de-duplicated and sorted before processing. Output is in
/// chronological order and never longer than the number of distinct dates.
pub fn compute_after_meeting_curve_with(
    monthly_curve: &[MonthlyRatePoint],
    meeting_dates: &[NaiveDate],
    current_rate: f64,
    increment_bp: i32,
    guards: &StabilityGuards,
) -> Result<Vec<MeetingExpectation>, CurveError> {
    let step = policy_step(increment_bp)?;
    if !current_rate.is_finite() {
        return Err(CurveError::NonFiniteInput("current_rate"));
    }
    validate_guards(guards)?;

    let index = MonthIndex::new(monthly_curve);
    let dates: BTreeSet<NaiveDate> = meeting_dates.iter().copied().collect();

    let (_, out) = dates.into_iter().fold(
        (current_rate, Vec::new()),
        |(prev_after, mut out), date| match expect_after_meeting(&index, date, prev_after, step, guards) {
            Some(expectation) => {
                let next_anchor = expectation.rate_after;
                out.push(expectation);
                (next_anchor, out)
            }
            None => {
                tracing::debug!(meeting = %date, "no monthly rate at or after meeting month; skipped");
                (prev_after, out)
            }
        },
    );

    Ok(out)
}

/// Guard thresholds must be finite and non-negative.
pub fn validate_guards(guards: &StabilityGuards) -> Result<(), CurveError> {
    for (name, value) in [("max_move_bp", guards.max_move_bp), ("clamp_pp", guards.clamp_pp)] {
        if !value.is_finite() {
            return Err(CurveError::NonFiniteInput(name));
        }
        if value < 0.0 {
            return Err(CurveError::NegativeGuard { name, value });
        }
    }
    Ok(())
}

/// One transition of the meeting fold.
///
/// Returns `None` when neither the meeting month nor any later month has a
/// rate; the caller must then keep its anchor unchanged.
pub fn expect_after_meeting(
    index: &MonthIndex,
    date: NaiveDate,
    prev_after: f64,
    step: f64,
    guards: &StabilityGuards,
) -> Option<MeetingExpectation> {
    let month = YearMonth::from_date(date);
    let MonthLookup::Found {
        month: source_month,
        rate: month_rate,
    } = index.resolve(month)
    else {
        return None;
    };

    let dim = month.days_in_month();
    let days_before = date.day() - 1;
    let days_after = dim - days_before;
    let weight_before = f64::from(days_before) / f64::from(dim);
    let weight_after = 1.0 - weight_before;

    let mut adjustments = Vec::new();
    let exact = source_month == month;

    let mut raw = if !exact {
        // The later month lies wholly after the meeting.
        adjustments.push(Adjustment::LaterMonth);
        month_rate
    } else if weight_after > WEIGHT_EPS {
        (month_rate - weight_before * prev_after) / weight_after
    } else {
        adjustments.push(Adjustment::MonthEnd);
        month_rate
    };

    let too_late_in_month = exact && days_after < guards.min_days_after;
    let too_large_move = to_bp((raw - prev_after).abs()) > guards.max_move_bp;
    if too_late_in_month || too_large_move {
        match index.rate(source_month.next()) {
            Some(next_rate) => {
                tracing::warn!(
                    meeting = %date,
                    days_after,
                    raw,
                    substitute = next_rate,
                    "unstable back-solve; using following month rate"
                );
                raw = next_rate;
                adjustments.push(Adjustment::FollowingMonth);
            }
            None => {
                let clamped = raw.clamp(prev_after - guards.clamp_pp, prev_after + guards.clamp_pp);
                tracing::warn!(
                    meeting = %date,
                    days_after,
                    raw,
                    clamped,
                    "unstable back-solve and no following month; clamping"
                );
                raw = clamped;
                adjustments.push(Adjustment::Clamped);
            }
        }
    }

    let rate_after = snap_to_step(raw, step);

    Some(MeetingExpectation {
        meeting_date: date,
        month,
        source_month,
        rate_after_raw: raw,
        rate_after,
        move_raw_bp: to_bp(raw - prev_after),
        move_after_bp: to_bp(rate_after - prev_after),
        weight_before,
        weight_after,
        adjustments,
    })
}
