//! Project an expected rate onto the policy grid.
//!
//! The distribution is the simplest robust one: mass is split linearly between
//! the two grid levels bracketing the expected rate.
//!
//! Example: expected 3.37 with a 25bp grid lies between 3.25 and 3.50;
//! `p(3.50) = (3.37 - 3.25) / 0.25 = 0.48` and `p(3.25) = 0.52`.

use std::cmp::Ordering;

use crate::domain::{CutHoldHike, RateDistribution, RateLevel, Scenario, TopScenarios};
use crate::error::CurveError;
use crate::math::{GRID_EPS, floor_to_step, policy_step, round_dp};

const PROB_DECIMALS: i32 = 6;

/// Build the two-level distribution for `expected_rate`.
pub fn distribution_from_expected(
    expected_rate: f64,
    increment_bp: i32,
    min_rate: f64,
    max_rate: f64,
) -> Result<RateDistribution, CurveError> {
    let step = policy_step(increment_bp)?;
    validate_bounds(min_rate, max_rate)?;
    if !expected_rate.is_finite() {
        return Err(CurveError::NonFiniteInput("expected_rate"));
    }

    let expected = expected_rate.clamp(min_rate, max_rate);
    let lo = floor_to_step(expected, step);
    let mut hi = round_dp(lo + step, 6);
    if hi > max_rate + GRID_EPS {
        hi = lo;
    }

    if (expected - lo).abs() < GRID_EPS || hi == lo {
        return Ok(point_mass(lo));
    }

    let p_high = round_dp((expected - lo) / step, PROB_DECIMALS);
    if p_high <= 0.0 {
        return Ok(point_mass(lo));
    }
    if p_high >= 1.0 {
        return Ok(point_mass(hi));
    }
    let p_low = round_dp(1.0 - p_high, PROB_DECIMALS);

    Ok(RateDistribution {
        levels: vec![
            RateLevel {
                rate: lo,
                probability: p_low,
            },
            RateLevel {
                rate: hi,
                probability: p_high,
            },
        ],
    })
}

fn point_mass(rate: f64) -> RateDistribution {
    RateDistribution {
        levels: vec![RateLevel { rate, probability: 1.0 }],
    }
}

/// Aggregate a distribution into cut / hold / hike mass relative to `current_rate`.
///
/// The current rate is first aligned down to the grid, so an off-grid
/// current rate (e.g. a range midpoint) compares against its grid floor.
pub fn cut_hold_hike(
    distribution: &RateDistribution,
    current_rate: f64,
    increment_bp: i32,
) -> Result<CutHoldHike, CurveError> {
    let step = policy_step(increment_bp)?;
    let current = floor_to_step(current_rate, step);

    let mut out = CutHoldHike::default();
    for level in &distribution.levels {
        if level.rate < current - GRID_EPS {
            out.cut += level.probability;
        } else if level.rate > current + GRID_EPS {
            out.hike += level.probability;
        } else {
            out.hold += level.probability;
        }
    }
    Ok(out)
}

/// The one or two most probable levels, most probable first.
///
/// Ties keep the lower rate first. `None` only for an empty distribution.
pub fn top_two_scenarios(distribution: &RateDistribution) -> Option<TopScenarios> {
    let mut levels = distribution.levels.clone();
    levels.sort_by(|a, b| {
        b.probability
            .partial_cmp(&a.probability)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.rate.total_cmp(&b.rate))
    });

    let mut it = levels.into_iter().map(|l| Scenario {
        rate: l.rate,
        probability: l.probability,
    });
    let main = it.next()?;
    Some(TopScenarios { main, alt: it.next() })
}

pub(crate) fn validate_bounds(min_rate: f64, max_rate: f64) -> Result<(), CurveError> {
    if !min_rate.is_finite() {
        return Err(CurveError::NonFiniteInput("min_rate"));
    }
    if !max_rate.is_finite() {
        return Err(CurveError::NonFiniteInput("max_rate"));
    }
    if min_rate > max_rate {
        return Err(CurveError::InvalidRateBounds {
            min: min_rate,
            max: max_rate,
        });
    }
    Ok(())
}
