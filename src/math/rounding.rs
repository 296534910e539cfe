//! Fixed-point conventions for rates on a policy-increment grid.
//!
//! All rounding is round-half-away-from-zero (`f64::round`), applied the same
//! way everywhere so that identical inputs give bit-identical outputs.
//!
//! Grid arithmetic is done in units of `step` and then cleaned to 6 decimals;
//! this removes float noise such as `15 * 0.25 = 3.7500000000000004`.

use crate::error::CurveError;

/// Tolerance used when comparing a value against a grid level.
pub const GRID_EPS: f64 = 1e-9;

/// Decimals kept after snapping to a grid.
const GRID_DECIMALS: i32 = 6;

/// Round `x` to `decimals` digits, half away from zero.
pub fn round_dp(x: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (x * scale).round() / scale
}

/// Convert an increment in bp to a grid step in percentage points.
pub fn policy_step(increment_bp: i32) -> Result<f64, CurveError> {
    if increment_bp <= 0 {
        return Err(CurveError::NonPositiveIncrement(increment_bp));
    }
    Ok(f64::from(increment_bp) / 100.0)
}

/// Snap `rate` to the nearest multiple of `step`.
pub fn snap_to_step(rate: f64, step: f64) -> f64 {
    round_dp((rate / step).round() * step, GRID_DECIMALS)
}

/// Largest grid level `<= x` (with a small tolerance for float noise just below a level).
pub fn floor_to_step(x: f64, step: f64) -> f64 {
    round_dp((x / step + GRID_EPS).floor() * step, GRID_DECIMALS)
}

/// Difference between two rates in basis points.
pub fn to_bp(delta_pct: f64) -> f64 {
    delta_pct * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_dp_is_half_away_from_zero() {
        assert_eq!(round_dp(3.66666666, 4), 3.6667);
        assert_eq!(round_dp(-0.125, 2), -0.13);
        assert_eq!(round_dp(2.5, 0), 3.0);
    }

    #[test]
    fn snap_breaks_ties_away_from_zero() {
        // 3.875 sits exactly between 3.75 and 4.00.
        assert_eq!(snap_to_step(3.875, 0.25), 4.0);
        assert_eq!(snap_to_step(-0.125, 0.25), -0.25);
        assert_eq!(snap_to_step(3.8176, 0.25), 3.75);
    }

    #[test]
    fn floor_tolerates_float_noise() {
        assert_eq!(floor_to_step(0.3, 0.1), 0.3);
        assert_eq!(floor_to_step(3.37, 0.25), 3.25);
        assert_eq!(floor_to_step(3.5, 0.25), 3.5);
        assert_eq!(floor_to_step(-0.1, 0.25), -0.25);
    }

    #[test]
    fn policy_step_rejects_non_positive() {
        assert_eq!(policy_step(25).unwrap(), 0.25);
        assert!(policy_step(0).is_err());
        assert!(policy_step(-25).is_err());
    }
}
