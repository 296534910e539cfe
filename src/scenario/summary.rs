//! Next-meeting summary built from the nearest meeting expectation.

use crate::domain::{MeetingExpectation, MeetingSummary};
use crate::error::CurveError;
use crate::math::{round_dp, to_bp};
use crate::scenario::distribution::{cut_hold_hike, distribution_from_expected, top_two_scenarios};

/// Summarize the first (nearest) meeting.
///
/// Returns `Ok(None)` when there is no expectation to summarize. The
/// unrounded `rate_after_raw` drives the distribution, since the snapped rate
/// would always collapse to a point mass.
pub fn build_summary(
    meeting_expectations: &[MeetingExpectation],
    current_rate: f64,
    increment_bp: i32,
    min_rate: f64,
    max_rate: f64,
) -> Result<Option<MeetingSummary>, CurveError> {
    let Some(next) = meeting_expectations.first() else {
        return Ok(None);
    };

    let expected = next.rate_after_raw;
    let distribution = distribution_from_expected(expected, increment_bp, min_rate, max_rate)?;
    let probabilities = cut_hold_hike(&distribution, current_rate, increment_bp)?;
    let Some(scenarios) = top_two_scenarios(&distribution) else {
        return Ok(None);
    };

    Ok(Some(MeetingSummary {
        current_rate,
        meeting: next.clone(),
        expected_rate_after_raw: expected,
        expected_move_bp: round_dp(to_bp(expected - current_rate), 2),
        distribution,
        probabilities,
        scenarios,
    }))
}
