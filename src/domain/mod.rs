//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - calendar and conversion primitives (`YearMonth`, `PriceFormula`)
//! - market inputs (`FuturesQuote`) and the monthly curve (`MonthlyRatePoint`)
//! - meeting outputs (`MeetingExpectation`, `RateDistribution`, `MeetingSummary`)

pub mod types;

pub use types::*;
