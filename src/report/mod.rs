//! Reporting utilities: formatted terminal output for a run.
//!
//! We keep formatting code in one place so:
//! - the curve/meeting code stays clean and testable
//! - output changes are localized (the tests below pin the layout)

pub mod format;

pub use format::*;
