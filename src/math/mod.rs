//! Numeric utilities: rounding and grid arithmetic.

pub mod rounding;

pub use rounding::*;
