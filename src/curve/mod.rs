//! Monthly curve builder.
//!
//! Responsibilities:
//!
//! - convert futures prices to implied rates
//! - collapse duplicate quotes to one point per month
//! - strip months already in the past
//! - densify sparse coverage with synthetic points
//! - tier quotes by liquidity (used by ingest)

pub mod builder;
pub mod densify;
pub mod quality;

pub use builder::*;
pub use densify::*;
pub use quality::*;
