//! Distribution & scenario builder.
//!
//! Responsibilities:
//!
//! - project the nearest expected rate onto the policy grid
//! - classify the mass as cut / hold / hike
//! - pick the two most probable outcomes

pub mod distribution;
pub mod summary;

pub use distribution::*;
pub use summary::*;
