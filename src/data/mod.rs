//! External and synthetic market data.
//!
//! - FRED observations for the current policy rate (`fred`)
//! - seeded synthetic quote sheets (`sample`)

pub mod fred;
pub mod sample;

pub use fred::*;
pub use sample::*;
