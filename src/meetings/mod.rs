//! Meeting interpolation engine: monthly curve → expected rate after each meeting.

pub mod engine;

pub use engine::*;
