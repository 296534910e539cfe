//! `implied-path` library crate.
//!
//! The binary (`ipath`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the curve, meeting and scenario stages are reusable on their own
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod curve;
pub mod data;
pub mod debug;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod meetings;
pub mod plot;
pub mod report;
pub mod scenario;
