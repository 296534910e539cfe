//! Input/output helpers.
//!
//! - bank config loading (`config`)
//! - quote CSV ingest + validation (`ingest`)
//! - futures symbol decoding (`symbols`)
//! - result exports (CSV) (`export`)
//! - run JSON read/write (`run`)

pub mod config;
pub mod export;
pub mod ingest;
pub mod run;
pub mod symbols;

pub use config::*;
pub use export::*;
pub use ingest::*;
pub use run::*;
pub use symbols::*;
