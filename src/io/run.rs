//! Read/write run JSON files.
//!
//! Run JSON is the "portable" representation of one bank's run:
//! - bank identity + as-of date + policy grid
//! - the monthly curve and the meeting path
//! - the next-meeting summary (distribution, cut/hold/hike, scenarios)
//!
//! The schema is defined by `domain::RunFile`.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::domain::RunFile;
use crate::error::AppError;

/// Write a run JSON file.
pub fn write_run_json(path: &Path, run: &RunFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create run JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(BufWriter::new(file), run)
        .map_err(|e| AppError::new(4, format!("Failed to write run JSON: {e}")))?;

    Ok(())
}

/// Read a run JSON file.
pub fn read_run_json(path: &Path) -> Result<RunFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open run JSON '{}': {e}", path.display())))?;
    let run: RunFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid run JSON: {e}")))?;
    Ok(run)
}
