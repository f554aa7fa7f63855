//! Error types for the retail analytics pipeline.
//!
//! Per-cell problems never surface here: unparsable values become missing
//! and are only reported through missing-value counts. This enum covers the
//! failures that stop a stage.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input file does not exist.
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// One or more required columns are absent from the input schema.
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// Argmax over a summary table with no usable values.
    #[error("No data in summary table for column '{column}'")]
    EmptySummary { column: String },

    /// Configuration values outside their valid range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
