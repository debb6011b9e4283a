//! Error types for the aggregation pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a [`GridIndexer`](crate::grid::GridIndexer).
#[derive(Error, Debug)]
pub enum GridError {
    /// The grid does not support the requested resolution.
    #[error("invalid resolution {resolution}: {reason}")]
    InvalidResolution { resolution: u8, reason: String },

    /// The coordinate cannot be placed on the grid.
    #[error("invalid coordinate ({lat}, {lon}): {reason}")]
    InvalidCoordinate { lat: f64, lon: f64, reason: String },

    /// The cell identifier is not one the grid produced.
    #[error("invalid cell id {cell_id:?}: {reason}")]
    InvalidCell { cell_id: String, reason: String },
}

/// Errors that abort a whole pipeline run.
///
/// Row-level defects never show up here; those rows are dropped by the loader.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The tabular source does not exist.
    #[error("source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The header row lacks one or more required columns.
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Grid(#[from] GridError),
}
