//! Error types for sheetscan-score

use thiserror::Error;

/// Scoring error type
#[derive(Error, Debug)]
pub enum ScoreError {
    /// Propagated core raster/geometry error
    #[error(transparent)]
    Core(#[from] sheetscan_core::CoreError),

    /// Zone rectangle collapses to nothing after margins are applied
    #[error("degenerate zone region: {0}")]
    DegenerateZone(String),

    /// Model-subtraction requested without a template raster
    #[error("model-subtraction scoring requires a template raster")]
    MissingTemplate,

    /// Invalid scoring parameter
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for scoring operations
pub type ScoreResult<T> = std::result::Result<T, ScoreError>;
