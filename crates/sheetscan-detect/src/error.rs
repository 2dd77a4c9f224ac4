//! Error types for sheetscan-detect

use thiserror::Error;

/// Detection error type
#[derive(Error, Debug)]
pub enum DetectError {
    /// Propagated core raster/geometry error
    #[error(transparent)]
    Core(#[from] sheetscan_core::CoreError),

    /// The page carries no measurable edge energy (blank or uniform image)
    #[error("no printed content detected")]
    NoContent,

    /// Invalid detection parameter
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for detection operations
pub type DetectResult<T> = std::result::Result<T, DetectError>;
