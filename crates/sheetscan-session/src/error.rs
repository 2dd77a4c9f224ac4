//! Error types for sheetscan-session

use thiserror::Error;

/// Session error type
#[derive(Error, Debug)]
pub enum SessionError {
    /// Propagated core raster/geometry error
    #[error(transparent)]
    Core(#[from] sheetscan_core::CoreError),

    /// Propagated content-rect detection error
    #[error(transparent)]
    Detect(#[from] sheetscan_detect::DetectError),

    /// Propagated scoring error
    #[error(transparent)]
    Score(#[from] sheetscan_score::ScoreError),

    /// Propagated barcode error
    #[error(transparent)]
    Barcode(#[from] sheetscan_barcode::BarcodeError),

    /// Page index past the loaded document
    #[error("page index {0} out of range")]
    PageOutOfRange(usize),

    /// Scoring or normalization requested before any overlay rectangle
    /// exists for the page
    #[error("no overlay rectangle for page {0}")]
    GeometryUnavailable(usize),

    /// The persistence sink rejected a write for lack of space
    #[error("storage quota exceeded")]
    StorageQuota,

    /// Other persistence-sink failure
    #[error("storage error: {0}")]
    Storage(String),
}

/// Result type alias for session operations
pub type SessionResult<T> = std::result::Result<T, SessionError>;
