//! Error types for sheetscan-barcode

use thiserror::Error;

/// Barcode error type
#[derive(Error, Debug)]
pub enum BarcodeError {
    /// Propagated core raster/geometry error
    #[error(transparent)]
    Core(#[from] sheetscan_core::CoreError),

    /// Signal extraction failed (too few crossings, bad unit width)
    #[error("barcode signal error: {0}")]
    Signal(String),

    /// Width sequence does not form a valid symbol
    #[error("barcode format error: {0}")]
    Format(String),

    /// No decodable barcode in any candidate zone
    #[error("no barcode found")]
    NoBarcode,

    /// Invalid decoding parameter
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for barcode operations
pub type BarcodeResult<T> = std::result::Result<T, BarcodeError>;
