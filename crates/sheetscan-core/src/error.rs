//! Error types for sheetscan-core
//!
//! Provides a unified error type for geometry and raster operations in the
//! core crate. Each variant captures enough context for diagnostics without
//! exposing internal implementation details.

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid rectangle parameters
    #[error("invalid rectangle: {0}")]
    InvalidRect(String),

    /// Rotation angle is not a multiple of 90 degrees
    #[error("invalid rotation angle: {0} (must be a multiple of 90)")]
    InvalidAngle(i32),

    /// Invalid raster dimensions
    #[error("invalid raster dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// Raw buffer length does not match the declared dimensions
    #[error("buffer length mismatch: expected {expected}, got {actual}")]
    BufferMismatch { expected: usize, actual: usize },

    /// Region lies outside the raster bounds
    #[error("region out of bounds: {x},{y} {w}x{h} in {width}x{height}")]
    RegionOutOfBounds {
        x: u32,
        y: u32,
        w: u32,
        h: u32,
        width: u32,
        height: u32,
    },

    /// A percentage rectangle resolves to an empty pixel region
    #[error("degenerate region: {0}")]
    DegenerateRegion(String),

    /// Image bytes could not be decoded
    #[error("decode error: {0}")]
    Decode(String),

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
