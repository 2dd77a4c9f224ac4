//! sheetscan-core - Data model and geometry for the sheetscan engine
//!
//! This crate provides the structures shared by every part of the
//! scan-overlay calibration and mark-detection engine:
//!
//! - [`RectPct`] - axis-aligned rectangle in percentage page coordinates
//! - [`Rotation`] - clockwise quarter-turn page rotation
//! - [`OverlayZone`] / [`SheetTemplate`] - the persisted template shapes
//! - [`GrayRaster`] / [`PixelRect`] - 8-bit luminance raster and pixel regions
//!
//! All geometry here is pure: functions take snapshots and return new
//! values, never mutating caller-owned state.

pub mod error;
pub mod raster;
pub mod rect;
pub mod zone;

pub use error::{CoreError, Result};
pub use raster::{GrayRaster, PixelRect, RegionStats};
pub use rect::{
    MIN_RECT_PCT, RectPct, Rotation, map_display_delta_to_model, map_model_delta_to_display,
};
pub use zone::{
    MIN_ZONE_PCT, OverlayZone, SheetTemplate, compute_tight_rect, normalize_zones_against_rect,
};
