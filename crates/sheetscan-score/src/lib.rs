//! sheetscan-score - Mark detection for overlay zones
//!
//! Two scoring paths decide whether a zone carries handwritten ink: an
//! adaptive ink-density measure over the scan alone, and model
//! subtraction against a clean template render when one is available.

pub mod density;
pub mod error;
pub mod mask;
pub mod strategy;
pub mod subtract;

pub use density::{DensityOptions, density_threshold_for_area, score_density};
pub use error::{ScoreError, ScoreResult};
pub use mask::{BitMask, box_blur_3x3};
pub use strategy::{ScoreOptions, ScoreStrategy, ZoneScore, score_zone};
pub use subtract::{SubtractOptions, score_subtraction};
