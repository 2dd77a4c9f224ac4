//! Strategy selection between the two scoring paths

use crate::density::{DensityOptions, score_density};
use crate::error::{ScoreError, ScoreResult};
use crate::subtract::{SubtractOptions, score_subtraction};
use sheetscan_core::{GrayRaster, PixelRect};

/// Outcome of scoring a single zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneScore {
    /// Whether the zone is considered marked
    pub checked: bool,
    /// Measured ink fraction
    pub ink_ratio: f64,
    /// Threshold the ratio was compared against
    pub threshold: f64,
}

/// Which scoring path a document uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreStrategy {
    /// Adaptive density over the scan alone
    Density,
    /// Subtraction of a clean template render
    ModelSubtraction,
}

impl ScoreStrategy {
    /// Pick the strategy for a document: subtraction whenever a template
    /// render exists, density otherwise.
    pub fn for_document(has_template_raster: bool) -> Self {
        if has_template_raster {
            ScoreStrategy::ModelSubtraction
        } else {
            ScoreStrategy::Density
        }
    }
}

/// Combined tunables for both scoring paths.
#[derive(Debug, Clone, Default)]
pub struct ScoreOptions {
    /// Density-path parameters
    pub density: DensityOptions,
    /// Subtraction-path parameters
    pub subtract: SubtractOptions,
}

/// Score one zone with the given strategy.
///
/// `template` pairs the template render with the zone's rectangle on it;
/// it is required for [`ScoreStrategy::ModelSubtraction`] and ignored by
/// [`ScoreStrategy::Density`].
pub fn score_zone(
    strategy: ScoreStrategy,
    scan: &GrayRaster,
    scan_zone: &PixelRect,
    template: Option<(&GrayRaster, &PixelRect)>,
    opts: &ScoreOptions,
) -> ScoreResult<ZoneScore> {
    match strategy {
        ScoreStrategy::Density => score_density(scan, scan_zone, &opts.density),
        ScoreStrategy::ModelSubtraction => {
            let (template_raster, template_zone) =
                template.ok_or(ScoreError::MissingTemplate)?;
            score_subtraction(scan, scan_zone, template_raster, template_zone, &opts.subtract)
        }
    }
}
