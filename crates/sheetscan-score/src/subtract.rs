//! Model-subtraction ink scoring
//!
//! The preferred strategy when a clean template render of the sheet is
//! available. Both the scan and the template ROI are reduced to a small
//! working raster, the template is subtracted from the scan, and the
//! residual is cleaned up morphologically; whatever survives is ink the
//! scanner saw that the model did not predict.

use crate::error::{ScoreError, ScoreResult};
use crate::mask::{BitMask, box_blur_3x3};
use crate::strategy::ZoneScore;
use sheetscan_core::{GrayRaster, PixelRect};

/// Tunable parameters for model-subtraction scoring.
#[derive(Debug, Clone)]
pub struct SubtractOptions {
    /// Width of the working raster both ROIs are resized to
    pub work_width: u32,
    /// Inward shrink fraction applied to both ROIs before comparison
    pub inner_margin: f64,
    /// Residual gray level (after blur) strictly above which a pixel
    /// counts as ink
    pub gray_threshold: u8,
    /// Connected components smaller than this survive-area are dropped
    pub min_blob_area: u32,
    /// Fraction of on pixels over the working raster above which the
    /// zone is marked
    pub ink_ratio_threshold: f64,
    /// Fraction of the working width cleared on the left, for zones
    /// carrying a printed numbering band
    pub left_band_frac: f64,
}

impl Default for SubtractOptions {
    fn default() -> Self {
        Self {
            work_width: 160,
            inner_margin: 0.18,
            gray_threshold: 18,
            min_blob_area: 12,
            ink_ratio_threshold: 0.010,
            left_band_frac: 0.0,
        }
    }
}

fn validate(opts: &SubtractOptions) -> ScoreResult<()> {
    if opts.work_width == 0 {
        return Err(ScoreError::InvalidParameter(
            "work_width must be non-zero".into(),
        ));
    }
    if !(0.0..1.0).contains(&opts.left_band_frac) {
        return Err(ScoreError::InvalidParameter(format!(
            "left_band_frac out of range: {}",
            opts.left_band_frac
        )));
    }
    Ok(())
}

/// Per-pixel `template - scan`, saturating at zero.
///
/// Ink present on the scan but absent from the template leaves a bright
/// residual; printed structure common to both cancels out.
fn residual(template: &GrayRaster, scan: &GrayRaster) -> ScoreResult<GrayRaster> {
    if template.width() != scan.width() || template.height() != scan.height() {
        return Err(ScoreError::InvalidParameter(format!(
            "residual planes differ: {}x{} vs {}x{}",
            template.width(),
            template.height(),
            scan.width(),
            scan.height()
        )));
    }
    let data = template
        .data()
        .iter()
        .zip(scan.data().iter())
        .map(|(&t, &s)| t.saturating_sub(s))
        .collect();
    Ok(GrayRaster::from_raw(template.width(), template.height(), data)?)
}

/// Score one zone by subtracting the template render from the scan.
///
/// `scan_zone` and `template_zone` locate the same logical zone on their
/// respective rasters; the two ROIs need not share dimensions, both are
/// resampled to the working raster before subtraction.
pub fn score_subtraction(
    scan: &GrayRaster,
    scan_zone: &PixelRect,
    template: &GrayRaster,
    template_zone: &PixelRect,
    opts: &SubtractOptions,
) -> ScoreResult<ZoneScore> {
    validate(opts)?;

    let scan_inner = scan_zone.shrink_margin(opts.inner_margin);
    let template_inner = template_zone.shrink_margin(opts.inner_margin);

    let scan_roi = scan.crop(&scan_inner)?;
    let template_roi = template.crop(&template_inner)?;

    // Working height preserves the scan ROI's aspect ratio.
    let work_height = ((opts.work_width as f64 * scan_roi.height() as f64
        / scan_roi.width() as f64)
        .round() as u32)
        .max(1);

    let scan_work = scan_roi.resize(opts.work_width, work_height)?;
    let template_work = template_roi.resize(opts.work_width, work_height)?;

    let diff = residual(&template_work, &scan_work)?;
    let blurred = box_blur_3x3(&diff)?;

    let mut mask = BitMask::from_threshold(&blurred, opts.gray_threshold);
    mask = mask.open3();
    mask.remove_small_components(opts.min_blob_area);
    if opts.left_band_frac > 0.0 {
        let band = (opts.left_band_frac * opts.work_width as f64).round() as u32;
        mask.clear_columns_before(band);
    }

    let ink_ratio = mask.on_ratio();
    Ok(ZoneScore {
        checked: ink_ratio > opts.ink_ratio_threshold,
        ink_ratio,
        threshold: opts.ink_ratio_threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(w: u32, h: u32, value: u8) -> GrayRaster {
        GrayRaster::from_fn(w, h, |_, _| value).unwrap()
    }

    #[test]
    fn test_residual_cancels_common_structure() {
        let template = GrayRaster::from_fn(10, 10, |x, _| if x < 5 { 40 } else { 240 }).unwrap();
        let scan = template.clone();
        let diff = residual(&template, &scan).unwrap();
        assert!(diff.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_residual_dimension_mismatch() {
        let a = flat(10, 10, 0);
        let b = flat(10, 8, 0);
        assert!(matches!(
            residual(&a, &b),
            Err(ScoreError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_identical_planes_score_unchecked() {
        let zone = PixelRect::new(10, 10, 80, 60).unwrap();
        let page = GrayRaster::from_fn(100, 100, |x, y| ((x * 2 + y) % 200) as u8 + 30).unwrap();
        let score =
            score_subtraction(&page, &zone, &page, &zone, &SubtractOptions::default()).unwrap();
        assert!(!score.checked);
        assert_eq!(score.ink_ratio, 0.0);
    }

    #[test]
    fn test_extra_ink_on_scan_scores_checked() {
        let zone = PixelRect::new(0, 0, 100, 100).unwrap();
        let template = flat(100, 100, 250);
        let scan = GrayRaster::from_fn(100, 100, |x, y| {
            if (30..70).contains(&x) && (30..70).contains(&y) {
                30
            } else {
                250
            }
        })
        .unwrap();
        let score = score_subtraction(&scan, &zone, &template, &zone, &SubtractOptions::default())
            .unwrap();
        assert!(score.checked);
        assert!(score.ink_ratio > 0.05);
    }

    #[test]
    fn test_left_band_suppresses_numbering_column() {
        let zone = PixelRect::new(0, 0, 100, 100).unwrap();
        let template = flat(100, 100, 250);
        // Dark printing only in the leftmost 10% of the zone
        let scan = GrayRaster::from_fn(100, 100, |x, _| if x < 10 { 30 } else { 250 }).unwrap();
        let opts = SubtractOptions {
            left_band_frac: 0.25,
            ..SubtractOptions::default()
        };
        let score = score_subtraction(&scan, &zone, &template, &zone, &opts).unwrap();
        assert!(!score.checked);
    }

    #[test]
    fn test_rejects_zero_work_width() {
        let zone = PixelRect::new(0, 0, 10, 10).unwrap();
        let page = flat(20, 20, 255);
        let opts = SubtractOptions {
            work_width: 0,
            ..SubtractOptions::default()
        };
        assert!(matches!(
            score_subtraction(&page, &zone, &page, &zone, &opts),
            Err(ScoreError::InvalidParameter(_))
        ));
    }
}
