//! Adaptive-threshold ink-density scoring
//!
//! The fallback strategy when no template render is available. The zone
//! interior is measured against a dynamic luminance cut derived from its
//! own statistics, and the resulting dark-pixel density is compared to an
//! area-bucketed threshold: small zones are noise-dominated and need less
//! density to count as marked, large zones need more.

use crate::error::ScoreResult;
use crate::strategy::ZoneScore;
use sheetscan_core::{GrayRaster, PixelRect};

/// Tunable parameters for density scoring.
///
/// The bucket table holds the empirically chosen production constants;
/// they are policy, not derived values.
#[derive(Debug, Clone)]
pub struct DensityOptions {
    /// Inward shrink fraction applied to the zone before measurement, to
    /// exclude printed borders
    pub inner_margin: f64,
    /// Coefficient on the standard deviation in the dynamic threshold
    /// `mean - coeff * std`
    pub std_coeff: f64,
    /// `(max_area_px, required_density)` buckets, in ascending area order
    pub area_buckets: [(u64, f64); 4],
    /// Required density for zones larger than the last bucket
    pub large_area_density: f64,
}

impl Default for DensityOptions {
    fn default() -> Self {
        Self {
            inner_margin: 0.18,
            std_coeff: 0.8,
            area_buckets: [(800, 0.04), (2000, 0.06), (4000, 0.08), (8000, 0.10)],
            large_area_density: 0.12,
        }
    }
}

/// The density a zone of `area_px` rasterized pixels must exceed to be
/// considered marked.
pub fn density_threshold_for_area(area_px: u64, opts: &DensityOptions) -> f64 {
    for &(max_area, density) in &opts.area_buckets {
        if area_px < max_area {
            return density;
        }
    }
    opts.large_area_density
}

/// Score one zone by adaptive ink density.
///
/// The zone rectangle must already be resolved to pixels on `page`. The
/// interior (after the inner margin) is thresholded at
/// `mean - std_coeff * std`; the fraction of pixels below that cut is the
/// ink ratio.
pub fn score_density(
    page: &GrayRaster,
    zone_px: &PixelRect,
    opts: &DensityOptions,
) -> ScoreResult<ZoneScore> {
    let inner = zone_px.shrink_margin(opts.inner_margin);
    let stats = page.region_stats(&inner)?;

    let cut = stats.mean - opts.std_coeff * stats.std_dev;
    let dark = page.count_below(&inner, cut)?;
    let ink_ratio = dark as f64 / inner.area() as f64;

    // Bucket lookup uses the zone's full rasterized area, not the
    // shrunk interior.
    let threshold = density_threshold_for_area(zone_px.area(), opts);

    Ok(ZoneScore {
        checked: ink_ratio > threshold,
        ink_ratio,
        threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_table() {
        let opts = DensityOptions::default();
        assert_eq!(density_threshold_for_area(0, &opts), 0.04);
        assert_eq!(density_threshold_for_area(799, &opts), 0.04);
        assert_eq!(density_threshold_for_area(800, &opts), 0.06);
        assert_eq!(density_threshold_for_area(1999, &opts), 0.06);
        assert_eq!(density_threshold_for_area(3999, &opts), 0.08);
        assert_eq!(density_threshold_for_area(7999, &opts), 0.10);
        assert_eq!(density_threshold_for_area(8000, &opts), 0.12);
        assert_eq!(density_threshold_for_area(1_000_000, &opts), 0.12);
    }

    #[test]
    fn test_blank_zone_unchecked() {
        let page = GrayRaster::new(200, 200).unwrap();
        let zone = PixelRect::new(50, 50, 60, 40).unwrap();
        let score = score_density(&page, &zone, &DensityOptions::default()).unwrap();
        assert!(!score.checked);
        assert_eq!(score.ink_ratio, 0.0);
    }

    #[test]
    fn test_solid_mark_checked() {
        // Mark covering ~40% of the shrunk zone interior. Kept well
        // under half coverage: once ink dominates the interior, the
        // interior's own statistics pull the adaptive cut below the ink
        // level and nothing counts as dark.
        let zone = PixelRect::new(20, 20, 60, 60).unwrap();
        let page = GrayRaster::from_fn(100, 100, |x, y| {
            if (38..62).contains(&x) && (38..62).contains(&y) {
                20
            } else {
                255
            }
        })
        .unwrap();
        let score = score_density(&page, &zone, &DensityOptions::default()).unwrap();
        assert!(score.checked);
        assert!(score.ink_ratio > 0.12);
    }

    #[test]
    fn test_light_noise_not_checked() {
        // A few scattered dark pixels only
        let zone = PixelRect::new(0, 0, 90, 90).unwrap();
        let page = GrayRaster::from_fn(90, 90, |x, y| {
            if x % 30 == 0 && y % 30 == 0 { 0 } else { 250 }
        })
        .unwrap();
        let score = score_density(&page, &zone, &DensityOptions::default()).unwrap();
        assert!(!score.checked);
    }
}
