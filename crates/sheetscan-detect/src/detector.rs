//! Two-pass content-rectangle detection
//!
//! Locates the printed content area of a scanned page without fiducial
//! markers. A coarse pass on a bounded-size render finds approximate
//! edges from the projection profiles; a fine pass at twice the
//! resolution re-centers a local search on the scaled coarse result,
//! giving sub-coarse-pixel precision without a full-resolution sweep.

use crate::error::{DetectError, DetectResult};
use crate::profile::{edge_energy_profiles, initial_cut, refine_edge, smooth_profile};
use sheetscan_core::{GrayRaster, RectPct};

/// Tunable detection parameters.
///
/// The defaults are the empirically chosen production values; they are
/// policy, not invariants.
#[derive(Debug, Clone)]
pub struct DetectOptions {
    /// Maximum dimension of the coarse-pass render
    pub coarse_dim: u32,
    /// Maximum dimension of the fine-pass render
    pub fine_dim: u32,
    /// Smoothing window as a fraction of the profile length
    pub smooth_frac: f64,
    /// Cumulative energy fraction for the initial cut on each side
    pub energy_frac: f64,
    /// Local refinement search radius as a fraction of the profile length
    pub search_radius_frac: f64,
    /// Refinement window width as a fraction of the profile length
    pub window_frac: f64,
    /// Outward padding applied to the final rectangle, as a fraction of
    /// each extent
    pub padding_frac: f64,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            coarse_dim: 900,
            fine_dim: 1800,
            smooth_frac: 0.01,
            energy_frac: 0.012,
            search_radius_frac: 0.05,
            window_frac: 0.006,
            padding_frac: 0.003,
        }
    }
}

/// Edge positions on one render, as fractions of the raster extent.
#[derive(Debug, Clone, Copy)]
struct Edges {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

/// Detect the tight bounding rectangle of printed content on a page.
///
/// Returns the rectangle in percentage page coordinates, expanded by a
/// small outward padding and clamped to the page.
///
/// # Errors
///
/// - [`DetectError::NoContent`] if the page carries no edge energy
///   (blank/uniform) or the located edges are degenerate; callers should
///   keep the previous overlay rectangle or prompt for manual placement.
/// - [`DetectError::InvalidParameter`] for nonsensical options.
pub fn detect_content_rect(page: &GrayRaster, opts: &DetectOptions) -> DetectResult<RectPct> {
    if opts.coarse_dim == 0 || opts.fine_dim == 0 {
        return Err(DetectError::InvalidParameter(
            "render dimensions must be > 0".into(),
        ));
    }
    if !(0.0..1.0).contains(&opts.energy_frac) {
        return Err(DetectError::InvalidParameter(format!(
            "energy fraction out of range: {}",
            opts.energy_frac
        )));
    }

    let coarse = page.scale_to_max_dim(opts.coarse_dim)?;
    let coarse_edges = detect_at_scale(&coarse, opts, None)?;

    // The fine pass only pays off when the source actually has more
    // detail than the coarse render.
    let edges = if page.max_dim() > coarse.max_dim() {
        let fine = page.scale_to_max_dim(opts.fine_dim)?;
        detect_at_scale(&fine, opts, Some(&coarse_edges))?
    } else {
        coarse_edges
    };

    let rect = RectPct {
        x: edges.left * 100.0,
        y: edges.top * 100.0,
        w: (edges.right - edges.left) * 100.0,
        h: (edges.bottom - edges.top) * 100.0,
    };
    if rect.w <= 0.0 || rect.h <= 0.0 {
        return Err(DetectError::NoContent);
    }

    // Small outward padding proportional to each extent, then clamp.
    let padded = RectPct {
        x: rect.x - rect.w * opts.padding_frac,
        y: rect.y - rect.h * opts.padding_frac,
        w: rect.w * (1.0 + 2.0 * opts.padding_frac),
        h: rect.h * (1.0 + 2.0 * opts.padding_frac),
    };
    Ok(padded.clamp_to_page())
}

/// Run the profile analysis on one render.
///
/// With `prior` edges from a coarser pass, the initial estimates are the
/// prior positions scaled to this render; otherwise they come from the
/// cumulative-energy walk.
fn detect_at_scale(
    raster: &GrayRaster,
    opts: &DetectOptions,
    prior: Option<&Edges>,
) -> DetectResult<Edges> {
    let profiles = edge_energy_profiles(raster);
    if profiles.col_total() <= 0.0 || profiles.row_total() <= 0.0 {
        return Err(DetectError::NoContent);
    }

    let cols = smooth_with(&profiles.cols, opts);
    let rows = smooth_with(&profiles.rows, opts);

    let (left, right) = locate_axis(
        &cols,
        opts,
        prior.map(|p| (p.left, p.right)),
    );
    let (top, bottom) = locate_axis(
        &rows,
        opts,
        prior.map(|p| (p.top, p.bottom)),
    );

    if right <= left || bottom <= top {
        return Err(DetectError::NoContent);
    }

    Ok(Edges {
        left,
        right,
        top,
        bottom,
    })
}

fn smooth_with(profile: &[f64], opts: &DetectOptions) -> Vec<f64> {
    let window = frac_len(profile.len(), opts.smooth_frac);
    smooth_profile(profile, window)
}

/// Locate the near and far content edges on one axis, as fractions.
fn locate_axis(
    profile: &[f64],
    opts: &DetectOptions,
    prior: Option<(f64, f64)>,
) -> (f64, f64) {
    let n = profile.len();
    let radius = frac_len(n, opts.search_radius_frac);
    let window = frac_len(n, opts.window_frac);

    let (near_init, far_init) = match prior {
        Some((near, far)) => (
            scale_index(near, n),
            scale_index(far, n).saturating_sub(1),
        ),
        None => (
            initial_cut(profile, opts.energy_frac, false),
            initial_cut(profile, opts.energy_frac, true),
        ),
    };

    let near = refine_edge(profile, near_init, radius, window);
    let far = refine_edge(profile, far_init, radius, window);

    // Far edge is exclusive: the content extends through the refined
    // sample.
    (near as f64 / n as f64, (far + 1) as f64 / n as f64)
}

#[inline]
fn frac_len(len: usize, frac: f64) -> usize {
    ((len as f64 * frac).round() as usize).max(1)
}

#[inline]
fn scale_index(frac: f64, len: usize) -> usize {
    ((frac * len as f64).round() as usize).min(len.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = DetectOptions::default();
        assert_eq!(opts.coarse_dim, 900);
        assert_eq!(opts.fine_dim, 1800);
        assert!((opts.energy_frac - 0.012).abs() < 1e-12);
    }

    #[test]
    fn test_blank_page_is_no_content() {
        let page = GrayRaster::new(400, 300).unwrap();
        let err = detect_content_rect(&page, &DetectOptions::default()).unwrap_err();
        assert!(matches!(err, DetectError::NoContent));
    }

    #[test]
    fn test_invalid_options_rejected() {
        let page = GrayRaster::new(10, 10).unwrap();
        let mut opts = DetectOptions::default();
        opts.energy_frac = 1.5;
        assert!(matches!(
            detect_content_rect(&page, &opts),
            Err(DetectError::InvalidParameter(_))
        ));
    }
}
