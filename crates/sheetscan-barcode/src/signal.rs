//! Signal extraction: from a grayscale stripe to element widths
//!
//! A band of scan lines through the middle of the candidate region is
//! averaged into a single 1-D luminance signal. Threshold crossings of
//! that signal, located with sub-pixel interpolation, give the element
//! boundaries; the distances between consecutive crossings quantize to
//! narrow/wide element widths.

use crate::error::{BarcodeError, BarcodeResult};
use sheetscan_core::GrayRaster;

/// Fewest crossings a plausible symbol can produce (one digit pair plus
/// start and stop codes gives 18).
const MIN_CROSSINGS: usize = 18;

/// Average `nscans` adjacent scan lines through the vertical middle of
/// the raster into one luminance signal.
pub fn average_scan_lines(raster: &GrayRaster, nscans: u32) -> Vec<f32> {
    let w = raster.width();
    let h = raster.height();
    let actual = nscans.clamp(1, h);
    let first = (h - actual) / 2;

    let mut signal = vec![0.0f32; w as usize];
    for y in first..first + actual {
        for x in 0..w {
            signal[x as usize] += raster.get_pixel_unchecked(x, y) as f32;
        }
    }
    for v in signal.iter_mut() {
        *v /= actual as f32;
    }
    signal
}

/// Find where the signal crosses `threshold`, with linear interpolation
/// between samples.
pub fn find_crossings(signal: &[f32], threshold: f32) -> Vec<f32> {
    let mut crossings = Vec::new();
    if signal.len() < 2 {
        return crossings;
    }

    let mut above = signal[0] > threshold;
    for i in 1..signal.len() {
        let current_above = signal[i] > threshold;
        if current_above != above {
            let x0 = (i - 1) as f32;
            let y0 = signal[i - 1];
            let y1 = signal[i];
            let crossing = if (y1 - y0).abs() > 0.001 {
                x0 + (threshold - y0) / (y1 - y0)
            } else {
                x0 + 0.5
            };
            crossings.push(crossing);
            above = current_above;
        }
    }
    crossings
}

/// Probe thresholds around `initial` and keep the one that yields the
/// most crossings. Low-contrast scans rarely cross a fixed midpoint.
fn select_crossing_threshold(signal: &[f32], initial: f32) -> f32 {
    let mut best_threshold = initial;
    let mut max_crossings = 0;
    for delta in -40i32..=40 {
        let thresh = initial + delta as f32;
        if !(20.0..=220.0).contains(&thresh) {
            continue;
        }
        let n = find_crossings(signal, thresh).len();
        if n > max_crossings {
            max_crossings = n;
            best_threshold = thresh;
        }
    }
    best_threshold
}

/// Extract sub-pixel crossing locations from a barcode stripe.
pub fn extract_crossings(raster: &GrayRaster, initial_threshold: f32) -> BarcodeResult<Vec<f32>> {
    let signal = average_scan_lines(raster, 50);
    if signal.is_empty() {
        return Err(BarcodeError::Signal("empty signal".to_string()));
    }

    let threshold = select_crossing_threshold(&signal, initial_threshold);
    let crossings = find_crossings(&signal, threshold);
    if crossings.len() < MIN_CROSSINGS {
        return Err(BarcodeError::Signal(format!(
            "only {} crossings found; need at least {MIN_CROSSINGS}",
            crossings.len()
        )));
    }
    Ok(crossings)
}

/// Quantize crossing distances to narrow/wide element widths.
///
/// The unit (narrow) width is taken at the 10th percentile of the sorted
/// distances, which tolerates a few merged or split elements. Widths are
/// clamped to {1, 2}; the symbology has no wider element.
pub fn crossings_to_widths(crossings: &[f32]) -> BarcodeResult<Vec<u8>> {
    if crossings.len() < MIN_CROSSINGS {
        return Err(BarcodeError::Signal("too few crossings".to_string()));
    }

    let distances: Vec<f32> = crossings.windows(2).map(|w| w[1] - w[0]).collect();

    let mut sorted = distances.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let min_idx = (sorted.len() as f32 * 0.1) as usize;
    let max_idx = ((sorted.len() as f32 * 0.9) as usize).min(sorted.len() - 1);
    let unit = sorted[min_idx];
    let widest = sorted[max_idx];

    if unit < 1.0 {
        return Err(BarcodeError::Signal(format!(
            "unit width {unit:.2} below one pixel"
        )));
    }
    if widest / unit > 4.0 {
        return Err(BarcodeError::Signal(format!(
            "width spread too large: max/min = {:.2}",
            widest / unit
        )));
    }

    Ok(distances
        .iter()
        .map(|&d| ((d / unit).round() as u8).clamp(1, 2))
        .collect())
}
