//! 1-D edge-energy projection profiles
//!
//! The detector reduces a page to two 1-D profiles: for every row and
//! every column, the sum of absolute horizontal and vertical luminance
//! gradients over that line. Printed content produces energy; blank
//! margins produce none. Edge positions are then found on the profiles,
//! which is far cheaper than any 2-D search.

use sheetscan_core::GrayRaster;

/// Per-row and per-column edge-energy projections.
#[derive(Debug, Clone)]
pub struct EnergyProfiles {
    /// One entry per row: summed gradient magnitude along that row
    pub rows: Vec<f64>,
    /// One entry per column: summed gradient magnitude down that column
    pub cols: Vec<f64>,
}

impl EnergyProfiles {
    /// Total energy across all rows (equals the column total up to the
    /// gradient boundary samples).
    pub fn row_total(&self) -> f64 {
        self.rows.iter().sum()
    }

    /// Total energy across all columns.
    pub fn col_total(&self) -> f64 {
        self.cols.iter().sum()
    }
}

/// Compute edge-energy projections for a raster.
///
/// The energy of a pixel is `|p(x+1,y) - p(x,y)| + |p(x,y+1) - p(x,y)|`,
/// accumulated into both its row and its column bucket.
pub fn edge_energy_profiles(raster: &GrayRaster) -> EnergyProfiles {
    let w = raster.width() as usize;
    let h = raster.height() as usize;
    let data = raster.data();

    let mut rows = vec![0.0f64; h];
    let mut cols = vec![0.0f64; w];

    for y in 0..h {
        let row = y * w;
        for x in 0..w {
            let v = data[row + x] as i32;
            let mut energy = 0i32;
            if x + 1 < w {
                energy += (data[row + x + 1] as i32 - v).abs();
            }
            if y + 1 < h {
                energy += (data[row + w + x] as i32 - v).abs();
            }
            let energy = energy as f64;
            rows[y] += energy;
            cols[x] += energy;
        }
    }

    EnergyProfiles { rows, cols }
}

/// Smooth a profile with a symmetrized moving average.
///
/// Runs a causal moving average of `window` samples forward, the same
/// backward, and averages the two passes. This suppresses single-row
/// noise spikes from text without biasing edge positions in either
/// direction.
pub fn smooth_profile(profile: &[f64], window: usize) -> Vec<f64> {
    let n = profile.len();
    let window = window.max(1);
    if n == 0 || window == 1 {
        return profile.to_vec();
    }

    // Prefix sums for O(1) windowed averages.
    let mut prefix = Vec::with_capacity(n + 1);
    let mut running = 0.0;
    prefix.push(running);
    for &v in profile {
        running += v;
        prefix.push(running);
    }
    let avg = |from: usize, to: usize| (prefix[to] - prefix[from]) / (to - from) as f64;

    (0..n)
        .map(|i| {
            // Trailing window ending at i, leading window starting at i.
            let forward = avg(i.saturating_sub(window - 1), i + 1);
            let backward = avg(i, (i + window).min(n));
            (forward + backward) / 2.0
        })
        .collect()
}

/// Initial edge estimate: walk the cumulative energy inward from one end
/// until `fraction` of the total has been accumulated.
///
/// Returns the index at which the fraction is first reached. For
/// `from_end`, walking starts at the far end and the returned index is
/// still expressed from the front.
pub fn initial_cut(profile: &[f64], fraction: f64, from_end: bool) -> usize {
    let total: f64 = profile.iter().sum();
    let target = total * fraction;
    let mut acc = 0.0;

    if from_end {
        for i in (0..profile.len()).rev() {
            acc += profile[i];
            if acc >= target {
                return i;
            }
        }
        0
    } else {
        for (i, &v) in profile.iter().enumerate() {
            acc += v;
            if acc >= target {
                return i;
            }
        }
        profile.len().saturating_sub(1)
    }
}

/// Refine an edge estimate by a local windowed search.
///
/// Slides a window of `window` samples across positions within `radius`
/// of `initial` and returns the center maximizing the windowed energy
/// sum. This locks onto the strongest nearby edge instead of a
/// noise-sensitive single sample.
pub fn refine_edge(profile: &[f64], initial: usize, radius: usize, window: usize) -> usize {
    let n = profile.len();
    if n == 0 {
        return 0;
    }
    let window = window.max(1);
    let half = window / 2;

    let lo = initial.saturating_sub(radius);
    let hi = (initial + radius).min(n - 1);

    let mut best = initial.min(n - 1);
    let mut best_sum = f64::MIN;
    for center in lo..=hi {
        let from = center.saturating_sub(half);
        let to = (center + half + 1).min(n);
        let sum: f64 = profile[from..to].iter().sum();
        // Adjacent windows around a sharp edge tie on the sum; prefer
        // the center sitting on the stronger sample.
        if sum > best_sum || (sum == best_sum && profile[center] > profile[best]) {
            best_sum = sum;
            best = center;
        }
    }
    best
}
