//! Binary masks and the small-raster cleanup toolkit
//!
//! Model-subtraction scoring works on small (≈160 px wide) rasters, so
//! the morphology here favors clarity over word-packed throughput: a
//! [`BitMask`] is a plain boolean plane with 3x3 erode/dilate, flood-fill
//! component removal, and a 3x3 box blur over the grayscale plane that
//! precedes thresholding.

use crate::error::{ScoreError, ScoreResult};
use sheetscan_core::GrayRaster;
use std::collections::VecDeque;

/// A binary raster: `true` = ink candidate, `false` = background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl BitMask {
    /// Create an all-background mask.
    pub fn new(width: u32, height: u32) -> ScoreResult<Self> {
        if width == 0 || height == 0 {
            return Err(ScoreError::InvalidParameter(format!(
                "mask dimensions must be non-zero: {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        })
    }

    /// Threshold a grayscale plane: on where the value is strictly above
    /// `threshold`.
    pub fn from_threshold(plane: &GrayRaster, threshold: u8) -> Self {
        Self {
            width: plane.width(),
            height: plane.height(),
            bits: plane.data().iter().map(|&v| v > threshold).collect(),
        }
    }

    /// Mask width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Mask height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn idx(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get a bit without bounds checking (debug-asserted).
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        debug_assert!(x < self.width && y < self.height);
        self.bits[self.idx(x, y)]
    }

    /// Set a bit without bounds checking (debug-asserted).
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        debug_assert!(x < self.width && y < self.height);
        let i = self.idx(x, y);
        self.bits[i] = value;
    }

    /// Number of on pixels.
    pub fn count_on(&self) -> u64 {
        self.bits.iter().filter(|&&b| b).count() as u64
    }

    /// Fraction of on pixels over the whole mask.
    pub fn on_ratio(&self) -> f64 {
        self.count_on() as f64 / self.bits.len() as f64
    }

    /// 3x3 erosion. Pixels outside the mask count as background, so
    /// foreground touching the border erodes away.
    pub fn erode3(&self) -> BitMask {
        let mut out = BitMask {
            width: self.width,
            height: self.height,
            bits: vec![false; self.bits.len()],
        };
        for y in 0..self.height {
            for x in 0..self.width {
                let mut all_on = true;
                'neigh: for dy in -1i32..=1 {
                    for dx in -1i32..=1 {
                        let nx = x as i32 + dx;
                        let ny = y as i32 + dy;
                        if nx < 0
                            || ny < 0
                            || nx >= self.width as i32
                            || ny >= self.height as i32
                            || !self.get(nx as u32, ny as u32)
                        {
                            all_on = false;
                            break 'neigh;
                        }
                    }
                }
                if all_on {
                    out.set(x, y, true);
                }
            }
        }
        out
    }

    /// 3x3 dilation.
    pub fn dilate3(&self) -> BitMask {
        let mut out = BitMask {
            width: self.width,
            height: self.height,
            bits: vec![false; self.bits.len()],
        };
        for y in 0..self.height {
            for x in 0..self.width {
                if !self.get(x, y) {
                    continue;
                }
                for dy in -1i32..=1 {
                    for dx in -1i32..=1 {
                        let nx = x as i32 + dx;
                        let ny = y as i32 + dy;
                        if nx >= 0
                            && ny >= 0
                            && nx < self.width as i32
                            && ny < self.height as i32
                        {
                            out.set(nx as u32, ny as u32, true);
                        }
                    }
                }
            }
        }
        out
    }

    /// Morphological open: erosion followed by dilation. Removes
    /// single-pixel noise while preserving larger marks.
    pub fn open3(&self) -> BitMask {
        self.erode3().dilate3()
    }

    /// Remove 4-connected components smaller than `min_area` pixels.
    ///
    /// Returns the number of components removed.
    pub fn remove_small_components(&mut self, min_area: u32) -> u32 {
        if min_area <= 1 {
            return 0;
        }
        let mut visited = vec![false; self.bits.len()];
        let mut removed = 0u32;
        let mut component: Vec<(u32, u32)> = Vec::new();
        let mut queue: VecDeque<(u32, u32)> = VecDeque::new();

        for sy in 0..self.height {
            for sx in 0..self.width {
                let start = self.idx(sx, sy);
                if !self.bits[start] || visited[start] {
                    continue;
                }

                component.clear();
                visited[start] = true;
                queue.push_back((sx, sy));
                while let Some((x, y)) = queue.pop_front() {
                    component.push((x, y));
                    let neighbors = [
                        (x.wrapping_sub(1), y),
                        (x + 1, y),
                        (x, y.wrapping_sub(1)),
                        (x, y + 1),
                    ];
                    for (nx, ny) in neighbors {
                        if nx < self.width && ny < self.height {
                            let i = self.idx(nx, ny);
                            if self.bits[i] && !visited[i] {
                                visited[i] = true;
                                queue.push_back((nx, ny));
                            }
                        }
                    }
                }

                if (component.len() as u32) < min_area {
                    for &(x, y) in &component {
                        self.set(x, y, false);
                    }
                    removed += 1;
                }
            }
        }
        removed
    }

    /// Clear all columns left of `col`. Used to ignore a printed
    /// numbering band on the left of a zone.
    pub fn clear_columns_before(&mut self, col: u32) {
        let col = col.min(self.width);
        for y in 0..self.height {
            for x in 0..col {
                self.set(x, y, false);
            }
        }
    }
}

/// 3x3 box blur over a grayscale plane.
///
/// Border pixels average over their in-bounds neighborhood only, so the
/// output never darkens toward the edges.
pub fn box_blur_3x3(plane: &GrayRaster) -> ScoreResult<GrayRaster> {
    let w = plane.width();
    let h = plane.height();
    let mut out = Vec::with_capacity(w as usize * h as usize);
    for y in 0..h {
        for x in 0..w {
            let mut sum = 0u32;
            let mut count = 0u32;
            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;
                    if nx >= 0 && ny >= 0 && nx < w as i32 && ny < h as i32 {
                        sum += plane.get_pixel_unchecked(nx as u32, ny as u32) as u32;
                        count += 1;
                    }
                }
            }
            out.push((sum / count) as u8);
        }
    }
    Ok(GrayRaster::from_raw(w, h, out)?)
}
