//! 8-bit luminance rasters
//!
//! [`GrayRaster`] is the single image container the engine processes:
//! decoded page scans, template renders, and any derived working rasters.
//! Construction from encoded bytes goes through the `image` crate; every
//! operation after decode is pure sheetscan code.

use crate::error::{CoreError, Result};
use crate::rect::{RectPct, Rotation};

/// A rectangle in pixel units, resolved against a concrete raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelRect {
    /// Left column
    pub x: u32,
    /// Top row
    pub y: u32,
    /// Width in pixels
    pub w: u32,
    /// Height in pixels
    pub h: u32,
}

impl PixelRect {
    /// Create a new pixel rectangle.
    ///
    /// # Errors
    ///
    /// Returns an error if width or height is zero.
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Result<Self> {
        if w == 0 || h == 0 {
            return Err(CoreError::DegenerateRegion(format!(
                "pixel rect must be non-empty: {w}x{h}"
            )));
        }
        Ok(Self { x, y, w, h })
    }

    /// Resolve a percentage rectangle against raster dimensions.
    ///
    /// The result is clamped to the raster and guaranteed at least 1x1.
    ///
    /// # Errors
    ///
    /// Returns an error if the rectangle lies entirely outside the raster
    /// or the raster is empty.
    pub fn from_pct(rect: &RectPct, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidDimension { width, height });
        }
        let clamped = rect.clamp_to_page();
        let x0 = (clamped.x / 100.0 * width as f64).round() as i64;
        let y0 = (clamped.y / 100.0 * height as f64).round() as i64;
        let x1 = (clamped.right() / 100.0 * width as f64).round() as i64;
        let y1 = (clamped.bottom() / 100.0 * height as f64).round() as i64;

        let x = x0.clamp(0, width as i64 - 1) as u32;
        let y = y0.clamp(0, height as i64 - 1) as u32;
        let w = (x1.clamp(x as i64 + 1, width as i64) - x as i64) as u32;
        let h = (y1.clamp(y as i64 + 1, height as i64) - y as i64) as u32;
        Ok(Self { x, y, w, h })
    }

    /// Right column (exclusive).
    #[inline]
    pub fn right(&self) -> u32 {
        self.x + self.w
    }

    /// Bottom row (exclusive).
    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }

    /// Area in pixels.
    #[inline]
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }

    /// Shrink the rectangle inward by a fraction of each extent.
    ///
    /// Used to exclude printed zone borders before ink measurement. The
    /// result keeps at least one pixel in each direction.
    pub fn shrink_margin(&self, fraction: f64) -> PixelRect {
        let fraction = fraction.clamp(0.0, 0.49);
        let mx = (self.w as f64 * fraction).round() as u32;
        let my = (self.h as f64 * fraction).round() as u32;
        let w = (self.w - 2 * mx.min(self.w / 2)).max(1);
        let h = (self.h - 2 * my.min(self.h / 2)).max(1);
        PixelRect {
            x: self.x + mx.min(self.w / 2),
            y: self.y + my.min(self.h / 2),
            w,
            h,
        }
    }
}

/// Mean and standard deviation of a raster region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionStats {
    /// Mean luminance
    pub mean: f64,
    /// Standard deviation of luminance
    pub std_dev: f64,
    /// Number of pixels measured
    pub count: u64,
}

/// An owned 8-bit grayscale raster.
///
/// Luminance convention: 0 = black ink, 255 = white paper.
#[derive(Debug, Clone, PartialEq)]
pub struct GrayRaster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl GrayRaster {
    /// Create a raster filled with white (255).
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidDimension { width, height });
        }
        Ok(Self {
            width,
            height,
            data: vec![255; width as usize * height as usize],
        })
    }

    /// Create a raster from a raw row-major luminance buffer.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidDimension { width, height });
        }
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(CoreError::BufferMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Create a raster by evaluating a function at each pixel.
    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> u8) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidDimension { width, height });
        }
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Decode encoded image bytes (PNG, JPEG, ...) into a luminance raster.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decode`] if the bytes cannot be decoded. There
    /// is no fallback: callers must surface this to the operator.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes).map_err(|e| CoreError::Decode(e.to_string()))?;
        Ok(Self::from_dynamic(&img))
    }

    /// Convert a decoded `image` crate image into a luminance raster.
    pub fn from_dynamic(img: &image::DynamicImage) -> Self {
        let luma = img.to_luma8();
        Self {
            width: luma.width(),
            height: luma.height(),
            data: luma.into_raw(),
        }
    }

    /// Raster width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Raster height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Largest dimension.
    #[inline]
    pub fn max_dim(&self) -> u32 {
        self.width.max(self.height)
    }

    /// Raw luminance data, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw luminance data, row-major.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Get a pixel, or `None` when out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<u8> {
        if x < self.width && y < self.height {
            Some(self.data[y as usize * self.width as usize + x as usize])
        } else {
            None
        }
    }

    /// Get a pixel without bounds checking (debug-asserted).
    #[inline]
    pub fn get_pixel_unchecked(&self, x: u32, y: u32) -> u8 {
        debug_assert!(x < self.width && y < self.height);
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Set a pixel without bounds checking (debug-asserted).
    #[inline]
    pub fn set_pixel_unchecked(&mut self, x: u32, y: u32, value: u8) {
        debug_assert!(x < self.width && y < self.height);
        self.data[y as usize * self.width as usize + x as usize] = value;
    }

    /// Check that a region lies within the raster.
    fn check_region(&self, rect: &PixelRect) -> Result<()> {
        if rect.right() > self.width || rect.bottom() > self.height {
            return Err(CoreError::RegionOutOfBounds {
                x: rect.x,
                y: rect.y,
                w: rect.w,
                h: rect.h,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Copy a rectangular region into a new raster.
    pub fn crop(&self, rect: &PixelRect) -> Result<GrayRaster> {
        self.check_region(rect)?;
        let mut data = Vec::with_capacity(rect.area() as usize);
        for y in rect.y..rect.bottom() {
            let row = y as usize * self.width as usize;
            data.extend_from_slice(&self.data[row + rect.x as usize..row + rect.right() as usize]);
        }
        GrayRaster::from_raw(rect.w, rect.h, data)
    }

    /// Resize to exact dimensions.
    ///
    /// Downscaling uses box averaging (area map) for anti-aliasing;
    /// upscaling uses bilinear interpolation.
    pub fn resize(&self, new_width: u32, new_height: u32) -> Result<GrayRaster> {
        if new_width == 0 || new_height == 0 {
            return Err(CoreError::InvalidDimension {
                width: new_width,
                height: new_height,
            });
        }
        if new_width == self.width && new_height == self.height {
            return Ok(self.clone());
        }
        if new_width <= self.width && new_height <= self.height {
            self.downscale_area(new_width, new_height)
        } else {
            self.upscale_bilinear(new_width, new_height)
        }
    }

    /// Scale so the largest dimension equals `max_dim`, preserving aspect
    /// ratio. Returns a clone when the raster already fits.
    pub fn scale_to_max_dim(&self, max_dim: u32) -> Result<GrayRaster> {
        if max_dim == 0 {
            return Err(CoreError::InvalidParameter("max_dim must be > 0".into()));
        }
        if self.max_dim() <= max_dim {
            return Ok(self.clone());
        }
        let scale = max_dim as f64 / self.max_dim() as f64;
        let nw = ((self.width as f64 * scale).round() as u32).max(1);
        let nh = ((self.height as f64 * scale).round() as u32).max(1);
        self.resize(nw, nh)
    }

    /// Scale to a target width, preserving aspect ratio.
    pub fn scale_to_width(&self, target_width: u32) -> Result<GrayRaster> {
        if target_width == 0 {
            return Err(CoreError::InvalidParameter(
                "target width must be > 0".into(),
            ));
        }
        let scale = target_width as f64 / self.width as f64;
        let nh = ((self.height as f64 * scale).round() as u32).max(1);
        self.resize(target_width, nh)
    }

    fn downscale_area(&self, new_width: u32, new_height: u32) -> Result<GrayRaster> {
        let sx = self.width as f64 / new_width as f64;
        let sy = self.height as f64 / new_height as f64;
        let mut data = Vec::with_capacity(new_width as usize * new_height as usize);
        for dy in 0..new_height {
            let y0 = (dy as f64 * sy).floor() as u32;
            let y1 = (((dy + 1) as f64 * sy).ceil() as u32).min(self.height).max(y0 + 1);
            for dx in 0..new_width {
                let x0 = (dx as f64 * sx).floor() as u32;
                let x1 = (((dx + 1) as f64 * sx).ceil() as u32).min(self.width).max(x0 + 1);
                let mut sum = 0u64;
                for y in y0..y1 {
                    let row = y as usize * self.width as usize;
                    for x in x0..x1 {
                        sum += self.data[row + x as usize] as u64;
                    }
                }
                let count = (y1 - y0) as u64 * (x1 - x0) as u64;
                data.push((sum / count) as u8);
            }
        }
        GrayRaster::from_raw(new_width, new_height, data)
    }

    fn upscale_bilinear(&self, new_width: u32, new_height: u32) -> Result<GrayRaster> {
        let sx = self.width as f64 / new_width as f64;
        let sy = self.height as f64 / new_height as f64;
        let mut data = Vec::with_capacity(new_width as usize * new_height as usize);
        for dy in 0..new_height {
            let fy = ((dy as f64 + 0.5) * sy - 0.5).max(0.0);
            let y0 = (fy.floor() as u32).min(self.height - 1);
            let y1 = (y0 + 1).min(self.height - 1);
            let wy = fy - y0 as f64;
            for dx in 0..new_width {
                let fx = ((dx as f64 + 0.5) * sx - 0.5).max(0.0);
                let x0 = (fx.floor() as u32).min(self.width - 1);
                let x1 = (x0 + 1).min(self.width - 1);
                let wx = fx - x0 as f64;

                let p00 = self.get_pixel_unchecked(x0, y0) as f64;
                let p10 = self.get_pixel_unchecked(x1, y0) as f64;
                let p01 = self.get_pixel_unchecked(x0, y1) as f64;
                let p11 = self.get_pixel_unchecked(x1, y1) as f64;
                let top = p00 + (p10 - p00) * wx;
                let bottom = p01 + (p11 - p01) * wx;
                data.push((top + (bottom - top) * wy).round().clamp(0.0, 255.0) as u8);
            }
        }
        GrayRaster::from_raw(new_width, new_height, data)
    }

    /// Rotate by quarter turns, clockwise.
    ///
    /// For 90 degrees the source pixel at `(x, y)` lands at
    /// `(height - 1 - y, x)`; 180 and 270 follow analogously.
    pub fn rotate_orth(&self, rotation: Rotation) -> GrayRaster {
        match rotation {
            Rotation::Deg0 => self.clone(),
            Rotation::Deg180 => {
                let mut out = GrayRaster {
                    width: self.width,
                    height: self.height,
                    data: vec![0; self.data.len()],
                };
                for y in 0..self.height {
                    for x in 0..self.width {
                        out.set_pixel_unchecked(
                            self.width - 1 - x,
                            self.height - 1 - y,
                            self.get_pixel_unchecked(x, y),
                        );
                    }
                }
                out
            }
            Rotation::Deg90 | Rotation::Deg270 => {
                let mut out = GrayRaster {
                    width: self.height,
                    height: self.width,
                    data: vec![0; self.data.len()],
                };
                for y in 0..self.height {
                    for x in 0..self.width {
                        let (nx, ny) = if rotation == Rotation::Deg90 {
                            (self.height - 1 - y, x)
                        } else {
                            (y, self.width - 1 - x)
                        };
                        out.set_pixel_unchecked(nx, ny, self.get_pixel_unchecked(x, y));
                    }
                }
                out
            }
        }
    }

    /// Mean and standard deviation of luminance over a region.
    pub fn region_stats(&self, rect: &PixelRect) -> Result<RegionStats> {
        self.check_region(rect)?;
        let mut sum = 0.0f64;
        let mut sum_sq = 0.0f64;
        for y in rect.y..rect.bottom() {
            let row = y as usize * self.width as usize;
            for x in rect.x..rect.right() {
                let v = self.data[row + x as usize] as f64;
                sum += v;
                sum_sq += v * v;
            }
        }
        let count = rect.area();
        let mean = sum / count as f64;
        let variance = (sum_sq / count as f64 - mean * mean).max(0.0);
        Ok(RegionStats {
            mean,
            std_dev: variance.sqrt(),
            count,
        })
    }

    /// Count pixels in a region with luminance strictly below `threshold`.
    pub fn count_below(&self, rect: &PixelRect, threshold: f64) -> Result<u64> {
        self.check_region(rect)?;
        let mut count = 0u64;
        for y in rect.y..rect.bottom() {
            let row = y as usize * self.width as usize;
            for x in rect.x..rect.right() {
                if (self.data[row + x as usize] as f64) < threshold {
                    count += 1;
                }
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_creation() {
        let r = GrayRaster::new(10, 5).unwrap();
        assert_eq!(r.width(), 10);
        assert_eq!(r.height(), 5);
        assert_eq!(r.get_pixel(0, 0), Some(255));
        assert_eq!(r.get_pixel(10, 0), None);
        assert!(GrayRaster::new(0, 5).is_err());
        assert!(GrayRaster::from_raw(4, 4, vec![0; 15]).is_err());
    }

    #[test]
    fn test_pixel_rect_from_pct() {
        let rect = RectPct::new(10.0, 20.0, 50.0, 30.0).unwrap();
        let px = PixelRect::from_pct(&rect, 200, 100).unwrap();
        assert_eq!(px, PixelRect { x: 20, y: 20, w: 100, h: 30 });
    }

    #[test]
    fn test_pixel_rect_from_pct_minimum_size() {
        let rect = RectPct::new_unchecked(99.9, 99.9, 0.01, 0.01);
        let px = PixelRect::from_pct(&rect, 100, 100).unwrap();
        assert!(px.w >= 1 && px.h >= 1);
        assert!(px.right() <= 100 && px.bottom() <= 100);
    }

    #[test]
    fn test_shrink_margin() {
        let r = PixelRect::new(10, 10, 100, 50).unwrap();
        let s = r.shrink_margin(0.18);
        assert_eq!(s.x, 28);
        assert_eq!(s.y, 19);
        assert_eq!(s.w, 64);
        assert_eq!(s.h, 32);

        // Never collapses to zero
        let tiny = PixelRect::new(0, 0, 2, 2).unwrap();
        let s = tiny.shrink_margin(0.45);
        assert!(s.w >= 1 && s.h >= 1);
    }

    #[test]
    fn test_crop() {
        let r = GrayRaster::from_fn(8, 8, |x, y| (x + 8 * y) as u8).unwrap();
        let c = r.crop(&PixelRect::new(2, 3, 4, 2).unwrap()).unwrap();
        assert_eq!(c.width(), 4);
        assert_eq!(c.height(), 2);
        assert_eq!(c.get_pixel(0, 0), Some(2 + 8 * 3));
        assert_eq!(c.get_pixel(3, 1), Some(5 + 8 * 4));

        assert!(r.crop(&PixelRect::new(6, 6, 4, 4).unwrap()).is_err());
    }

    #[test]
    fn test_rotate_orth_roundtrip() {
        let r = GrayRaster::from_fn(5, 3, |x, y| (x * 10 + y) as u8).unwrap();
        let r90 = r.rotate_orth(Rotation::Deg90);
        assert_eq!(r90.width(), 3);
        assert_eq!(r90.height(), 5);
        // (0,0) -> (h-1, 0)
        assert_eq!(r90.get_pixel(2, 0), r.get_pixel(0, 0));

        let back = r90.rotate_orth(Rotation::Deg270);
        assert_eq!(back, r);

        let r180 = r.rotate_orth(Rotation::Deg180).rotate_orth(Rotation::Deg180);
        assert_eq!(r180, r);
    }

    #[test]
    fn test_downscale_area_uniform() {
        let r = GrayRaster::from_fn(100, 100, |_, _| 77).unwrap();
        let small = r.scale_to_max_dim(10).unwrap();
        assert_eq!(small.width(), 10);
        assert_eq!(small.height(), 10);
        assert!(small.data().iter().all(|&v| v == 77));
    }

    #[test]
    fn test_scale_preserves_aspect() {
        let r = GrayRaster::new(400, 200).unwrap();
        let s = r.scale_to_max_dim(100).unwrap();
        assert_eq!((s.width(), s.height()), (100, 50));
        // Already small enough: clone
        let same = s.scale_to_max_dim(200).unwrap();
        assert_eq!((same.width(), same.height()), (100, 50));
    }

    #[test]
    fn test_upscale_bilinear_range() {
        let r = GrayRaster::from_fn(4, 4, |x, _| if x < 2 { 0 } else { 255 }).unwrap();
        let up = r.scale_to_width(16).unwrap();
        assert_eq!(up.width(), 16);
        // Interpolated values stay within the source range
        assert!(up.data().iter().all(|&v| v <= 255));
        assert_eq!(up.get_pixel(0, 0), Some(0));
        assert_eq!(up.get_pixel(15, 0), Some(255));
    }

    #[test]
    fn test_region_stats() {
        let r = GrayRaster::from_fn(10, 10, |x, _| if x < 5 { 0 } else { 200 }).unwrap();
        let stats = r
            .region_stats(&PixelRect::new(0, 0, 10, 10).unwrap())
            .unwrap();
        assert!((stats.mean - 100.0).abs() < 1e-9);
        assert!((stats.std_dev - 100.0).abs() < 1e-9);
        assert_eq!(stats.count, 100);

        let below = r
            .count_below(&PixelRect::new(0, 0, 10, 10).unwrap(), 50.0)
            .unwrap();
        assert_eq!(below, 50);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = GrayRaster::decode(&[0u8; 16]).unwrap_err();
        assert!(matches!(err, CoreError::Decode(_)));
    }
}
