//! sheetscan-test - Synthetic-image test support
//!
//! Builders for the synthetic pages the workspace tests run against:
//! blank paper, framed content areas, ink patches at percentage
//! rectangles, and rendered Interleaved 2 of 5 stripes. Everything is
//! deterministic; no image files are read from disk.

use sheetscan_core::{GrayRaster, PixelRect, RectPct};

/// Luminance of clean paper.
pub const PAPER: u8 = 255;
/// Luminance of printed/inked content.
pub const INK: u8 = 20;

/// A blank white page.
pub fn blank_page(width: u32, height: u32) -> GrayRaster {
    GrayRaster::new(width, height).expect("test page dimensions")
}

/// A page with a pure white margin of `margin_frac` of each dimension
/// around a uniformly dark interior.
pub fn framed_page(width: u32, height: u32, margin_frac: f64, interior: u8) -> GrayRaster {
    let mx = (width as f64 * margin_frac).round() as u32;
    let my = (height as f64 * margin_frac).round() as u32;
    GrayRaster::from_fn(width, height, |x, y| {
        if x >= mx && x < width - mx && y >= my && y < height - my {
            interior
        } else {
            PAPER
        }
    })
    .expect("test page dimensions")
}

/// Fill a percentage rectangle of the page with a luminance value.
pub fn paint_pct(page: &mut GrayRaster, rect: &RectPct, value: u8) {
    let px = PixelRect::from_pct(rect, page.width(), page.height()).expect("paintable rect");
    paint_px(page, &px, value);
}

/// Fill a pixel rectangle of the page with a luminance value.
pub fn paint_px(page: &mut GrayRaster, rect: &PixelRect, value: u8) {
    for y in rect.y..rect.bottom() {
        for x in rect.x..rect.right() {
            page.set_pixel_unchecked(x, y, value);
        }
    }
}

/// Fill the centered fraction of a percentage rectangle, leaving its border
/// untouched. `coverage` is the linear fraction of each extent (0.0-1.0).
pub fn paint_pct_center(page: &mut GrayRaster, rect: &RectPct, coverage: f64, value: u8) {
    let px = PixelRect::from_pct(rect, page.width(), page.height()).expect("paintable rect");
    let inset = (1.0 - coverage) / 2.0;
    paint_px(page, &px.shrink_margin(inset), value);
}

/// Interleaved 2 of 5 element patterns for digits 0-9 (1 = narrow, 2 = wide).
const I2OF5_DIGITS: [[u8; 5]; 10] = [
    [1, 1, 2, 2, 1], // 0
    [2, 1, 1, 1, 2], // 1
    [1, 2, 1, 1, 2], // 2
    [2, 2, 1, 1, 1], // 3
    [1, 1, 2, 1, 2], // 4
    [2, 1, 2, 1, 1], // 5
    [1, 2, 2, 1, 1], // 6
    [1, 1, 1, 2, 2], // 7
    [2, 1, 1, 2, 1], // 8
    [1, 2, 1, 2, 1], // 9
];

/// Render an Interleaved 2 of 5 barcode stripe.
///
/// `digits` must contain an even number of values in 0-9. `narrow` is the
/// narrow element width in pixels (wide elements are twice that); `quiet`
/// is the white quiet zone on each side.
///
/// # Panics
///
/// Panics on invalid digits or an odd digit count (test helper only).
pub fn i2of5_strip(digits: &[u8], narrow: u32, quiet: u32, height: u32) -> GrayRaster {
    assert!(digits.len() % 2 == 0, "I2of5 needs an even digit count");
    assert!(digits.iter().all(|&d| d < 10), "digits must be 0-9");
    assert!(narrow >= 1 && height >= 1);

    // Element widths, alternating bar/space, starting with a bar.
    let mut elements: Vec<u8> = vec![1, 1, 1, 1]; // start code
    for pair in digits.chunks(2) {
        let bars = I2OF5_DIGITS[pair[0] as usize];
        let spaces = I2OF5_DIGITS[pair[1] as usize];
        for i in 0..5 {
            elements.push(bars[i]);
            elements.push(spaces[i]);
        }
    }
    elements.extend_from_slice(&[2, 1, 1]); // stop code

    let bar_width: u32 = elements.iter().map(|&e| e as u32 * narrow).sum();
    let width = bar_width + 2 * quiet;

    let mut strip = GrayRaster::new(width, height).expect("strip dimensions");
    let mut x = quiet;
    for (i, &e) in elements.iter().enumerate() {
        let w = e as u32 * narrow;
        if i % 2 == 0 {
            // bars are even-indexed elements
            paint_px(
                &mut strip,
                &PixelRect::new(x, 0, w, height).expect("bar rect"),
                0,
            );
        }
        x += w;
    }
    strip
}

/// Paste a smaller raster into a page at pixel coordinates.
pub fn blit(page: &mut GrayRaster, src: &GrayRaster, x0: u32, y0: u32) {
    for y in 0..src.height() {
        for x in 0..src.width() {
            if x0 + x < page.width() && y0 + y < page.height() {
                page.set_pixel_unchecked(x0 + x, y0 + y, src.get_pixel_unchecked(x, y));
            }
        }
    }
}
