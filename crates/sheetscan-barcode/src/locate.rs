//! Zone-driven barcode location on a scanned page
//!
//! The overlay template marks which zones may carry a patient barcode;
//! candidates are tried in template order and the first zone that decodes
//! wins. A low-resolution stripe gets one bilinear upscale retry before
//! the zone is given up on.

use crate::error::{BarcodeError, BarcodeResult};
use crate::formats::decode_i2of5;
use crate::signal::{crossings_to_widths, extract_crossings};
use sheetscan_core::{GrayRaster, PixelRect};

/// Tunable parameters for barcode location.
#[derive(Debug, Clone)]
pub struct BarcodeOptions {
    /// Starting luminance threshold for crossing detection
    pub crossing_threshold: f32,
    /// Stripe width below which a failed decode earns an upscale retry,
    /// and the width the retry scales to
    pub target_width: u32,
    /// Cap on the upscale factor for the retry
    pub max_upscale: f64,
}

impl Default for BarcodeOptions {
    fn default() -> Self {
        Self {
            crossing_threshold: 120.0,
            target_width: 600,
            max_upscale: 4.0,
        }
    }
}

/// A successfully decoded barcode and the candidate zone it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBarcode {
    /// Index into the candidate zone slice
    pub zone_index: usize,
    /// Decoded digit string
    pub digits: String,
}

fn decode_once(stripe: &GrayRaster, opts: &BarcodeOptions) -> BarcodeResult<String> {
    let crossings = extract_crossings(stripe, opts.crossing_threshold)?;
    let widths = crossings_to_widths(&crossings)?;
    decode_i2of5(&widths)
}

/// Decode the barcode in one stripe, with a single upscale retry for
/// stripes narrower than the target width.
pub fn decode_stripe(stripe: &GrayRaster, opts: &BarcodeOptions) -> BarcodeResult<String> {
    if opts.target_width == 0 || opts.max_upscale < 1.0 {
        return Err(BarcodeError::InvalidParameter(format!(
            "target_width {} / max_upscale {}",
            opts.target_width, opts.max_upscale
        )));
    }

    match decode_once(stripe, opts) {
        Ok(digits) => Ok(digits),
        Err(err) => {
            if stripe.width() >= opts.target_width {
                return Err(err);
            }
            let factor =
                (opts.target_width as f64 / stripe.width() as f64).min(opts.max_upscale);
            let new_width = ((stripe.width() as f64 * factor).round() as u32).max(1);
            let new_height = ((stripe.height() as f64 * factor).round() as u32).max(1);
            let upscaled = stripe.resize(new_width, new_height)?;
            decode_once(&upscaled, opts)
        }
    }
}

/// Try each candidate zone on the page in order; the first decodable one
/// wins. All-fail yields [`BarcodeError::NoBarcode`].
pub fn decode_in_zones(
    page: &GrayRaster,
    zones: &[PixelRect],
    opts: &BarcodeOptions,
) -> BarcodeResult<DecodedBarcode> {
    for (zone_index, zone) in zones.iter().enumerate() {
        let stripe = match page.crop(zone) {
            Ok(stripe) => stripe,
            Err(_) => continue,
        };
        if let Ok(digits) = decode_stripe(&stripe, opts) {
            return Ok(DecodedBarcode { zone_index, digits });
        }
    }
    Err(BarcodeError::NoBarcode)
}
