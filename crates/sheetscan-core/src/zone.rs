//! Overlay zones and sheet templates
//!
//! A zone is an axis-aligned rectangle authored against a template's
//! reference rectangle, in percentage units. Zones are constructed once
//! from a persisted template document and never mutated in place; every
//! normalization pass yields recomputed copies.

use crate::error::{CoreError, Result};
use crate::rect::RectPct;
use serde::{Deserialize, Serialize};

/// Floor for normalized zone width/height, in percent.
///
/// Avoids degenerate zero-size zones when a zone barely overlaps the
/// rectangle it is normalized against.
pub const MIN_ZONE_PCT: f64 = 0.5;

/// A single encodable zone on a sheet template.
///
/// Coordinates are percentages relative to a [`RectPct`] - either the
/// template's reference rectangle or a page's overlay rectangle, depending
/// on the processing stage. `page` is the zero-based relative page index
/// within one patient's multi-page template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayZone {
    /// Stable zone identifier
    pub id: String,
    /// Left edge, percent
    pub x: f64,
    /// Top edge, percent
    pub y: f64,
    /// Width, percent
    pub width: f64,
    /// Height, percent
    pub height: f64,
    /// Zero-based relative page index
    pub page: u32,
    /// Optional encoding code attached to the zone
    #[serde(default)]
    pub code: Option<String>,
    /// Optional operator-facing label
    #[serde(default)]
    pub label: Option<String>,
    /// Whether the zone carries the stay-number barcode
    #[serde(default)]
    pub is_barcode: bool,
}

impl OverlayZone {
    /// The zone's rectangle in the coordinate space it is currently
    /// expressed in.
    pub fn rect(&self) -> RectPct {
        RectPct::new_unchecked(self.x, self.y, self.width, self.height)
    }

    /// Re-express the zone's rectangle as absolute page percentages, given
    /// the rectangle its coordinates are relative to.
    ///
    /// Inverse of [`normalize_zones_against_rect`] for a single zone.
    pub fn resolve_against(&self, rect: &RectPct) -> RectPct {
        RectPct {
            x: rect.x + self.x / 100.0 * rect.w,
            y: rect.y + self.y / 100.0 * rect.h,
            w: self.width / 100.0 * rect.w,
            h: self.height / 100.0 * rect.h,
        }
    }

    /// A copy of the zone with a different rectangle.
    fn with_rect(&self, rect: RectPct) -> OverlayZone {
        OverlayZone {
            x: rect.x,
            y: rect.y,
            width: rect.w,
            height: rect.h,
            ..self.clone()
        }
    }
}

/// A sheet template: the zone set and reference geometry one patient's
/// encoding sheet is authored against.
///
/// Created once per template at load time and read-only for the lifetime
/// of an encoding session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetTemplate {
    /// Stable template identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Number of pages per patient
    pub pages_per_patient: u32,
    /// Zones, in template page percentages
    pub zones: Vec<OverlayZone>,
    /// Pixel width of the template's source image
    pub ref_width: f64,
    /// Pixel height of the template's source image
    pub ref_height: f64,
    /// Reference rectangle the zones were authored against, in template
    /// page percentages. `None` means the full page.
    #[serde(default)]
    pub reference_rect: Option<RectPct>,
    /// Opaque handle to the rendered reference page image, resolved by the
    /// template store. Present when model-subtraction scoring is available.
    #[serde(default)]
    pub background_image: Option<String>,
}

impl SheetTemplate {
    /// The reference rectangle, defaulting to the full page.
    pub fn reference_rect_or_full(&self) -> RectPct {
        self.reference_rect.unwrap_or_else(RectPct::full_page)
    }

    /// Iterate over the zones on one relative page.
    pub fn zones_on_page(&self, page: u32) -> impl Iterator<Item = &OverlayZone> {
        self.zones.iter().filter(move |z| z.page == page)
    }
}

/// Smallest rectangle containing all zones on `page`, expanded by
/// `padding_pct` on each side and clamped to the page.
///
/// Returns `None` if no zone matches the page index.
///
/// # Errors
///
/// Returns an error if `padding_pct` is negative or non-finite.
pub fn compute_tight_rect(
    zones: &[OverlayZone],
    page: u32,
    padding_pct: f64,
) -> Result<Option<RectPct>> {
    if !padding_pct.is_finite() || padding_pct < 0.0 {
        return Err(CoreError::InvalidParameter(format!(
            "padding must be non-negative: {padding_pct}"
        )));
    }

    let mut bounds: Option<(f64, f64, f64, f64)> = None;
    for zone in zones.iter().filter(|z| z.page == page) {
        let r = zone.rect();
        bounds = Some(match bounds {
            None => (r.x, r.y, r.right(), r.bottom()),
            Some((x1, y1, x2, y2)) => (
                x1.min(r.x),
                y1.min(r.y),
                x2.max(r.right()),
                y2.max(r.bottom()),
            ),
        });
    }

    Ok(bounds.map(|(x1, y1, x2, y2)| {
        RectPct {
            x: x1,
            y: y1,
            w: x2 - x1,
            h: y2 - y1,
        }
        .expand(padding_pct)
        .clamp_to_page()
    }))
}

/// Re-express each zone on `page` as percentages of `rect` instead of
/// percentages of the page.
///
/// The returned set always matches the input zones on that page in
/// identity, order and count; none are synthesized or dropped. Width and
/// height are floored at [`MIN_ZONE_PCT`]. Re-running with the same inputs
/// is bit-stable.
///
/// # Errors
///
/// Returns an error if `rect` has a non-positive extent.
pub fn normalize_zones_against_rect(
    zones: &[OverlayZone],
    page: u32,
    rect: &RectPct,
) -> Result<Vec<OverlayZone>> {
    if rect.w <= 0.0 || rect.h <= 0.0 {
        return Err(CoreError::InvalidRect(format!(
            "cannot normalize against empty rectangle: w={}, h={}",
            rect.w, rect.h
        )));
    }

    Ok(zones
        .iter()
        .filter(|z| z.page == page)
        .map(|zone| {
            let r = zone.rect();
            zone.with_rect(RectPct {
                x: (r.x - rect.x) / rect.w * 100.0,
                y: (r.y - rect.y) / rect.h * 100.0,
                w: (r.w / rect.w * 100.0).max(MIN_ZONE_PCT),
                h: (r.h / rect.h * 100.0).max(MIN_ZONE_PCT),
            })
        })
        .collect())
}
