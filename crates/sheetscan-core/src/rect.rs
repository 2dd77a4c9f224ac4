//! Percentage rectangles and quarter-turn rotation
//!
//! All overlay geometry is expressed in percentage units (0-100) of a
//! containing page, so the same rectangle is meaningful at any raster
//! resolution. Rotation is restricted to quarter turns and stays anchored
//! to the page's own 100x100 percentage space.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Minimum width/height a clamped rectangle keeps, in percent.
///
/// Keeps clamping total: a rectangle pushed entirely off the page still
/// comes back with a usable (if tiny) extent instead of a zero area.
pub const MIN_RECT_PCT: f64 = 0.01;

/// Clockwise quarter-turn rotation of a displayed page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    /// No rotation
    #[default]
    Deg0,
    /// 90 degrees clockwise
    Deg90,
    /// 180 degrees
    Deg180,
    /// 270 degrees clockwise
    Deg270,
}

impl Rotation {
    /// Create a rotation from an angle in degrees.
    ///
    /// The angle is normalized modulo 360 and must land on a multiple of 90.
    pub fn from_degrees(degrees: i32) -> Result<Self> {
        match degrees.rem_euclid(360) {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(CoreError::InvalidAngle(other)),
        }
    }

    /// Angle in degrees (0, 90, 180 or 270).
    pub fn degrees(self) -> u32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Number of clockwise quarter turns (0-3).
    pub fn quarter_turns(self) -> u32 {
        self.degrees() / 90
    }

    /// Add one clockwise quarter turn.
    pub fn plus_quarter(self) -> Self {
        match self {
            Rotation::Deg0 => Rotation::Deg90,
            Rotation::Deg90 => Rotation::Deg180,
            Rotation::Deg180 => Rotation::Deg270,
            Rotation::Deg270 => Rotation::Deg0,
        }
    }

    /// The rotation that undoes this one.
    pub fn inverse(self) -> Self {
        match self {
            Rotation::Deg0 => Rotation::Deg0,
            Rotation::Deg90 => Rotation::Deg270,
            Rotation::Deg180 => Rotation::Deg180,
            Rotation::Deg270 => Rotation::Deg90,
        }
    }

    /// Compose two rotations (apply `self`, then `other`).
    pub fn compose(self, other: Self) -> Self {
        match (self.quarter_turns() + other.quarter_turns()) % 4 {
            0 => Rotation::Deg0,
            1 => Rotation::Deg90,
            2 => Rotation::Deg180,
            _ => Rotation::Deg270,
        }
    }
}

/// An axis-aligned rectangle in percentage units (0-100) of a containing
/// page or image.
///
/// Used both for the reference rectangle of a template and for the overlay
/// rectangle on a scanned page. A valid rectangle has `w > 0` and `h > 0`;
/// after [`RectPct::clamp_to_page`] it also satisfies `x + w <= 100` and
/// `y + h <= 100`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectPct {
    /// Left edge, percent
    pub x: f64,
    /// Top edge, percent
    pub y: f64,
    /// Width, percent
    pub w: f64,
    /// Height, percent
    pub h: f64,
}

impl RectPct {
    /// Create a new rectangle.
    ///
    /// # Errors
    ///
    /// Returns an error if any component is non-finite or if width/height
    /// is not strictly positive.
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Result<Self> {
        if !(x.is_finite() && y.is_finite() && w.is_finite() && h.is_finite()) {
            return Err(CoreError::InvalidRect(format!(
                "non-finite component: x={x}, y={y}, w={w}, h={h}"
            )));
        }
        if w <= 0.0 || h <= 0.0 {
            return Err(CoreError::InvalidRect(format!(
                "width and height must be positive: w={w}, h={h}"
            )));
        }
        Ok(Self { x, y, w, h })
    }

    /// Create a rectangle without validation.
    pub const fn new_unchecked(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// The full 100x100 page.
    pub const fn full_page() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            w: 100.0,
            h: 100.0,
        }
    }

    /// Right edge, percent.
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    /// Bottom edge, percent.
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Area in percent-squared units.
    #[inline]
    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    /// Check whether a point lies inside the rectangle.
    #[inline]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Check whether this rectangle fully contains another.
    pub fn contains_rect(&self, other: &RectPct) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Expand the rectangle by a margin on each side.
    ///
    /// A negative margin shrinks it. Width and height are floored at
    /// [`MIN_RECT_PCT`].
    pub fn expand(&self, margin: f64) -> RectPct {
        RectPct {
            x: self.x - margin,
            y: self.y - margin,
            w: (self.w + 2.0 * margin).max(MIN_RECT_PCT),
            h: (self.h + 2.0 * margin).max(MIN_RECT_PCT),
        }
    }

    /// Clamp the rectangle into the 100x100 page.
    ///
    /// Position is clamped first, then the extent is limited so that
    /// `x + w <= 100` and `y + h <= 100`, with width/height floored at
    /// [`MIN_RECT_PCT`].
    pub fn clamp_to_page(&self) -> RectPct {
        let x = self.x.clamp(0.0, 100.0 - MIN_RECT_PCT);
        let y = self.y.clamp(0.0, 100.0 - MIN_RECT_PCT);
        let w = self.w.clamp(MIN_RECT_PCT, 100.0 - x);
        let h = self.h.clamp(MIN_RECT_PCT, 100.0 - y);
        RectPct { x, y, w, h }
    }

    /// How this rectangle (defined in unrotated model space) appears after
    /// the page is rotated clockwise by `rotation`.
    ///
    /// Rotation stays anchored to the page's own 100x100 percentage space:
    ///
    /// - 90°:  `x' = 100 - (y + h)`, `y' = x`, swapped extents
    /// - 180°: point reflection through the page center
    /// - 270°: inverse of 90°
    pub fn rotate(&self, rotation: Rotation) -> RectPct {
        match rotation {
            Rotation::Deg0 => *self,
            Rotation::Deg90 => RectPct {
                x: 100.0 - (self.y + self.h),
                y: self.x,
                w: self.h,
                h: self.w,
            },
            Rotation::Deg180 => RectPct {
                x: 100.0 - (self.x + self.w),
                y: 100.0 - (self.y + self.h),
                w: self.w,
                h: self.h,
            },
            Rotation::Deg270 => RectPct {
                x: self.y,
                y: 100.0 - (self.x + self.w),
                w: self.h,
                h: self.w,
            },
        }
    }
}

/// Map a pointer delta expressed in the displayed (rotated) percentage
/// space back into unrotated model space.
///
/// This is the exact inverse of the rotation applied by
/// [`RectPct::rotate`], so drag handlers can work purely in model space
/// regardless of the current display rotation.
pub fn map_display_delta_to_model(dx: f64, dy: f64, rotation: Rotation) -> (f64, f64) {
    match rotation {
        Rotation::Deg0 => (dx, dy),
        Rotation::Deg90 => (dy, -dx),
        Rotation::Deg180 => (-dx, -dy),
        Rotation::Deg270 => (-dy, dx),
    }
}

/// Map a delta in unrotated model space into the displayed (rotated)
/// percentage space. Inverse of [`map_display_delta_to_model`].
pub fn map_model_delta_to_display(dx: f64, dy: f64, rotation: Rotation) -> (f64, f64) {
    match rotation {
        Rotation::Deg0 => (dx, dy),
        Rotation::Deg90 => (-dy, dx),
        Rotation::Deg180 => (-dx, -dy),
        Rotation::Deg270 => (dy, -dx),
    }
}
