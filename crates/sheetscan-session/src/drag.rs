//! Overlay drag interaction
//!
//! One drag at a time: a pointer-down over a handle captures a snapshot
//! of the overlay rectangle and the page rotation, and every subsequent
//! move recomputes the candidate rectangle from that snapshot plus the
//! raw cumulative pointer delta. Nothing is applied incrementally, so a
//! long drag cannot accumulate drift.
//!
//! The pointer delta arrives in display (rotated) space. It is mapped to
//! model space once, and the handle's compass direction is mapped the
//! same way, so the edge arithmetic below never branches on the angle.

use crate::error::SessionResult;
use sheetscan_core::{RectPct, Rotation, map_display_delta_to_model};

/// Smallest overlay width/height a resize may leave, in page percent.
pub const MIN_DRAG_PCT: f64 = 1.0;

/// What a drag is doing: moving the whole rectangle or pulling one of
/// the eight resize handles. Handle names are display-space compass
/// directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Move,
    ResizeN,
    ResizeS,
    ResizeE,
    ResizeW,
    ResizeNe,
    ResizeNw,
    ResizeSe,
    ResizeSw,
}

/// Compass directions as quarter turns clockwise from north.
const NORTH: u32 = 0;
const EAST: u32 = 1;
const SOUTH: u32 = 2;
const WEST: u32 = 3;

impl DragMode {
    /// The display-space edges this handle moves.
    fn display_edges(self) -> &'static [u32] {
        match self {
            DragMode::Move => &[],
            DragMode::ResizeN => &[NORTH],
            DragMode::ResizeS => &[SOUTH],
            DragMode::ResizeE => &[EAST],
            DragMode::ResizeW => &[WEST],
            DragMode::ResizeNe => &[NORTH, EAST],
            DragMode::ResizeNw => &[NORTH, WEST],
            DragMode::ResizeSe => &[SOUTH, EAST],
            DragMode::ResizeSw => &[SOUTH, WEST],
        }
    }
}

/// Immutable snapshot taken at pointer-down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragState {
    /// What the drag manipulates
    pub mode: DragMode,
    /// Overlay rectangle at pointer-down, in model space
    pub start_rect: RectPct,
    /// Page rotation at pointer-down
    pub rotation: Rotation,
}

impl DragState {
    /// Begin a drag over `rect` at the page's current rotation.
    pub fn begin(mode: DragMode, start_rect: RectPct, rotation: Rotation) -> Self {
        Self {
            mode,
            start_rect,
            rotation,
        }
    }

    /// Candidate model rectangle for the cumulative display-space pointer
    /// delta `(display_dx, display_dy)` since pointer-down.
    pub fn resolve(&self, display_dx: f64, display_dy: f64) -> SessionResult<RectPct> {
        let (mdx, mdy) = map_display_delta_to_model(display_dx, display_dy, self.rotation);
        let r = &self.start_rect;

        if self.mode == DragMode::Move {
            let x = (r.x + mdx).clamp(0.0, 100.0 - r.w);
            let y = (r.y + mdy).clamp(0.0, 100.0 - r.h);
            return Ok(RectPct::new(x, y, r.w, r.h)?);
        }

        let mut x0 = r.x;
        let mut y0 = r.y;
        let mut x1 = r.right();
        let mut y1 = r.bottom();

        // A display edge is a model edge rotated back by the page angle.
        let back = self.rotation.quarter_turns();
        for &edge in self.mode.display_edges() {
            match (edge + 4 - back) % 4 {
                NORTH => y0 = (y0 + mdy).min(y1 - MIN_DRAG_PCT).max(0.0),
                EAST => x1 = (x1 + mdx).max(x0 + MIN_DRAG_PCT).min(100.0),
                SOUTH => y1 = (y1 + mdy).max(y0 + MIN_DRAG_PCT).min(100.0),
                WEST => x0 = (x0 + mdx).min(x1 - MIN_DRAG_PCT).max(0.0),
                _ => unreachable!("compass arithmetic is mod 4"),
            }
        }

        Ok(RectPct::new(x0, y0, x1 - x0, y1 - y0)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> RectPct {
        RectPct::new(x, y, w, h).unwrap()
    }

    #[test]
    fn test_move_translates() {
        let state = DragState::begin(DragMode::Move, rect(10.0, 10.0, 20.0, 20.0), Rotation::Deg0);
        let out = state.resolve(5.0, -3.0).unwrap();
        assert_eq!(out, rect(15.0, 7.0, 20.0, 20.0));
    }

    #[test]
    fn test_move_clamps_to_page() {
        let state = DragState::begin(DragMode::Move, rect(70.0, 70.0, 20.0, 20.0), Rotation::Deg0);
        let out = state.resolve(50.0, 50.0).unwrap();
        assert_eq!(out, rect(80.0, 80.0, 20.0, 20.0));
    }

    #[test]
    fn test_east_resize_at_zero_rotation_grows_width() {
        let state =
            DragState::begin(DragMode::ResizeE, rect(10.0, 10.0, 20.0, 20.0), Rotation::Deg0);
        let out = state.resolve(7.0, 0.0).unwrap();
        assert_eq!(out, rect(10.0, 10.0, 27.0, 20.0));
    }

    #[test]
    fn test_east_resize_at_quarter_turn_grows_height() {
        // Display east at 90 degrees is the model's north edge: a
        // rightward display drag enlarges the unrotated height.
        let start = rect(10.0, 10.0, 20.0, 20.0);
        let state = DragState::begin(DragMode::ResizeE, start, Rotation::Deg90);
        let out = state.resolve(7.0, 0.0).unwrap();
        assert_eq!(out.w, start.w);
        assert!((out.h - (start.h + 7.0)).abs() < 1e-9);
        assert!((out.y - (start.y - 7.0)).abs() < 1e-9);
    }

    #[test]
    fn test_resize_respects_minimum_size() {
        let state =
            DragState::begin(DragMode::ResizeW, rect(10.0, 10.0, 20.0, 20.0), Rotation::Deg0);
        // Drag the west edge far past the east edge
        let out = state.resolve(80.0, 0.0).unwrap();
        assert!((out.w - MIN_DRAG_PCT).abs() < 1e-9);
        assert!((out.right() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_corner_resize_moves_both_edges() {
        let state =
            DragState::begin(DragMode::ResizeSe, rect(10.0, 10.0, 20.0, 20.0), Rotation::Deg0);
        let out = state.resolve(5.0, 8.0).unwrap();
        assert_eq!(out, rect(10.0, 10.0, 25.0, 28.0));
    }

    #[test]
    fn test_resolve_is_not_incremental() {
        // Two resolves with the same cumulative delta give the same
        // rectangle regardless of intermediate moves.
        let state =
            DragState::begin(DragMode::ResizeE, rect(10.0, 10.0, 20.0, 20.0), Rotation::Deg0);
        let _mid = state.resolve(3.0, 0.0).unwrap();
        let a = state.resolve(7.0, 0.0).unwrap();
        let b = state.resolve(7.0, 0.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_half_turn_move_matches_negated_delta() {
        let start = rect(20.0, 20.0, 30.0, 10.0);
        let at0 = DragState::begin(DragMode::Move, start, Rotation::Deg0)
            .resolve(4.0, -2.0)
            .unwrap();
        let at180 = DragState::begin(DragMode::Move, start, Rotation::Deg180)
            .resolve(-4.0, 2.0)
            .unwrap();
        assert_eq!(at0, at180);
    }

    #[test]
    fn test_half_turn_north_handle_is_model_south_edge() {
        // The display north handle on an upside-down page grabs the
        // model's south edge.
        let start = rect(20.0, 20.0, 30.0, 10.0);
        let at180 = DragState::begin(DragMode::ResizeN, start, Rotation::Deg180)
            .resolve(-4.0, 2.0)
            .unwrap();
        let south_at0 = DragState::begin(DragMode::ResizeS, start, Rotation::Deg0)
            .resolve(4.0, -2.0)
            .unwrap();
        assert_eq!(at180, south_at0);
    }
}
