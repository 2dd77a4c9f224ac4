//! Sheetscan - scan-overlay calibration and mark detection
//!
//! Sheetscan turns scanned medical encoding sheets into structured
//! checked-zone records: it finds the printed content rectangle on each
//! page, aligns a percentage-based zone overlay to it, scores each zone
//! for handwritten ink, reads the patient's stay-number barcode, and
//! collects the result into append-only patient entries.
//!
//! # Overview
//!
//! - Percentage-rect geometry with quarter-turn rotation and
//!   rotation-agnostic drag handling
//! - Content-rectangle detection from edge-energy projection profiles
//! - Dual ink scoring: adaptive density and model subtraction
//! - Interleaved 2 of 5 barcode location and decoding
//! - Session orchestration with cancellation by version counter
//!
//! # Example
//!
//! ```
//! use sheetscan::{GrayRaster, RectPct};
//!
//! let page = GrayRaster::new(1200, 900).unwrap();
//! let overlay = RectPct::new(5.0, 5.0, 90.0, 90.0).unwrap();
//! assert!(overlay.contains_point(50.0, 50.0));
//! assert_eq!(page.max_dim(), 1200);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use sheetscan_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use sheetscan_barcode as barcode;
pub use sheetscan_detect as detect;
pub use sheetscan_score as score;
pub use sheetscan_session as session;
