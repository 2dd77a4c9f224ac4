//! sheetscan-session - Encoding-session orchestration
//!
//! Owns the mutable per-page state of one operator session (rotation,
//! overlay rectangles, checked maps, stay number) and coordinates the
//! pure detection/scoring/barcode passes over raster snapshots, with
//! cancellation by version counter and append-only patient commits.

pub mod drag;
pub mod entry;
pub mod error;
pub mod session;

pub use drag::{DragMode, DragState, MIN_DRAG_PCT};
pub use entry::{EntrySink, MemorySink, PRUNE_KEEP, PatientEntry, commit_entry};
pub use error::{SessionError, SessionResult};
pub use session::EncodingSession;
