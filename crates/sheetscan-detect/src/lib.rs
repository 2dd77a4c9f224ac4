//! sheetscan-detect - Content-rectangle detection
//!
//! Finds the tight bounding rectangle of the printed content on a scanned
//! page, without any physical alignment markers, from row/column
//! edge-energy projection profiles with coarse-to-fine refinement.

pub mod detector;
pub mod error;
pub mod profile;

pub use detector::{DetectOptions, detect_content_rect};
pub use error::{DetectError, DetectResult};
pub use profile::{EnergyProfiles, edge_energy_profiles, initial_cut, refine_edge, smooth_profile};
