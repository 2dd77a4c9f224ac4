//! sheetscan-barcode - Patient barcode reading
//!
//! Locates and decodes Interleaved 2 of 5 barcodes inside template-marked
//! zones of a scanned page: averaged scan lines, sub-pixel threshold
//! crossings, narrow/wide quantization, and the interleaved digit-pair
//! decoder.

pub mod error;
pub mod formats;
pub mod locate;
pub mod signal;

pub use error::{BarcodeError, BarcodeResult};
pub use formats::{FormatVerification, decode_i2of5, verify_i2of5};
pub use locate::{BarcodeOptions, DecodedBarcode, decode_in_zones, decode_stripe};
pub use signal::{average_scan_lines, crossings_to_widths, extract_crossings, find_crossings};
