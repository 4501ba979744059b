//! Dataset transformations
//!
//! - [`variation`] - season-over-season performance variation columns
//! - [`csv`] - CSV encoding/decoding of tables

pub mod csv;
pub mod variation;

pub use self::csv::{decode_table, encode_table};
pub use variation::{compute as compute_variation, VARIATION_COLUMN, VARIATION_PCT_COLUMN};
