//! Domain models and types for Statlake.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`StorePath`], [`JobName`])
//! - **The dataset model** ([`Table`], [`Value`])
//! - **Error types** ([`PipelineError`], [`StoreError`], [`ExportError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Store paths are validated once, on construction:
//!
//! ```rust
//! use statlake::domain::StorePath;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let target = StorePath::new("/data_processed/career_stats_clean.csv")?;
//! let snapshot = target.sibling("career_stats.duckdb")?;
//! assert_eq!(snapshot.as_str(), "/data_processed/career_stats.duckdb");
//!
//! assert!(StorePath::new("relative/path.csv").is_err());
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod errors;
pub mod ids;
pub mod result;
pub mod table;

// Re-export commonly used types for convenience
pub use errors::{ExportError, PipelineError, StoreError};
pub use ids::{JobName, StorePath};
pub use result::Result;
pub use table::{Table, Value};
