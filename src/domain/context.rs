//! Error context extension trait
//!
//! `.context()` / `.with_context()` for `Result<T, PipelineError>`, so library
//! code can annotate failures without giving up the typed error.
//!
//! # Examples
//!
//! ```rust
//! use statlake::domain::Result;
//! use statlake::domain::context::ResultExt;
//!
//! fn read_input(path: &str) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .with_context(|| format!("Failed to read staged input {path}"))
//! }
//! ```

use crate::domain::errors::PipelineError;
use crate::domain::result::Result;

/// Extension trait for adding context to `Result` types
pub trait ResultExt<T> {
    /// Add context to an error (evaluated eagerly)
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static;

    /// Add context to an error, computing it only on failure
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<PipelineError>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| PipelineError::Other(format!("{context}: {}", e.into())))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| {
            let base_error = e.into();
            PipelineError::Other(format!("{}: {base_error}", f()))
        })
    }
}
