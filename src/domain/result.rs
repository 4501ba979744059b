//! Result type alias for Statlake
//!
//! This module provides a convenient Result type alias that uses PipelineError
//! as the error type.

use super::errors::PipelineError;

/// Result type alias for Statlake operations
///
/// # Examples
///
/// ```
/// use statlake::domain::result::Result;
/// use statlake::domain::errors::PipelineError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(PipelineError::Dataset("missing column".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, PipelineError>;
