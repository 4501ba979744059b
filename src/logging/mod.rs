//! Logging and observability
//!
//! Structured logging with:
//! - Human-readable console output
//! - Configurable log levels (overridable with `RUST_LOG`)
//! - JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use statlake::logging::init_logging;
//! use statlake::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(job = "career_stats", "Export started");
//! ```

pub mod structured;

pub use structured::{init_logging, job_span, record_state, LoggingGuard};

/// Log the start of an export job
///
/// # Example
///
/// ```no_run
/// use statlake::log_job_start;
///
/// log_job_start!("career_stats", "/data_processed/career_stats_clean.csv");
/// ```
#[macro_export]
macro_rules! log_job_start {
    ($job:expr, $target:expr) => {
        tracing::info!(
            job = %$job,
            target_path = %$target,
            "Starting export job"
        );
    };
}

/// Log the completion of an export job
///
/// # Example
///
/// ```no_run
/// use statlake::log_job_complete;
/// use std::time::Duration;
///
/// log_job_complete!("career_stats", "partitioned", Duration::from_secs(3));
/// ```
#[macro_export]
macro_rules! log_job_complete {
    ($job:expr, $strategy:expr, $duration:expr) => {
        tracing::info!(
            job = %$job,
            strategy = %$strategy,
            duration_ms = $duration.as_millis() as u64,
            "Export job completed"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use statlake::log_retry_attempt;
///
/// log_retry_attempt!("list", 2, 3, "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($operation:expr, $attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            operation = $operation,
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying store operation"
        );
    };
}
