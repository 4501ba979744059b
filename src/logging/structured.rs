//! Subscriber setup and per-job spans
//!
//! Every export job runs inside an `export_job` span carrying `job`,
//! `target_path` and the job's current `state`. The console shows the span
//! context inline; the JSON file layer flattens it into each event.
//!
//! # Example
//!
//! ```no_run
//! use statlake::logging::init_logging;
//! use statlake::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//! ```

use crate::config::LoggingConfig;
use crate::domain::{JobName, PipelineError, Result, StorePath};
use std::fmt::Display;
use tracing::{Level, Span};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// File name prefix of the JSON log files
pub const LOG_FILE_PREFIX: &str = "statlake.log";

/// HTTP client internals stay at `warn` unless `RUST_LOG` says otherwise
const QUIET_TARGETS: &[&str] = &["reqwest", "hyper", "rustls"];

/// Keeps the non-blocking file writer alive; logs are flushed on drop
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over `log_level_str`.
///
/// # Errors
///
/// Returns a configuration error for an unknown level, an unwritable log
/// directory, or when a global subscriber is already installed.
pub fn init_logging(log_level_str: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let level = parse_log_level(log_level_str)?;
    let directives = default_directives(level);

    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directives))
    };

    let console_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_filter(filter())
        .boxed();

    let (file_layer, file_guard) = if config.local_enabled {
        std::fs::create_dir_all(&config.local_path).map_err(|e| {
            PipelineError::Configuration(format!(
                "Failed to create log directory {}: {e}",
                config.local_path
            ))
        })?;

        let appender = RollingFileAppender::new(
            parse_rotation(&config.local_rotation),
            &config.local_path,
            LOG_FILE_PREFIX,
        );
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(writer)
            .with_filter(filter())
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| {
            PipelineError::Configuration(format!("Failed to install tracing subscriber: {e}"))
        })?;

    tracing::info!(
        level = %level,
        file_logging = config.local_enabled,
        log_dir = %config.local_path,
        "Logging initialized"
    );

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Span wrapping one export job
///
/// `state` starts empty and is filled in by [`record_state`].
pub fn job_span(job: &JobName, target_path: &StorePath) -> Span {
    tracing::info_span!(
        "export_job",
        job = %job,
        target_path = %target_path,
        state = tracing::field::Empty,
    )
}

/// Record the job's current state on the enclosing `export_job` span
pub fn record_state(state: impl Display) {
    Span::current().record("state", tracing::field::display(state));
}

/// Filter directives used when `RUST_LOG` is unset
fn default_directives(level: Level) -> String {
    let mut directives = vec![format!("statlake={level}")];
    directives.extend(QUIET_TARGETS.iter().map(|target| format!("{target}=warn")));
    directives.join(",")
}

fn parse_log_level(level_str: &str) -> Result<Level> {
    match level_str.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(PipelineError::Configuration(format!(
            "Invalid log level: {level_str}. Must be one of: trace, debug, info, warn, error"
        ))),
    }
}

fn parse_rotation(rotation: &str) -> Rotation {
    match rotation {
        "hourly" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}
