//! Domain error types
//!
//! This module defines the error hierarchy for Statlake.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Statlake error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Distributed store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Export job errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Dataset shape or content errors (missing key columns, bad CSV)
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Embedded snapshot database errors
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Distributed store errors
///
/// Errors raised by store adapters. Command failures keep the exit status and
/// captured output for diagnostics.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An external command exited with a non-zero status
    #[error("Command `{command}` failed with status {status}: {output}")]
    CommandFailed {
        command: String,
        status: i32,
        output: String,
    },

    /// An external command did not finish within its deadline
    #[error("Command `{command}` timed out after {seconds}s")]
    CommandTimeout { command: String, seconds: u64 },

    /// An external command could not be started
    #[error("Failed to spawn `{command}`: {message}")]
    CommandSpawn { command: String, message: String },

    /// Listing a directory failed (path unreachable)
    #[error("Failed to list {path}: {cause}")]
    ListFailed { path: String, cause: String },

    /// HTTP error status from the store's REST gateway
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    /// Network/connection errors
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Response could not be interpreted
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Local filesystem errors while staging data
    #[error("I/O error: {0}")]
    Io(String),
}

/// Export job error taxonomy
///
/// `Count`, `DirectWrite`, `SnapshotExport` and `Preview` are absorbed by the
/// engine and recorded as degradations. The remaining variants fail the job.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExportError {
    /// Row count unknown; the engine degrades to the partitioned path
    #[error("Row count failed: {0}")]
    Count(String),

    /// In-memory collect or single-object write failed
    #[error("Direct write failed: {0}")]
    DirectWrite(String),

    /// The single-fragment write itself failed
    #[error("Partitioned write failed: {0}")]
    PartitionedWrite(String),

    /// No output fragment could be found after a successful write
    #[error("No part file found in {tmp_path}: {detail}")]
    PartFileNotFound { tmp_path: String, detail: String },

    /// Both the atomic move and the byte-level copy failed
    #[error("Failed to promote part file: move failed: {move_cause}; fallback copy failed: {copy_cause}")]
    Promotion {
        move_cause: String,
        copy_cause: String,
    },

    /// Secondary analytical export or its upload failed
    #[error("Snapshot export failed: {0}")]
    SnapshotExport(String),

    /// Post-write preview read failed
    #[error("Preview read failed: {0}")]
    Preview(String),
}

impl ExportError {
    /// Whether this error terminates the job
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ExportError::PartitionedWrite(_)
                | ExportError::PartFileNotFound { .. }
                | ExportError::Promotion { .. }
        )
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Io(err.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for PipelineError {
    fn from(err: toml::de::Error) -> Self {
        PipelineError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<csv::Error> for PipelineError {
    fn from(err: csv::Error) -> Self {
        PipelineError::Dataset(format!("CSV error: {err}"))
    }
}

impl From<duckdb::Error> for PipelineError {
    fn from(err: duckdb::Error) -> Self {
        PipelineError::Snapshot(err.to_string())
    }
}
