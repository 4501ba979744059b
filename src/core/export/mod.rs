//! Single-file export
//!
//! This module provides the publishing side of Statlake:
//! - The tiered export engine and its per-job state machine
//! - Part-file discovery after a partitioned write
//! - DuckDB snapshots of partitioned exports
//! - Run coordination and summary reporting

pub mod coordinator;
pub mod engine;
pub mod job;
pub mod locator;
pub mod snapshot;
pub mod summary;

pub use coordinator::ExportCoordinator;
pub use engine::{EngineSettings, TieredExportEngine};
pub use job::{ExportJob, ExportReport, JobState, Promotion, SnapshotStatus, WriteStrategy};
pub use locator::{locate_part, PartLocation};
pub use summary::{FailureKind, JobFailure, JobOutcome, RunSummary};
