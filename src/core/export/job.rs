//! Export job description and per-job report

use crate::config::JobConfig;
use crate::domain::{ExportError, JobName, PipelineError, Result, StorePath};
use std::fmt;
use std::time::Duration;

/// One dataset to publish as a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportJob {
    /// Job name, also the snapshot table name
    pub name: JobName,

    /// Final single-file location
    pub target_path: StorePath,

    /// Scratch directory owned by the job during the partitioned write
    pub tmp_path: StorePath,

    /// Largest row count exported through the direct write
    pub row_count_threshold: u64,
}

impl ExportJob {
    pub fn new(
        name: JobName,
        target_path: StorePath,
        tmp_path: StorePath,
        row_count_threshold: u64,
    ) -> Self {
        Self {
            name,
            target_path,
            tmp_path,
            row_count_threshold,
        }
    }

    /// Build a job from configuration, applying the global default threshold
    pub fn from_config(config: &JobConfig, default_threshold: u64) -> Self {
        Self::new(
            config.name.clone(),
            config.target_path.clone(),
            config.tmp_path.clone(),
            config.row_count_threshold.unwrap_or(default_threshold),
        )
    }

    /// `<target dir>/<job name>.duckdb`
    pub fn snapshot_path(&self) -> Result<StorePath> {
        self.target_path
            .sibling(&format!("{}.duckdb", self.name))
            .map_err(PipelineError::Other)
    }
}

/// Engine state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Init,
    Counting,
    DirectWrite,
    PartitionedWrite,
    LocatePart,
    Promote,
    FallbackCopy,
    Done,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Done | JobState::Failed)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Init => "INIT",
            JobState::Counting => "COUNTING",
            JobState::DirectWrite => "DIRECT_WRITE",
            JobState::PartitionedWrite => "PARTITIONED_WRITE",
            JobState::LocatePart => "LOCATE_PART",
            JobState::Promote => "PROMOTE",
            JobState::FallbackCopy => "FALLBACK_COPY",
            JobState::Done => "DONE",
            JobState::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// How the fragment reached the target on the partitioned path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Promotion {
    /// Atomic rename
    Moved,
    /// Download and re-upload after the rename failed
    Copied,
}

/// Write path that produced the target file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStrategy {
    Direct,
    Partitioned { promotion: Promotion },
}

impl fmt::Display for WriteStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteStrategy::Direct => f.write_str("direct"),
            WriteStrategy::Partitioned {
                promotion: Promotion::Moved,
            } => f.write_str("partitioned+move"),
            WriteStrategy::Partitioned {
                promotion: Promotion::Copied,
            } => f.write_str("partitioned+copy"),
        }
    }
}

/// Outcome of the secondary DuckDB export
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SnapshotStatus {
    /// Disabled, direct path, or job failed
    #[default]
    NotAttempted,
    /// Uploaded to the given path
    Uploaded(StorePath),
    /// Export or upload failed (job still succeeded)
    Failed(String),
}

/// Everything the engine observed while running one job
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub job: JobName,
    pub target_path: StorePath,

    /// Visited states in order, starting at `Init`
    pub transitions: Vec<JobState>,

    /// Row count, when counting succeeded
    pub row_count: Option<u64>,

    /// Set once the job reaches `Done`
    pub strategy: Option<WriteStrategy>,

    pub snapshot: SnapshotStatus,

    /// First lines of the target after success
    pub preview: Vec<String>,

    /// Absorbed, non-fatal errors
    pub degradations: Vec<ExportError>,

    /// The fatal error, when the job ended in `Failed`
    pub error: Option<ExportError>,

    pub duration: Duration,
}

impl ExportReport {
    pub fn new(job: &ExportJob) -> Self {
        Self {
            job: job.name.clone(),
            target_path: job.target_path.clone(),
            transitions: vec![JobState::Init],
            row_count: None,
            strategy: None,
            snapshot: SnapshotStatus::NotAttempted,
            preview: Vec::new(),
            degradations: Vec::new(),
            error: None,
            duration: Duration::ZERO,
        }
    }

    /// Current (last entered) state
    pub fn state(&self) -> JobState {
        self.transitions.last().copied().unwrap_or(JobState::Init)
    }

    pub fn is_done(&self) -> bool {
        self.state() == JobState::Done
    }

    pub fn visited(&self, state: JobState) -> bool {
        self.transitions.contains(&state)
    }

    pub(crate) fn enter(&mut self, state: JobState) {
        tracing::info!(
            job = %self.job,
            from = %self.state(),
            state = %state,
            "Export state transition"
        );
        crate::logging::record_state(state);
        self.transitions.push(state);
    }

    pub(crate) fn degrade(&mut self, error: ExportError) {
        tracing::warn!(job = %self.job, error = %error, "Export degraded");
        self.degradations.push(error);
    }

    /// `Ok(self)` when done, the fatal error otherwise
    pub fn into_result(self) -> Result<ExportReport> {
        match &self.error {
            Some(error) => Err(PipelineError::Export(error.clone())),
            None => Ok(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> ExportJob {
        ExportJob::new(
            JobName::new("career_stats").unwrap(),
            StorePath::new("/data_processed/career_stats_clean.csv").unwrap(),
            StorePath::new("/data_processed/_tmp_career").unwrap(),
            50_000,
        )
    }

    #[test]
    fn test_snapshot_path() {
        assert_eq!(
            job().snapshot_path().unwrap().as_str(),
            "/data_processed/career_stats.duckdb"
        );
    }

    #[test]
    fn test_report_transitions() {
        let mut report = ExportReport::new(&job());
        assert_eq!(report.state(), JobState::Init);

        report.enter(JobState::Counting);
        report.enter(JobState::DirectWrite);
        report.enter(JobState::Done);

        assert!(report.is_done());
        assert!(report.state().is_terminal());
        assert!(report.visited(JobState::DirectWrite));
        assert!(!report.visited(JobState::PartitionedWrite));
    }

    #[test]
    fn test_into_result() {
        let mut report = ExportReport::new(&job());
        report.error = Some(ExportError::PartitionedWrite("disk full".into()));
        assert!(matches!(
            report.into_result(),
            Err(PipelineError::Export(ExportError::PartitionedWrite(_)))
        ));
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(WriteStrategy::Direct.to_string(), "direct");
        assert_eq!(
            WriteStrategy::Partitioned {
                promotion: Promotion::Copied
            }
            .to_string(),
            "partitioned+copy"
        );
        assert_eq!(JobState::FallbackCopy.to_string(), "FALLBACK_COPY");
    }
}
