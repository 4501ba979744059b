//! Run summary and reporting
//!
//! Tracks the outcome of every job in one `export` run.

use super::job::{ExportReport, JobState, WriteStrategy};
use crate::domain::{ExportError, JobName};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Where a job failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Source dataset could not be downloaded or decoded
    Source,
    /// Report derivation failed
    Transform,
    /// Partitioned write failed
    PartitionedWrite,
    /// No fragment found after the partitioned write
    PartFileNotFound,
    /// Move and fallback copy both failed
    Promotion,
    /// Anything else
    Other,
}

impl FailureKind {
    pub fn from_export_error(error: &ExportError) -> Self {
        match error {
            ExportError::PartitionedWrite(_) => FailureKind::PartitionedWrite,
            ExportError::PartFileNotFound { .. } => FailureKind::PartFileNotFound,
            ExportError::Promotion { .. } => FailureKind::Promotion,
            _ => FailureKind::Other,
        }
    }
}

/// A failed job
#[derive(Debug, Clone)]
pub struct JobFailure {
    pub job: JobName,
    pub kind: FailureKind,
    pub message: String,
}

/// Condensed engine result for one job
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub job: JobName,
    pub state: JobState,
    pub strategy: Option<WriteStrategy>,
    pub row_count: Option<u64>,
    pub degradations: usize,
    pub duration: Duration,
}

/// Summary of an export run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Jobs selected for the run
    pub total_jobs: usize,

    /// Jobs that reached `Done`
    pub succeeded: usize,

    /// Jobs that failed before or inside the engine
    pub failed: usize,

    /// Jobs not started because of a shutdown request
    pub skipped: usize,

    /// Engine outcomes, in run order
    pub outcomes: Vec<JobOutcome>,

    /// Failures, in run order
    pub errors: Vec<JobFailure>,

    /// Wall-clock start of the run
    pub started_at: DateTime<Utc>,

    pub duration: Duration,
}

impl RunSummary {
    pub fn new(total_jobs: usize) -> Self {
        Self {
            total_jobs,
            started_at: Utc::now(),
            ..Self::default()
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Record a job that reached the engine
    pub fn record_report(&mut self, report: &ExportReport) {
        self.outcomes.push(JobOutcome {
            job: report.job.clone(),
            state: report.state(),
            strategy: report.strategy,
            row_count: report.row_count,
            degradations: report.degradations.len(),
            duration: report.duration,
        });

        match &report.error {
            None => self.succeeded += 1,
            Some(error) => self.record_failure(
                report.job.clone(),
                FailureKind::from_export_error(error),
                error.to_string(),
            ),
        }
    }

    /// Record a job that failed
    pub fn record_failure(&mut self, job: JobName, kind: FailureKind, message: String) {
        self.failed += 1;
        self.errors.push(JobFailure { job, kind, message });
    }

    pub fn record_skipped(&mut self, count: usize) {
        self.skipped += count;
    }

    /// Every selected job reached `Done`
    pub fn is_successful(&self) -> bool {
        self.failed == 0 && self.skipped == 0
    }

    /// Percentage of selected jobs that succeeded
    pub fn success_rate(&self) -> f64 {
        if self.total_jobs == 0 {
            return 100.0;
        }
        (self.succeeded as f64 / self.total_jobs as f64) * 100.0
    }

    pub fn log_summary(&self) {
        tracing::info!(
            total_jobs = self.total_jobs,
            succeeded = self.succeeded,
            failed = self.failed,
            skipped = self.skipped,
            started_at = %self.started_at.to_rfc3339(),
            duration_secs = self.duration.as_secs(),
            success_rate = format!("{:.2}%", self.success_rate()),
            "Export run completed"
        );

        for failure in &self.errors {
            tracing::warn!(
                job = %failure.job,
                kind = ?failure.kind,
                message = %failure.message,
                "Job failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::export::job::{ExportJob, Promotion};
    use crate::domain::StorePath;

    fn report(error: Option<ExportError>) -> ExportReport {
        let job = ExportJob::new(
            JobName::new("career_stats").unwrap(),
            StorePath::new("/out/career.csv").unwrap(),
            StorePath::new("/out/_tmp").unwrap(),
            10,
        );
        let mut report = ExportReport::new(&job);
        report.error = error;
        report
    }

    #[test]
    fn test_empty_summary() {
        let summary = RunSummary::new(0);
        assert!(summary.started_at.timestamp() > 0);
        assert!(summary.is_successful());
        assert_eq!(summary.success_rate(), 100.0);
    }

    #[test]
    fn test_record_reports() {
        let mut summary = RunSummary::new(3);

        let mut ok = report(None);
        ok.strategy = Some(WriteStrategy::Partitioned {
            promotion: Promotion::Copied,
        });
        summary.record_report(&ok);
        summary.record_report(&report(Some(ExportError::Promotion {
            move_cause: "a".into(),
            copy_cause: "b".into(),
        })));
        summary.record_failure(
            JobName::new("games").unwrap(),
            FailureKind::Source,
            "download failed".into(),
        );

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.outcomes.len(), 2);
        assert_eq!(summary.errors[0].kind, FailureKind::Promotion);
        assert_eq!(summary.errors[1].kind, FailureKind::Source);
        assert!(!summary.is_successful());
        assert!((summary.success_rate() - 33.33).abs() < 0.01);
    }

    #[test]
    fn test_skipped_jobs_are_not_successful() {
        let mut summary = RunSummary::new(2);
        summary.record_report(&report(None));
        summary.record_skipped(1);
        assert!(!summary.is_successful());
    }
}
