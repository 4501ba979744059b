//! Export coordinator - runs the configured jobs in order
//!
//! For each job: stage the source CSV locally, decode it, derive the report
//! dataset, and hand it to the [`TieredExportEngine`]. A failed job is
//! recorded in the [`RunSummary`] and the run continues with the next one.

use super::engine::{EngineSettings, TieredExportEngine};
use super::job::ExportJob;
use super::summary::{FailureKind, RunSummary};
use crate::adapters::store::DistributedStore;
use crate::config::{JobConfig, StatlakeConfig};
use crate::core::frame::InMemoryFrame;
use crate::core::reports::build_report;
use crate::core::transform::decode_table;
use crate::domain::context::ResultExt;
use crate::domain::{PipelineError, Result, StorePath, Table};
use crate::logging::job_span;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::Instrument;

/// Export coordinator
pub struct ExportCoordinator {
    config: StatlakeConfig,
    store: Arc<dyn DistributedStore>,
    engine: TieredExportEngine,
    shutdown_signal: watch::Receiver<bool>,
}

impl ExportCoordinator {
    /// Create a coordinator over an existing store handle
    pub fn new(
        config: StatlakeConfig,
        store: Arc<dyn DistributedStore>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Self {
        let engine = TieredExportEngine::new(
            store.clone(),
            EngineSettings::from_config(&config.export),
        );
        Self {
            config,
            store,
            engine,
            shutdown_signal,
        }
    }

    /// Run the selected jobs (all jobs when `job_filter` is empty)
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the filter names an unknown job. Job
    /// failures are reported in the summary, not as errors.
    pub async fn execute_export(&self, job_filter: &[String]) -> Result<RunSummary> {
        let start_time = Instant::now();
        let jobs = self
            .config
            .selected_jobs(job_filter)
            .map_err(PipelineError::Configuration)?;

        let mut summary = RunSummary::new(jobs.len());
        tracing::info!(
            job_count = jobs.len(),
            backend = self.store.backend(),
            "Starting export run"
        );

        for (idx, job_config) in jobs.iter().enumerate() {
            if *self.shutdown_signal.borrow() {
                let remaining = jobs.len() - idx;
                tracing::warn!(remaining, "Shutdown requested, skipping remaining jobs");
                summary.record_skipped(remaining);
                break;
            }
            let span = job_span(&job_config.name, &job_config.target_path);
            self.run_job(job_config, &mut summary).instrument(span).await;
        }

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    async fn run_job(&self, job_config: &JobConfig, summary: &mut RunSummary) {
        let job = ExportJob::from_config(job_config, self.config.export.row_count_threshold);
        crate::log_job_start!(job.name, job.target_path);

        let source = match self.load_source(&job_config.input).await {
            Ok(table) => table,
            Err(e) => {
                tracing::error!(job = %job.name, input = %job_config.input, error = %e, "Failed to load source");
                summary.record_failure(job.name.clone(), FailureKind::Source, e.to_string());
                return;
            }
        };

        let dataset = match build_report(&job_config.report, source) {
            Ok(table) => table,
            Err(e) => {
                tracing::error!(job = %job.name, error = %e, "Failed to build report");
                summary.record_failure(job.name.clone(), FailureKind::Transform, e.to_string());
                return;
            }
        };

        let frame = InMemoryFrame::new(dataset);
        let report = self.engine.run(&job, &frame).await;

        if let Some(strategy) = report.strategy {
            crate::log_job_complete!(job.name, strategy, report.duration);
        }
        summary.record_report(&report);
    }

    /// Download the source CSV to a scratch file and decode it
    async fn load_source(&self, input: &StorePath) -> Result<Table> {
        let scratch_dir = PathBuf::from(&self.config.export.scratch_dir);
        tokio::fs::create_dir_all(&scratch_dir).await?;
        let staged = tempfile::Builder::new()
            .prefix("source_")
            .suffix(".csv")
            .tempfile_in(&scratch_dir)?
            .into_temp_path();

        self.store
            .download(input, &staged)
            .await
            .with_context(|| format!("Failed to download {input}"))?;

        let table = tokio::task::spawn_blocking(move || {
            let file = std::fs::File::open(&staged)?;
            decode_table(std::io::BufReader::new(file))
        })
        .await
        .map_err(|e| PipelineError::Other(format!("Decode task failed: {e}")))?
        .with_context(|| format!("Failed to decode {input}"))?;

        tracing::info!(
            input = %input,
            rows = table.row_count(),
            columns = table.columns().len(),
            "Loaded source dataset"
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::LocalStore;
    use crate::config::{ExportConfig, ReportConfig, StoreConfig};
    use tempfile::TempDir;

    fn config(scratch: &TempDir, jobs: Vec<JobConfig>) -> StatlakeConfig {
        StatlakeConfig {
            application: Default::default(),
            store: StoreConfig::default(),
            export: ExportConfig {
                settle_delay_ms: 0,
                scratch_dir: scratch.path().to_string_lossy().into_owned(),
                snapshot_enabled: false,
                ..ExportConfig::default()
            },
            logging: Default::default(),
            jobs,
        }
    }

    fn job(name: &str, input: &str, report: ReportConfig) -> JobConfig {
        JobConfig {
            name: name.parse().unwrap(),
            input: input.parse().unwrap(),
            target_path: format!("/data_processed/{name}.csv").parse().unwrap(),
            tmp_path: format!("/data_processed/_tmp_{name}").parse().unwrap(),
            row_count_threshold: None,
            report,
        }
    }

    #[tokio::test]
    async fn test_failed_job_does_not_stop_run() {
        let (root, scratch) = (TempDir::new().unwrap(), TempDir::new().unwrap());
        let store = Arc::new(LocalStore::new(root.path()));
        store
            .write_text(
                &"/raw/career.csv".parse().unwrap(),
                "PLAYER_ID,SEASON_ID,PTS\n1,2019-20,10\n1,2020-21,15\n",
            )
            .await
            .unwrap();

        let jobs = vec![
            job("missing", "/raw/absent.csv", ReportConfig::Raw),
            job("career_stats", "/raw/career.csv", ReportConfig::career_stats()),
        ];
        let (_tx, rx) = watch::channel(false);
        let coordinator = ExportCoordinator::new(config(&scratch, jobs), store, rx);

        let summary = coordinator.execute_export(&[]).await.unwrap();
        assert_eq!(summary.total_jobs, 2);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.errors[0].kind, FailureKind::Source);

        let output =
            std::fs::read_to_string(root.path().join("data_processed/career_stats.csv")).unwrap();
        assert_eq!(
            output,
            "PLAYER_ID,SEASON_ID,PTS,performance_variation,performance_variation_pct\n\
             1,2019-20,10,0.0,0.0\n\
             1,2020-21,15,5.0,50.0\n"
        );
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_job_filter() {
        let (root, scratch) = (TempDir::new().unwrap(), TempDir::new().unwrap());
        let (_tx, rx) = watch::channel(false);
        let coordinator = ExportCoordinator::new(
            config(&scratch, vec![]),
            Arc::new(LocalStore::new(root.path())),
            rx,
        );

        let result = coordinator.execute_export(&["nope".to_string()]).await;
        assert!(matches!(result, Err(PipelineError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_shutdown_skips_jobs() {
        let (root, scratch) = (TempDir::new().unwrap(), TempDir::new().unwrap());
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let jobs = vec![job("a", "/raw/a.csv", ReportConfig::Raw)];
        let coordinator =
            ExportCoordinator::new(config(&scratch, jobs), Arc::new(LocalStore::new(root.path())), rx);

        let summary = coordinator.execute_export(&[]).await.unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 0);
        assert!(!summary.is_successful());
    }
}
