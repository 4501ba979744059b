//! Tiered single-file export engine
//!
//! Publishes a dataset as exactly one file at the job's target path:
//!
//! 1. **Counting** the rows decides the first attempt.
//! 2. **Direct write**: small datasets are collected and written as one object.
//! 3. **Partitioned write**: otherwise (or when 1/2 fail) the frame engine writes
//!    a single fragment into the job's temporary directory, the fragment is
//!    located, and promoted to the target with an atomic move, falling back to
//!    a download/upload copy when the move fails.
//!
//! After success the target's first lines are read back as a preview, and
//! partitioned exports also get a DuckDB snapshot uploaded next to the target.

use super::job::{ExportJob, ExportReport, JobState, Promotion, SnapshotStatus, WriteStrategy};
use super::locator::{locate_part, PartLocation};
use super::snapshot::export_snapshot;
use crate::adapters::store::{DistributedStore, MoveResult};
use crate::config::ExportConfig;
use crate::core::frame::FrameEngine;
use crate::core::transform::encode_table;
use crate::domain::{ExportError, PipelineError, Result, StorePath};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Engine tunables
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Lines read back from the target after success (0 disables the preview)
    pub preview_lines: usize,

    /// Pause between the partitioned write and the listing
    pub settle_delay: Duration,

    /// Local directory for fallback copies and snapshot files
    pub scratch_dir: PathBuf,

    /// Upload a DuckDB snapshot after partitioned exports
    pub snapshot_enabled: bool,
}

impl EngineSettings {
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            preview_lines: config.preview_lines,
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            scratch_dir: PathBuf::from(&config.scratch_dir),
            snapshot_enabled: config.snapshot_enabled,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&ExportConfig::default())
    }
}

/// Runs export jobs against one store
pub struct TieredExportEngine {
    store: Arc<dyn DistributedStore>,
    settings: EngineSettings,
}

impl TieredExportEngine {
    pub fn new(store: Arc<dyn DistributedStore>, settings: EngineSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Run one job to a terminal state
    ///
    /// Never returns an error: the outcome is in [`ExportReport::error`] and
    /// the final state. On failure the job's temporary directory is left in
    /// place for inspection.
    pub async fn run(&self, job: &ExportJob, frame: &dyn FrameEngine) -> ExportReport {
        let start = Instant::now();
        let mut report = ExportReport::new(job);

        match self.write(job, frame, &mut report).await {
            Ok(strategy) => {
                report.strategy = Some(strategy);
                report.enter(JobState::Done);
                self.preview(job, &mut report).await;

                if self.settings.snapshot_enabled
                    && matches!(strategy, WriteStrategy::Partitioned { .. })
                {
                    report.snapshot = match self.snapshot(job, frame).await {
                        Ok(path) => {
                            tracing::info!(job = %job.name, snapshot = %path, "Snapshot uploaded");
                            SnapshotStatus::Uploaded(path)
                        }
                        Err(e) => {
                            let message = e.to_string();
                            report.degrade(ExportError::SnapshotExport(message.clone()));
                            SnapshotStatus::Failed(message)
                        }
                    };
                }
            }
            Err(error) => {
                tracing::error!(
                    job = %job.name,
                    target_path = %job.target_path,
                    tmp_path = %job.tmp_path,
                    error = %error,
                    "Export failed"
                );
                report.enter(JobState::Failed);
                report.error = Some(error);
            }
        }

        report.duration = start.elapsed();
        report
    }

    async fn write(
        &self,
        job: &ExportJob,
        frame: &dyn FrameEngine,
        report: &mut ExportReport,
    ) -> std::result::Result<WriteStrategy, ExportError> {
        report.enter(JobState::Counting);
        let row_count = match frame.count().await {
            Ok(count) => {
                tracing::info!(job = %job.name, row_count = count, "Counted rows");
                Some(count)
            }
            Err(e) => {
                report.degrade(ExportError::Count(e.to_string()));
                None
            }
        };
        report.row_count = row_count;

        if let Some(count) = row_count {
            if count <= job.row_count_threshold {
                report.enter(JobState::DirectWrite);
                match self.direct_write(job, frame).await {
                    Ok(()) => return Ok(WriteStrategy::Direct),
                    Err(e) => report.degrade(ExportError::DirectWrite(e.to_string())),
                }
            }
        }

        report.enter(JobState::PartitionedWrite);
        if let Err(e) = self.store.remove_recursive(&job.tmp_path).await {
            tracing::warn!(tmp_path = %job.tmp_path, error = %e, "Failed to clear temporary directory");
        }
        frame
            .write_single_fragment(self.store.as_ref(), &job.tmp_path)
            .await
            .map_err(|e| ExportError::PartitionedWrite(e.to_string()))?;

        if !self.settings.settle_delay.is_zero() {
            tokio::time::sleep(self.settings.settle_delay).await;
        }

        report.enter(JobState::LocatePart);
        let part = match locate_part(self.store.as_ref(), &job.tmp_path).await {
            Ok(PartLocation::Found(part)) => part,
            Ok(PartLocation::NotFound { listing }) => {
                return Err(ExportError::PartFileNotFound {
                    tmp_path: job.tmp_path.to_string(),
                    detail: format!("no part-* file in listing:\n{}", listing.raw),
                })
            }
            Err(e) => {
                return Err(ExportError::PartFileNotFound {
                    tmp_path: job.tmp_path.to_string(),
                    detail: e.to_string(),
                })
            }
        };
        tracing::info!(job = %job.name, part = %part, "Found part file");

        report.enter(JobState::Promote);
        if let Err(e) = self.store.remove(&job.target_path).await {
            tracing::warn!(target_path = %job.target_path, error = %e, "Failed to remove previous target");
        }

        let promotion = match self.store.move_path(&part, &job.target_path).await {
            MoveResult::Moved => Promotion::Moved,
            MoveResult::Failed(move_cause) => {
                tracing::warn!(job = %job.name, cause = %move_cause, "Move failed, copying instead");
                report.enter(JobState::FallbackCopy);
                self.fallback_copy(&part, &job.target_path)
                    .await
                    .map_err(|e| ExportError::Promotion {
                        move_cause,
                        copy_cause: e.to_string(),
                    })?;
                Promotion::Copied
            }
        };

        if let Err(e) = self.store.remove_recursive(&job.tmp_path).await {
            tracing::warn!(tmp_path = %job.tmp_path, error = %e, "Failed to remove temporary directory");
        }

        Ok(WriteStrategy::Partitioned { promotion })
    }

    async fn direct_write(&self, job: &ExportJob, frame: &dyn FrameEngine) -> Result<()> {
        let table = frame.collect().await?;
        let content = encode_table(&table)?;
        self.store.write_text(&job.target_path, &content).await?;
        tracing::info!(
            job = %job.name,
            target_path = %job.target_path,
            bytes = content.len(),
            "Wrote target directly"
        );
        Ok(())
    }

    /// Byte copy through a local scratch file removed on every exit path
    async fn fallback_copy(&self, part: &StorePath, target: &StorePath) -> Result<()> {
        tokio::fs::create_dir_all(&self.settings.scratch_dir).await?;
        let scratch = tempfile::Builder::new()
            .prefix("partfile_")
            .tempfile_in(&self.settings.scratch_dir)?
            .into_temp_path();

        self.store.download(part, &scratch).await?;
        self.store.upload(&scratch, target).await?;

        tracing::info!(part = %part, target_path = %target, "Copied part file to target");
        Ok(())
    }

    async fn snapshot(&self, job: &ExportJob, frame: &dyn FrameEngine) -> Result<StorePath> {
        let remote = job.snapshot_path()?;
        let table = frame.collect().await?;

        tokio::fs::create_dir_all(&self.settings.scratch_dir).await?;
        let workdir = tempfile::Builder::new()
            .prefix("snapshot_")
            .tempdir_in(&self.settings.scratch_dir)?;
        let local = workdir.path().join(format!("{}.duckdb", job.name));

        let table_name = job.name.to_string();
        let db_path = local.clone();
        tokio::task::spawn_blocking(move || export_snapshot(&table, &db_path, &table_name))
            .await
            .map_err(|e| PipelineError::Snapshot(format!("Snapshot task failed: {e}")))??;

        self.store.upload(&local, &remote).await?;
        Ok(remote)
    }

    async fn preview(&self, job: &ExportJob, report: &mut ExportReport) {
        if self.settings.preview_lines == 0 {
            return;
        }
        match self
            .store
            .read_head(&job.target_path, self.settings.preview_lines)
            .await
        {
            Ok(lines) => {
                tracing::info!(
                    job = %job.name,
                    preview = %lines.join("\n"),
                    "Target preview"
                );
                report.preview = lines;
            }
            Err(e) => report.degrade(ExportError::Preview(e.to_string())),
        }
    }
}
