//! Export command implementation
//!
//! This module implements the `export` command, which runs the configured
//! jobs against the distributed store.

use crate::adapters::store::create_store;
use crate::config::{load_config, JobConfig, StatlakeConfig};
use crate::core::export::{ExportCoordinator, RunSummary};
use crate::domain::PipelineError;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Run only these jobs (comma-separated names)
    #[arg(long)]
    pub job: Option<String>,

    /// Override the direct-write row count threshold for every job
    #[arg(long, value_name = "N")]
    pub row_count_threshold: Option<u64>,

    /// Skip the DuckDB snapshot after partitioned exports
    #[arg(long)]
    pub no_snapshot: bool,

    /// Dry run mode - validate and print the plan without touching the store
    #[arg(long)]
    pub dry_run: bool,
}

impl ExportArgs {
    /// Job names from `--job`, trimmed, empty entries dropped
    pub fn job_filter(&self) -> Vec<String> {
        self.job
            .as_deref()
            .map(|jobs| {
                jobs.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        self.apply_overrides(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let filter = self.job_filter();
        let jobs = match config.selected_jobs(&filter) {
            Ok(jobs) => jobs,
            Err(e) => {
                tracing::error!(error = %e, "Invalid job selection");
                eprintln!("Invalid job selection: {e}");
                return Ok(2);
            }
        };

        if jobs.is_empty() {
            println!("No jobs configured. Nothing to export.");
            return Ok(0);
        }

        if self.dry_run || config.application.dry_run {
            tracing::info!(job_count = jobs.len(), "Dry run mode enabled - store will not be touched");
            println!("🔍 DRY RUN MODE - No data will be written to the store");
            println!();
            print_plan(&config, &jobs);
            return Ok(0);
        }

        tracing::info!(backend = ?config.store.kind, "Creating store adapter");
        let store = match create_store(&config.store) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create store adapter");
                eprintln!("Failed to initialize store: {e}");
                return Ok(4); // Store initialisation error exit code
            }
        };

        println!("🚀 Starting export of {} job(s)...", jobs.len());
        println!();

        let coordinator = ExportCoordinator::new(config, store, shutdown_signal);
        let summary = match coordinator.execute_export(&filter).await {
            Ok(s) => s,
            Err(PipelineError::Configuration(e)) => {
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                eprintln!("Export failed: {e}");
                return Ok(5); // Fatal error exit code
            }
        };

        print_summary(&summary);
        Ok(exit_code(&summary))
    }

    fn apply_overrides(&self, config: &mut StatlakeConfig) {
        if let Some(threshold) = self.row_count_threshold {
            tracing::info!(threshold, "Overriding row count threshold from CLI");
            config.export.row_count_threshold = threshold;
            for job in &mut config.jobs {
                job.row_count_threshold = None;
            }
        }

        if self.no_snapshot {
            tracing::info!("Disabling snapshots from CLI");
            config.export.snapshot_enabled = false;
        }
    }
}

/// Exit code for a finished run
pub fn exit_code(summary: &RunSummary) -> i32 {
    if summary.skipped > 0 {
        130 // SIGINT exit code (standard Unix convention)
    } else if summary.failed > 0 {
        1 // Partial success
    } else {
        0
    }
}

fn print_plan(config: &StatlakeConfig, jobs: &[&JobConfig]) {
    println!("Export plan ({:?} store):", config.store.kind);
    for job in jobs {
        println!("  - {}", describe_job(job, config.export.row_count_threshold));
    }
    println!();
    println!(
        "  Snapshots: {}",
        if config.export.snapshot_enabled {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!();
}

fn describe_job(job: &JobConfig, default_threshold: u64) -> String {
    format!(
        "{} [{}]: {} -> {} (tmp: {}, threshold: {})",
        job.name,
        job.report.kind(),
        job.input,
        job.target_path,
        job.tmp_path,
        job.row_count_threshold.unwrap_or(default_threshold)
    )
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("📊 Export Summary:");
    println!("  Total Jobs: {}", summary.total_jobs);
    println!("  Succeeded: {}", summary.succeeded);
    println!("  Failed: {}", summary.failed);
    if summary.skipped > 0 {
        println!("  Skipped: {}", summary.skipped);
    }
    println!("  Started: {}", summary.started_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!("  Success Rate: {:.2}%", summary.success_rate());
    println!();

    for outcome in &summary.outcomes {
        let strategy = outcome
            .strategy
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {} {} ({}, rows: {})",
            outcome.job,
            outcome.state,
            strategy,
            outcome
                .row_count
                .map(|n| n.to_string())
                .unwrap_or_else(|| "?".to_string())
        );
    }
    println!();

    if !summary.errors.is_empty() {
        println!("⚠️  Errors encountered:");
        for error in &summary.errors {
            println!("  - {} ({:?}): {}", error.job, error.kind, error.message);
        }
        println!();
    }

    if summary.skipped > 0 {
        println!("⚠️  Export interrupted. Remaining jobs were not started.");
    } else if summary.is_successful() {
        println!("✅ Export completed successfully!");
    } else {
        println!("⚠️  Export completed with failures");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportConfig;
    use crate::domain::JobName;

    fn args() -> ExportArgs {
        ExportArgs {
            job: None,
            row_count_threshold: None,
            no_snapshot: false,
            dry_run: false,
        }
    }

    #[test]
    fn test_job_filter() {
        assert!(args().job_filter().is_empty());

        let args = ExportArgs {
            job: Some("a, b,,c ".to_string()),
            ..args()
        };
        assert_eq!(args.job_filter(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_overrides() {
        let mut config: StatlakeConfig = toml::from_str(
            r#"
[[jobs]]
name = "career_stats"
input = "/raw/career.csv"
target_path = "/out/career.csv"
tmp_path = "/out/_tmp"
row_count_threshold = 10
"#,
        )
        .unwrap();

        let args = ExportArgs {
            row_count_threshold: Some(5),
            no_snapshot: true,
            ..args()
        };
        args.apply_overrides(&mut config);

        assert_eq!(config.export.row_count_threshold, 5);
        assert_eq!(config.jobs[0].row_count_threshold, None);
        assert!(!config.export.snapshot_enabled);
    }

    #[test]
    fn test_describe_job() {
        let job = JobConfig {
            name: "games".parse().unwrap(),
            input: "/raw/game.csv".parse().unwrap(),
            target_path: "/out/games.csv".parse().unwrap(),
            tmp_path: "/out/_tmp_games".parse().unwrap(),
            row_count_threshold: None,
            report: ReportConfig::SpectacularGames { limit: 10 },
        };
        assert_eq!(
            describe_job(&job, 50_000),
            "games [spectacular_games]: /raw/game.csv -> /out/games.csv (tmp: /out/_tmp_games, threshold: 50000)"
        );
    }

    #[test]
    fn test_exit_codes() {
        let mut summary = RunSummary::new(2);
        assert_eq!(exit_code(&summary), 0);

        summary.record_failure(
            JobName::new("games").unwrap(),
            crate::core::export::FailureKind::Source,
            "missing".into(),
        );
        assert_eq!(exit_code(&summary), 1);

        summary.record_skipped(1);
        assert_eq!(exit_code(&summary), 130);
    }
}
