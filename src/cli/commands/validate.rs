//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Statlake configuration file.

use crate::config::{load_config, StatlakeConfig, StoreKind};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// `load_config` validates as it loads, so a load failure covers both
    /// parse and validation errors.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(2); // Configuration error exit code
            }
        };

        println!("✅ Configuration is valid");
        println!();
        print_summary(&config);
        Ok(0)
    }
}

fn print_summary(config: &StatlakeConfig) {
    println!("Configuration Summary:");
    println!("  Log Level: {}", config.application.log_level);
    println!("  Dry Run: {}", config.application.dry_run);

    match config.store.kind {
        StoreKind::Hdfs => {
            println!("  Store: HDFS");
            println!("  RPC URL: {}", config.store.hdfs.rpc_url);
            println!("  WebHDFS URL: {}", config.store.hdfs.web_url);
            println!("  User: {}", config.store.hdfs.user);
        }
        StoreKind::Local => {
            println!("  Store: local");
            println!(
                "  Root: {}",
                config.store.local_root.as_deref().unwrap_or("-")
            );
        }
    }
    println!("  Max Retries: {}", config.store.retry.max_retries);

    println!("  Row Count Threshold: {}", config.export.row_count_threshold);
    println!("  Preview Lines: {}", config.export.preview_lines);
    println!("  Scratch Dir: {}", config.export.scratch_dir);
    println!("  Snapshots: {}", config.export.snapshot_enabled);

    println!("  Jobs: {}", config.jobs.len());
    for job in &config.jobs {
        println!(
            "    - {} [{}] -> {}",
            job.name,
            job.report.kind(),
            job.target_path
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_validate_missing_file() {
        let code = ValidateArgs {}
            .execute("/nonexistent/statlake.toml")
            .await
            .unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_validate_invalid_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[export]\nrow_count_threshold = 0").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
