//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "statlake.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Statlake configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        match fs::write(&self.output, Self::sample_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your store and job settings", self.output);
                println!("  2. Set HDFS_USER (or put it in a .env file)");
                println!("  3. Validate configuration: statlake validate-config");
                println!("  4. Preview the plan: statlake export --dry-run");
                println!("  5. Run export: statlake export");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Sample configuration with the three NBA jobs
    fn sample_config() -> &'static str {
        r#"# Statlake Configuration File
# Single-file exports of NBA statistics to HDFS

[application]
log_level = "info"
dry_run = false

# ============================================================================
# Store
# ============================================================================
[store]
kind = "hdfs"  # hdfs | local
# local_root = "/srv/statlake"  # required when kind = "local"

[store.hdfs]
rpc_url = "hdfs://namenode:9000"
web_url = "http://namenode:9870"
user = "${HDFS_USER}"
binary = "hdfs"
command_timeout_seconds = 300
request_timeout_seconds = 60

# Retries apply to listing, removal and WebHDFS calls, never to moves
[store.retry]
max_retries = 3
initial_delay_ms = 1000
max_delay_ms = 30000
backoff_multiplier = 2.0

# ============================================================================
# Export engine
# ============================================================================
[export]
# Datasets with at most this many rows are written directly
row_count_threshold = 50000
# Lines read back from the target after success (0 disables)
preview_lines = 5
# Pause between the partitioned write and the listing
settle_delay_ms = 2000
scratch_dir = "/tmp/statlake"
# DuckDB snapshot next to partitioned exports
snapshot_enabled = true

[logging]
local_enabled = false
local_path = "/var/log/statlake"
local_rotation = "daily"  # daily | hourly | never

# ============================================================================
# Jobs (run in order)
# ============================================================================
[[jobs]]
name = "career_stats"
input = "/data_raw/api_nba/career_stats.csv"
target_path = "/data_processed/career_stats_clean.csv"
tmp_path = "/data_processed/_tmp_career_stats"

[jobs.report]
kind = "career_stats"

[[jobs]]
name = "spectacular_games"
input = "/data_raw/kaggle/game.csv"
target_path = "/data_processed/spectacular_games.csv"
tmp_path = "/data_processed/_tmp_spectacular_games"

[jobs.report]
kind = "spectacular_games"
limit = 10

[[jobs]]
name = "players"
input = "/data_raw/kaggle/player.csv"
target_path = "/data_processed/players.csv"
tmp_path = "/data_processed/_tmp_players"
row_count_threshold = 10000

[jobs.report]
kind = "raw"
"#
    }
}
