//! Configuration schema types
//!
//! This module defines the configuration structure for Statlake.

use crate::domain::{JobName, StorePath};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Store backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// HDFS through `hdfs dfs` commands and WebHDFS
    #[default]
    Hdfs,
    /// Directory on the local filesystem
    Local,
}

/// Main Statlake configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatlakeConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Distributed store connection
    #[serde(default)]
    pub store: StoreConfig,

    /// Export engine settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Export jobs, run in order
    #[serde(default)]
    pub jobs: Vec<JobConfig>,
}

impl StatlakeConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.store.validate()?;
        self.export.validate()?;
        self.logging.validate()?;

        let mut names = HashSet::new();
        for job in &self.jobs {
            job.validate()?;
            if !names.insert(job.name.as_str()) {
                return Err(format!("Duplicate job name '{}'", job.name));
            }
        }
        Ok(())
    }

    /// Jobs matching a name filter (all jobs when the filter is empty)
    pub fn selected_jobs(&self, filter: &[String]) -> Result<Vec<&JobConfig>, String> {
        if filter.is_empty() {
            return Ok(self.jobs.iter().collect());
        }
        filter
            .iter()
            .map(|name| {
                self.jobs
                    .iter()
                    .find(|job| job.name.as_str() == name)
                    .ok_or_else(|| format!("Unknown job '{name}'"))
            })
            .collect()
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (validate and plan jobs without touching the store)
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Retry configuration for idempotent store operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts (1 disables retries)
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl RetryConfig {
    /// Single attempt, no backoff
    pub fn none() -> Self {
        Self {
            max_retries: 1,
            initial_delay_ms: 0,
            max_delay_ms: 0,
            backoff_multiplier: 1.0,
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.max_retries == 0 {
            return Err("store.retry.max_retries must be at least 1".to_string());
        }
        if self.backoff_multiplier < 1.0 {
            return Err("store.retry.backoff_multiplier must be >= 1.0".to_string());
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err("store.retry.initial_delay_ms cannot exceed max_delay_ms".to_string());
        }
        Ok(())
    }
}

/// Distributed store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend kind (hdfs or local)
    #[serde(default)]
    pub kind: StoreKind,

    /// Root directory for the local backend
    #[serde(default)]
    pub local_root: Option<String>,

    /// HDFS connection settings
    #[serde(default)]
    pub hdfs: HdfsConfig,

    /// Retry policy for idempotent operations
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::default(),
            local_root: None,
            hdfs: HdfsConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl StoreConfig {
    fn validate(&self) -> Result<(), String> {
        self.retry.validate()?;
        match self.kind {
            StoreKind::Hdfs => self.hdfs.validate(),
            StoreKind::Local => match &self.local_root {
                Some(root) if !root.trim().is_empty() => Ok(()),
                _ => Err("store.local_root is required when store.kind = 'local'".to_string()),
            },
        }
    }
}

/// HDFS connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HdfsConfig {
    /// Namenode RPC URL used to qualify paths passed to `hdfs dfs`
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// WebHDFS base URL
    #[serde(default = "default_web_url")]
    pub web_url: String,

    /// User name sent as `user.name`
    #[serde(default = "default_hdfs_user")]
    pub user: String,

    /// Path to the `hdfs` executable
    #[serde(default = "default_hdfs_binary")]
    pub binary: String,

    /// Deadline for a single `hdfs dfs` command (0 disables it)
    #[serde(default = "default_command_timeout_seconds")]
    pub command_timeout_seconds: u64,

    /// Timeout for WebHDFS requests in seconds
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

impl Default for HdfsConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            web_url: default_web_url(),
            user: default_hdfs_user(),
            binary: default_hdfs_binary(),
            command_timeout_seconds: default_command_timeout_seconds(),
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

impl HdfsConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.rpc_url.is_empty() && !self.rpc_url.starts_with("hdfs://") {
            return Err(format!(
                "store.hdfs.rpc_url must start with hdfs:// (got '{}')",
                self.rpc_url
            ));
        }
        let web = url::Url::parse(&self.web_url)
            .map_err(|e| format!("store.hdfs.web_url is not a valid URL: {e}"))?;
        if web.scheme() != "http" && web.scheme() != "https" {
            return Err("store.hdfs.web_url must use http or https".to_string());
        }
        if self.user.trim().is_empty() {
            return Err("store.hdfs.user cannot be empty".to_string());
        }
        if self.binary.trim().is_empty() {
            return Err("store.hdfs.binary cannot be empty".to_string());
        }
        if self.request_timeout_seconds == 0 {
            return Err("store.hdfs.request_timeout_seconds must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Export engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Largest row count exported through the direct in-memory write
    #[serde(default = "default_row_count_threshold")]
    pub row_count_threshold: u64,

    /// Number of lines read back from the target after a successful export
    #[serde(default = "default_preview_lines")]
    pub preview_lines: usize,

    /// Pause between the partitioned write and the directory listing
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Local directory for scratch copies and snapshot files
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: String,

    /// Upload a DuckDB snapshot next to partitioned exports
    #[serde(default = "default_true")]
    pub snapshot_enabled: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            row_count_threshold: default_row_count_threshold(),
            preview_lines: default_preview_lines(),
            settle_delay_ms: default_settle_delay_ms(),
            scratch_dir: default_scratch_dir(),
            snapshot_enabled: true,
        }
    }
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.row_count_threshold == 0 {
            return Err("export.row_count_threshold must be greater than 0".to_string());
        }
        if self.scratch_dir.trim().is_empty() {
            return Err("export.scratch_dir cannot be empty".to_string());
        }
        Ok(())
    }
}

/// One export job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Job name (also the snapshot table name)
    pub name: JobName,

    /// Source CSV object in the store
    pub input: StorePath,

    /// Final single-file location
    pub target_path: StorePath,

    /// Scratch directory for the partitioned write
    pub tmp_path: StorePath,

    /// Per-job override of `export.row_count_threshold`
    #[serde(default)]
    pub row_count_threshold: Option<u64>,

    /// How the exported dataset is derived from the source
    #[serde(default)]
    pub report: ReportConfig,
}

impl JobConfig {
    fn validate(&self) -> Result<(), String> {
        if self.tmp_path == self.target_path {
            return Err(format!(
                "Job '{}': tmp_path and target_path must differ",
                self.name
            ));
        }
        if self.tmp_path.is_ancestor_of(&self.target_path) {
            return Err(format!(
                "Job '{}': target_path cannot live inside tmp_path",
                self.name
            ));
        }
        if self.target_path.is_ancestor_of(&self.tmp_path) {
            return Err(format!(
                "Job '{}': tmp_path cannot live inside target_path",
                self.name
            ));
        }
        if self.row_count_threshold == Some(0) {
            return Err(format!(
                "Job '{}': row_count_threshold must be greater than 0",
                self.name
            ));
        }
        self.report.validate()
    }
}

/// Report derivation, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportConfig {
    /// Deduplicated career rows with performance variation columns
    CareerStats {
        #[serde(default = "default_group_key")]
        group_key: String,
        #[serde(default = "default_order_key")]
        order_key: String,
        #[serde(default = "default_stat_columns")]
        stat_columns: Vec<String>,
        /// Extra columns kept alongside keys and stats
        #[serde(default = "default_extra_columns")]
        extra_columns: Vec<String>,
    },
    /// Highest-scoring games with home and away totals combined
    SpectacularGames {
        #[serde(default = "default_games_limit")]
        limit: usize,
    },
    /// Source table as-is
    Raw,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig::Raw
    }
}

impl ReportConfig {
    /// Career report with the default NBA column set
    pub fn career_stats() -> Self {
        ReportConfig::CareerStats {
            group_key: default_group_key(),
            order_key: default_order_key(),
            stat_columns: default_stat_columns(),
            extra_columns: default_extra_columns(),
        }
    }

    /// The `kind` tag as written in the configuration file
    pub fn kind(&self) -> &'static str {
        match self {
            ReportConfig::CareerStats { .. } => "career_stats",
            ReportConfig::SpectacularGames { .. } => "spectacular_games",
            ReportConfig::Raw => "raw",
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            ReportConfig::CareerStats {
                group_key,
                order_key,
                stat_columns,
                extra_columns,
            } => {
                if group_key.trim().is_empty() || order_key.trim().is_empty() {
                    return Err("career_stats report requires group_key and order_key".to_string());
                }
                if group_key == order_key {
                    return Err("career_stats group_key and order_key must differ".to_string());
                }

                // Keys, extras and stats together name each column once
                let mut seen: HashSet<&str> = HashSet::new();
                seen.insert(group_key);
                seen.insert(order_key);
                for column in extra_columns.iter().chain(stat_columns) {
                    if !seen.insert(column) {
                        return Err(format!(
                            "career_stats column '{column}' is listed more than once \
                             across group_key, order_key, extra_columns and stat_columns"
                        ));
                    }
                }
                Ok(())
            }
            ReportConfig::SpectacularGames { limit } => {
                if *limit == 0 {
                    return Err("spectacular_games limit must be greater than 0".to_string());
                }
                Ok(())
            }
            ReportConfig::Raw => Ok(()),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_log_path")]
    pub local_path: String,

    /// Rotation policy (daily, hourly, never)
    #[serde(default = "default_log_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_log_path(),
            local_rotation: default_log_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }
        Ok(())
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    5000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_rpc_url() -> String {
    "hdfs://namenode:9000".to_string()
}

fn default_web_url() -> String {
    "http://namenode:9870".to_string()
}

fn default_hdfs_user() -> String {
    "root".to_string()
}

fn default_hdfs_binary() -> String {
    "hdfs".to_string()
}

fn default_command_timeout_seconds() -> u64 {
    300
}

fn default_request_timeout_seconds() -> u64 {
    60
}

pub(crate) fn default_row_count_threshold() -> u64 {
    50_000
}

fn default_preview_lines() -> usize {
    20
}

fn default_settle_delay_ms() -> u64 {
    500
}

fn default_scratch_dir() -> String {
    std::env::temp_dir().to_string_lossy().to_string()
}

fn default_group_key() -> String {
    "PLAYER_ID".to_string()
}

fn default_order_key() -> String {
    "SEASON_ID".to_string()
}

fn default_stat_columns() -> Vec<String> {
    [
        "GP", "MIN", "FGM", "FGA", "FG_PCT", "FTM", "FTA", "FT_PCT", "OREB", "DREB", "REB", "AST",
        "STL", "BLK", "TOV", "PF", "PTS",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_extra_columns() -> Vec<String> {
    vec!["TEAM_ID".to_string()]
}

fn default_games_limit() -> usize {
    10
}

fn default_log_path() -> String {
    "data/logs".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(name: &str, target: &str, tmp: &str) -> JobConfig {
        JobConfig {
            name: JobName::new(name).unwrap(),
            input: StorePath::new("/data_raw/input.csv").unwrap(),
            target_path: StorePath::new(target).unwrap(),
            tmp_path: StorePath::new(tmp).unwrap(),
            row_count_threshold: None,
            report: ReportConfig::Raw,
        }
    }

    fn config_with_jobs(jobs: Vec<JobConfig>) -> StatlakeConfig {
        StatlakeConfig {
            application: ApplicationConfig::default(),
            store: StoreConfig::default(),
            export: ExportConfig::default(),
            logging: LoggingConfig::default(),
            jobs,
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = config_with_jobs(vec![]);
        assert!(config.validate().is_ok());
        assert_eq!(config.export.row_count_threshold, 50_000);
        assert_eq!(config.export.preview_lines, 20);
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = config_with_jobs(vec![]);
        config.application.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_local_store_requires_root() {
        let mut config = config_with_jobs(vec![]);
        config.store.kind = StoreKind::Local;
        assert!(config.validate().is_err());
        config.store.local_root = Some("/srv/lake".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_web_url() {
        let mut config = config_with_jobs(vec![]);
        config.store.hdfs.web_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let mut config = config_with_jobs(vec![]);
        config.export.row_count_threshold = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_job_names_rejected() {
        let config = config_with_jobs(vec![
            job("career", "/out/a.csv", "/out/_tmp_a"),
            job("career", "/out/b.csv", "/out/_tmp_b"),
        ]);
        let err = config.validate().unwrap_err();
        assert!(err.contains("Duplicate job name"));
    }

    #[test]
    fn test_tmp_path_must_not_contain_target() {
        let config = config_with_jobs(vec![job("career", "/out/_tmp/a.csv", "/out/_tmp")]);
        assert!(config.validate().is_err());

        let config = config_with_jobs(vec![job("career", "/out/a.csv", "/out/a.csv")]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_target_path_must_not_contain_tmp() {
        let config = config_with_jobs(vec![job("career", "/out", "/out/_tmp")]);
        let err = config.validate().unwrap_err();
        assert!(err.contains("tmp_path cannot live inside target_path"));

        let config = config_with_jobs(vec![job("career", "/out/career.csv", "/out/_tmp")]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_selected_jobs_filter() {
        let config = config_with_jobs(vec![
            job("career", "/out/a.csv", "/out/_tmp_a"),
            job("games", "/out/b.csv", "/out/_tmp_b"),
        ]);
        assert_eq!(config.selected_jobs(&[]).unwrap().len(), 2);
        let selected = config.selected_jobs(&["games".to_string()]).unwrap();
        assert_eq!(selected[0].name.as_str(), "games");
        assert!(config.selected_jobs(&["nope".to_string()]).is_err());
    }

    #[test]
    fn test_report_config_deserialize_defaults() {
        let report: ReportConfig = toml::from_str("kind = \"career_stats\"").unwrap();
        assert_eq!(report, ReportConfig::career_stats());

        let report: ReportConfig = toml::from_str("kind = \"spectacular_games\"").unwrap();
        assert_eq!(report, ReportConfig::SpectacularGames { limit: 10 });
    }

    #[test]
    fn test_career_stats_overlapping_columns_rejected() {
        let career = |group_key: &str, stats: &[&str], extras: &[&str]| ReportConfig::CareerStats {
            group_key: group_key.to_string(),
            order_key: default_order_key(),
            stat_columns: stats.iter().map(|s| s.to_string()).collect(),
            extra_columns: extras.iter().map(|s| s.to_string()).collect(),
        };

        assert!(ReportConfig::career_stats().validate().is_ok());
        assert!(career("PLAYER_ID", &["PTS", "PTS"], &[]).validate().is_err());
        assert!(career("PLAYER_ID", &["PTS"], &["PTS"]).validate().is_err());
        assert!(career("TEAM_ID", &["PTS"], &["TEAM_ID"]).validate().is_err());
        assert!(career("PLAYER_ID", &["SEASON_ID"], &[]).validate().is_err());
        assert!(career("TEAM_ID", &["PTS"], &[]).validate().is_ok());
    }

    #[test]
    fn test_spectacular_games_zero_limit_rejected() {
        assert!(ReportConfig::SpectacularGames { limit: 0 }.validate().is_err());
    }
}
