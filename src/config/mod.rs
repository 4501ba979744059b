//! Configuration management for Statlake.
//!
//! TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Statlake uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `STATLAKE_<SECTION>_<KEY>` overrides
//! - Default values for optional settings
//! - Validation of every section and job
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level and dry-run flag
//! - [`StoreConfig`] - Store backend, HDFS endpoints, retry policy
//! - [`ExportConfig`] - Row-count threshold, preview, scratch directory, snapshots
//! - [`LoggingConfig`] - File logging
//! - [`JobConfig`] - One entry per exported result set
//!
//! # Example Configuration
//!
//! ```toml
//! [store]
//! kind = "hdfs"
//!
//! [store.hdfs]
//! rpc_url = "hdfs://namenode:9000"
//! web_url = "http://namenode:9870"
//! user = "${HDFS_USER}"
//!
//! [export]
//! row_count_threshold = 50000
//!
//! [[jobs]]
//! name = "career_stats"
//! input = "/data_raw/api_nba/career_stats.csv"
//! target_path = "/data_processed/career_stats_clean.csv"
//! tmp_path = "/data_processed/_tmp_career_stats"
//!
//! [jobs.report]
//! kind = "career_stats"
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, ExportConfig, HdfsConfig, JobConfig, LoggingConfig, ReportConfig,
    RetryConfig, StatlakeConfig, StoreConfig, StoreKind,
};
