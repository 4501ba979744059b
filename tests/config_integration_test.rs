//! Integration tests for configuration loading and validation
//!
//! Tests that modify environment variables hold `ENV_MUTEX` to avoid
//! interference between tests.

use statlake::config::{load_config, ReportConfig, StoreKind};
use statlake::domain::PipelineError;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn cleanup_env_vars() {
    for var in [
        "STATLAKE_APPLICATION_LOG_LEVEL",
        "STATLAKE_APPLICATION_DRY_RUN",
        "STATLAKE_STORE_KIND",
        "STATLAKE_STORE_LOCAL_ROOT",
        "STATLAKE_STORE_HDFS_USER",
        "STATLAKE_EXPORT_ROW_COUNT_THRESHOLD",
        "STATLAKE_EXPORT_SNAPSHOT_ENABLED",
        "TEST_HDFS_USER",
    ] {
        std::env::remove_var(var);
    }
}

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const COMPLETE_CONFIG: &str = r#"
[application]
log_level = "debug"
dry_run = false

[store]
kind = "hdfs"

[store.hdfs]
rpc_url = "hdfs://namenode:9000"
web_url = "http://namenode:9870"
user = "etl"
binary = "/opt/hadoop/bin/hdfs"
command_timeout_seconds = 120

[store.retry]
max_retries = 5
initial_delay_ms = 100
max_delay_ms = 1000
backoff_multiplier = 3.0

[export]
row_count_threshold = 1000
preview_lines = 10
settle_delay_ms = 0
scratch_dir = "/var/tmp/statlake"
snapshot_enabled = false

[logging]
local_enabled = false
local_rotation = "hourly"

[[jobs]]
name = "career_stats"
input = "/data_raw/api_nba/career_stats.csv"
target_path = "/data_processed/career_stats_clean.csv"
tmp_path = "/data_processed/_tmp_career_stats"

[jobs.report]
kind = "career_stats"
stat_columns = ["PTS", "AST"]

[[jobs]]
name = "spectacular_games"
input = "/data_raw/kaggle/game.csv"
target_path = "/data_processed/spectacular_games.csv"
tmp_path = "/data_processed/_tmp_games"
row_count_threshold = 20

[jobs.report]
kind = "spectacular_games"
limit = 25
"#;

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(COMPLETE_CONFIG);
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.store.kind, StoreKind::Hdfs);
    assert_eq!(config.store.hdfs.binary, "/opt/hadoop/bin/hdfs");
    assert_eq!(config.store.retry.max_retries, 5);
    assert_eq!(config.export.row_count_threshold, 1000);
    assert!(!config.export.snapshot_enabled);
    assert_eq!(config.logging.local_rotation, "hourly");

    assert_eq!(config.jobs.len(), 2);
    match &config.jobs[0].report {
        ReportConfig::CareerStats {
            group_key,
            stat_columns,
            ..
        } => {
            assert_eq!(group_key, "PLAYER_ID");
            assert_eq!(stat_columns, &vec!["PTS".to_string(), "AST".to_string()]);
        }
        other => panic!("unexpected report {other:?}"),
    }
    assert_eq!(config.jobs[1].row_count_threshold, Some(20));
    assert_eq!(
        config.jobs[1].report,
        ReportConfig::SpectacularGames { limit: 25 }
    );
}

#[test]
fn test_minimal_config_uses_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config("");
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "info");
    assert_eq!(config.store.kind, StoreKind::Hdfs);
    assert_eq!(config.export.row_count_threshold, 50_000);
    assert!(config.export.snapshot_enabled);
    assert!(config.jobs.is_empty());
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("TEST_HDFS_USER", "hadoop");

    let file = write_config(
        r#"
[store.hdfs]
user = "${TEST_HDFS_USER}"
"#,
    );
    let config = load_config(file.path()).unwrap();
    assert_eq!(config.store.hdfs.user, "hadoop");

    cleanup_env_vars();
}

#[test]
fn test_missing_env_var_is_an_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[store.hdfs]
user = "${TEST_HDFS_USER}"
"#,
    );
    match load_config(file.path()) {
        Err(PipelineError::Configuration(message)) => {
            assert!(message.contains("TEST_HDFS_USER"));
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn test_env_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("STATLAKE_STORE_KIND", "local");
    std::env::set_var("STATLAKE_STORE_LOCAL_ROOT", "/srv/lake");
    std::env::set_var("STATLAKE_EXPORT_ROW_COUNT_THRESHOLD", "42");
    std::env::set_var("STATLAKE_APPLICATION_LOG_LEVEL", "warn");

    let file = write_config(COMPLETE_CONFIG);
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.store.kind, StoreKind::Local);
    assert_eq!(config.store.local_root.as_deref(), Some("/srv/lake"));
    assert_eq!(config.export.row_count_threshold, 42);
    assert_eq!(config.application.log_level, "warn");

    cleanup_env_vars();
}

#[test]
fn test_invalid_store_kind_override() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("STATLAKE_STORE_KIND", "s3");

    let file = write_config("");
    assert!(matches!(
        load_config(file.path()),
        Err(PipelineError::Configuration(_))
    ));

    cleanup_env_vars();
}

#[test]
fn test_job_paths_are_validated() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let nested = write_config(
        r#"
[[jobs]]
name = "career_stats"
input = "/raw/career.csv"
target_path = "/out/_tmp/career.csv"
tmp_path = "/out/_tmp"
"#,
    );
    assert!(load_config(nested.path()).is_err());

    let relative = write_config(
        r#"
[[jobs]]
name = "career_stats"
input = "raw/career.csv"
target_path = "/out/career.csv"
tmp_path = "/out/_tmp"
"#,
    );
    assert!(load_config(relative.path()).is_err());

    let tmp_inside_target = write_config(
        r#"
[[jobs]]
name = "career_stats"
input = "/raw/career.csv"
target_path = "/out"
tmp_path = "/out/_tmp"
"#,
    );
    assert!(load_config(tmp_inside_target.path()).is_err());
}

#[test]
fn test_career_report_columns_must_not_overlap() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[[jobs]]
name = "team_stats"
input = "/raw/team.csv"
target_path = "/out/team.csv"
tmp_path = "/out/_tmp_team"

[jobs.report]
kind = "career_stats"
group_key = "TEAM_ID"
stat_columns = ["PTS"]
"#,
    );
    match load_config(file.path()) {
        Err(PipelineError::Configuration(message)) => assert!(message.contains("TEAM_ID")),
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn test_duplicate_job_names_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[[jobs]]
name = "games"
input = "/raw/a.csv"
target_path = "/out/a.csv"
tmp_path = "/out/_tmp_a"

[[jobs]]
name = "games"
input = "/raw/b.csv"
target_path = "/out/b.csv"
tmp_path = "/out/_tmp_b"
"#,
    );
    assert!(load_config(file.path()).is_err());
}
