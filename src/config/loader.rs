//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{StatlakeConfig, StoreKind};
use crate::domain::errors::PipelineError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into StatlakeConfig
/// 4. Applies environment variable overrides (STATLAKE_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use statlake::config::loader::load_config;
///
/// let config = load_config("statlake.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<StatlakeConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(PipelineError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        PipelineError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: StatlakeConfig = toml::from_str(&contents)
        .map_err(|e| PipelineError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        PipelineError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| PipelineError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(PipelineError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using STATLAKE_* prefix
///
/// Environment variables follow the pattern: STATLAKE_<SECTION>_<KEY>
/// For example: STATLAKE_STORE_KIND, STATLAKE_EXPORT_ROW_COUNT_THRESHOLD
fn apply_env_overrides(config: &mut StatlakeConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("STATLAKE_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("STATLAKE_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Store overrides
    if let Ok(val) = std::env::var("STATLAKE_STORE_KIND") {
        config.store.kind = match val.to_lowercase().as_str() {
            "hdfs" => StoreKind::Hdfs,
            "local" => StoreKind::Local,
            other => {
                return Err(PipelineError::Configuration(format!(
                    "Invalid STATLAKE_STORE_KIND '{other}'. Must be one of: hdfs, local"
                )))
            }
        };
    }
    if let Ok(val) = std::env::var("STATLAKE_STORE_LOCAL_ROOT") {
        config.store.local_root = Some(val);
    }
    if let Ok(val) = std::env::var("STATLAKE_STORE_HDFS_RPC_URL") {
        config.store.hdfs.rpc_url = val;
    }
    if let Ok(val) = std::env::var("STATLAKE_STORE_HDFS_WEB_URL") {
        config.store.hdfs.web_url = val;
    }
    if let Ok(val) = std::env::var("STATLAKE_STORE_HDFS_USER") {
        config.store.hdfs.user = val;
    }
    if let Ok(val) = std::env::var("STATLAKE_STORE_HDFS_BINARY") {
        config.store.hdfs.binary = val;
    }
    if let Ok(val) = std::env::var("STATLAKE_STORE_HDFS_COMMAND_TIMEOUT_SECONDS") {
        if let Ok(seconds) = val.parse() {
            config.store.hdfs.command_timeout_seconds = seconds;
        }
    }
    if let Ok(val) = std::env::var("STATLAKE_STORE_RETRY_MAX_RETRIES") {
        if let Ok(retries) = val.parse() {
            config.store.retry.max_retries = retries;
        }
    }

    // Export overrides
    if let Ok(val) = std::env::var("STATLAKE_EXPORT_ROW_COUNT_THRESHOLD") {
        if let Ok(threshold) = val.parse() {
            config.export.row_count_threshold = threshold;
        }
    }
    if let Ok(val) = std::env::var("STATLAKE_EXPORT_PREVIEW_LINES") {
        if let Ok(lines) = val.parse() {
            config.export.preview_lines = lines;
        }
    }
    if let Ok(val) = std::env::var("STATLAKE_EXPORT_SETTLE_DELAY_MS") {
        if let Ok(delay) = val.parse() {
            config.export.settle_delay_ms = delay;
        }
    }
    if let Ok(val) = std::env::var("STATLAKE_EXPORT_SCRATCH_DIR") {
        config.export.scratch_dir = val;
    }
    if let Ok(val) = std::env::var("STATLAKE_EXPORT_SNAPSHOT_ENABLED") {
        config.export.snapshot_enabled = val.parse().unwrap_or(true);
    }

    // Logging overrides
    if let Ok(val) = std::env::var("STATLAKE_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("STATLAKE_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("STATLAKE_TEST_WEB_HOST", "namenode.internal");
        let input = "web_url = \"http://${STATLAKE_TEST_WEB_HOST}:9870\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "web_url = \"http://namenode.internal:9870\"\n");
        std::env::remove_var("STATLAKE_TEST_WEB_HOST");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("STATLAKE_TEST_MISSING_VAR");
        let input = "user = \"${STATLAKE_TEST_MISSING_VAR}\"";
        let result = substitute_env_vars(input);
        assert!(result.is_err());
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("STATLAKE_TEST_COMMENTED");
        let input = "# user = \"${STATLAKE_TEST_COMMENTED}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "info"

[store]
kind = "local"
local_root = "/srv/lake"

[[jobs]]
name = "career_stats"
input = "/data_raw/api_nba/career_stats.csv"
target_path = "/data_processed/career_stats_clean.csv"
tmp_path = "/data_processed/_tmp_career_stats"

[jobs.report]
kind = "career_stats"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.store.kind, StoreKind::Local);
        assert_eq!(config.jobs.len(), 1);
        assert_eq!(
            config.jobs[0].target_path.as_str(),
            "/data_processed/career_stats_clean.csv"
        );
    }
}
