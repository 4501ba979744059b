//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Statlake using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Statlake - single-file exports of NBA statistics to a distributed store
#[derive(Parser, Debug)]
#[command(name = "statlake")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "statlake.toml", env = "STATLAKE_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "STATLAKE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the configured export jobs
    Export(commands::export::ExportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_export() {
        let cli = Cli::parse_from(["statlake", "export"]);
        assert_eq!(cli.config, "statlake.toml");
        assert!(matches!(cli.command, Commands::Export(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["statlake", "--config", "custom.toml", "export"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["statlake", "--log-level", "debug", "export"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_export_options() {
        let cli = Cli::parse_from([
            "statlake",
            "export",
            "--job",
            "career_stats, games",
            "--row-count-threshold",
            "100",
            "--no-snapshot",
            "--dry-run",
        ]);
        match cli.command {
            Commands::Export(args) => {
                assert_eq!(args.job_filter(), vec!["career_stats", "games"]);
                assert_eq!(args.row_count_threshold, Some(100));
                assert!(args.no_snapshot);
                assert!(args.dry_run);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["statlake", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["statlake", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
