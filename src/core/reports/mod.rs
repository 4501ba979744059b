//! Report datasets derived from source tables
//!
//! - [`career`] - deduplicated career rows with variation columns
//! - [`games`] - highest-scoring games with combined totals

pub mod career;
pub mod games;

pub use career::career_report;
pub use games::spectacular_games;

use crate::config::ReportConfig;
use crate::domain::{Result, Table};

/// Build the dataset a job exports from its source table
pub fn build_report(config: &ReportConfig, source: Table) -> Result<Table> {
    match config {
        ReportConfig::CareerStats {
            group_key,
            order_key,
            stat_columns,
            extra_columns,
        } => career_report(source, group_key, order_key, stat_columns, extra_columns),
        ReportConfig::SpectacularGames { limit } => spectacular_games(source, *limit),
        ReportConfig::Raw => Ok(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transform::csv::decode_table;

    #[test]
    fn test_raw_report_is_identity() {
        let table = decode_table("a,b\n1,x\n".as_bytes()).unwrap();
        assert_eq!(build_report(&ReportConfig::Raw, table.clone()).unwrap(), table);
    }

    #[test]
    fn test_career_report_defaults() {
        let input = "PLAYER_ID,SEASON_ID,TEAM_ID,PTS\n1,2019-20,5,10\n1,2020-21,5,20\n";
        let table = decode_table(input.as_bytes()).unwrap();
        let out = build_report(&ReportConfig::career_stats(), table).unwrap();

        assert_eq!(out.columns().len(), 6);
        assert!(out.has_column("performance_variation_pct"));
    }
}
