//! DuckDB snapshot export
//!
//! Writes a dataset into a standalone DuckDB file holding a single table, for
//! ad-hoc analytical queries next to the exported CSV.

use crate::domain::{PipelineError, Result, Table, Value};
use duckdb::types::Value as DbValue;
use duckdb::{appender_params_from_iter, Connection};
use std::path::Path;

/// Column type chosen for the snapshot table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    BigInt,
    Double,
    Varchar,
}

impl ColumnType {
    pub fn sql(self) -> &'static str {
        match self {
            ColumnType::BigInt => "BIGINT",
            ColumnType::Double => "DOUBLE",
            ColumnType::Varchar => "VARCHAR",
        }
    }
}

/// Infer one type per column from its non-null values
///
/// All integers → `BIGINT`; integers and floats → `DOUBLE`; anything else,
/// including an all-null column, → `VARCHAR`.
pub fn infer_column_types(table: &Table) -> Vec<ColumnType> {
    (0..table.columns().len())
        .map(|idx| {
            let mut seen_value = false;
            let mut seen_float = false;
            for row in table.rows() {
                match &row[idx] {
                    Value::Null => {}
                    Value::Int(_) => seen_value = true,
                    Value::Float(_) => {
                        seen_value = true;
                        seen_float = true;
                    }
                    Value::Text(_) => return ColumnType::Varchar,
                }
            }
            match (seen_value, seen_float) {
                (false, _) => ColumnType::Varchar,
                (true, false) => ColumnType::BigInt,
                (true, true) => ColumnType::Double,
            }
        })
        .collect()
}

/// Create (or replace) `local_path` holding `table` as `table_name`
///
/// Blocking; run it on the blocking thread pool from async code.
///
/// # Errors
///
/// Returns `PipelineError::Snapshot` on any DuckDB failure and
/// `PipelineError::Io` if an existing file cannot be replaced.
pub fn export_snapshot(table: &Table, local_path: &Path, table_name: &str) -> Result<()> {
    if table.columns().is_empty() {
        return Err(PipelineError::Snapshot(format!(
            "Cannot create snapshot table {table_name} without columns"
        )));
    }

    if local_path.exists() {
        std::fs::remove_file(local_path)?;
    }

    let types = infer_column_types(table);
    let column_defs = table
        .columns()
        .iter()
        .zip(&types)
        .map(|(name, ty)| format!("{} {}", quote_ident(name), ty.sql()))
        .collect::<Vec<_>>()
        .join(", ");
    let quoted = quote_ident(table_name);

    let conn = Connection::open(local_path)?;
    conn.execute_batch(&format!(
        "DROP TABLE IF EXISTS {quoted}; CREATE TABLE {quoted} ({column_defs});"
    ))?;

    {
        let mut appender = conn.appender(table_name)?;
        for row in table.rows() {
            let values = row.iter().zip(&types).map(|(v, ty)| to_db_value(v, *ty));
            appender.append_row(appender_params_from_iter(values))?;
        }
        appender.flush()?;
    }

    tracing::debug!(
        path = %local_path.display(),
        table = table_name,
        rows = table.row_count(),
        "Wrote DuckDB snapshot"
    );
    Ok(())
}

fn to_db_value(value: &Value, ty: ColumnType) -> DbValue {
    match (value, ty) {
        (Value::Null, _) => DbValue::Null,
        (Value::Int(i), ColumnType::BigInt) => DbValue::BigInt(*i),
        (Value::Int(i), ColumnType::Double) => DbValue::Double(*i as f64),
        (Value::Float(f), ColumnType::Double | ColumnType::BigInt) => DbValue::Double(*f),
        (other, _) => DbValue::Text(other.to_string()),
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Table {
        Table::new(
            vec!["PLAYER_ID".into(), "SEASON_ID".into(), "performance_variation".into(), "NOTE".into()],
            vec![
                vec![Value::Int(1), Value::from("2019-20"), Value::Float(0.0), Value::Null],
                vec![Value::Int(1), Value::from("2020-21"), Value::Int(60), Value::Null],
            ],
        )
        .unwrap()
    }

    fn column_types(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(
                "SELECT data_type FROM information_schema.columns \
                 WHERE table_name = ? ORDER BY ordinal_position",
            )
            .unwrap();
        stmt.query_map([table], |row| row.get::<_, String>(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect()
    }

    #[test]
    fn test_infer_column_types() {
        assert_eq!(
            infer_column_types(&sample()),
            vec![
                ColumnType::BigInt,
                ColumnType::Varchar,
                ColumnType::Double,
                ColumnType::Varchar
            ]
        );
    }

    #[test]
    fn test_export_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("career_stats.duckdb");

        export_snapshot(&sample(), &path, "career_stats").unwrap();

        let conn = Connection::open(&path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM career_stats", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(
            column_types(&conn, "career_stats"),
            vec!["BIGINT", "VARCHAR", "DOUBLE", "VARCHAR"]
        );

        let variation: f64 = conn
            .query_row(
                "SELECT performance_variation FROM career_stats WHERE SEASON_ID = '2020-21'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(variation, 60.0);
    }

    #[test]
    fn test_export_snapshot_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("games.duckdb");

        export_snapshot(&sample(), &path, "games").unwrap();
        let smaller = sample().limit(1);
        export_snapshot(&smaller, &path, "games").unwrap();

        let conn = Connection::open(&path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_export_snapshot_without_columns() {
        let dir = TempDir::new().unwrap();
        let result = export_snapshot(&Table::default(), &dir.path().join("x.duckdb"), "x");
        assert!(matches!(result, Err(PipelineError::Snapshot(_))));
    }
}
