//! CSV encoding and decoding of tables
//!
//! Output is a header row followed by data rows with `\n` terminators and
//! minimal quoting. Input fields are typed with [`Value::infer`].

use crate::domain::{PipelineError, Result, Table, Value};
use csv::{ReaderBuilder, Terminator, WriterBuilder};
use std::io::Read;

/// Encode `table` as CSV text with a header row
pub fn encode_table(table: &Table) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(Value::to_string))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| PipelineError::Dataset(format!("Failed to flush CSV writer: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| PipelineError::Dataset(format!("CSV output is not UTF-8: {e}")))
}

/// Decode CSV with a header row into a table
///
/// # Errors
///
/// Returns `PipelineError::Dataset` for malformed CSV or ragged rows.
pub fn decode_table<R: Read>(reader: R) -> Result<Table> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(Value::infer).collect());
    }

    Table::new(columns, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_formats_values() {
        let table = Table::new(
            vec!["name".into(), "pts".into(), "pct".into(), "note".into()],
            vec![vec![
                Value::from("Smith, J"),
                Value::Int(12),
                Value::Float(50.0),
                Value::Null,
            ]],
        )
        .unwrap();

        let csv = encode_table(&table).unwrap();
        assert_eq!(csv, "name,pts,pct,note\n\"Smith, J\",12,50.0,\n");
    }

    #[test]
    fn test_encode_empty_table_keeps_header() {
        let table = Table::new(vec!["a".into(), "b".into()], vec![]).unwrap();
        assert_eq!(encode_table(&table).unwrap(), "a,b\n");
    }

    #[test]
    fn test_decode_infers_types() {
        let input = "PLAYER_ID,SEASON_ID,PTS,FG_PCT\n2544,2003-04,1654,0.417\n2544,2004-05,,0.472\n";
        let table = decode_table(input.as_bytes()).unwrap();

        assert_eq!(table.columns(), &["PLAYER_ID", "SEASON_ID", "PTS", "FG_PCT"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.value(0, "PLAYER_ID"), Some(&Value::Int(2544)));
        assert_eq!(table.value(0, "SEASON_ID"), Some(&Value::from("2003-04")));
        assert_eq!(table.value(1, "PTS"), Some(&Value::Null));
        assert_eq!(table.value(1, "FG_PCT"), Some(&Value::Float(0.472)));
    }

    #[test]
    fn test_decode_ragged_rows_fail() {
        let input = "a,b\n1,2\n3\n";
        assert!(matches!(
            decode_table(input.as_bytes()),
            Err(PipelineError::Dataset(_))
        ));
    }
}
