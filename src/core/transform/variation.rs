//! Season-over-season performance variation
//!
//! For every row, compares the stat columns with the previous row of the same
//! group (ordered by the ordering key) and appends two columns:
//!
//! - `performance_variation`: sum of absolute differences
//! - `performance_variation_pct`: that sum as a percentage of the previous
//!   row's stat total
//!
//! The first row of each group has no predecessor and gets `0.0` for both.

use crate::domain::{Result, Table, Value};
use std::collections::HashMap;

/// Sum of absolute stat differences against the previous row of the group
pub const VARIATION_COLUMN: &str = "performance_variation";

/// Variation as a percentage of the previous row's stat total
pub const VARIATION_PCT_COLUMN: &str = "performance_variation_pct";

/// Append the variation columns to `table`
///
/// Stat columns missing from the table are ignored; when none are present the
/// table is returned unchanged. Rows keep their input order.
///
/// # Errors
///
/// Returns `PipelineError::Dataset` if the group or order column is missing
/// (only checked when at least one stat column is present).
///
/// # Examples
///
/// ```
/// use statlake::core::transform::variation::{compute, VARIATION_COLUMN};
/// use statlake::domain::{Table, Value};
///
/// let table = Table::new(
///     vec!["PLAYER_ID".into(), "SEASON_ID".into(), "PTS".into()],
///     vec![
///         vec![Value::Int(1), Value::from("2019-20"), Value::Int(100)],
///         vec![Value::Int(1), Value::from("2020-21"), Value::Int(150)],
///     ],
/// )
/// .unwrap();
///
/// let out = compute(table, "PLAYER_ID", "SEASON_ID", &["PTS"]).unwrap();
/// assert_eq!(out.value(1, VARIATION_COLUMN), Some(&Value::Float(50.0)));
/// ```
pub fn compute<S: AsRef<str>>(
    table: Table,
    group_key: &str,
    order_key: &str,
    stat_columns: &[S],
) -> Result<Table> {
    let mut stat_indices: Vec<usize> = Vec::with_capacity(stat_columns.len());
    for idx in stat_columns
        .iter()
        .filter_map(|c| table.column_index(c.as_ref()))
    {
        // Each column counts once in the totals
        if !stat_indices.contains(&idx) {
            stat_indices.push(idx);
        }
    }

    if stat_indices.is_empty() {
        tracing::debug!("No stat columns present, skipping variation");
        return Ok(table);
    }

    let group_idx = table.require_column(group_key)?;
    let order_idx = table.require_column(order_key)?;
    let rows = table.rows();

    // Stable sort of row positions by (group, order)
    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by(|&a, &b| {
        rows[a][group_idx]
            .total_cmp(&rows[b][group_idx])
            .then_with(|| rows[a][order_idx].total_cmp(&rows[b][order_idx]))
    });

    // Predecessor of each row within its group
    let mut previous: HashMap<usize, usize> = HashMap::with_capacity(rows.len());
    for pair in order.windows(2) {
        let (prev, curr) = (pair[0], pair[1]);
        if rows[prev][group_idx].total_cmp(&rows[curr][group_idx]).is_eq() {
            previous.insert(curr, prev);
        }
    }

    let mut variation = Vec::with_capacity(rows.len());
    let mut variation_pct = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let (total_abs, pct) = match previous.get(&i) {
            Some(&p) => row_variation(&rows[p], row, &stat_indices),
            None => (0.0, 0.0),
        };
        variation.push(Value::Float(total_abs));
        variation_pct.push(Value::Float(pct));
    }

    table
        .with_column(VARIATION_COLUMN, variation)?
        .with_column(VARIATION_PCT_COLUMN, variation_pct)
}

/// (sum of |current - previous|, percentage of previous total)
fn row_variation(prev: &[Value], curr: &[Value], stat_indices: &[usize]) -> (f64, f64) {
    let mut total_abs = 0.0;
    let mut prev_total = 0.0;

    for &idx in stat_indices {
        let before = prev[idx].as_f64();
        if let (Some(b), Some(c)) = (before, curr[idx].as_f64()) {
            total_abs += (c - b).abs();
        }
        prev_total += before.unwrap_or(0.0);
    }

    if !total_abs.is_finite() {
        return (0.0, 0.0);
    }

    let pct = if prev_total == 0.0 {
        0.0
    } else {
        total_abs / prev_total * 100.0
    };

    (total_abs, if pct.is_finite() { pct } else { 0.0 })
}
