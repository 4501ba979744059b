//! Career statistics report

use crate::core::transform::compute_variation;
use crate::domain::{Result, Table};

/// Deduplicated career rows with performance variation columns
///
/// Keeps the key, extra and stat columns that exist in `table` (in that
/// order, each column once), drops repeated (group, order) pairs keeping the
/// first row, then appends the variation columns.
pub fn career_report(
    table: Table,
    group_key: &str,
    order_key: &str,
    stat_columns: &[String],
    extra_columns: &[String],
) -> Result<Table> {
    let wanted: Vec<&str> = [group_key, order_key]
        .into_iter()
        .chain(extra_columns.iter().map(String::as_str))
        .chain(stat_columns.iter().map(String::as_str))
        .collect();

    let selected = table.select_available(&wanted);
    let deduped = selected.dedup_by(&[group_key, order_key])?;

    tracing::debug!(
        input_rows = table.row_count(),
        rows = deduped.row_count(),
        columns = deduped.columns().len(),
        "Prepared career rows"
    );

    compute_variation(deduped, group_key, order_key, stat_columns)
}
