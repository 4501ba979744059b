//! Spectacular games report
//!
//! Combines home and away box-score columns into game totals and keeps the
//! highest-scoring games.

use crate::domain::{Result, Table, Value};

/// Source columns considered by the report
const GAME_COLUMNS: &[&str] = &[
    "season_id",
    "team_id_home",
    "game_id",
    "game_date",
    "fgm_home",
    "fga_home",
    "fg_pct_home",
    "reb_home",
    "ast_home",
    "stl_home",
    "blk_home",
    "tov_home",
    "pts_home",
    "fgm_away",
    "fga_away",
    "fg_pct_away",
    "reb_away",
    "ast_away",
    "stl_away",
    "blk_away",
    "tov_away",
    "pts_away",
    "season_type",
];

/// Derived total, home column, away column
const TOTALS: &[(&str, &str, &str)] = &[
    ("pts", "pts_home", "pts_away"),
    ("reb", "reb_home", "reb_away"),
    ("ast", "ast_home", "ast_away"),
    ("stl", "stl_home", "stl_away"),
    ("blk", "blk_home", "blk_away"),
    ("tov", "tov_home", "tov_away"),
];

const OUTPUT_COLUMNS: &[&str] = &[
    "season_id",
    "game_id",
    "game_date",
    "season_type",
    "pts",
    "reb",
    "ast",
    "stl",
    "blk",
    "tov",
];

/// Top `limit` games by combined points
pub fn spectacular_games(table: Table, limit: usize) -> Result<Table> {
    let mut games = table.select_available(GAME_COLUMNS);

    for (total, home, away) in TOTALS {
        let values = (0..games.row_count())
            .map(|row| combine(games.value(row, home), games.value(row, away)))
            .collect();
        games = games.with_column(total, values)?;
    }

    let ranked = games
        .select_available(OUTPUT_COLUMNS)
        .sort_desc_nulls_last("pts")?
        .limit(limit);

    tracing::debug!(rows = ranked.row_count(), limit, "Ranked games by points");
    Ok(ranked)
}

/// Home plus away; one side when only one column exists, 0 when neither does
fn combine(home: Option<&Value>, away: Option<&Value>) -> Value {
    match (home, away) {
        (Some(h), Some(a)) => add(h, a),
        (Some(side), None) | (None, Some(side)) => side.clone(),
        (None, None) => Value::Int(0),
    }
}

fn add(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x
            .checked_add(*y)
            .map_or_else(|| Value::Float(*x as f64 + *y as f64), Value::Int),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => Value::Float(x + y),
            _ => Value::Null,
        },
    }
}
