//! Integration tests for the performance variation columns

use statlake::core::transform::{
    compute_variation, decode_table, encode_table, VARIATION_COLUMN, VARIATION_PCT_COLUMN,
};
use statlake::domain::{Table, Value};
use test_case::test_case;

fn column(table: &Table, name: &str) -> Vec<f64> {
    (0..table.row_count())
        .map(|row| table.value(row, name).and_then(Value::as_f64).unwrap())
        .collect()
}

fn career(csv: &str) -> Table {
    decode_table(csv.as_bytes()).unwrap()
}

#[test]
fn test_five_season_career() {
    let input = career(
        "PLAYER_ID,SEASON_ID,PTS\n\
         7,2016-17,10\n\
         7,2017-18,15\n\
         7,2018-19,12\n\
         7,2019-20,12\n\
         7,2020-21,20\n",
    );

    let out = compute_variation(input, "PLAYER_ID", "SEASON_ID", &["PTS"]).unwrap();

    assert_eq!(column(&out, VARIATION_COLUMN), vec![0.0, 5.0, 3.0, 0.0, 8.0]);
    assert_eq!(column(&out, VARIATION_PCT_COLUMN)[..2], [0.0, 50.0]);
    assert_eq!(column(&out, VARIATION_PCT_COLUMN)[3], 0.0);
}

#[test]
fn test_zero_previous_total() {
    let input = career(
        "PLAYER_ID,SEASON_ID,PTS,AST\n\
         3,2019-20,0,0\n\
         3,2020-21,8,4\n",
    );

    let out = compute_variation(input, "PLAYER_ID", "SEASON_ID", &["PTS", "AST"]).unwrap();

    assert_eq!(column(&out, VARIATION_COLUMN), vec![0.0, 12.0]);
    assert_eq!(column(&out, VARIATION_PCT_COLUMN), vec![0.0, 0.0]);
}

#[test_case("1,2019-20,40\n2,2019-20,10\n", &[0.0, 0.0] ; "one season per player")]
#[test_case("1,2019-20,40\n1,2020-21,30\n", &[0.0, 10.0] ; "decline counts as variation")]
#[test_case("1,2020-21,30\n1,2019-20,40\n", &[10.0, 0.0] ; "rows keep input order")]
#[test_case("1,2019-20,40\n2,2020-21,10\n1,2020-21,50\n", &[0.0, 0.0, 10.0] ; "groups are independent")]
fn test_variation_values(rows: &str, expected: &[f64]) {
    let input = career(&format!("PLAYER_ID,SEASON_ID,PTS\n{rows}"));
    let out = compute_variation(input, "PLAYER_ID", "SEASON_ID", &["PTS"]).unwrap();
    assert_eq!(column(&out, VARIATION_COLUMN), expected);
}

#[test_case(100, 150, 50.0 ; "half again")]
#[test_case(200, 100, 50.0 ; "halved")]
#[test_case(50, 50, 0.0 ; "unchanged")]
#[test_case(4, 5, 25.0 ; "small totals")]
fn test_variation_pct(previous: i64, current: i64, expected: f64) {
    let input = career(&format!(
        "PLAYER_ID,SEASON_ID,PTS\n1,2019-20,{previous}\n1,2020-21,{current}\n"
    ));
    let out = compute_variation(input, "PLAYER_ID", "SEASON_ID", &["PTS"]).unwrap();
    assert_eq!(column(&out, VARIATION_PCT_COLUMN), vec![0.0, expected]);
}

#[test]
fn test_encoded_output_formats_floats() {
    let input = career("PLAYER_ID,SEASON_ID,PTS\n1,2019-20,100\n1,2020-21,150\n");
    let out = compute_variation(input, "PLAYER_ID", "SEASON_ID", &["PTS"]).unwrap();

    assert_eq!(
        encode_table(&out).unwrap(),
        "PLAYER_ID,SEASON_ID,PTS,performance_variation,performance_variation_pct\n\
         1,2019-20,100,0.0,0.0\n\
         1,2020-21,150,50.0,50.0\n"
    );
}
