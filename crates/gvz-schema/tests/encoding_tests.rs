//! Row encoding against typed tables

use chrono::{NaiveDate, TimeDelta};
use gvz_schema::{
    CellValue, Column, Datatype, DatabaseTemplate, NumericPolicy, SchemaError, Table,
    TableTemplate, Validator,
};
use serde_json::json;

fn name_and_count() -> Table {
    Table::new(
        "Attendance",
        Some(1),
        vec![
            Column::new("name", Datatype::String),
            Column::new("count", Datatype::unumber(0)),
        ],
    )
}

#[test]
fn test_temporal_wire_forms() {
    let table = Table::new(
        "Log",
        Some(2),
        vec![
            Column::new("at", Datatype::DateTime),
            Column::new("short", Datatype::Duration),
            Column::new("long", Datatype::Duration),
        ],
    );
    let at = NaiveDate::from_ymd_opt(2024, 3, 5)
        .unwrap()
        .and_hms_milli_opt(7, 8, 9, 250)
        .unwrap();
    let row = vec![
        CellValue::from(at),
        CellValue::from(TimeDelta::milliseconds(90_000)),
        CellValue::from(TimeDelta::milliseconds(90_000_000)),
    ];

    let encoded = table.encode_row(&row, &Validator::default()).unwrap();
    assert_eq!(
        encoded,
        vec!["2024-03-05 07:08:09.250", "00:01:30.000", "25:00:00.000"]
    );
}

#[test]
fn test_json_shapes() {
    let table = name_and_count();
    let validator = Validator::default();

    let many = table
        .encode_json_rows(&json!([["a", 1], ["b", 2]]), &validator)
        .unwrap();
    assert_eq!(many, vec![vec!["a", "1"], vec!["b", "2"]]);

    let single = table.encode_json_rows(&json!(["a", 1]), &validator).unwrap();
    assert_eq!(single, vec![vec!["a", "1"]]);

    let mixed = table.encode_json_rows(&json!([["a", 1], "b"]), &validator);
    assert!(matches!(mixed, Err(SchemaError::RowShape(_))));
}

#[test]
fn test_json_tagged_datetime() {
    let table = Table::new("T", Some(3), vec![Column::new("day", Datatype::Date)]);
    let encoded = table
        .encode_json_rows(
            &json!([{"$datetime": "2024-12-31T23:59:59"}]),
            &Validator::default(),
        )
        .unwrap();
    assert_eq!(encoded, vec![vec!["2024-12-31"]]);
}

#[test]
fn test_unumber_sign_under_both_policies() {
    let table = name_and_count();
    let compatible = Validator::default();
    let corrected = Validator::new(NumericPolicy::Corrected);

    assert!(table
        .encode_row(&["a".into(), "12.3.4".into()], &compatible)
        .is_err());
    assert_eq!(
        table.encode_row(&["a".into(), "-5".into()], &compatible).unwrap(),
        vec!["a", "-5"]
    );
    assert!(matches!(
        table.encode_row(&["a".into(), "-5".into()], &corrected),
        Err(SchemaError::RowValidation { column: 1, .. })
    ));
}

#[test]
fn test_one_bad_row_fails_the_batch() {
    let table = name_and_count();
    let rows = vec![
        vec![CellValue::from("a"), CellValue::from(1)],
        vec![CellValue::from("b")],
    ];
    assert!(matches!(
        table.encode_rows(&rows, &Validator::default()),
        Err(SchemaError::RowArity { row: 1, .. })
    ));
}

#[test]
fn test_template_table_names() {
    let duplicate = DatabaseTemplate::new("Club")
        .table(TableTemplate::new("Sheet1").column("a", Datatype::String))
        .table(TableTemplate::new("Sheet1").column("b", Datatype::Boolean));
    assert!(!duplicate.is_valid());

    let unique = DatabaseTemplate::new("Club")
        .table(TableTemplate::new("Sheet1").column("a", Datatype::String))
        .table(TableTemplate::new("Sheet2").column("b", Datatype::Boolean));
    assert!(unique.is_valid());
}
