use std::path::PathBuf;

use crate::errors::ReaderError;
use crate::readers::read_table_file;
use crate::table::{RawTable, StructuredTable};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

#[test]
fn reads_semicolon_export_preserving_row_order() {
    let table = read_table_file(&fixture_path("klimalogg_office.csv")).expect("read failed");

    assert_eq!(table.height(), 8);
    assert_eq!(table.rows()[0][0], "KlimaLogg Pro Export");
    assert_eq!(
        table.rows()[3],
        vec!["Datum/Uhrzeit", "Temperatur[°C]", "rel.Luftfeuchte[%rF]"]
    );
}

#[test]
fn reads_comma_export() {
    let table = read_table_file(&fixture_path("hygro_basement.csv")).expect("read failed");

    assert_eq!(table.height(), 10);
    assert_eq!(
        table.rows()[5],
        vec!["Datum/Uhrzeit", "Lufttemperatur[°C]", "%Feuchtigkeit[%rF]"]
    );
}

#[test]
fn structured_table_roundtrips_header_row() {
    let table = read_table_file(&fixture_path("klimalogg_office.csv")).expect("read failed");
    let structured = StructuredTable::from_raw(&table, 3).expect("header row in range");

    assert_eq!(
        structured.columns(),
        ["Datum/Uhrzeit", "Temperatur[°C]", "rel.Luftfeuchte[%rF]"]
    );
    assert_eq!(structured.height(), 4);
    assert_eq!(
        structured.column("Temperatur[°C]").expect("column missing"),
        vec!["21,4", "21,6", "21,5", "21,3"]
    );
}

#[test]
fn structured_table_pads_short_rows() {
    let raw = RawTable::new(vec![
        vec!["a".into(), "b".into(), "c".into()],
        vec!["1".into()],
        vec!["1".into(), "2".into(), "3".into(), "4".into()],
    ]);
    let structured = StructuredTable::from_raw(&raw, 0).expect("header row in range");

    assert_eq!(structured.column("b").expect("column missing"), vec!["", "2"]);
    assert_eq!(structured.column("c").expect("column missing"), vec!["", "3"]);
}

#[test]
fn out_of_range_header_row_is_rejected() {
    let raw = RawTable::new(vec![vec!["only".into()]]);
    assert!(StructuredTable::from_raw(&raw, 5).is_none());
}

#[test]
fn unknown_extension_is_unsupported() {
    let err = read_table_file(&fixture_path("report.pdf")).unwrap_err();
    assert!(matches!(err, ReaderError::UnsupportedFormat { extension } if extension == "pdf"));
}

#[test]
fn empty_export_is_rejected() {
    let err = read_table_file(&fixture_path("empty.csv")).unwrap_err();
    assert!(matches!(err, ReaderError::EmptyTable { .. }));
}
