mod common;

use std::fs;

use common::fixture_path;
use rust_xlsxwriter::Workbook;
use tabchart::decode::{Cell, FileKind, decode, decode_as};
use tabchart::error::PipelineError;

fn read_fixture(name: &str) -> Vec<u8> {
    fs::read(fixture_path(name)).expect("read fixture")
}

#[test]
fn csv_reports_non_empty_row_count() {
    let table = decode(&read_fixture("orders.csv"), "orders.csv").expect("decode orders");
    assert_eq!(table.columns(), ["name", "price", "date"]);
    assert_eq!(table.row_count(), 2);
}

#[test]
fn all_blank_rows_yield_an_empty_but_valid_table() {
    let table = decode(&read_fixture("blank_rows.csv"), "blank_rows.csv").expect("decode");
    assert_eq!(table.columns(), ["a", "b", "c"]);
    assert_eq!(table.row_count(), 0);
}

#[test]
fn totally_empty_input_is_rejected() {
    assert!(matches!(
        decode(b"", "empty.csv"),
        Err(PipelineError::EmptyFile)
    ));
}

#[test]
fn json_array_columns_follow_first_object() {
    let table = decode(&read_fixture("products.json"), "products.json").expect("decode");
    assert_eq!(table.columns(), ["sku", "title", "unit_price", "in_stock"]);
    assert_eq!(table.row_count(), 3);
    let index = table.column_index("unit_price").expect("column index");
    assert_eq!(table.realized_values(index).len(), 2);
}

#[test]
fn json_numeric_keys_sort_ascending() {
    let table = decode(&read_fixture("numeric_keys.json"), "numeric_keys.json").expect("decode");
    assert_eq!(table.columns(), ["city", "population"]);
    let index = table.column_index("city").expect("column index");
    let cities: Vec<String> = table.column_cells(index).map(Cell::render).collect();
    assert_eq!(cities, ["Bergen", "Trondheim", "Oslo"]);
}

#[test]
fn unknown_extensions_are_rejected_before_parsing() {
    let err = decode(&read_fixture("orders.csv"), "orders.parquet").unwrap_err();
    assert!(matches!(
        err,
        PipelineError::UnsupportedFormat { extension } if extension == "parquet"
    ));
}

fn sample_xlsx() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "product").expect("header");
    sheet.write_string(0, 1, "units").expect("header");
    sheet.write_string(1, 0, "Widget").expect("cell");
    sheet.write_number(1, 1, 12.0).expect("cell");
    sheet.write_string(2, 0, "Gadget").expect("cell");
    sheet.write_number(2, 1, 7.5).expect("cell");
    workbook.save_to_buffer().expect("xlsx buffer")
}

#[test]
fn xlsx_first_sheet_decodes_like_csv() {
    let table = decode(&sample_xlsx(), "report.xlsx").expect("decode xlsx");
    assert_eq!(table.columns(), ["product", "units"]);
    assert_eq!(table.row_count(), 2);
    let index = table.column_index("units").expect("column index");
    let values: Vec<&Cell> = table.realized_values(index);
    assert_eq!(values[0], &Cell::Number(12.0));
    assert_eq!(values[1], &Cell::Number(7.5));
}

#[test]
fn sheets_beyond_the_first_are_ignored() {
    let mut workbook = Workbook::new();
    let first = workbook.add_worksheet();
    first.write_string(0, 0, "kept").expect("header");
    first.write_string(1, 0, "yes").expect("cell");
    let second = workbook.add_worksheet();
    second.write_string(0, 0, "ignored").expect("header");
    second.write_string(1, 0, "entirely").expect("cell");
    let bytes = workbook.save_to_buffer().expect("xlsx buffer");

    let table = decode(&bytes, "multi.xlsx").expect("decode xlsx");
    assert_eq!(table.columns(), ["kept"]);
    assert_eq!(table.row_count(), 1);
}

#[test]
fn xlsx_bytes_with_wrong_content_are_malformed() {
    assert!(matches!(
        decode_as(b"definitely not a zip archive", FileKind::Xlsx),
        Err(PipelineError::MalformedInput { .. })
    ));
}
