//! First mile normalization tests

use super::first_mile_fixture;
use crate::error::DashboardError;
use crate::frame;
use crate::loader::load_csv_bytes;
use crate::models::{DataKind, Rgba};
use crate::normalizer::{preprocess, row_colors};
use crate::palette::palette_color;
use polars::prelude::*;

#[test]
fn test_row_missing_customer_lat_is_dropped() {
    let table = first_mile_fixture();
    let prepared = preprocess(&table, DataKind::FirstMile).unwrap();

    assert_eq!(prepared.height(), table.height() - 1);
    assert_eq!(prepared.report.input_rows, 4);
    assert_eq!(prepared.report.dropped_rows, 1);
    assert_eq!(prepared.report.retained_rows(), 3);
}

#[test]
fn test_row_with_infinite_coordinate_is_dropped() {
    let table = load_csv_bytes(
        "microwarehouse,customerlong,customerlat,microwarehouselong,microwarehouselat\n\
         MW-North,77.59,12.97,77.60,12.98\n\
         MW-North,inf,12.97,77.60,12.98\n",
    )
    .unwrap();
    let prepared = preprocess(&table, DataKind::FirstMile).unwrap();

    assert_eq!(prepared.height(), 1);
    assert_eq!(prepared.report.dropped_rows, 1);
}

#[test]
fn test_original_table_is_untouched() {
    let table = first_mile_fixture();
    let _ = preprocess(&table, DataKind::FirstMile).unwrap();

    assert_eq!(table.height(), 4);
    assert_eq!(table.column("kms").unwrap().dtype(), &DataType::String);
}

#[test]
fn test_numeric_columns_are_coerced() {
    let prepared = preprocess(&first_mile_fixture(), DataKind::FirstMile).unwrap();
    let frame = &prepared.frame;

    assert_eq!(frame.column("customerlat").unwrap().dtype(), &DataType::Float64);
    assert_eq!(
        frame::float_values(frame, "kms").unwrap(),
        vec![Some(4.5), Some(6.25), None]
    );
    assert_eq!(
        frame::int_values(frame, "num_orders").unwrap(),
        vec![Some(3), Some(2), Some(4)]
    );
}

#[test]
fn test_unparsable_timestamp_becomes_missing_with_warning() {
    let prepared = preprocess(&first_mile_fixture(), DataKind::FirstMile).unwrap();

    let stamps = frame::datetime_values(&prepared.frame, "pickedup_at").unwrap();
    assert!(stamps[0].is_some());
    assert!(stamps[2].is_none());
    assert_eq!(prepared.report.unparsed_timestamps, 1);
    assert_eq!(prepared.report.warnings.len(), 1);
}

#[test]
fn test_colors_follow_first_appearance_of_microwarehouse() {
    let prepared = preprocess(&first_mile_fixture(), DataKind::FirstMile).unwrap();

    let labels: Vec<&str> = prepared
        .palette
        .entries()
        .iter()
        .map(|(label, _)| label.as_str())
        .collect();
    assert_eq!(labels, vec!["MW-North", "MW-South", "MW-East"]);

    let colors = row_colors(&prepared.frame).unwrap();
    assert_eq!(colors, vec![palette_color(0), palette_color(1), palette_color(2)]);
}

#[test]
fn test_missing_category_column_uses_neutral_gray() {
    let csv = "\
customerlong,customerlat,microwarehouselong,microwarehouselat
77.59,12.97,77.60,12.98
77.61,12.91,77.62,12.90
";
    let table = load_csv_bytes(csv).unwrap();
    let prepared = preprocess(&table, DataKind::FirstMile).unwrap();

    assert!(prepared.palette.is_empty());
    assert_eq!(row_colors(&prepared.frame).unwrap(), vec![Rgba::NEUTRAL; 2]);
    assert_eq!(prepared.report.warnings.len(), 1);
}

#[test]
fn test_blank_category_gets_neutral_gray() {
    let csv = "\
microwarehouse,customerlong,customerlat,microwarehouselong,microwarehouselat
MW-1,77.59,12.97,77.60,12.98
,77.61,12.91,77.62,12.90
";
    let prepared = preprocess(&load_csv_bytes(csv).unwrap(), DataKind::FirstMile).unwrap();
    let colors = row_colors(&prepared.frame).unwrap();

    assert_eq!(colors[0], palette_color(0));
    assert_eq!(colors[1], Rgba::NEUTRAL);
    assert_eq!(prepared.palette.len(), 1);
}

#[test]
fn test_missing_coordinate_columns_are_reported() {
    let table = load_csv_bytes("customer,customerlat\nAcme,12.9\n").unwrap();
    let err = preprocess(&table, DataKind::FirstMile).unwrap_err();

    match err {
        DashboardError::MissingColumns { columns, .. } => {
            assert_eq!(
                columns,
                vec!["microwarehouselong", "microwarehouselat", "customerlong"]
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_empty_upload_normalizes_to_empty_table() {
    let csv = "customerlong,customerlat,microwarehouselong,microwarehouselat,microwarehouse\n";
    let prepared = preprocess(&load_csv_bytes(csv).unwrap(), DataKind::FirstMile).unwrap();

    assert!(prepared.is_empty());
    assert!(prepared.palette.is_empty());
    assert_eq!(prepared.report.dropped_rows, 0);
}
