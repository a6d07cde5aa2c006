//! Last mile normalization tests

use super::last_mile_fixture;
use crate::frame;
use crate::models::DataKind;
use crate::normalizer::{preprocess, row_colors};
use crate::palette::generate_palette;
use polars::prelude::*;

#[test]
fn test_rows_with_unparsable_coordinates_are_dropped() {
    let prepared = preprocess(&last_mile_fixture(), DataKind::LastMile).unwrap();

    assert_eq!(prepared.height(), 4);
    assert_eq!(prepared.report.dropped_rows, 1);
}

#[test]
fn test_postcodes_remain_text_with_leading_zeros() {
    let prepared = preprocess(&last_mile_fixture(), DataKind::LastMile).unwrap();

    assert_eq!(
        prepared.frame.column("postcode").unwrap().dtype(),
        &DataType::String
    );
    let postcodes = frame::string_values(&prepared.frame, "postcode").unwrap();
    assert_eq!(postcodes[0].as_deref(), Some("010203"));
}

#[test]
fn test_created_date_parsed_from_bare_dates() {
    let prepared = preprocess(&last_mile_fixture(), DataKind::LastMile).unwrap();

    let stamps = frame::datetime_values(&prepared.frame, "created_date").unwrap();
    assert!(stamps.iter().all(Option::is_some));
    assert_eq!(prepared.report.unparsed_timestamps, 0);
    assert!(prepared.report.warnings.is_empty());
}

#[test]
fn test_hub_colors_match_independent_palette() {
    let prepared = preprocess(&last_mile_fixture(), DataKind::LastMile).unwrap();
    let independent = generate_palette(["A", "B"]);

    assert_eq!(prepared.palette.entries(), independent.entries());

    let colors = row_colors(&prepared.frame).unwrap();
    let hubs = frame::string_values(&prepared.frame, "hub").unwrap();
    for (hub, color) in hubs.iter().zip(colors) {
        assert_eq!(independent.get(hub.as_deref().unwrap()), Some(color));
    }
}

#[test]
fn test_first_mile_columns_ignored_for_last_mile() {
    // pickedup_at is not the last mile timestamp and stays untouched
    let csv = "\
hub,hub_long,hub_lat,delivered_long,delivered_lat,pickedup_at
A,77.5,12.9,77.55,12.95,garbage
";
    let table = crate::loader::load_csv_bytes(csv).unwrap();
    let prepared = preprocess(&table, DataKind::LastMile).unwrap();

    assert_eq!(
        prepared.frame.column("pickedup_at").unwrap().dtype(),
        &DataType::String
    );
    assert_eq!(prepared.report.unparsed_timestamps, 0);
}
