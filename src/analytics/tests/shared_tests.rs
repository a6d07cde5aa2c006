//! Tests for helpers shared by both geographic dashboards

use super::prepare;
use crate::analytics::{category_counts, distance_histogram, format_date_range, map_view};
use crate::config::MapSettings;
use crate::constants::MISSING_LABEL;
use crate::loader::load_csv_bytes;
use crate::models::{DataKind, Rgba};
use chrono::NaiveDate;

#[test]
fn test_format_date_range() {
    let start = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
    assert_eq!(format_date_range(start, end), "Jan 05, 2024 to Jan 09, 2024");
}

#[test]
fn test_distance_histogram_bins() {
    let df = load_csv_bytes("kms\n0\n1\n2\n3\n4\n\n").unwrap();
    let bins = distance_histogram(&df, 4).unwrap().unwrap();

    assert_eq!(bins.len(), 4);
    let counts: Vec<usize> = bins.iter().map(|b| b.count).collect();
    assert_eq!(counts, vec![1, 1, 1, 2]);
    assert_eq!(bins[0].lower, 0.0);
    assert_eq!(bins[3].upper, 4.0);
}

#[test]
fn test_distance_histogram_single_value() {
    let df = load_csv_bytes("kms\n2.5\n2.5\n").unwrap();
    let bins = distance_histogram(&df, 20).unwrap().unwrap();
    assert_eq!(bins.len(), 1);
    assert_eq!(bins[0].count, 2);

    let no_distance = load_csv_bytes("hub\nA\n").unwrap();
    assert!(distance_histogram(&no_distance, 20).unwrap().is_none());
}

#[test]
fn test_category_counts_without_category_column() {
    let table = prepare(
        "hub_long,hub_lat,delivered_long,delivered_lat\n77.5,12.9,77.6,12.8\n",
        DataKind::LastMile,
    );
    assert!(category_counts(&table).unwrap().is_empty());
}

#[test]
fn test_category_counts_carry_palette_colors() {
    let table = prepare(
        "hub,hub_long,hub_lat,delivered_long,delivered_lat\n\
         X,77.5,12.9,77.6,12.8\n\
         Y,77.5,12.9,77.6,12.8\n\
         Y,77.5,12.9,77.6,12.8\n",
        DataKind::LastMile,
    );
    let counts = category_counts(&table).unwrap();

    assert_eq!(counts[0].label, "Y");
    assert_eq!(counts[0].color, table.palette.get("Y").unwrap());
    assert_ne!(counts[0].color, Rgba::NEUTRAL);
}

#[test]
fn test_category_counts_include_rows_without_category() {
    let table = prepare(
        "hub,hub_long,hub_lat,delivered_long,delivered_lat\n\
         X,77.5,12.9,77.6,12.8\n\
         ,77.5,12.9,77.6,12.8\n\
         X,77.5,12.9,77.6,12.8\n",
        DataKind::LastMile,
    );
    let counts = category_counts(&table).unwrap();

    let labels: Vec<&str> = counts.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["X", MISSING_LABEL]);
    assert_eq!(counts[1].color, Rgba::NEUTRAL);
    let total: i64 = counts.iter().map(|c| c.count).sum();
    assert_eq!(total as usize, table.height());
}

#[test]
fn test_map_view_absent_for_empty_table() {
    let table = prepare(
        "customerlong,customerlat,microwarehouselong,microwarehouselat\n",
        DataKind::FirstMile,
    );
    assert!(map_view(&table, &MapSettings::default()).unwrap().is_none());
}
