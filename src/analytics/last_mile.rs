//! Last mile dashboard: deliveries from hubs to postcodes.

use super::{
    CategoryCount, DateSpan, DistanceBin, MapView, TopTable, category_counts, count_values,
    date_span, distance_histogram, distinct, key_values, map_view,
};
use crate::aggregate::{AggOp, AggregateSpec, TopN, value_counts};
use crate::config::DashboardConfig;
use crate::constants::{HISTOGRAM_BINS, STATS_DECIMALS, columns};
use crate::error::{DashboardError, Result};
use crate::frame::{self, has_column, mean_present};
use crate::models::{DataKind, Metric};
use crate::normalizer::PreparedTable;
use polars::prelude::DataFrame;
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

/// Headline numbers of the last mile dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LastMileCards {
    pub total_deliveries: usize,
    pub avg_distance: Metric,
    pub unique_drivers: Option<usize>,
    pub unique_postcodes: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostcodeCount {
    pub postcode: String,
    pub deliveries: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleCount {
    pub vehicle_model: String,
    pub deliveries: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HubPostcode {
    pub hub: String,
    pub postcode: String,
    pub deliveries: i64,
}

/// Distance statistics of one postcode and the hub that serves it most
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostcodeCoverage {
    pub postcode: String,
    pub avg_distance: Metric,
    pub min_distance: Metric,
    pub max_distance: Metric,
    pub deliveries: i64,
    pub primary_hub: Option<String>,
}

/// Everything the last mile dashboard shows
#[derive(Debug, Clone, Serialize)]
pub struct LastMileReport {
    pub cards: LastMileCards,
    pub date_span: Option<DateSpan>,
    pub distance_distribution: Option<Vec<DistanceBin>>,
    pub hubs: Vec<CategoryCount>,
    pub vehicles: Option<Vec<VehicleCount>>,
    pub postcodes: Option<TopTable<PostcodeCount>>,
    pub hub_postcodes: Option<TopTable<HubPostcode>>,
    pub coverage: Option<Vec<PostcodeCoverage>>,
    pub map: Option<MapView>,
}

/// Build the last mile dashboard for `prepared` under the session filters
pub fn last_mile_report(prepared: &PreparedTable, config: &DashboardConfig) -> Result<LastMileReport> {
    if prepared.kind != DataKind::LastMile {
        return Err(DashboardError::DataKindMismatch {
            expected: DataKind::LastMile,
            detected: prepared.kind,
        });
    }

    let filtered = prepared.with_frame(config.last_mile.apply(&prepared.frame)?);
    let top = TopN::new(config.top_n).with_show_all(config.show_all);
    let wide = TopN::new(config.wide_top_n).with_show_all(config.show_all);
    let frame = &filtered.frame;

    let report = LastMileReport {
        cards: last_mile_cards(frame)?,
        date_span: date_span(&filtered)?,
        distance_distribution: distance_histogram(frame, HISTOGRAM_BINS)?,
        hubs: category_counts(&filtered)?,
        vehicles: vehicle_counts(frame)?,
        postcodes: postcode_counts(frame, top)?,
        hub_postcodes: hub_postcode_mapping(frame, wide)?,
        coverage: postcode_coverage(frame)?,
        map: map_view(&filtered, config.map_settings(DataKind::LastMile))?,
    };

    info!(
        "Last mile report: {} of {} deliveries after filters",
        frame.height(),
        prepared.height()
    );
    Ok(report)
}

pub fn last_mile_cards(frame: &DataFrame) -> Result<LastMileCards> {
    let distances = frame::optional_floats(frame, columns::DISTANCE_KMS)?;

    Ok(LastMileCards {
        total_deliveries: frame.height(),
        avg_distance: Metric::from_option(distances.as_deref().and_then(mean_present))
            .rounded(STATS_DECIMALS),
        unique_drivers: distinct(frame, columns::DRIVER)?,
        unique_postcodes: distinct(frame, columns::POSTCODE)?,
    })
}

/// Deliveries per postcode, busiest first
pub fn postcode_counts(frame: &DataFrame, top: TopN) -> Result<Option<TopTable<PostcodeCount>>> {
    if !has_column(frame, columns::POSTCODE) {
        return Ok(None);
    }
    let counts = value_counts(frame, &[columns::POSTCODE], "deliveries")?;

    TopTable::from_truncated(top.apply(&counts), |df| {
        Ok(key_values(df, columns::POSTCODE)?
            .into_iter()
            .zip(count_values(df, "deliveries")?)
            .map(|(postcode, deliveries)| PostcodeCount {
                postcode,
                deliveries,
            })
            .collect())
    })
    .map(Some)
}

/// Deliveries per vehicle model, busiest first
pub fn vehicle_counts(frame: &DataFrame) -> Result<Option<Vec<VehicleCount>>> {
    if !has_column(frame, columns::VEHICLE_MODEL) {
        return Ok(None);
    }
    let counts = value_counts(frame, &[columns::VEHICLE_MODEL], "deliveries")?;

    Ok(Some(
        key_values(&counts, columns::VEHICLE_MODEL)?
            .into_iter()
            .zip(count_values(&counts, "deliveries")?)
            .map(|(vehicle_model, deliveries)| VehicleCount {
                vehicle_model,
                deliveries,
            })
            .collect(),
    ))
}

/// Deliveries of every (hub, postcode) pair in first-seen order
pub fn hub_postcode_mapping(frame: &DataFrame, top: TopN) -> Result<Option<TopTable<HubPostcode>>> {
    if !has_column(frame, columns::HUB) || !has_column(frame, columns::POSTCODE) {
        return Ok(None);
    }
    let pairs = AggregateSpec::new([columns::HUB, columns::POSTCODE])
        .with_count("deliveries")
        .run(frame)?;

    TopTable::from_truncated(top.apply(&pairs), |df| {
        let hubs = key_values(df, columns::HUB)?;
        let postcodes = key_values(df, columns::POSTCODE)?;
        let deliveries = count_values(df, "deliveries")?;
        Ok(hubs
            .into_iter()
            .zip(postcodes)
            .zip(deliveries)
            .map(|((hub, postcode), deliveries)| HubPostcode {
                hub,
                postcode,
                deliveries,
            })
            .collect())
    })
    .map(Some)
}

/// Distance statistics per postcode with the primary hub of each
///
/// The primary hub is the hub with the most deliveries to the postcode; on
/// a tie the hub seen first wins.
pub fn postcode_coverage(frame: &DataFrame) -> Result<Option<Vec<PostcodeCoverage>>> {
    if !has_column(frame, columns::POSTCODE) {
        return Ok(None);
    }

    let mut spec = AggregateSpec::new([columns::POSTCODE]).with_count("deliveries");
    if has_column(frame, columns::DISTANCE_KMS) {
        spec = spec
            .with_rounded_output(columns::DISTANCE_KMS, AggOp::Mean, "avg_distance", STATS_DECIMALS)
            .with_rounded_output(columns::DISTANCE_KMS, AggOp::Min, "min_distance", STATS_DECIMALS)
            .with_rounded_output(columns::DISTANCE_KMS, AggOp::Max, "max_distance", STATS_DECIMALS);
    }
    let stats = spec.run(frame)?;

    let primary_hubs = primary_hubs(frame)?;
    let postcodes = key_values(&stats, columns::POSTCODE)?;
    let deliveries = count_values(&stats, "deliveries")?;
    let metric = |name: &str| -> Result<Vec<Metric>> {
        Ok(match frame::optional_floats(&stats, name)? {
            Some(values) => values.into_iter().map(Metric::from_option).collect(),
            None => vec![Metric::NotApplicable; stats.height()],
        })
    };
    let avg = metric("avg_distance")?;
    let min = metric("min_distance")?;
    let max = metric("max_distance")?;

    Ok(Some(
        postcodes
            .into_iter()
            .enumerate()
            .map(|(i, postcode)| PostcodeCoverage {
                primary_hub: primary_hubs.get(&postcode).cloned(),
                postcode,
                avg_distance: avg[i],
                min_distance: min[i],
                max_distance: max[i],
                deliveries: deliveries[i],
            })
            .collect(),
    ))
}

fn primary_hubs(frame: &DataFrame) -> Result<HashMap<String, String>> {
    let mut primary = HashMap::new();
    if !has_column(frame, columns::HUB) {
        return Ok(primary);
    }

    // Sorted busiest first, so the first pair seen for a postcode wins
    let pairs = value_counts(frame, &[columns::POSTCODE, columns::HUB], "deliveries")?;
    let postcodes = key_values(&pairs, columns::POSTCODE)?;
    let hubs = frame::string_values(&pairs, columns::HUB)?;
    for (postcode, hub) in postcodes.into_iter().zip(hubs) {
        if let Some(hub) = hub {
            primary.entry(postcode).or_insert(hub);
        }
    }
    Ok(primary)
}
