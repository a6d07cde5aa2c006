//! First mile dashboard: pickups from customers into microwarehouses.

use super::{
    CategoryCount, DateSpan, DistanceBin, MapView, TopTable, category_counts, count_values,
    date_span, distance_histogram, distinct, key_values, map_view,
};
use crate::aggregate::{AggOp, AggregateSpec, TopN};
use crate::config::DashboardConfig;
use crate::constants::{HISTOGRAM_BINS, STATS_DECIMALS, columns};
use crate::error::{DashboardError, Result};
use crate::frame::{self, has_column, mean_present, sum_present};
use crate::models::{DataKind, Metric};
use crate::normalizer::PreparedTable;
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::info;

/// Headline numbers of the first mile dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FirstMileCards {
    pub total_pickups: usize,
    pub avg_distance: Metric,
    pub unique_customers: Option<usize>,
    pub total_orders: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerOrders {
    pub customer: String,
    pub total_orders: f64,
}

/// Distance and order statistics of one hub
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HubStats {
    pub hub: String,
    pub avg_distance: Metric,
    pub min_distance: Metric,
    pub max_distance: Metric,
    pub pickups: i64,
    pub total_orders: Metric,
    pub avg_orders_per_pickup: Metric,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HubMicrowarehouse {
    pub hub: String,
    pub microwarehouse: String,
    pub pickups: i64,
    pub total_orders: Metric,
}

/// Everything the first mile dashboard shows
#[derive(Debug, Clone, Serialize)]
pub struct FirstMileReport {
    pub cards: FirstMileCards,
    pub date_span: Option<DateSpan>,
    pub distance_distribution: Option<Vec<DistanceBin>>,
    pub microwarehouses: Vec<CategoryCount>,
    pub customers: Option<TopTable<CustomerOrders>>,
    pub hubs: Option<Vec<HubStats>>,
    pub hub_microwarehouses: Option<TopTable<HubMicrowarehouse>>,
    pub map: Option<MapView>,
}

/// Build the first mile dashboard for `prepared` under the session filters
pub fn first_mile_report(
    prepared: &PreparedTable,
    config: &DashboardConfig,
) -> Result<FirstMileReport> {
    if prepared.kind != DataKind::FirstMile {
        return Err(DashboardError::DataKindMismatch {
            expected: DataKind::FirstMile,
            detected: prepared.kind,
        });
    }

    let filtered = prepared.with_frame(config.first_mile.apply(&prepared.frame)?);
    let top = TopN::new(config.top_n).with_show_all(config.show_all);
    let wide = TopN::new(config.wide_top_n).with_show_all(config.show_all);
    let frame = &filtered.frame;

    let report = FirstMileReport {
        cards: first_mile_cards(frame)?,
        date_span: date_span(&filtered)?,
        distance_distribution: distance_histogram(frame, HISTOGRAM_BINS)?,
        microwarehouses: category_counts(&filtered)?,
        customers: customer_orders(frame, top)?,
        hubs: hub_stats(frame)?,
        hub_microwarehouses: hub_microwarehouse_mapping(frame, wide)?,
        map: map_view(&filtered, config.map_settings(DataKind::FirstMile))?,
    };

    info!(
        "First mile report: {} of {} pickups after filters",
        frame.height(),
        prepared.height()
    );
    Ok(report)
}

pub fn first_mile_cards(frame: &DataFrame) -> Result<FirstMileCards> {
    let distances = frame::optional_floats(frame, columns::DISTANCE_KMS)?;
    let orders = frame::optional_floats(frame, columns::NUM_ORDERS)?;

    Ok(FirstMileCards {
        total_pickups: frame.height(),
        avg_distance: Metric::from_option(distances.as_deref().and_then(mean_present))
            .rounded(STATS_DECIMALS),
        unique_customers: distinct(frame, columns::CUSTOMER)?,
        total_orders: orders.map(|values| sum_present(&values).unwrap_or(0.0) as i64),
    })
}

/// Orders summed per customer, largest first
pub fn customer_orders(frame: &DataFrame, top: TopN) -> Result<Option<TopTable<CustomerOrders>>> {
    if !has_column(frame, columns::CUSTOMER) || !has_column(frame, columns::NUM_ORDERS) {
        return Ok(None);
    }

    let totals = AggregateSpec::new([columns::CUSTOMER])
        .with_output(columns::NUM_ORDERS, AggOp::Sum, "total_orders")
        .sorted_by("total_orders")
        .run(frame)?;

    TopTable::from_truncated(top.apply(&totals), |df| {
        let customers = key_values(df, columns::CUSTOMER)?;
        let orders = frame::float_values(df, "total_orders")?;
        Ok(customers
            .into_iter()
            .zip(orders)
            .map(|(customer, total)| CustomerOrders {
                customer,
                total_orders: total.unwrap_or(0.0),
            })
            .collect())
    })
    .map(Some)
}

/// Per-hub distance and order statistics in first-seen hub order
pub fn hub_stats(frame: &DataFrame) -> Result<Option<Vec<HubStats>>> {
    if !has_column(frame, columns::HUB) {
        return Ok(None);
    }

    let mut spec = AggregateSpec::new([columns::HUB]).with_count("pickups");
    if has_column(frame, columns::DISTANCE_KMS) {
        spec = spec
            .with_rounded_output(columns::DISTANCE_KMS, AggOp::Mean, "avg_distance", STATS_DECIMALS)
            .with_rounded_output(columns::DISTANCE_KMS, AggOp::Min, "min_distance", STATS_DECIMALS)
            .with_rounded_output(columns::DISTANCE_KMS, AggOp::Max, "max_distance", STATS_DECIMALS);
    }
    if has_column(frame, columns::NUM_ORDERS) {
        spec = spec
            .with_rounded_output(columns::NUM_ORDERS, AggOp::Sum, "total_orders", STATS_DECIMALS)
            .with_rounded_output(columns::NUM_ORDERS, AggOp::Mean, "avg_orders", STATS_DECIMALS);
    }
    let stats = spec.run(frame)?;

    let hubs = key_values(&stats, columns::HUB)?;
    let pickups = count_values(&stats, "pickups")?;
    let metric = |name: &str| -> Result<Vec<Metric>> {
        Ok(match frame::optional_floats(&stats, name)? {
            Some(values) => values.into_iter().map(Metric::from_option).collect(),
            None => vec![Metric::NotApplicable; stats.height()],
        })
    };
    let avg = metric("avg_distance")?;
    let min = metric("min_distance")?;
    let max = metric("max_distance")?;
    let total_orders = metric("total_orders")?;
    let avg_orders = metric("avg_orders")?;

    Ok(Some(
        hubs.into_iter()
            .enumerate()
            .map(|(i, hub)| HubStats {
                hub,
                avg_distance: avg[i],
                min_distance: min[i],
                max_distance: max[i],
                pickups: pickups[i],
                total_orders: total_orders[i],
                avg_orders_per_pickup: avg_orders[i],
            })
            .collect(),
    ))
}

/// Pickups and orders of every (hub, microwarehouse) pair in first-seen order
pub fn hub_microwarehouse_mapping(
    frame: &DataFrame,
    top: TopN,
) -> Result<Option<TopTable<HubMicrowarehouse>>> {
    if !has_column(frame, columns::HUB) || !has_column(frame, columns::MICROWAREHOUSE) {
        return Ok(None);
    }

    let with_orders = has_column(frame, columns::NUM_ORDERS);
    let mut spec =
        AggregateSpec::new([columns::HUB, columns::MICROWAREHOUSE]).with_count("pickups");
    if with_orders {
        spec = spec.with_output(columns::NUM_ORDERS, AggOp::Sum, "total_orders");
    }
    let pairs = spec.run(frame)?;

    TopTable::from_truncated(top.apply(&pairs), |df| {
        let hubs = key_values(df, columns::HUB)?;
        let microwarehouses = key_values(df, columns::MICROWAREHOUSE)?;
        let pickups = count_values(df, "pickups")?;
        let orders = match frame::optional_floats(df, "total_orders")? {
            Some(values) => values.into_iter().map(Metric::from_option).collect(),
            None => vec![Metric::NotApplicable; df.height()],
        };

        Ok(hubs
            .into_iter()
            .zip(microwarehouses)
            .zip(pickups.into_iter().zip(orders))
            .map(|((hub, microwarehouse), (pickups, total_orders))| HubMicrowarehouse {
                hub,
                microwarehouse,
                pickups,
                total_orders,
            })
            .collect())
    })
    .map(Some)
}
