//! Driver cost summaries: overview, per-model breakdowns, daily trends and
//! the formatted detail table.

use super::{DailyFamily, format_amount};
use crate::aggregate::{AggOp, AggregateSpec, TopN};
use crate::analytics::{TopTable, count_values, key_values};
use crate::config::DashboardConfig;
use crate::constants::{MAX_TREND_DAY, columns};
use crate::error::Result;
use crate::filters::DriverSort;
use crate::frame::{self, has_column, sum_present};
use crate::models::Metric;
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverCostOverview {
    pub drivers: usize,
    pub total_cost: Option<f64>,
    pub total_orders: Option<f64>,
    pub average_cpo: Metric,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub model: String,
    pub drivers: i64,
    pub total_cost: f64,
    pub avg_cost_per_vehicle: Metric,
}

/// Total cost split by mile type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub first_mile: f64,
    pub mid_mile: f64,
    pub last_mile: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelCostBreakdown {
    pub model: String,
    pub breakdown: CostBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelCpo {
    pub model: String,
    pub average_cpo: Metric,
    pub total_orders: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopDriver {
    pub driver: String,
    pub model: Option<String>,
    pub total_cost: Metric,
}

/// Cost and orders of one day summed over all drivers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTrend {
    pub day: u32,
    pub total_cost: f64,
    pub total_orders: f64,
    /// Not applicable on days without orders
    pub cpo: Metric,
}

/// One row of the detail table, amounts already formatted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverRow {
    pub driver: Option<String>,
    pub model: Option<String>,
    pub total_cost: String,
    pub first_mile: String,
    pub mid_mile: String,
    pub last_mile: String,
    pub total_orders: Option<f64>,
    pub cpo: String,
}

/// Everything the driver cost dashboard shows
#[derive(Debug, Clone, Serialize)]
pub struct DriverCostReport {
    pub overview: DriverCostOverview,
    pub models: Vec<ModelSummary>,
    pub cost_breakdown: Option<CostBreakdown>,
    pub model_breakdown: Option<Vec<ModelCostBreakdown>>,
    pub cpo_by_model: Option<Vec<ModelCpo>>,
    pub top_drivers: TopTable<TopDriver>,
    pub daily_trends: Vec<DailyTrend>,
    pub details: Vec<DriverRow>,
}

/// Build the driver cost dashboard from a normalized driver cost table
pub fn driver_cost_report(table: &DataFrame, config: &DashboardConfig) -> Result<DriverCostReport> {
    let filtered = config.driver_cost.apply(table)?;
    let top = TopN::new(config.top_n).with_show_all(config.show_all);

    let report = DriverCostReport {
        overview: overview(&filtered)?,
        models: model_summary(&filtered)?,
        cost_breakdown: cost_breakdown(&filtered)?,
        model_breakdown: model_cost_breakdown(&filtered)?,
        cpo_by_model: cpo_by_model(&filtered)?,
        top_drivers: top_drivers(&filtered, top)?,
        daily_trends: daily_trends(&filtered)?,
        details: detail_rows(&filtered)?,
    };

    info!(
        "Driver cost report: {} of {} drivers after filters",
        filtered.height(),
        table.height()
    );
    Ok(report)
}

/// Cost per order; not applicable when orders are missing or sum to zero
pub fn cost_per_order(total_cost: Option<f64>, total_orders: Option<f64>) -> Metric {
    Metric::ratio(total_cost, total_orders)
}

fn column_total(df: &DataFrame, name: &str) -> Result<Option<f64>> {
    Ok(frame::optional_floats(df, name)?.map(|values| sum_present(&values).unwrap_or(0.0)))
}

pub fn overview(df: &DataFrame) -> Result<DriverCostOverview> {
    let total_cost = column_total(df, columns::TOTAL_COST)?;
    let total_orders = column_total(df, columns::TOTAL_ORDERS)?;

    Ok(DriverCostOverview {
        drivers: df.height(),
        total_cost,
        total_orders,
        average_cpo: cost_per_order(total_cost, total_orders),
    })
}

/// Driver count and cost per vehicle model in first-seen order
pub fn model_summary(df: &DataFrame) -> Result<Vec<ModelSummary>> {
    if !has_column(df, columns::MODEL_NAME) {
        return Ok(Vec::new());
    }

    let mut spec = AggregateSpec::new([columns::MODEL_NAME]).with_count("drivers");
    if has_column(df, columns::TOTAL_COST) {
        spec = spec.with_output(columns::TOTAL_COST, AggOp::Sum, "total_cost");
    }
    let stats = spec.run(df)?;

    let models = key_values(&stats, columns::MODEL_NAME)?;
    let drivers = count_values(&stats, "drivers")?;
    let costs = frame::optional_floats(&stats, "total_cost")?
        .unwrap_or_else(|| vec![None; stats.height()]);

    Ok(models
        .into_iter()
        .zip(drivers)
        .zip(costs)
        .map(|((model, drivers), cost)| {
            let total_cost = cost.unwrap_or(0.0);
            ModelSummary {
                model,
                drivers,
                total_cost,
                avg_cost_per_vehicle: Metric::ratio(Some(total_cost), Some(drivers as f64)),
            }
        })
        .collect())
}

fn has_breakdown_columns(df: &DataFrame) -> bool {
    [
        columns::TOTAL_FIRST_MILE,
        columns::TOTAL_MID_MILE,
        columns::TOTAL_LAST_MILE,
    ]
    .iter()
    .all(|name| has_column(df, name))
}

/// First, mid and last mile totals; `None` unless all three columns exist
pub fn cost_breakdown(df: &DataFrame) -> Result<Option<CostBreakdown>> {
    if !has_breakdown_columns(df) {
        return Ok(None);
    }
    Ok(Some(CostBreakdown {
        first_mile: column_total(df, columns::TOTAL_FIRST_MILE)?.unwrap_or(0.0),
        mid_mile: column_total(df, columns::TOTAL_MID_MILE)?.unwrap_or(0.0),
        last_mile: column_total(df, columns::TOTAL_LAST_MILE)?.unwrap_or(0.0),
    }))
}

/// Mile type totals per vehicle model
pub fn model_cost_breakdown(df: &DataFrame) -> Result<Option<Vec<ModelCostBreakdown>>> {
    if !has_breakdown_columns(df) || !has_column(df, columns::MODEL_NAME) {
        return Ok(None);
    }

    let sums = AggregateSpec::new([columns::MODEL_NAME])
        .with_output(columns::TOTAL_FIRST_MILE, AggOp::Sum, "first_mile")
        .with_output(columns::TOTAL_MID_MILE, AggOp::Sum, "mid_mile")
        .with_output(columns::TOTAL_LAST_MILE, AggOp::Sum, "last_mile")
        .run(df)?;

    let models = key_values(&sums, columns::MODEL_NAME)?;
    let first = frame::float_values(&sums, "first_mile")?;
    let mid = frame::float_values(&sums, "mid_mile")?;
    let last = frame::float_values(&sums, "last_mile")?;

    Ok(Some(
        models
            .into_iter()
            .enumerate()
            .map(|(i, model)| ModelCostBreakdown {
                model,
                breakdown: CostBreakdown {
                    first_mile: first[i].unwrap_or(0.0),
                    mid_mile: mid[i].unwrap_or(0.0),
                    last_mile: last[i].unwrap_or(0.0),
                },
            })
            .collect(),
    ))
}

/// Mean CPO and summed orders per model; models without orders are left out
pub fn cpo_by_model(df: &DataFrame) -> Result<Option<Vec<ModelCpo>>> {
    if ![columns::MODEL_NAME, columns::OVERALL_CPO, columns::TOTAL_ORDERS]
        .iter()
        .all(|name| has_column(df, name))
    {
        return Ok(None);
    }

    let stats = AggregateSpec::new([columns::MODEL_NAME])
        .with_output(columns::OVERALL_CPO, AggOp::Mean, "average_cpo")
        .with_output(columns::TOTAL_ORDERS, AggOp::Sum, "total_orders")
        .run(df)?;

    let models = key_values(&stats, columns::MODEL_NAME)?;
    let cpo = frame::float_values(&stats, "average_cpo")?;
    let orders = frame::float_values(&stats, "total_orders")?;

    Ok(Some(
        models
            .into_iter()
            .zip(cpo)
            .zip(orders)
            .filter_map(|((model, cpo), orders)| {
                let total_orders = orders.unwrap_or(0.0);
                (total_orders > 0.0).then(|| ModelCpo {
                    model,
                    average_cpo: Metric::from_option(cpo),
                    total_orders,
                })
            })
            .collect(),
    ))
}

/// Drivers with the highest total cost
pub fn top_drivers(df: &DataFrame, top: TopN) -> Result<TopTable<TopDriver>> {
    let ranked = DriverSort::TotalCostDesc.sort(df)?;

    TopTable::from_truncated(top.apply(&ranked), |rows| {
        let drivers = frame::string_values(rows, columns::DRIVER)?;
        let models = frame::optional_strings(rows, columns::MODEL_NAME)?
            .unwrap_or_else(|| vec![None; rows.height()]);
        let costs = frame::float_values(rows, columns::TOTAL_COST)?;

        Ok(drivers
            .into_iter()
            .zip(models)
            .zip(costs)
            .map(|((driver, model), cost)| TopDriver {
                driver: driver.unwrap_or_default(),
                model,
                total_cost: Metric::from_option(cost),
            })
            .collect())
    })
}

/// Cost, orders and CPO for each day that has both a cost and an order column
pub fn daily_trends(df: &DataFrame) -> Result<Vec<DailyTrend>> {
    let mut trends = Vec::new();

    for day in 1..=MAX_TREND_DAY {
        let cost_column = DailyFamily::Cost.column(day);
        let orders_column = DailyFamily::Orders.column(day);
        let (Some(total_cost), Some(total_orders)) = (
            column_total(df, &cost_column)?,
            column_total(df, &orders_column)?,
        ) else {
            continue;
        };

        let cpo = if total_orders > 0.0 {
            cost_per_order(Some(total_cost), Some(total_orders))
        } else {
            Metric::NotApplicable
        };
        trends.push(DailyTrend {
            day,
            total_cost,
            total_orders,
            cpo,
        });
    }

    Ok(trends)
}

/// Detail table rows in the table's current order
pub fn detail_rows(df: &DataFrame) -> Result<Vec<DriverRow>> {
    let rows = df.height();
    let text = |name: &str| -> Result<Vec<Option<String>>> {
        Ok(frame::optional_strings(df, name)?.unwrap_or_else(|| vec![None; rows]))
    };
    let amounts = |name: &str| -> Result<Vec<Option<f64>>> {
        Ok(frame::optional_floats(df, name)?.unwrap_or_else(|| vec![None; rows]))
    };

    let drivers = text(columns::DRIVER)?;
    let models = text(columns::MODEL_NAME)?;
    let total_cost = amounts(columns::TOTAL_COST)?;
    let first_mile = amounts(columns::TOTAL_FIRST_MILE)?;
    let mid_mile = amounts(columns::TOTAL_MID_MILE)?;
    let last_mile = amounts(columns::TOTAL_LAST_MILE)?;
    let orders = amounts(columns::TOTAL_ORDERS)?;
    let cpo = amounts(columns::OVERALL_CPO)?;

    Ok((0..rows)
        .map(|i| DriverRow {
            driver: drivers[i].clone(),
            model: models[i].clone(),
            total_cost: format_amount(total_cost[i]),
            first_mile: format_amount(first_mile[i]),
            mid_mile: format_amount(mid_mile[i]),
            last_mile: format_amount(last_mile[i]),
            total_orders: orders[i],
            cpo: format_amount(cpo[i]),
        })
        .collect())
}
