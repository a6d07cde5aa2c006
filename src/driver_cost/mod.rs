//! Driver cost dashboard.
//!
//! A driver cost export has one row per driver: summary columns
//! (`total_cost`, per-mile totals, `total_orders`, `overall_cpo`) plus
//! optional per-day column families such as `cost_day_3` or
//! `total_orders_day_3`. Amounts often arrive as locale formatted text
//! ("1,234.50", "₹ 99"), so every amount column goes through
//! [`clean_numeric_string`] before anything is summed.

use crate::cleaning::clean_numeric_string;
use crate::constants::{DAILY_COLUMN_PATTERN, DRIVER_COST_NUMERIC, DRIVER_COST_REQUIRED, NOT_APPLICABLE};
use crate::error::{DashboardError, Result};
use crate::frame::{self, column_names, has_column};
use polars::prelude::DataFrame;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

pub mod summary;

#[cfg(test)]
mod tests;

pub use summary::{DriverCostReport, driver_cost_report};

/// Column family of a per-day driver cost column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DailyFamily {
    Cost,
    FirstMile,
    MidMile,
    LastMile,
    Orders,
    Cpo,
}

impl DailyFamily {
    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "cost" => Some(DailyFamily::Cost),
            "fm" => Some(DailyFamily::FirstMile),
            "mm" => Some(DailyFamily::MidMile),
            "lm" => Some(DailyFamily::LastMile),
            "total_orders" => Some(DailyFamily::Orders),
            "cpo" => Some(DailyFamily::Cpo),
            _ => None,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            DailyFamily::Cost => "cost",
            DailyFamily::FirstMile => "fm",
            DailyFamily::MidMile => "mm",
            DailyFamily::LastMile => "lm",
            DailyFamily::Orders => "total_orders",
            DailyFamily::Cpo => "cpo",
        }
    }

    /// Column name of this family for `day`, e.g. `cost_day_4`
    pub fn column(&self, day: u32) -> String {
        format!("{}_day_{}", self.prefix(), day)
    }
}

impl fmt::Display for DailyFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A per-day column found in an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyColumn {
    pub name: String,
    pub family: DailyFamily,
    pub day: u32,
}

/// Per-day columns among `columns`, in the order given
pub fn daily_columns<I, S>(columns: I) -> Result<Vec<DailyColumn>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let pattern = Regex::new(DAILY_COLUMN_PATTERN)
        .map_err(|e| DashboardError::configuration(format!("Invalid day column pattern: {}", e)))?;

    Ok(columns
        .into_iter()
        .filter_map(|name| {
            let name = name.as_ref();
            let captures = pattern.captures(name)?;
            let family = DailyFamily::from_prefix(captures.get(1)?.as_str())?;
            let day = captures.get(2)?.as_str().parse().ok()?;
            Some(DailyColumn {
                name: name.to_string(),
                family,
                day,
            })
        })
        .collect())
}

/// Clean a driver cost export into numeric columns
///
/// Fails with `MissingColumns` when `driver`, `model_name` or `total_cost`
/// is absent. Summary and per-day amount columns become floats; text that
/// does not clean to a number becomes missing.
pub fn normalize_driver_costs(table: &DataFrame) -> Result<DataFrame> {
    let names = column_names(table);
    let missing: Vec<String> = DRIVER_COST_REQUIRED
        .iter()
        .filter(|required| !names.iter().any(|name| name == *required))
        .map(|required| required.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DashboardError::missing_columns("driver_cost", missing));
    }

    let mut frame = table.clone();
    let daily = daily_columns(&names)?;
    let amount_columns = DRIVER_COST_NUMERIC
        .iter()
        .copied()
        .filter(|name| has_column(&frame, name))
        .map(str::to_string)
        .chain(daily.iter().map(|column| column.name.clone()))
        .collect::<Vec<_>>();

    for name in &amount_columns {
        let cleaned = frame::string_values(&frame, name)?
            .iter()
            .map(|value| clean_numeric_string(value.as_deref()))
            .collect();
        frame::set_float_column(&mut frame, name, cleaned)?;
    }
    debug!(
        "Cleaned {} amount columns ({} per-day)",
        amount_columns.len(),
        daily.len()
    );

    info!("Normalized driver cost table with {} drivers", frame.height());
    Ok(frame)
}

/// Render an amount with thousands separators and two decimals, e.g.
/// `12,345.67`; missing amounts render as `N/A`
pub fn format_amount(amount: Option<f64>) -> String {
    let Some(value) = amount.filter(|v| v.is_finite()) else {
        return NOT_APPLICABLE.to_string();
    };

    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && fixed.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    format!("{}{}.{}", sign, grouped, fraction)
}
