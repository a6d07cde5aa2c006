//! Session filters for the three dashboards.
//!
//! Filters are plain selections: an empty multi-select or a `None` single
//! select means "all". A filter on a column the table does not carry is
//! skipped. Filters never modify their input; they return a new table.

use crate::constants::columns;
use crate::error::{DashboardError, Result};
use crate::frame::{self, has_column};
use crate::models::DataKind;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Inclusive calendar-day range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(DashboardError::configuration(format!(
                "Date range starts ({}) after it ends ({})",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Row mask built up one filter at a time
struct RowMask {
    keep: Vec<bool>,
    active: usize,
}

impl RowMask {
    fn new(rows: usize) -> Self {
        Self {
            keep: vec![true; rows],
            active: 0,
        }
    }

    fn and(&mut self, keep: impl IntoIterator<Item = bool>) {
        for (slot, value) in self.keep.iter_mut().zip(keep) {
            *slot &= value;
        }
        self.active += 1;
    }

    fn date_range(&mut self, df: &DataFrame, column: &str, range: Option<&DateRange>) -> Result<()> {
        let Some(range) = range else {
            return Ok(());
        };
        if !has_column(df, column) {
            debug!("Skipping date filter: column '{}' not present", column);
            return Ok(());
        }
        let stamps = frame::datetime_values(df, column)?;
        self.and(
            stamps
                .iter()
                .map(|stamp| stamp.is_some_and(|s| range.contains(s.date()))),
        );
        Ok(())
    }

    fn one_of(&mut self, df: &DataFrame, column: &str, selected: &[String]) -> Result<()> {
        if selected.is_empty() {
            return Ok(());
        }
        if !has_column(df, column) {
            debug!("Skipping selection filter: column '{}' not present", column);
            return Ok(());
        }
        let values = frame::string_values(df, column)?;
        self.and(
            values
                .iter()
                .map(|value| value.as_ref().is_some_and(|v| selected.contains(v))),
        );
        Ok(())
    }

    fn equals(&mut self, df: &DataFrame, column: &str, selected: Option<&String>) -> Result<()> {
        match selected {
            Some(value) => self.one_of(df, column, std::slice::from_ref(value)),
            None => Ok(()),
        }
    }

    fn within(&mut self, df: &DataFrame, column: &str, range: Option<(f64, f64)>) -> Result<()> {
        let Some((low, high)) = range else {
            return Ok(());
        };
        if !has_column(df, column) {
            debug!("Skipping range filter: column '{}' not present", column);
            return Ok(());
        }
        let values = frame::float_values(df, column)?;
        self.and(
            values
                .iter()
                .map(|value| value.is_some_and(|v| low <= v && v <= high)),
        );
        Ok(())
    }

    fn apply(self, df: &DataFrame) -> Result<DataFrame> {
        if self.active == 0 {
            return Ok(df.clone());
        }
        let filtered = frame::filter_rows(df, &self.keep)?;
        debug!(
            "{} filters kept {} of {} rows",
            self.active,
            filtered.height(),
            df.height()
        );
        Ok(filtered)
    }
}

/// Sidebar selections of the first mile dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirstMileFilters {
    pub date_range: Option<DateRange>,
    pub microwarehouses: Vec<String>,
    pub customers: Vec<String>,
    pub hub: Option<String>,
}

impl FirstMileFilters {
    pub fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut mask = RowMask::new(df.height());
        mask.date_range(
            df,
            DataKind::FirstMile.timestamp_column(),
            self.date_range.as_ref(),
        )?;
        mask.one_of(df, columns::MICROWAREHOUSE, &self.microwarehouses)?;
        mask.one_of(df, columns::CUSTOMER, &self.customers)?;
        mask.equals(df, columns::HUB, self.hub.as_ref())?;
        mask.apply(df)
    }
}

/// Sidebar selections of the last mile dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LastMileFilters {
    pub date_range: Option<DateRange>,
    pub hubs: Vec<String>,
    pub postcode: Option<String>,
    pub vehicle_models: Vec<String>,
    pub customers: Vec<String>,
}

impl LastMileFilters {
    pub fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut mask = RowMask::new(df.height());
        mask.date_range(
            df,
            DataKind::LastMile.timestamp_column(),
            self.date_range.as_ref(),
        )?;
        mask.one_of(df, columns::HUB, &self.hubs)?;
        mask.equals(df, columns::POSTCODE, self.postcode.as_ref())?;
        mask.one_of(df, columns::VEHICLE_MODEL, &self.vehicle_models)?;
        mask.one_of(df, columns::CUSTOMER, &self.customers)?;
        mask.apply(df)
    }
}

/// Ordering of the driver cost detail table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverSort {
    DriverAsc,
    DriverDesc,
    #[default]
    TotalCostDesc,
    TotalCostAsc,
    CpoDesc,
    CpoAsc,
    OrdersDesc,
    OrdersAsc,
}

impl DriverSort {
    pub const ALL: [DriverSort; 8] = [
        DriverSort::DriverAsc,
        DriverSort::DriverDesc,
        DriverSort::TotalCostDesc,
        DriverSort::TotalCostAsc,
        DriverSort::CpoDesc,
        DriverSort::CpoAsc,
        DriverSort::OrdersDesc,
        DriverSort::OrdersAsc,
    ];

    /// Column sorted on and whether the order is descending
    pub fn key(&self) -> (&'static str, bool) {
        match self {
            DriverSort::DriverAsc => (columns::DRIVER, false),
            DriverSort::DriverDesc => (columns::DRIVER, true),
            DriverSort::TotalCostDesc => (columns::TOTAL_COST, true),
            DriverSort::TotalCostAsc => (columns::TOTAL_COST, false),
            DriverSort::CpoDesc => (columns::OVERALL_CPO, true),
            DriverSort::CpoAsc => (columns::OVERALL_CPO, false),
            DriverSort::OrdersDesc => (columns::TOTAL_ORDERS, true),
            DriverSort::OrdersAsc => (columns::TOTAL_ORDERS, false),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DriverSort::DriverAsc => "driver_asc",
            DriverSort::DriverDesc => "driver_desc",
            DriverSort::TotalCostDesc => "total_cost_desc",
            DriverSort::TotalCostAsc => "total_cost_asc",
            DriverSort::CpoDesc => "cpo_desc",
            DriverSort::CpoAsc => "cpo_asc",
            DriverSort::OrdersDesc => "orders_desc",
            DriverSort::OrdersAsc => "orders_asc",
        }
    }

    /// Sort `df` by this order; missing values go last either way
    pub fn sort(&self, df: &DataFrame) -> Result<DataFrame> {
        let (column, descending) = self.key();
        if !has_column(df, column) {
            debug!("Skipping sort: column '{}' not present", column);
            return Ok(df.clone());
        }
        Ok(df.sort(
            [column],
            SortMultipleOptions::default()
                .with_order_descending(descending)
                .with_nulls_last(true)
                .with_maintain_order(true),
        )?)
    }
}

impl fmt::Display for DriverSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DriverSort {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        DriverSort::ALL
            .into_iter()
            .find(|sort| sort.as_str() == normalized)
            .ok_or_else(|| {
                DashboardError::configuration(format!("Unknown driver sort order '{}'", s))
            })
    }
}

/// Sidebar selections of the driver cost dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverCostFilters {
    pub models: Vec<String>,
    /// Inclusive (min, max) total cost
    pub cost_range: Option<(f64, f64)>,
    pub sort: DriverSort,
}

impl DriverCostFilters {
    /// Filter by model and cost range, then apply the sort order
    pub fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut mask = RowMask::new(df.height());
        mask.one_of(df, columns::MODEL_NAME, &self.models)?;
        mask.within(df, columns::TOTAL_COST, self.cost_range)?;
        let filtered = mask.apply(df)?;
        self.sort.sort(&filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_csv_bytes;
    use crate::normalizer::preprocess;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn last_mile() -> DataFrame {
        let csv = "\
hub,hub_long,hub_lat,delivered_long,delivered_lat,created_date,postcode,vehicle_model
A,77.5,12.9,77.55,12.95,2024-01-05 08:00:00,010203,Van
B,77.4,12.8,77.45,12.85,2024-01-06 23:59:00,560001,Bike
A,77.5,12.9,77.57,12.97,2024-01-09,560001,Bike
A,77.5,12.9,77.58,12.98,,560002,Van
";
        preprocess(&load_csv_bytes(csv).unwrap(), DataKind::LastMile)
            .unwrap()
            .frame
    }

    #[test]
    fn test_no_selection_keeps_everything() {
        let df = last_mile();
        assert_eq!(LastMileFilters::default().apply(&df).unwrap().height(), 4);
    }

    #[test]
    fn test_date_range_is_inclusive_by_day() {
        let filters = LastMileFilters {
            date_range: Some(DateRange::new(date(2024, 1, 5), date(2024, 1, 6)).unwrap()),
            ..Default::default()
        };
        let filtered = filters.apply(&last_mile()).unwrap();
        assert_eq!(filtered.height(), 2);
    }

    #[test]
    fn test_missing_timestamps_excluded_by_active_date_filter() {
        let filters = LastMileFilters {
            date_range: Some(DateRange::new(date(2000, 1, 1), date(2100, 1, 1)).unwrap()),
            ..Default::default()
        };
        assert_eq!(filters.apply(&last_mile()).unwrap().height(), 3);
    }

    #[test]
    fn test_selections_combine() {
        let filters = LastMileFilters {
            hubs: vec!["A".to_string()],
            vehicle_models: vec!["Bike".to_string()],
            ..Default::default()
        };
        let filtered = filters.apply(&last_mile()).unwrap();
        assert_eq!(filtered.height(), 1);

        let postcode = LastMileFilters {
            postcode: Some("010203".to_string()),
            ..Default::default()
        };
        assert_eq!(postcode.apply(&last_mile()).unwrap().height(), 1);
    }

    #[test]
    fn test_filter_on_absent_column_is_skipped() {
        let filters = LastMileFilters {
            customers: vec!["Acme".to_string()],
            ..Default::default()
        };
        assert_eq!(filters.apply(&last_mile()).unwrap().height(), 4);
    }

    #[test]
    fn test_first_mile_hub_and_microwarehouse() {
        let df = load_csv_bytes(
            "hub,microwarehouse,customer\nH1,MW1,Acme\nH1,MW2,Bolt\nH2,MW1,Acme\n",
        )
        .unwrap();
        let filters = FirstMileFilters {
            microwarehouses: vec!["MW1".to_string()],
            hub: Some("H1".to_string()),
            ..Default::default()
        };
        assert_eq!(filters.apply(&df).unwrap().height(), 1);
    }

    #[test]
    fn test_empty_table_stays_empty() {
        let df = load_csv_bytes("hub,microwarehouse\n").unwrap();
        let filters = FirstMileFilters {
            hub: Some("H1".to_string()),
            ..Default::default()
        };
        assert_eq!(filters.apply(&df).unwrap().height(), 0);
    }

    #[test]
    fn test_invalid_date_range_rejected() {
        assert!(DateRange::new(date(2024, 2, 1), date(2024, 1, 1)).is_err());
    }

    #[test]
    fn test_driver_filters_and_sort() {
        let df = load_csv_bytes(
            "driver,model_name,total_cost\nAnu,Van,100\nBen,Bike,50\nCai,Van,300\nDev,Van,\n",
        )
        .unwrap();

        let filters = DriverCostFilters {
            models: vec!["Van".to_string()],
            cost_range: None,
            sort: DriverSort::TotalCostDesc,
        };
        let sorted = filters.apply(&df).unwrap();
        assert_eq!(
            frame::string_values(&sorted, "driver").unwrap(),
            vec![
                Some("Cai".to_string()),
                Some("Anu".to_string()),
                Some("Dev".to_string())
            ]
        );

        let ranged = DriverCostFilters {
            cost_range: Some((50.0, 100.0)),
            sort: DriverSort::DriverDesc,
            ..Default::default()
        };
        assert_eq!(
            frame::string_values(&ranged.apply(&df).unwrap(), "driver").unwrap(),
            vec![Some("Ben".to_string()), Some("Anu".to_string())]
        );
    }

    #[test]
    fn test_driver_sort_parsing() {
        assert_eq!("cpo-asc".parse::<DriverSort>().unwrap(), DriverSort::CpoAsc);
        assert!("fastest".parse::<DriverSort>().is_err());
    }
}
