//! Configuration management and validation.
//!
//! [`DashboardConfig`] is the session context of one dashboard run: the
//! sidebar selections of each dashboard, the map display toggles and the
//! top-N limits. It is built once (defaults, optionally a JSON file, then
//! command-line overrides) and passed explicitly to whatever needs it.

use crate::constants::{
    ARC_HEIGHT_RANGE, DEFAULT_ARC_HEIGHT, DEFAULT_MAP_ZOOM, DEFAULT_TOP_N, WIDE_TOP_N,
};
use crate::error::{DashboardError, Result};
use crate::filters::{DateRange, DriverCostFilters, FirstMileFilters, LastMileFilters};
use crate::models::DataKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Map display toggles of a geographic dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    /// Aggregate nearby points into clusters instead of plotting each one
    pub use_clusters: bool,

    /// Draw origin to destination arcs
    pub show_flow_lines: bool,

    /// Arc height multiplier for flow lines
    pub arc_height: f64,

    /// Initial zoom level
    pub zoom: f64,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            use_clusters: false,
            show_flow_lines: true,
            arc_height: DEFAULT_ARC_HEIGHT,
            zoom: DEFAULT_MAP_ZOOM,
        }
    }
}

/// Session context shared by every dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub first_mile: FirstMileFilters,
    pub last_mile: LastMileFilters,
    pub driver_cost: DriverCostFilters,

    pub first_mile_map: MapSettings,
    pub last_mile_map: MapSettings,

    /// Rows shown in "top" tables (customers, postcodes, drivers)
    pub top_n: usize,

    /// Rows shown in the wider mapping tables
    pub wide_top_n: usize,

    /// Show every row instead of the top-N
    pub show_all: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            first_mile: FirstMileFilters::default(),
            last_mile: LastMileFilters::default(),
            driver_cost: DriverCostFilters::default(),
            first_mile_map: MapSettings::default(),
            last_mile_map: MapSettings::default(),
            top_n: DEFAULT_TOP_N,
            wide_top_n: WIDE_TOP_N,
            show_all: false,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a JSON file; absent keys take their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DashboardError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path)?;
        let config: DashboardConfig = serde_json::from_str(&text).map_err(|e| {
            DashboardError::configuration(format!("Invalid config {}: {}", path.display(), e))
        })?;
        debug!("Loaded configuration from {}", path.display());
        config.validate()?;
        Ok(config)
    }

    /// Map settings of the given dashboard
    pub fn map_settings(&self, kind: DataKind) -> &MapSettings {
        match kind {
            DataKind::FirstMile => &self.first_mile_map,
            DataKind::LastMile => &self.last_mile_map,
        }
    }

    fn map_settings_mut(&mut self, kind: DataKind) -> &mut MapSettings {
        match kind {
            DataKind::FirstMile => &mut self.first_mile_map,
            DataKind::LastMile => &mut self.last_mile_map,
        }
    }

    /// Configuration with a custom top-N limit
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Configuration that shows every row of top-N tables
    pub fn with_show_all(mut self, show_all: bool) -> Self {
        self.show_all = show_all;
        self
    }

    /// Configuration with clustering toggled for one dashboard
    pub fn with_clusters(mut self, kind: DataKind, use_clusters: bool) -> Self {
        self.map_settings_mut(kind).use_clusters = use_clusters;
        self
    }

    /// Configuration with flow lines toggled for one dashboard
    pub fn with_flow_lines(mut self, kind: DataKind, show: bool) -> Self {
        self.map_settings_mut(kind).show_flow_lines = show;
        self
    }

    /// Configuration with a custom arc height for one dashboard
    pub fn with_arc_height(mut self, kind: DataKind, arc_height: f64) -> Self {
        self.map_settings_mut(kind).arc_height = arc_height;
        self
    }

    pub fn with_first_mile_filters(mut self, filters: FirstMileFilters) -> Self {
        self.first_mile = filters;
        self
    }

    pub fn with_last_mile_filters(mut self, filters: LastMileFilters) -> Self {
        self.last_mile = filters;
        self
    }

    pub fn with_driver_cost_filters(mut self, filters: DriverCostFilters) -> Self {
        self.driver_cost = filters;
        self
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 || self.wide_top_n == 0 {
            return Err(DashboardError::configuration(
                "top_n and wide_top_n must be at least 1",
            ));
        }

        let (low, high) = ARC_HEIGHT_RANGE;
        for (kind, map) in [
            (DataKind::FirstMile, &self.first_mile_map),
            (DataKind::LastMile, &self.last_mile_map),
        ] {
            if !(low..=high).contains(&map.arc_height) {
                return Err(DashboardError::configuration(format!(
                    "{} arc height {} is outside {}..={}",
                    kind, map.arc_height, low, high
                )));
            }
            if !(map.zoom.is_finite() && map.zoom > 0.0) {
                return Err(DashboardError::configuration(format!(
                    "{} zoom must be a positive number",
                    kind
                )));
            }
        }

        for range in [self.first_mile.date_range, self.last_mile.date_range]
            .iter()
            .flatten()
        {
            check_date_range(range)?;
        }

        if let Some((min, max)) = self.driver_cost.cost_range {
            if min > max {
                return Err(DashboardError::configuration(format!(
                    "Cost range minimum {} exceeds maximum {}",
                    min, max
                )));
            }
        }

        Ok(())
    }
}

fn check_date_range(range: &DateRange) -> Result<()> {
    DateRange::new(range.start, range.end).map(|_| ())
}
