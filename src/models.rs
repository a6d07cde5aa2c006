//! Core data structures and types for delivery dashboards.
//!
//! Defines the first/last mile data kinds and the column roles each kind
//! assigns, the RGBA color type, the "value or not applicable" metric type
//! and the report produced by normalization.

use crate::constants::{NEUTRAL_GRAY, NOT_APPLICABLE, columns};
use crate::error::DashboardError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of delivery export, derived from column presence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    FirstMile,
    LastMile,
}

impl DataKind {
    /// Stable label used in configuration and JSON output
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::FirstMile => "first_mile",
            DataKind::LastMile => "last_mile",
        }
    }

    /// Column holding the pickup or creation timestamp
    pub fn timestamp_column(&self) -> &'static str {
        match self {
            DataKind::FirstMile => columns::PICKEDUP_AT,
            DataKind::LastMile => columns::CREATED_DATE,
        }
    }

    /// The four coordinate columns: origin (long, lat) then destination (long, lat)
    pub fn coordinate_columns(&self) -> [&'static str; 4] {
        match self {
            DataKind::FirstMile => [
                columns::MICROWAREHOUSE_LONG,
                columns::MICROWAREHOUSE_LAT,
                columns::CUSTOMER_LONG,
                columns::CUSTOMER_LAT,
            ],
            DataKind::LastMile => [
                columns::HUB_LONG,
                columns::HUB_LAT,
                columns::DELIVERED_LONG,
                columns::DELIVERED_LAT,
            ],
        }
    }

    /// Category column that drives color assignment
    pub fn category_column(&self) -> &'static str {
        match self {
            DataKind::FirstMile => columns::MICROWAREHOUSE,
            DataKind::LastMile => columns::HUB,
        }
    }

    /// (latitude, longitude) columns the map view is centered on
    pub fn map_center_columns(&self) -> (&'static str, &'static str) {
        match self {
            DataKind::FirstMile => (columns::CUSTOMER_LAT, columns::CUSTOMER_LONG),
            DataKind::LastMile => (columns::DELIVERED_LAT, columns::DELIVERED_LONG),
        }
    }

    /// Plural noun for one row of this kind
    pub fn record_noun(&self) -> &'static str {
        match self {
            DataKind::FirstMile => "pickups",
            DataKind::LastMile => "deliveries",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataKind {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "first_mile" => Ok(DataKind::FirstMile),
            "last_mile" => Ok(DataKind::LastMile),
            other => Err(DashboardError::configuration(format!(
                "Unknown data kind '{}' (expected first_mile or last_mile)",
                other
            ))),
        }
    }
}

/// RGBA color with 8-bit channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Color for rows whose category is absent or unmapped
    pub const NEUTRAL: Rgba = Rgba::from_array(NEUTRAL_GRAY);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_array(channels: [u8; 4]) -> Self {
        Self {
            r: channels[0],
            g: channels[1],
            b: channels[2],
            a: channels[3],
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Hex form without alpha, e.g. `#b2f470`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// A derived number that may be undefined (empty input, zero divisor)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Metric {
    Value(f64),
    NotApplicable,
}

impl Metric {
    /// Wrap an optional value; NaN and infinities are not applicable
    pub fn from_option(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Metric::Value(v),
            _ => Metric::NotApplicable,
        }
    }

    /// Guarded division: a zero, missing or non-finite divisor gives `NotApplicable`
    pub fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Self {
        match (numerator, denominator) {
            (Some(n), Some(d)) if d != 0.0 && d.is_finite() => Metric::from_option(Some(n / d)),
            _ => Metric::NotApplicable,
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Metric::Value(v) => Some(*v),
            Metric::NotApplicable => None,
        }
    }

    pub fn is_applicable(&self) -> bool {
        matches!(self, Metric::Value(_))
    }

    /// Round to the given number of decimal places
    pub fn rounded(self, decimals: u32) -> Self {
        match self {
            Metric::Value(v) => Metric::Value(round_to(v, decimals)),
            Metric::NotApplicable => Metric::NotApplicable,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Value(v) => f.pad(&format!("{:.2}", v)),
            Metric::NotApplicable => f.pad(NOT_APPLICABLE),
        }
    }
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Outcome of normalizing one uploaded table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PreprocessReport {
    /// Rows in the uploaded table
    pub input_rows: usize,
    /// Rows removed because a coordinate was missing
    pub dropped_rows: usize,
    /// Non-empty timestamps that could not be parsed
    pub unparsed_timestamps: usize,
    /// Non-fatal problems worth showing to the user
    pub warnings: Vec<String>,
}

impl PreprocessReport {
    pub fn retained_rows(&self) -> usize {
        self.input_rows.saturating_sub(self.dropped_rows)
    }
}
