//! Delivery Lens Library
//!
//! Normalization and aggregation for logistics delivery exports: first mile
//! pickups into microwarehouses, last mile deliveries out of hubs and driver
//! cost sheets.
//!
//! This library provides tools for:
//! - Detecting whether a CSV export holds first mile or last mile records
//! - Cleaning locale-formatted numeric strings ("₹1,200.50", "45%")
//! - Dropping rows without usable coordinates and coercing distance, order and timestamp columns
//! - Assigning stable, well-separated colors to category labels
//! - Grouped aggregation with ranking and top-N truncation
//! - Assembling the first mile, last mile and driver cost dashboard figures

pub mod aggregate;
pub mod analytics;
pub mod cleaning;
pub mod config;
pub mod constants;
pub mod detection;
pub mod driver_cost;
pub mod error;
pub mod filters;
pub mod frame;
pub mod loader;
pub mod models;
pub mod normalizer;
pub mod palette;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
    pub mod report;
}

// Re-export commonly used types
pub use aggregate::{AggOp, AggregateSpec, TopN, aggregate};
pub use cleaning::clean_numeric_string;
pub use config::DashboardConfig;
pub use detection::detect_data_type;
pub use error::{DashboardError, Result};
pub use models::{DataKind, Metric, Rgba};
pub use normalizer::{PreparedTable, preprocess};
pub use palette::{ColorPalette, generate_palette};
