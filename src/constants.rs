//! Application constants for the delivery dashboards
//!
//! Column names, detection indicator sets, palette parameters and display
//! defaults shared by every dashboard.

// =============================================================================
// Column Name Constants
// =============================================================================

/// Standard column names found in delivery exports
pub mod columns {
    // First mile coordinates and facilities
    pub const CUSTOMER_LONG: &str = "customerlong";
    pub const CUSTOMER_LAT: &str = "customerlat";
    pub const MICROWAREHOUSE: &str = "microwarehouse";
    pub const MICROWAREHOUSE_LONG: &str = "microwarehouselong";
    pub const MICROWAREHOUSE_LAT: &str = "microwarehouselat";
    pub const PICKEDUP_AT: &str = "pickedup_at";

    // Last mile coordinates and facilities
    pub const HUB: &str = "hub";
    pub const HUB_LONG: &str = "hub_long";
    pub const HUB_LAT: &str = "hub_lat";
    pub const DELIVERED_LONG: &str = "delivered_long";
    pub const DELIVERED_LAT: &str = "delivered_lat";
    pub const CREATED_DATE: &str = "created_date";
    pub const POSTCODE: &str = "postcode";

    // Shared identifiers and metrics
    pub const CUSTOMER: &str = "customer";
    pub const DRIVER: &str = "driver";
    pub const VEHICLE_MODEL: &str = "vehicle_model";
    pub const DISTANCE_KMS: &str = "kms";
    pub const NUM_ORDERS: &str = "num_orders";
    pub const WEIGHT: &str = "weight";

    // Color columns attached by the normalizer
    pub const COLOR_R: &str = "color_r";
    pub const COLOR_G: &str = "color_g";
    pub const COLOR_B: &str = "color_b";
    pub const COLOR_A: &str = "color_a";

    // Driver cost export
    pub const MODEL_NAME: &str = "model_name";
    pub const TOTAL_COST: &str = "total_cost";
    pub const TOTAL_FIRST_MILE: &str = "total_first_mile";
    pub const TOTAL_MID_MILE: &str = "total_mid_mile";
    pub const TOTAL_LAST_MILE: &str = "total_last_mile";
    pub const TOTAL_ORDERS: &str = "total_orders";
    pub const OVERALL_CPO: &str = "overall_cpo";
}

// =============================================================================
// Data Kind Detection
// =============================================================================

/// Columns whose presence suggests a first mile pickup export
pub const FIRST_MILE_INDICATORS: &[&str] = &[
    columns::CUSTOMER_LONG,
    columns::CUSTOMER_LAT,
    columns::MICROWAREHOUSE,
    columns::MICROWAREHOUSE_LONG,
    columns::MICROWAREHOUSE_LAT,
    columns::PICKEDUP_AT,
];

/// Columns whose presence suggests a last mile delivery export
pub const LAST_MILE_INDICATORS: &[&str] = &[
    columns::HUB_LONG,
    columns::HUB_LAT,
    columns::DELIVERED_LONG,
    columns::DELIVERED_LAT,
    columns::CREATED_DATE,
    columns::POSTCODE,
];

// =============================================================================
// Palette Constants
// =============================================================================

/// Hue step between consecutive categories, in degrees
pub const GOLDEN_ANGLE_DEGREES: f64 = 137.5;

/// Base brightness of every channel before the hue term
pub const PALETTE_BASE: f64 = 0.7;

/// Amplitude of the sinusoidal hue term
pub const PALETTE_AMPLITUDE: f64 = 0.3;

/// Alpha shared by all category colors
pub const PALETTE_ALPHA: u8 = 180;

/// Color used for rows without a known category
pub const NEUTRAL_GRAY: [u8; 4] = [100, 100, 100, 180];

// =============================================================================
// Display Defaults
// =============================================================================

/// Default number of rows shown in ranked tables and charts
pub const DEFAULT_TOP_N: usize = 15;

/// Row limit used by the wider mapping tables
pub const WIDE_TOP_N: usize = 20;

/// Bins in the distance distribution
pub const HISTOGRAM_BINS: usize = 20;

/// Map pitch in degrees when clustered markers are shown
pub const CLUSTER_MAP_PITCH: f64 = 40.0;

/// Initial zoom level for delivery maps
pub const DEFAULT_MAP_ZOOM: f64 = 10.0;

/// Default arc height for first mile flow lines
pub const DEFAULT_ARC_HEIGHT: f64 = 1.0;

/// Allowed arc height range
pub const ARC_HEIGHT_RANGE: (f64, f64) = (0.1, 2.0);

/// Decimal places kept in rounded statistics tables
pub const STATS_DECIMALS: u32 = 2;

/// Text shown wherever a metric cannot be computed
pub const NOT_APPLICABLE: &str = "N/A";

/// Label of the group collecting rows whose category is missing
pub const MISSING_LABEL: &str = "(missing)";

// =============================================================================
// Driver Cost Constants
// =============================================================================

/// Columns that must exist in a driver cost export
pub const DRIVER_COST_REQUIRED: &[&str] =
    &[columns::DRIVER, columns::MODEL_NAME, columns::TOTAL_COST];

/// Summary columns that may arrive as locale formatted strings
pub const DRIVER_COST_NUMERIC: &[&str] = &[
    columns::TOTAL_COST,
    columns::TOTAL_FIRST_MILE,
    columns::TOTAL_MID_MILE,
    columns::TOTAL_LAST_MILE,
    columns::TOTAL_ORDERS,
    columns::OVERALL_CPO,
];

/// Pattern matching the per-day driver cost column families
pub const DAILY_COLUMN_PATTERN: &str = r"^(cost|fm|mm|lm|total_orders|cpo)_day_(\d+)$";

/// Last day of month considered by the daily trend analysis
pub const MAX_TREND_DAY: u32 = 31;
