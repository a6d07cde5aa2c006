//! Command implementations for the delivery-lens CLI
//!
//! Each command loads its CSV export, builds the session configuration
//! (defaults, then an optional JSON file, then command-line flags), runs the
//! library and hands the result to [`crate::cli::report`] for printing.

use crate::analytics::{first_mile_report, last_mile_report};
use crate::cli::args::{
    Args, Commands, DetectArgs, DriverCostArgs, FirstMileArgs, LastMileArgs, MapArgs,
    OutputArgs, PaletteArgs,
};
use crate::cli::report::{self, DetectionSummary};
use crate::config::DashboardConfig;
use crate::detection::{detect_data_type, indicator_scores, missing_required_columns};
use crate::driver_cost::{driver_cost_report, normalize_driver_costs};
use crate::error::DashboardError;
use crate::filters::{DateRange, DriverCostFilters, FirstMileFilters, LastMileFilters};
use crate::frame::column_names;
use crate::loader::{export_table, load_csv};
use crate::models::DataKind;
use crate::normalizer::{PreparedTable, preprocess};
use crate::palette::generate_palette;
use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use std::path::Path;
use tracing::{debug, info, warn};

/// Main command runner
pub fn run(args: Args) -> Result<()> {
    setup_logging(&args)?;
    debug!("Command line arguments: {:?}", args);

    let Some(command) = args.command else {
        return Ok(());
    };

    match command {
        Commands::Detect(detect) => run_detect(&detect),
        Commands::FirstMile(first_mile) => run_first_mile(&first_mile),
        Commands::LastMile(last_mile) => run_last_mile(&last_mile),
        Commands::DriverCost(driver_cost) => run_driver_cost(&driver_cost),
        Commands::Palette(palette) => run_palette(&palette),
    }
}

/// Set up logging based on the verbosity flags
fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("delivery_lens={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

fn run_detect(args: &DetectArgs) -> Result<()> {
    let table = load_table(&args.input)?;
    let columns = column_names(&table);

    let kind = detect_data_type(&columns);
    let summary = DetectionSummary {
        file: args.input.display().to_string(),
        rows: table.height(),
        kind,
        scores: indicator_scores(&columns),
        missing_columns: missing_required_columns(&columns, kind),
    };
    report::print_detection(&summary, args.format)
}

fn run_first_mile(args: &FirstMileArgs) -> Result<()> {
    let mut config = load_configuration(&args.output)?;
    if let Some(range) = date_range(args.dates.from, args.dates.to)? {
        config.first_mile.date_range = Some(range);
    }
    config.first_mile = FirstMileFilters {
        microwarehouses: override_list(&args.microwarehouses, &config.first_mile.microwarehouses),
        customers: override_list(&args.customers, &config.first_mile.customers),
        hub: args.hub.clone().or(config.first_mile.hub.clone()),
        ..config.first_mile
    };
    config = apply_map_flags(config, DataKind::FirstMile, &args.map);
    config.validate()?;

    let prepared = prepare(&args.input, DataKind::FirstMile)?;
    let dashboard = first_mile_report(&prepared, &config)?;

    if let Some(path) = &args.output.export {
        let filtered = config.first_mile.apply(&prepared.frame)?;
        export(&filtered, path)?;
    }
    report::print_first_mile(&args.input, &prepared, &dashboard, args.output.format)
}

fn run_last_mile(args: &LastMileArgs) -> Result<()> {
    let mut config = load_configuration(&args.output)?;
    if let Some(range) = date_range(args.dates.from, args.dates.to)? {
        config.last_mile.date_range = Some(range);
    }
    config.last_mile = LastMileFilters {
        hubs: override_list(&args.hubs, &config.last_mile.hubs),
        postcode: args.postcode.clone().or(config.last_mile.postcode.clone()),
        vehicle_models: override_list(&args.vehicle_models, &config.last_mile.vehicle_models),
        customers: override_list(&args.customers, &config.last_mile.customers),
        ..config.last_mile
    };
    config = apply_map_flags(config, DataKind::LastMile, &args.map);
    config.validate()?;

    let prepared = prepare(&args.input, DataKind::LastMile)?;
    let dashboard = last_mile_report(&prepared, &config)?;

    if let Some(path) = &args.output.export {
        let filtered = config.last_mile.apply(&prepared.frame)?;
        export(&filtered, path)?;
    }
    report::print_last_mile(&args.input, &prepared, &dashboard, args.output.format)
}

fn run_driver_cost(args: &DriverCostArgs) -> Result<()> {
    let mut config = load_configuration(&args.output)?;
    let current = config.driver_cost.clone();
    let cost_range = match (args.min_cost, args.max_cost) {
        (None, None) => current.cost_range,
        (min, max) => Some((
            min.unwrap_or(f64::NEG_INFINITY),
            max.unwrap_or(f64::INFINITY),
        )),
    };
    config = config.with_driver_cost_filters(DriverCostFilters {
        models: override_list(&args.models, &current.models),
        cost_range,
        sort: args.sort.unwrap_or(current.sort),
    });
    config.validate()?;

    let table = load_table(&args.input)?;
    let normalized = normalize_driver_costs(&table)?;
    let dashboard = driver_cost_report(&normalized, &config)?;

    if let Some(path) = &args.output.export {
        let filtered = config.driver_cost.apply(&normalized)?;
        export(&filtered, path)?;
    }
    report::print_driver_cost(&args.input, &dashboard, args.output.format)
}

fn run_palette(args: &PaletteArgs) -> Result<()> {
    let palette = generate_palette(&args.labels);
    if palette.len() < args.labels.len() {
        warn!(
            "{} repeated labels keep the color of their first occurrence",
            args.labels.len() - palette.len()
        );
    }
    report::print_palette(&palette, args.format)
}

/// Defaults, then the JSON config file if given, then the shared output flags
fn load_configuration(output: &OutputArgs) -> Result<DashboardConfig> {
    let mut config = match &output.config {
        Some(path) => DashboardConfig::from_json_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => DashboardConfig::default(),
    };

    if let Some(top) = output.top {
        config = config.with_top_n(top);
    }
    if output.show_all {
        config = config.with_show_all(true);
    }
    debug!("Loaded configuration: {:?}", config);
    Ok(config)
}

fn apply_map_flags(config: DashboardConfig, kind: DataKind, map: &MapArgs) -> DashboardConfig {
    let mut config = config;
    if map.clusters {
        config = config.with_clusters(kind, true);
    }
    if map.no_flow_lines {
        config = config.with_flow_lines(kind, false);
    }
    if let Some(height) = map.arc_height {
        config = config.with_arc_height(kind, height);
    }
    config
}

fn override_list(flags: &[String], configured: &[String]) -> Vec<String> {
    if flags.is_empty() {
        configured.to_vec()
    } else {
        flags.to_vec()
    }
}

fn date_range(
    from: Option<chrono::NaiveDate>,
    to: Option<chrono::NaiveDate>,
) -> Result<Option<DateRange>> {
    match (from, to) {
        (Some(from), Some(to)) => Ok(Some(DateRange::new(from, to)?)),
        _ => Ok(None),
    }
}

fn load_table(path: &Path) -> Result<DataFrame> {
    load_csv(path).with_context(|| format!("Failed to load {}", path.display()))
}

/// Load, check the detected kind and normalize
fn prepare(path: &Path, expected: DataKind) -> Result<PreparedTable> {
    let table = load_table(path)?;

    let detected = detect_data_type(column_names(&table));
    if detected != expected {
        return Err(DashboardError::DataKindMismatch { expected, detected }.into());
    }

    preprocess(&table, expected).with_context(|| format!("Failed to normalize {}", path.display()))
}

fn export(frame: &DataFrame, path: &Path) -> Result<()> {
    export_table(frame, path).with_context(|| format!("Failed to export {}", path.display()))?;
    info!("Exported {} rows to {}", frame.height(), path.display());
    Ok(())
}
