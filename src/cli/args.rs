//! Command-line argument definitions for delivery-lens
//!
//! This module defines the complete CLI interface using the clap derive API.

use crate::filters::DriverSort;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the delivery dashboards
///
/// Loads first mile, last mile and driver cost CSV exports, normalizes them
/// and prints the dashboard figures as text or JSON.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "delivery-lens",
    version,
    about = "Summarize first mile, last mile and driver cost delivery exports",
    long_about = "Loads logistics CSV exports, detects whether they hold first mile pickups or \
                  last mile deliveries, cleans coordinates, distances and amounts, assigns \
                  stable category colors and prints the dashboard figures. The normalized \
                  table can be exported as CSV or Parquet for rendering elsewhere."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging output
    #[arg(
        short = 'v',
        long = "verbose",
        global = true,
        action = clap::ArgAction::Count,
        help = "Enable verbose logging (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only log errors
    #[arg(short = 'q', long = "quiet", global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Report which kind of export a CSV file holds
    Detect(DetectArgs),
    /// First mile dashboard (customer pickups into microwarehouses)
    FirstMile(FirstMileArgs),
    /// Last mile dashboard (hub deliveries to postcodes)
    LastMile(LastMileArgs),
    /// Driver cost dashboard
    DriverCost(DriverCostArgs),
    /// Print the colors assigned to a sequence of category labels
    Palette(PaletteArgs),
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Text,
    /// JSON format for scripting
    Json,
}

/// Output options shared by the dashboard commands
#[derive(Debug, Clone, Parser)]
pub struct OutputArgs {
    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write the filtered, normalized table to this path (.csv or .parquet)
    #[arg(short = 'e', long = "export", value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// JSON configuration file; command-line flags override its values
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Rows shown in ranked tables
    #[arg(long = "top", value_name = "N")]
    pub top: Option<usize>,

    /// Show every row of ranked tables
    #[arg(long = "show-all")]
    pub show_all: bool,
}

/// Date range flags shared by the geographic dashboards
#[derive(Debug, Clone, Parser)]
pub struct DateArgs {
    /// First day to include (YYYY-MM-DD)
    #[arg(long = "from", value_name = "DATE", requires = "to")]
    pub from: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long = "to", value_name = "DATE", requires = "from")]
    pub to: Option<NaiveDate>,
}

/// Map display flags shared by the geographic dashboards
#[derive(Debug, Clone, Parser)]
pub struct MapArgs {
    /// Cluster nearby points on the map
    #[arg(long = "clusters")]
    pub clusters: bool,

    /// Hide origin to destination flow lines
    #[arg(long = "no-flow-lines")]
    pub no_flow_lines: bool,

    /// Arc height multiplier for flow lines (0.1 to 2.0)
    #[arg(long = "arc-height", value_name = "HEIGHT")]
    pub arc_height: Option<f64>,
}

#[derive(Debug, Clone, Parser)]
pub struct DetectArgs {
    /// CSV export to inspect
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Parser)]
pub struct FirstMileArgs {
    /// First mile CSV export
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    #[command(flatten)]
    pub dates: DateArgs,

    /// Only include these microwarehouses (comma-separated)
    #[arg(long = "microwarehouse", value_delimiter = ',')]
    pub microwarehouses: Vec<String>,

    /// Only include these customers (comma-separated)
    #[arg(long = "customer", value_delimiter = ',')]
    pub customers: Vec<String>,

    /// Only include this hub
    #[arg(long = "hub")]
    pub hub: Option<String>,

    #[command(flatten)]
    pub map: MapArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Clone, Parser)]
pub struct LastMileArgs {
    /// Last mile CSV export
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    #[command(flatten)]
    pub dates: DateArgs,

    /// Only include these hubs (comma-separated)
    #[arg(long = "hub", value_delimiter = ',')]
    pub hubs: Vec<String>,

    /// Only include this postcode
    #[arg(long = "postcode")]
    pub postcode: Option<String>,

    /// Only include these vehicle models (comma-separated)
    #[arg(long = "vehicle-model", value_delimiter = ',')]
    pub vehicle_models: Vec<String>,

    /// Only include these customers (comma-separated)
    #[arg(long = "customer", value_delimiter = ',')]
    pub customers: Vec<String>,

    #[command(flatten)]
    pub map: MapArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Clone, Parser)]
pub struct DriverCostArgs {
    /// Driver cost CSV export
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Only include these vehicle models (comma-separated)
    #[arg(long = "model", value_delimiter = ',')]
    pub models: Vec<String>,

    /// Minimum total cost
    #[arg(long = "min-cost", value_name = "AMOUNT")]
    pub min_cost: Option<f64>,

    /// Maximum total cost
    #[arg(long = "max-cost", value_name = "AMOUNT")]
    pub max_cost: Option<f64>,

    /// Detail table order, e.g. total-cost-desc, driver-asc, cpo-asc, orders-desc
    #[arg(long = "sort", value_name = "ORDER")]
    pub sort: Option<DriverSort>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Clone, Parser)]
pub struct PaletteArgs {
    /// Category labels in the order colors are assigned
    #[arg(value_name = "LABEL", required = true)]
    pub labels: Vec<String>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl Args {
    /// Log level implied by the verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_last_mile_flags() {
        let args = Args::try_parse_from([
            "delivery-lens",
            "-vv",
            "last-mile",
            "deliveries.csv",
            "--hub",
            "A,B",
            "--from",
            "2024-01-05",
            "--to",
            "2024-01-09",
            "--clusters",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.get_log_level(), "debug");
        match args.command {
            Some(Commands::LastMile(last_mile)) => {
                assert_eq!(last_mile.hubs, vec!["A", "B"]);
                assert_eq!(last_mile.dates.from, NaiveDate::from_ymd_opt(2024, 1, 5));
                assert!(last_mile.map.clusters);
                assert_eq!(last_mile.output.format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_driver_cost_sort() {
        let args = Args::try_parse_from([
            "delivery-lens",
            "driver-cost",
            "costs.csv",
            "--sort",
            "cpo-asc",
            "--min-cost",
            "100",
        ])
        .unwrap();

        match args.command {
            Some(Commands::DriverCost(driver_cost)) => {
                assert_eq!(driver_cost.sort, Some(DriverSort::CpoAsc));
                assert_eq!(driver_cost.min_cost, Some(100.0));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_date_flags_come_in_pairs() {
        let result = Args::try_parse_from([
            "delivery-lens",
            "first-mile",
            "pickups.csv",
            "--from",
            "2024-01-05",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["delivery-lens", "-q", "-v", "detect", "x.csv"]).is_err());
        let quiet = Args::try_parse_from(["delivery-lens", "-q", "detect", "x.csv"]).unwrap();
        assert_eq!(quiet.get_log_level(), "error");
    }
}
