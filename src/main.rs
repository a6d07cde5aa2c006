use clap::Parser;
use delivery_lens::cli::{args::Args, commands};
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    match commands::run(args) {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Delivery Lens - Logistics Delivery Dashboards");
    println!("=============================================");
    println!();
    println!("Summarize first mile pickups, last mile deliveries and driver cost");
    println!("sheets exported as CSV.");
    println!();
    println!("USAGE:");
    println!("    delivery-lens <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    detect        Report which kind of export a CSV file holds");
    println!("    first-mile    First mile dashboard");
    println!("    last-mile     Last mile dashboard");
    println!("    driver-cost   Driver cost dashboard");
    println!("    palette       Print the colors assigned to category labels");
    println!();
    println!("EXAMPLES:");
    println!("    delivery-lens detect pickups.csv");
    println!("    delivery-lens first-mile pickups.csv --from 2024-01-01 --to 2024-01-31");
    println!("    delivery-lens last-mile deliveries.csv --hub A,B --format json");
    println!("    delivery-lens driver-cost costs.csv --sort cpo-asc --export costs.parquet");
    println!();
    println!("For detailed help on any command, use:");
    println!("    delivery-lens <COMMAND> --help");
}
