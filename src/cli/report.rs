//! Text and JSON rendering of dashboard reports

use crate::analytics::{
    CategoryCount, DateSpan, DistanceBin, FirstMileReport, LastMileReport, TopTable,
};
use crate::cli::args::OutputFormat;
use crate::detection::IndicatorScores;
use crate::driver_cost::{DriverCostReport, format_amount};
use crate::models::{DataKind, PreprocessReport};
use crate::normalizer::PreparedTable;
use crate::palette::ColorPalette;
use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use serde_json::json;
use std::path::Path;

/// Outcome of the detect command
#[derive(Debug, Clone, Serialize)]
pub struct DetectionSummary {
    pub file: String,
    pub rows: usize,
    pub kind: DataKind,
    pub scores: IndicatorScores,
    pub missing_columns: Vec<String>,
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    println!("{}", text);
    Ok(())
}

fn heading(title: &str) {
    println!("\n{}", title.bright_green().bold());
}

fn field(label: &str, value: impl ToString) {
    println!("  {} {}", format!("{}:", label).bright_cyan(), value.to_string().bright_white());
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

fn print_preprocess(report: &PreprocessReport) {
    field("Rows loaded", report.input_rows);
    if report.dropped_rows > 0 {
        println!(
            "  {} {}",
            "Rows dropped (missing coordinates):".bright_yellow(),
            report.dropped_rows.to_string().bright_yellow().bold()
        );
    }
    for warning in &report.warnings {
        println!("  {} {}", "Warning:".bright_yellow(), warning);
    }
}

fn print_date_span(span: Option<&DateSpan>) {
    if let Some(span) = span {
        field("Period", span.label());
    }
}

fn print_categories(title: &str, categories: &[CategoryCount]) {
    if categories.is_empty() {
        return;
    }
    heading(title);
    for category in categories {
        println!(
            "  {} {:<24} {}",
            "■".truecolor(category.color.r, category.color.g, category.color.b),
            category.label,
            category.count.to_string().bright_white()
        );
    }
}

fn print_distribution(bins: Option<&Vec<DistanceBin>>) {
    let Some(bins) = bins else {
        return;
    };
    let widest = bins.iter().map(|bin| bin.count).max().unwrap_or(0).max(1);
    heading("Distance Distribution (km)");
    for bin in bins {
        let bar = "█".repeat((bin.count * 30).div_ceil(widest));
        println!(
            "  {:>8.2} - {:<8.2} {:>5} {}",
            bin.lower,
            bin.upper,
            bin.count,
            bar.bright_blue()
        );
    }
}

fn print_top_table<T>(title: &str, table: &TopTable<T>, line: impl Fn(&T) -> String) {
    heading(title);
    for row in &table.rows {
        println!("  {}", line(row));
    }
    if table.hidden() > 0 {
        println!(
            "  {}",
            format!("... {} more (use --show-all)", table.hidden()).bright_black()
        );
    }
}

pub fn print_detection(summary: &DetectionSummary, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(&serde_json::to_value(summary)?);
    }

    heading("Data Type Detection");
    field("File", &summary.file);
    field("Rows", summary.rows);
    field("Detected", summary.kind);
    field("First mile indicators", summary.scores.first_mile);
    field("Last mile indicators", summary.scores.last_mile);
    if summary.missing_columns.is_empty() {
        println!("  {}", "All required columns present".bright_green());
    } else {
        println!(
            "  {} {}",
            "Missing required columns:".bright_red(),
            summary.missing_columns.join(", ").bright_red().bold()
        );
    }
    Ok(())
}

pub fn print_first_mile(
    input: &Path,
    prepared: &PreparedTable,
    report: &FirstMileReport,
    format: OutputFormat,
) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(&json!({
            "file": input.display().to_string(),
            "kind": prepared.kind,
            "preprocess": prepared.report,
            "palette": prepared.palette,
            "dashboard": report,
        }));
    }

    heading("First Mile Dashboard");
    field("File", input.display());
    print_preprocess(&prepared.report);
    print_date_span(report.date_span.as_ref());

    heading("Key Metrics");
    field("Total Pickups", report.cards.total_pickups);
    field("Avg. Distance (km)", report.cards.avg_distance);
    field("Unique Customers", optional(report.cards.unique_customers));
    field("Total Orders", optional(report.cards.total_orders));

    print_distribution(report.distance_distribution.as_ref());
    print_categories("Pickups per Microwarehouse", &report.microwarehouses);

    if let Some(customers) = &report.customers {
        print_top_table("Orders by Customer", customers, |row| {
            format!("{:<28} {}", row.customer, row.total_orders)
        });
    }

    if let Some(hubs) = &report.hubs {
        heading("Hub Analysis");
        println!(
            "  {}",
            format!(
                "{:<16} {:>8} {:>8} {:>8} {:>8} {:>10} {:>10}",
                "Hub", "Avg km", "Min km", "Max km", "Pickups", "Orders", "Avg Orders"
            )
            .bright_cyan()
        );
        for hub in hubs {
            println!(
                "  {:<16} {:>8} {:>8} {:>8} {:>8} {:>10} {:>10}",
                hub.hub,
                hub.avg_distance,
                hub.min_distance,
                hub.max_distance,
                hub.pickups,
                hub.total_orders,
                hub.avg_orders_per_pickup
            );
        }
    }

    if let Some(mapping) = &report.hub_microwarehouses {
        print_top_table("Hub-Microwarehouse Mapping", mapping, |row| {
            format!(
                "{:<16} {:<20} {:>8} {:>10}",
                row.hub, row.microwarehouse, row.pickups, row.total_orders
            )
        });
    }

    if let Some(map) = &report.map {
        heading("Map");
        field("Center", format!("{:.5}, {:.5}", map.center_lat, map.center_lon));
        field("Zoom", map.zoom);
        field("Markers", if map.use_clusters { "clustered" } else { "individual" });
        field("Flow lines", if map.show_flow_lines { "shown" } else { "hidden" });
    }
    Ok(())
}

pub fn print_last_mile(
    input: &Path,
    prepared: &PreparedTable,
    report: &LastMileReport,
    format: OutputFormat,
) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(&json!({
            "file": input.display().to_string(),
            "kind": prepared.kind,
            "preprocess": prepared.report,
            "palette": prepared.palette,
            "dashboard": report,
        }));
    }

    heading("Last Mile Dashboard");
    field("File", input.display());
    print_preprocess(&prepared.report);
    print_date_span(report.date_span.as_ref());

    heading("Key Metrics");
    field("Total Deliveries", report.cards.total_deliveries);
    field("Avg. Distance (km)", report.cards.avg_distance);
    field("Unique Drivers", optional(report.cards.unique_drivers));
    field("Unique Postcodes", optional(report.cards.unique_postcodes));

    print_distribution(report.distance_distribution.as_ref());
    print_categories("Deliveries per Hub", &report.hubs);

    if let Some(vehicles) = &report.vehicles {
        heading("Deliveries by Vehicle Type");
        for vehicle in vehicles {
            println!("  {:<24} {}", vehicle.vehicle_model, vehicle.deliveries);
        }
    }

    if let Some(postcodes) = &report.postcodes {
        print_top_table("Deliveries by Postcode", postcodes, |row| {
            format!("{:<12} {}", row.postcode, row.deliveries)
        });
    }

    if let Some(mapping) = &report.hub_postcodes {
        print_top_table("Hub-Postcode Mapping", mapping, |row| {
            format!("{:<16} {:<12} {:>8}", row.hub, row.postcode, row.deliveries)
        });
    }

    if let Some(coverage) = &report.coverage {
        heading("Postcode Coverage");
        println!(
            "  {}",
            format!(
                "{:<12} {:>8} {:>8} {:>8} {:>10} {:<16}",
                "Postcode", "Avg km", "Min km", "Max km", "Deliveries", "Primary Hub"
            )
            .bright_cyan()
        );
        for row in coverage {
            println!(
                "  {:<12} {:>8} {:>8} {:>8} {:>10} {:<16}",
                row.postcode,
                row.avg_distance,
                row.min_distance,
                row.max_distance,
                row.deliveries,
                optional(row.primary_hub.as_deref())
            );
        }
    }

    if let Some(map) = &report.map {
        heading("Map");
        field("Center", format!("{:.5}, {:.5}", map.center_lat, map.center_lon));
        field("Zoom", map.zoom);
        field("Markers", if map.use_clusters { "clustered" } else { "individual" });
    }
    Ok(())
}

pub fn print_driver_cost(input: &Path, report: &DriverCostReport, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(&json!({
            "file": input.display().to_string(),
            "dashboard": report,
        }));
    }

    heading("Driver Cost Overview");
    field("File", input.display());
    field("Total Drivers", report.overview.drivers);
    field("Total Cost", format_amount(report.overview.total_cost));
    field("Total Orders", optional(report.overview.total_orders.map(|o| format!("{:.0}", o))));
    field("Average CPO", report.overview.average_cpo);

    if !report.models.is_empty() {
        heading("Vehicle Model Distribution");
        for model in &report.models {
            println!(
                "  {:<20} {:>6} drivers  {:>14}  avg {}",
                model.model,
                model.drivers,
                format_amount(Some(model.total_cost)),
                format_amount(model.avg_cost_per_vehicle.value())
            );
        }
    }

    if let Some(breakdown) = &report.cost_breakdown {
        heading("Cost Breakdown");
        field("First Mile", format_amount(Some(breakdown.first_mile)));
        field("Mid Mile", format_amount(Some(breakdown.mid_mile)));
        field("Last Mile", format_amount(Some(breakdown.last_mile)));
    }

    if let Some(per_model) = &report.model_breakdown {
        for model in per_model {
            println!(
                "  {:<20} FM {:>14}  MM {:>14}  LM {:>14}",
                model.model,
                format_amount(Some(model.breakdown.first_mile)),
                format_amount(Some(model.breakdown.mid_mile)),
                format_amount(Some(model.breakdown.last_mile))
            );
        }
    }

    if let Some(cpo) = &report.cpo_by_model {
        heading("Cost Per Order by Vehicle Model");
        for model in cpo {
            println!(
                "  {:<20} CPO {:>10}  orders {:>8.0}",
                model.model, model.average_cpo, model.total_orders
            );
        }
    }

    print_top_table("Top Drivers by Cost", &report.top_drivers, |driver| {
        format!(
            "{:<24} {:<16} {:>14}",
            driver.driver,
            driver.model.as_deref().unwrap_or("-"),
            format_amount(driver.total_cost.value())
        )
    });

    if !report.daily_trends.is_empty() {
        heading("Daily Trends");
        for day in &report.daily_trends {
            println!(
                "  Day {:>2}  cost {:>14}  orders {:>8.0}  CPO {}",
                day.day,
                format_amount(Some(day.total_cost)),
                day.total_orders,
                day.cpo
            );
        }
    }

    heading("Driver Details");
    for row in &report.details {
        println!(
            "  {:<24} {:<16} {:>14} {:>12} {:>12} {:>12} {:>8} {:>10}",
            optional(row.driver.as_deref()),
            optional(row.model.as_deref()),
            row.total_cost,
            row.first_mile,
            row.mid_mile,
            row.last_mile,
            optional(row.total_orders.map(|o| format!("{:.0}", o))),
            row.cpo
        );
    }
    Ok(())
}

pub fn print_palette(palette: &ColorPalette, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        let entries: Vec<_> = palette
            .entries()
            .iter()
            .map(|(label, color)| json!({ "label": label, "rgba": color.to_array(), "hex": color.to_hex() }))
            .collect();
        return print_json(&serde_json::Value::Array(entries));
    }

    heading("Palette");
    for (label, color) in palette.entries() {
        println!(
            "  {} {:<24} {} {}",
            "■".truecolor(color.r, color.g, color.b),
            label,
            color.to_hex().bright_white(),
            color.to_string().bright_black()
        );
    }
    Ok(())
}
