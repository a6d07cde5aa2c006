//! Driver cost summary tests

use super::driver_costs;
use crate::aggregate::TopN;
use crate::config::DashboardConfig;
use crate::driver_cost::driver_cost_report;
use crate::driver_cost::summary::{
    cost_breakdown, cost_per_order, cpo_by_model, daily_trends, model_cost_breakdown, model_summary,
    overview, top_drivers,
};
use crate::filters::{DriverCostFilters, DriverSort};
use crate::loader::load_csv_bytes;
use crate::models::Metric;

#[test]
fn test_overview() {
    let summary = overview(&driver_costs()).unwrap();

    assert_eq!(summary.drivers, 4);
    assert_eq!(summary.total_cost, Some(3500.5));
    assert_eq!(summary.total_orders, Some(70.0));
    assert_eq!(summary.average_cpo.rounded(2), Metric::Value(50.01));
}

#[test]
fn test_cost_per_order_guards_zero_orders() {
    assert_eq!(cost_per_order(Some(100.0), Some(0.0)), Metric::NotApplicable);
    assert_eq!(cost_per_order(Some(100.0), None), Metric::NotApplicable);
    assert_eq!(cost_per_order(Some(100.0), Some(4.0)), Metric::Value(25.0));
}

#[test]
fn test_overview_without_orders_column() {
    let df = load_csv_bytes("driver,model_name,total_cost\nAnu,Van,10\n").unwrap();
    let df = crate::driver_cost::normalize_driver_costs(&df).unwrap();
    let summary = overview(&df).unwrap();

    assert_eq!(summary.total_orders, None);
    assert_eq!(summary.average_cpo, Metric::NotApplicable);
}

#[test]
fn test_model_summary() {
    let models = model_summary(&driver_costs()).unwrap();

    assert_eq!(models.len(), 3);
    assert_eq!(models[0].model, "Van");
    assert_eq!(models[0].drivers, 2);
    assert_eq!(models[0].total_cost, 3200.5);
    assert_eq!(models[0].avg_cost_per_vehicle, Metric::Value(1600.25));
    assert_eq!(models[2].model, "Truck");
    assert_eq!(models[2].total_cost, 0.0);
}

#[test]
fn test_cost_breakdown() {
    let breakdown = cost_breakdown(&driver_costs()).unwrap().unwrap();
    assert_eq!(breakdown.first_mile, 800.5);
    assert_eq!(breakdown.mid_mile, 1000.0);
    assert_eq!(breakdown.last_mile, 1700.0);

    let partial = load_csv_bytes("driver,total_first_mile\nAnu,1\n").unwrap();
    assert!(cost_breakdown(&partial).unwrap().is_none());
}

#[test]
fn test_model_cost_breakdown_in_first_seen_order() {
    let per_model = model_cost_breakdown(&driver_costs()).unwrap().unwrap();
    let models: Vec<&str> = per_model.iter().map(|m| m.model.as_str()).collect();

    assert_eq!(models, vec!["Van", "Bike", "Truck"]);
    assert_eq!(per_model[0].breakdown.first_mile, 700.5);
    assert_eq!(per_model[0].breakdown.last_mile, 1600.0);
    assert_eq!(per_model[2].breakdown.mid_mile, 0.0);
}

#[test]
fn test_cpo_by_model_drops_models_without_orders() {
    let cpo = cpo_by_model(&driver_costs()).unwrap().unwrap();
    let models: Vec<&str> = cpo.iter().map(|m| m.model.as_str()).collect();

    assert_eq!(models, vec!["Van", "Bike"]);
    assert_eq!(cpo[0].average_cpo, Metric::Value(30.01));
    assert_eq!(cpo[0].total_orders, 40.0);
}

#[test]
fn test_top_drivers_by_cost() {
    let top = top_drivers(&driver_costs(), TopN::new(2)).unwrap();
    let names: Vec<&str> = top.rows.iter().map(|d| d.driver.as_str()).collect();

    assert_eq!(names, vec!["Cai", "Anu"]);
    assert_eq!(top.hidden(), 2);
    assert_eq!(top.rows[0].model.as_deref(), Some("Van"));
}

#[test]
fn test_daily_trends_zero_orders_not_applicable() {
    let trends = daily_trends(&driver_costs()).unwrap();

    assert_eq!(trends.len(), 2);
    assert_eq!(trends[0].day, 1);
    assert_eq!(trends[0].total_cost, 1100.0);
    assert_eq!(trends[0].total_orders, 30.0);
    assert_eq!(trends[0].cpo.rounded(2), Metric::Value(36.67));

    assert_eq!(trends[1].day, 2);
    assert_eq!(trends[1].total_orders, 0.0);
    assert_eq!(trends[1].cpo, Metric::NotApplicable);
}

#[test]
fn test_report_details_follow_sort_and_format() {
    let report = driver_cost_report(&driver_costs(), &DashboardConfig::default()).unwrap();

    let first = &report.details[0];
    assert_eq!(first.driver.as_deref(), Some("Cai"));
    assert_eq!(first.total_cost, "2,000.00");
    assert_eq!(first.cpo, "N/A");
    assert_eq!(first.total_orders, None);

    let last = report.details.last().unwrap();
    assert_eq!(last.driver.as_deref(), Some("Dev"));
    assert_eq!(last.total_cost, "N/A");
}

#[test]
fn test_report_with_model_and_cost_filters() {
    let config = DashboardConfig::default().with_driver_cost_filters(DriverCostFilters {
        models: vec!["Van".to_string(), "Bike".to_string()],
        cost_range: Some((250.0, 1500.0)),
        sort: DriverSort::DriverAsc,
    });
    let report = driver_cost_report(&driver_costs(), &config).unwrap();

    let drivers: Vec<Option<&str>> = report
        .details
        .iter()
        .map(|row| row.driver.as_deref())
        .collect();
    assert_eq!(drivers, vec![Some("Anu"), Some("Ben")]);
    assert_eq!(report.overview.drivers, 2);
    assert_eq!(report.overview.total_cost, Some(1500.5));
}
