//! Tests for the driver cost dashboard

use crate::driver_cost::normalize_driver_costs;
use crate::loader::load_csv_bytes;
use polars::prelude::DataFrame;

pub mod summary_tests;

/// Raw export with locale formatted amounts and two days of history
pub fn raw_driver_costs() -> DataFrame {
    let csv = r#"driver,model_name,total_cost,total_first_mile,total_mid_mile,total_last_mile,total_orders,overall_cpo,cost_day_1,total_orders_day_1,cost_day_2,total_orders_day_2,cpo_day_1
Anu,Van,"1,200.50",200.50,400,600,40,30.01,"1,000",20,200.5,0,50
Ben,Bike,300,100,100,100,30,10,100,10,200,0,10
Cai,Van,"₹ 2,000",500,500,"1,000",,,"",,300,0,
Dev,Truck,n/a,0,0,0,0,,0,0,0,0,
"#;
    load_csv_bytes(csv).unwrap()
}

pub fn driver_costs() -> DataFrame {
    normalize_driver_costs(&raw_driver_costs()).unwrap()
}
