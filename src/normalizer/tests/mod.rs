//! Tests for table normalization
//!
//! Fixtures are small CSV exports loaded the same way uploads are.

use crate::loader::load_csv_bytes;
use polars::prelude::DataFrame;

pub mod first_mile_tests;
pub mod last_mile_tests;

/// First mile export with one row missing a customer latitude
pub fn first_mile_fixture() -> DataFrame {
    let csv = "\
customer,hub,microwarehouse,customerlong,customerlat,microwarehouselong,microwarehouselat,pickedup_at,kms,num_orders
Acme,H1,MW-North,77.59,12.97,77.60,12.98,2024-03-01 09:00:00,4.5,3
Acme,H1,MW-North,77.58,,77.60,12.98,2024-03-01 10:00:00,3.0,1
Bolt,H2,MW-South,77.61,12.91,77.62,12.90,2024-03-02 11:30:00,6.25,2
Core,H2,MW-East,77.65,12.95,77.66,12.96,not a date,abc,4
";
    load_csv_bytes(csv).unwrap()
}

/// Last mile export with postcodes that carry leading zeros
pub fn last_mile_fixture() -> DataFrame {
    let csv = "\
hub,hub_long,hub_lat,delivered_long,delivered_lat,created_date,postcode,driver,kms
A,77.50,12.90,77.55,12.95,2024-03-01,010203,D1,2.0
A,77.50,12.90,77.56,12.96,2024-03-01,010203,D2,3.0
B,77.40,12.80,77.45,12.85,2024-03-02,560001,D1,4.0
A,77.50,12.90,77.57,12.97,2024-03-03,560001,D3,5.0
B,77.40,12.80,x,12.85,2024-03-03,560002,D2,6.0
";
    load_csv_bytes(csv).unwrap()
}
