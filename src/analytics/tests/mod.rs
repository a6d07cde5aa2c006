//! Tests for dashboard analytics

use crate::loader::load_csv_bytes;
use crate::models::DataKind;
use crate::normalizer::{PreparedTable, preprocess};

pub mod shared_tests;

pub fn prepare(csv: &str, kind: DataKind) -> PreparedTable {
    preprocess(&load_csv_bytes(csv).unwrap(), kind).unwrap()
}

pub fn first_mile() -> PreparedTable {
    prepare(
        "\
customer,hub,microwarehouse,customerlong,customerlat,microwarehouselong,microwarehouselat,pickedup_at,kms,num_orders
Acme,H1,MW-North,77.0,12.0,77.6,12.9,2024-01-05 09:00:00,2.0,3
Bolt,H1,MW-North,78.0,13.0,77.6,12.9,2024-01-06 10:00:00,4.0,1
Acme,H2,MW-South,77.0,12.0,77.5,12.8,2024-01-07 11:00:00,6.0,5
Core,H1,MW-East,78.0,13.0,77.7,12.7,2024-01-09 12:00:00,,2
",
        DataKind::FirstMile,
    )
}

pub fn last_mile() -> PreparedTable {
    prepare(
        "\
hub,hub_long,hub_lat,delivered_long,delivered_lat,created_date,postcode,driver,vehicle_model,kms
A,77.5,12.9,77.0,12.0,2024-01-05,010203,D1,Van,2.0
B,77.4,12.8,78.0,13.0,2024-01-05,010203,D2,Bike,4.0
B,77.4,12.8,77.0,12.0,2024-01-06,560001,D1,Bike,1.0
A,77.5,12.9,78.0,13.0,2024-01-07,560002,D3,Bike,3.0
A,77.5,12.9,77.0,12.0,2024-01-08,560001,D1,Van,5.0
B,77.4,12.8,78.0,13.0,2024-01-08,560001,D2,Van,7.0
",
        DataKind::LastMile,
    )
}
