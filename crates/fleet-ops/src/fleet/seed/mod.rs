//! Sample fleet used to initialise a fresh store.

use serde::Deserialize;

use super::domain::{Challan, Cluster, Driver, Notification, Ride, Vehicle};

const DEMO_FLEET: &str = include_str!("demo_fleet.json");

#[derive(Debug, Clone, Deserialize)]
pub struct DemoFleet {
    pub drivers: Vec<Driver>,
    pub vehicles: Vec<Vehicle>,
    pub rides: Vec<Ride>,
    pub challans: Vec<Challan>,
    pub notifications: Vec<Notification>,
    pub clusters: Vec<Cluster>,
}

pub fn demo_fleet() -> Result<DemoFleet, serde_json::Error> {
    serde_json::from_str(DEMO_FLEET)
}
