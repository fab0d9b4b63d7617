//! Fleet back office: drivers, vehicles, rides, challans, notifications and clusters.
//!
//! [`service::FleetService`] is the entry point. It reads collections from an
//! [`store::EntityStore`], runs the document expiry alerting in [`compliance`] and the list
//! engine in [`listing`], and writes changes back through typed store operations.

pub mod compliance;
pub mod domain;
pub mod export;
pub mod listing;
pub mod patch;
pub mod router;
pub mod seed;
pub mod service;
pub mod store;
pub mod summary;

#[cfg(test)]
mod tests;

pub use compliance::{collect_alerts, AlertDigest, AlertPolicy, AlertSeverity, DocumentAlert};
pub use listing::{filter, Category, DateRange, ListAggregates, ListQuery, ListResult};
pub use patch::{DriverPatch, NewDriver, NewVehicle, VehiclePatch};
pub use router::fleet_router;
pub use service::{DocumentUpload, FleetService, FleetServiceError, NewNotification, SeedReport};
pub use store::{EntityStore, FileStore, KeyValueStore, MemoryStore, StoreBackend, StoreError};
