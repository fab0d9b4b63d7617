use axum::body::to_bytes;
use axum::http::StatusCode;
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::fleet::compliance::AlertPolicy;
use crate::fleet::domain::{
    Document, DocumentStatus, Driver, DriverDocuments, DriverStatus, EntityId, MaintenanceRecord,
    Vehicle, VehicleDocuments, VehicleStatus,
};
use crate::fleet::seed::{demo_fleet, DemoFleet};
use crate::fleet::service::FleetService;
use crate::fleet::store::MemoryStore;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn fleet() -> DemoFleet {
    demo_fleet().expect("embedded fleet parses")
}

pub(super) fn seeded_service() -> FleetService<MemoryStore> {
    let service = FleetService::new(MemoryStore::new(), AlertPolicy::default());
    service.seed_demo_data().expect("seed succeeds");
    service
}

pub(super) fn empty_service() -> FleetService<MemoryStore> {
    FleetService::new(MemoryStore::new(), AlertPolicy::default())
}

pub(super) fn doc(status: DocumentStatus, expiry: Option<&str>) -> Document {
    Document::new(status, expiry)
}

pub(super) fn verified_until(expiry: &str) -> Document {
    doc(DocumentStatus::Verified, Some(expiry))
}

/// Driver whose every document is verified without an expiry, except the license.
pub(super) fn driver_with_license(id: &str, name: &str, license: Document) -> Driver {
    let clean = doc(DocumentStatus::Verified, None);
    Driver {
        id: EntityId::from(id),
        name: name.to_string(),
        phone: "+91 90000 00000".to_string(),
        email: String::new(),
        license: format!("HR-{id}"),
        vehicle: "Unassigned".to_string(),
        status: DriverStatus::Active,
        cluster: "North".to_string(),
        join_date: date(2023, 1, 1),
        total_rides: 0,
        rating: 0.0,
        address: String::new(),
        documents: DriverDocuments {
            license,
            aadhaar: clean.clone(),
            pan: clean.clone(),
            medical: clean,
        },
    }
}

/// Vehicle whose every document is verified without an expiry, except insurance.
pub(super) fn vehicle_with_insurance(id: &str, number: &str, insurance: Document) -> Vehicle {
    let clean = doc(DocumentStatus::Verified, None);
    Vehicle {
        id: EntityId::from(id),
        number: number.to_string(),
        model: "Maruti Suzuki Dzire".to_string(),
        year: 2022,
        color: "White".to_string(),
        driver: "Unassigned".to_string(),
        status: VehicleStatus::Active,
        fuel_type: "Petrol".to_string(),
        last_service: date(2024, 1, 1),
        mileage: 1000,
        image: None,
        documents: VehicleDocuments {
            registration: clean.clone(),
            insurance,
            pollution: clean.clone(),
            fitness: clean,
        },
        maintenance: MaintenanceRecord {
            last_service: date(2024, 1, 1),
            next_service: date(2024, 4, 1),
            service_due: false,
        },
    }
}

pub(super) async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}

pub(super) async fn assert_status_json(response: Response, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    json_body(response).await
}
