use chrono::{Duration, NaiveDate};
use serde::Deserialize;

use super::domain::{
    Driver, DriverDocuments, DriverStatus, EntityId, MaintenanceRecord, Vehicle,
    VehicleDocuments, VehicleStatus, UNASSIGNED,
};

/// Days between a recorded service and the next scheduled one.
pub const SERVICE_INTERVAL_DAYS: i64 = 90;

/// Registration form for a new driver.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDriver {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: String,
    pub license: String,
    #[serde(default)]
    pub vehicle: Option<String>,
    #[serde(default)]
    pub cluster: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub documents: Option<DriverDocuments>,
}

impl NewDriver {
    /// New drivers join active on `today` with no rides and no rating.
    pub fn into_driver(self, today: NaiveDate) -> Driver {
        Driver {
            id: EntityId::default(),
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: self.email,
            license: self.license.trim().to_string(),
            vehicle: non_blank(self.vehicle).unwrap_or_else(|| UNASSIGNED.to_string()),
            status: DriverStatus::Active,
            cluster: self.cluster,
            join_date: today,
            total_rides: 0,
            rating: 0.0,
            address: self.address,
            documents: self.documents.unwrap_or_else(DriverDocuments::pending),
        }
    }
}

/// Registration form for a new vehicle.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVehicle {
    pub number: String,
    pub model: String,
    pub year: u16,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub driver: Option<String>,
    #[serde(default)]
    pub status: Option<VehicleStatus>,
    pub fuel_type: String,
    #[serde(default)]
    pub last_service: Option<NaiveDate>,
    #[serde(default)]
    pub mileage: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub documents: Option<VehicleDocuments>,
}

impl NewVehicle {
    pub fn into_vehicle(self, today: NaiveDate) -> Vehicle {
        let last_service = self.last_service.unwrap_or(today);
        Vehicle {
            id: EntityId::default(),
            number: normalize_plate(&self.number),
            model: self.model.trim().to_string(),
            year: self.year,
            color: self.color,
            driver: non_blank(self.driver).unwrap_or_else(|| UNASSIGNED.to_string()),
            status: self.status.unwrap_or(VehicleStatus::Active),
            fuel_type: self.fuel_type,
            last_service,
            mileage: self.mileage,
            image: self.image,
            documents: self.documents.unwrap_or_else(VehicleDocuments::pending),
            maintenance: MaintenanceRecord {
                last_service,
                next_service: last_service + Duration::days(SERVICE_INTERVAL_DAYS),
                service_due: false,
            },
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Partial driver update; absent fields leave the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DriverPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub license: Option<String>,
    pub vehicle: Option<String>,
    pub status: Option<DriverStatus>,
    pub cluster: Option<String>,
    pub address: Option<String>,
    pub total_rides: Option<u32>,
    pub rating: Option<f64>,
    pub documents: Option<DriverDocuments>,
}

impl DriverPatch {
    pub fn apply(self, driver: &mut Driver) {
        let Self {
            name,
            phone,
            email,
            license,
            vehicle,
            status,
            cluster,
            address,
            total_rides,
            rating,
            documents,
        } = self;

        assign(&mut driver.name, name);
        assign(&mut driver.phone, phone);
        assign(&mut driver.email, email);
        assign(&mut driver.license, license);
        assign(&mut driver.vehicle, vehicle);
        assign(&mut driver.status, status);
        assign(&mut driver.cluster, cluster);
        assign(&mut driver.address, address);
        assign(&mut driver.total_rides, total_rides);
        assign(&mut driver.rating, rating);
        assign(&mut driver.documents, documents);
    }
}

/// Partial vehicle update; absent fields leave the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VehiclePatch {
    pub number: Option<String>,
    pub model: Option<String>,
    pub year: Option<u16>,
    pub color: Option<String>,
    pub driver: Option<String>,
    pub status: Option<VehicleStatus>,
    pub fuel_type: Option<String>,
    pub mileage: Option<u32>,
    pub image: Option<String>,
    pub documents: Option<VehicleDocuments>,
    pub maintenance: Option<MaintenanceRecord>,
}

impl VehiclePatch {
    pub fn apply(self, vehicle: &mut Vehicle) {
        let Self {
            number,
            model,
            year,
            color,
            driver,
            status,
            fuel_type,
            mileage,
            image,
            documents,
            maintenance,
        } = self;

        assign(&mut vehicle.number, number.as_deref().map(normalize_plate));
        assign(&mut vehicle.model, model);
        assign(&mut vehicle.year, year);
        assign(&mut vehicle.color, color);
        assign(&mut vehicle.driver, driver);
        assign(&mut vehicle.status, status);
        assign(&mut vehicle.fuel_type, fuel_type);
        assign(&mut vehicle.mileage, mileage);
        assign(&mut vehicle.documents, documents);
        if let Some(image) = image {
            vehicle.image = Some(image);
        }
        if let Some(maintenance) = maintenance {
            vehicle.last_service = maintenance.last_service;
            vehicle.maintenance = maintenance;
        }
    }
}

/// Registration plates are stored trimmed and upper-cased.
pub(crate) fn normalize_plate(number: &str) -> String {
    number.trim().to_uppercase()
}

fn assign<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}
