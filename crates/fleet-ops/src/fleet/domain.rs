use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier shared by every persisted fleet record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Placeholder used for drivers without a vehicle and vehicles without a driver.
pub const UNASSIGNED: &str = "Unassigned";

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
#[error("'{value}' is not a recognizable calendar date")]
pub struct InvalidDate {
    pub value: String,
}

/// Parse a persisted date string. Accepts `YYYY-MM-DD`, RFC 3339 timestamps and naive
/// `YYYY-MM-DDTHH:MM:SS` timestamps; only the calendar date is kept.
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate, InvalidDate> {
    let trimmed = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc).date_naive());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt.date());
    }

    Err(InvalidDate {
        value: raw.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Verified,
    Expiring,
    Expired,
}

impl DocumentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Expiring => "expiring",
            Self::Expired => "expired",
        }
    }

    /// Statuses that raise an alert on their own, with or without an expiry date.
    pub const fn forces_alert(self) -> bool {
        matches!(self, Self::Expiring | Self::Expired)
    }
}

/// Every compliance document the operator tracks, across drivers and vehicles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    License,
    Aadhaar,
    Pan,
    Medical,
    Registration,
    Insurance,
    Pollution,
    Fitness,
}

impl DocumentKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::License => "license",
            Self::Aadhaar => "aadhaar",
            Self::Pan => "pan",
            Self::Medical => "medical",
            Self::Registration => "registration",
            Self::Insurance => "insurance",
            Self::Pollution => "pollution",
            Self::Fitness => "fitness",
        }
    }
}

/// A compliance artifact. `status` is advisory and is not kept in sync with `expiry`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub status: DocumentStatus,
    #[serde(default)]
    pub expiry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Document {
    pub fn new(status: DocumentStatus, expiry: Option<&str>) -> Self {
        Self {
            status,
            expiry: expiry.map(str::to_string),
            image: None,
        }
    }

    /// Parsed expiry date. Blank strings count as "no expiry".
    pub fn expiry_date(&self) -> Result<Option<NaiveDate>, InvalidDate> {
        match self.expiry.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => parse_calendar_date(raw).map(Some),
        }
    }

    /// Record an uploaded scan. An upload marks the document verified; a given `expiry`
    /// replaces the date on file.
    pub fn attach(&mut self, image: String, expiry: Option<String>) {
        self.image = Some(image);
        self.status = DocumentStatus::Verified;
        if let Some(expiry) = expiry {
            self.expiry = Some(expiry);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverDocuments {
    pub license: Document,
    pub aadhaar: Document,
    pub pan: Document,
    pub medical: Document,
}

impl DriverDocuments {
    /// Every document awaiting verification, nothing on file yet.
    pub fn pending() -> Self {
        let blank = Document::new(DocumentStatus::Pending, None);
        Self {
            license: blank.clone(),
            aadhaar: blank.clone(),
            pan: blank.clone(),
            medical: blank,
        }
    }

    pub fn entries(&self) -> [(DocumentKind, &Document); 4] {
        [
            (DocumentKind::License, &self.license),
            (DocumentKind::Aadhaar, &self.aadhaar),
            (DocumentKind::Pan, &self.pan),
            (DocumentKind::Medical, &self.medical),
        ]
    }

    /// `None` for kinds that belong to vehicles.
    pub fn get_mut(&mut self, kind: DocumentKind) -> Option<&mut Document> {
        match kind {
            DocumentKind::License => Some(&mut self.license),
            DocumentKind::Aadhaar => Some(&mut self.aadhaar),
            DocumentKind::Pan => Some(&mut self.pan),
            DocumentKind::Medical => Some(&mut self.medical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleDocuments {
    pub registration: Document,
    pub insurance: Document,
    pub pollution: Document,
    pub fitness: Document,
}

impl VehicleDocuments {
    pub fn pending() -> Self {
        let blank = Document::new(DocumentStatus::Pending, None);
        Self {
            registration: blank.clone(),
            insurance: blank.clone(),
            pollution: blank.clone(),
            fitness: blank,
        }
    }

    pub fn entries(&self) -> [(DocumentKind, &Document); 4] {
        [
            (DocumentKind::Registration, &self.registration),
            (DocumentKind::Insurance, &self.insurance),
            (DocumentKind::Pollution, &self.pollution),
            (DocumentKind::Fitness, &self.fitness),
        ]
    }

    pub fn get_mut(&mut self, kind: DocumentKind) -> Option<&mut Document> {
        match kind {
            DocumentKind::Registration => Some(&mut self.registration),
            DocumentKind::Insurance => Some(&mut self.insurance),
            DocumentKind::Pollution => Some(&mut self.pollution),
            DocumentKind::Fitness => Some(&mut self.fitness),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverStatus {
    Active,
    Inactive,
    Suspended,
}

impl DriverStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Suspended => "suspended",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    #[serde(default)]
    pub id: EntityId,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: String,
    pub license: String,
    /// Plate number of the assigned vehicle, or [`UNASSIGNED`].
    pub vehicle: String,
    pub status: DriverStatus,
    pub cluster: String,
    pub join_date: NaiveDate,
    #[serde(default)]
    pub total_rides: u32,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub address: String,
    pub documents: DriverDocuments,
}

impl Driver {
    pub fn is_unassigned(&self) -> bool {
        self.vehicle.trim().is_empty() || self.vehicle.eq_ignore_ascii_case(UNASSIGNED)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    Active,
    Maintenance,
    Inactive,
}

impl VehicleStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Maintenance => "maintenance",
            Self::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRecord {
    pub last_service: NaiveDate,
    pub next_service: NaiveDate,
    #[serde(default)]
    pub service_due: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    #[serde(default)]
    pub id: EntityId,
    /// Registration plate, e.g. `HR-26-AB-1234`.
    pub number: String,
    pub model: String,
    pub year: u16,
    pub color: String,
    /// Name of the assigned driver, or [`UNASSIGNED`].
    pub driver: String,
    pub status: VehicleStatus,
    pub fuel_type: String,
    pub last_service: NaiveDate,
    #[serde(default)]
    pub mileage: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub documents: VehicleDocuments,
    pub maintenance: MaintenanceRecord,
}

impl Vehicle {
    pub fn is_unassigned(&self) -> bool {
        self.driver.trim().is_empty() || self.driver.to_lowercase().contains("unassigned")
    }

    pub fn needs_service(&self) -> bool {
        self.status == VehicleStatus::Maintenance || self.maintenance.service_due
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RideStatus {
    Completed,
    Cancelled,
    Ongoing,
}

impl RideStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Ongoing => "ongoing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
}

impl PaymentMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Upi => "upi",
        }
    }
}

/// Historical ride record; never mutated once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    #[serde(default)]
    pub id: EntityId,
    pub driver_id: EntityId,
    pub driver_name: String,
    pub vehicle_number: String,
    pub passenger_name: String,
    pub passenger_phone: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub pickup_time: DateTime<Utc>,
    pub dropoff_time: DateTime<Utc>,
    pub distance: f64,
    pub fare: f64,
    pub status: RideStatus,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub rating: f64,
    pub cluster: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallanStatus {
    Pending,
    Paid,
    Overdue,
}

impl ChallanStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
        }
    }

    pub const fn is_outstanding(self) -> bool {
        matches!(self, Self::Pending | Self::Overdue)
    }
}

/// Traffic citation issued against a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challan {
    #[serde(default)]
    pub id: EntityId,
    pub vehicle_number: String,
    pub driver_name: String,
    pub amount: u32,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: ChallanStatus,
    #[serde(rename = "type")]
    pub violation: String,
    pub location: String,
}

impl Challan {
    /// Settle an outstanding challan. Returns `false` when it was already paid.
    pub fn mark_paid(&mut self) -> bool {
        if self.status.is_outstanding() {
            self.status = ChallanStatus::Paid;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Warning,
    Error,
    Success,
}

impl NotificationKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Success => "success",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(default)]
    pub id: EntityId,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

impl Notification {
    pub const fn read_state(&self) -> &'static str {
        if self.read {
            "read"
        } else {
            "unread"
        }
    }
}

/// Named operating zone. Drivers and rides reference clusters by free-text name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    #[serde(default)]
    pub id: EntityId,
    pub name: String,
    /// `[longitude, latitude]` of the zone center.
    pub center: [f64; 2],
    /// Radius in kilometres.
    pub radius: f64,
    pub color: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl Cluster {
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(name.trim())
    }
}

fn default_active() -> bool {
    true
}
