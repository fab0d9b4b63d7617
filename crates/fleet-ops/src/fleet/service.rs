use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::compliance::{AlertAggregator, AlertDigest, AlertPolicy, ComplianceIssue, DocumentAlert};
use super::domain::{
    parse_calendar_date, Challan, Cluster, DocumentKind, Driver, EntityId, Notification,
    NotificationKind, Ride, Vehicle, VehicleStatus,
};
use super::listing::{filter, ListQuery, ListResult, Listable};
use super::patch::{DriverPatch, NewDriver, NewVehicle, VehiclePatch};
use super::seed::demo_fleet;
use super::store::{EntityStore, KeyValueStore, Record, StoreError};
use super::summary::{
    cluster_stats, maintenance_queue, ChallanSummary, DriverSummary, FleetSummary,
    NotificationSummary, VehicleSummary,
};

/// Which collections a seeding pass initialised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub drivers: bool,
    pub vehicles: bool,
    pub rides: bool,
    pub challans: bool,
    pub notifications: bool,
    pub clusters: bool,
}

impl SeedReport {
    pub fn any(&self) -> bool {
        self.drivers
            || self.vehicles
            || self.rides
            || self.challans
            || self.notifications
            || self.clusters
    }
}

/// Fields a new notification carries; id, timestamp and read flag are assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
}

/// An uploaded document scan. `expiry`, when present, replaces the date on file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct DocumentUpload {
    pub image: String,
    #[serde(default)]
    pub expiry: Option<String>,
}

impl DocumentUpload {
    /// Blank expiries keep the date on file; anything else must be a calendar date.
    fn validated(self) -> Result<Self, FleetServiceError> {
        require("image", &self.image)?;
        let expiry = match self.expiry.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                let date = parse_calendar_date(raw)
                    .map_err(|err| FleetServiceError::InvalidRecord(err.to_string()))?;
                Some(date.format("%Y-%m-%d").to_string())
            }
        };

        Ok(Self {
            image: self.image.trim().to_string(),
            expiry,
        })
    }
}

/// Operations behind every fleet view, composed over one entity store.
pub struct FleetService<S> {
    store: EntityStore<S>,
    aggregator: AlertAggregator,
}

impl<S> FleetService<S>
where
    S: KeyValueStore + 'static,
{
    pub fn new(backend: S, policy: AlertPolicy) -> Self {
        Self {
            store: EntityStore::new(backend),
            aggregator: AlertAggregator::new(policy),
        }
    }

    pub fn store(&self) -> &EntityStore<S> {
        &self.store
    }

    pub fn policy(&self) -> AlertPolicy {
        self.aggregator.evaluator().policy()
    }

    /// Initialise every collection that has never been written with the sample fleet.
    pub fn seed_demo_data(&self) -> Result<SeedReport, FleetServiceError> {
        let fleet = demo_fleet()?;
        let report = SeedReport {
            drivers: self.store.seed_if_absent(&fleet.drivers)?,
            vehicles: self.store.seed_if_absent(&fleet.vehicles)?,
            rides: self.store.seed_if_absent(&fleet.rides)?,
            challans: self.store.seed_if_absent(&fleet.challans)?,
            notifications: self.store.seed_if_absent(&fleet.notifications)?,
            clusters: self.store.seed_if_absent(&fleet.clusters)?,
        };

        if report.any() {
            info!(?report, "seeded demo fleet");
        }
        Ok(report)
    }

    /// Overwrite drivers and vehicles with the sample fleet.
    pub fn reset_demo_data(&self) -> Result<(), FleetServiceError> {
        let fleet = demo_fleet()?;
        self.store.save_all(&fleet.drivers)?;
        self.store.save_all(&fleet.vehicles)?;
        info!("restored sample drivers and vehicles");
        Ok(())
    }

    pub fn drivers(&self) -> Vec<Driver> {
        self.store.all()
    }

    pub fn vehicles(&self) -> Vec<Vehicle> {
        self.store.all()
    }

    pub fn rides(&self) -> Vec<Ride> {
        self.store.all()
    }

    pub fn challans(&self) -> Vec<Challan> {
        self.store.all()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.store.all()
    }

    pub fn clusters(&self) -> Vec<Cluster> {
        self.store.all()
    }

    pub fn document_alerts(&self, today: NaiveDate) -> Vec<DocumentAlert> {
        self.aggregator
            .collect(&self.drivers(), &self.vehicles(), today)
    }

    pub fn alert_digest(&self, today: NaiveDate, limit: usize) -> AlertDigest {
        AlertDigest::from_alerts(self.document_alerts(today), limit)
    }

    pub fn vehicle_compliance_issues(&self, today: NaiveDate) -> Vec<ComplianceIssue> {
        self.aggregator.compliance_issues(&self.vehicles(), today)
    }

    pub fn driver_compliance_issues(&self, today: NaiveDate) -> Vec<ComplianceIssue> {
        self.aggregator.compliance_issues(&self.drivers(), today)
    }

    pub fn maintenance_queue(&self) -> Vec<Vehicle> {
        maintenance_queue(&self.vehicles())
            .into_iter()
            .cloned()
            .collect()
    }

    /// Filter one collection and aggregate over the survivors.
    pub fn search<T>(&self, query: &ListQuery) -> ListResult<T>
    where
        T: Record + Listable,
    {
        let records = self.store.all::<T>();
        let result = filter(&records, query);
        debug!(
            key = %T::KEY,
            scanned = records.len(),
            matched = result.aggregates.count,
            "list query evaluated"
        );
        result
    }

    /// Register a driver. New drivers start active with no rides and no rating.
    pub fn add_driver(
        &self,
        draft: NewDriver,
        today: NaiveDate,
    ) -> Result<Driver, FleetServiceError> {
        require("name", &draft.name)?;
        require("phone", &draft.phone)?;
        require("license", &draft.license)?;

        let stored = self.store.add(draft.into_driver(today))?;
        info!(id = %stored.id, name = %stored.name, "driver added");
        Ok(stored)
    }

    pub fn update_driver(
        &self,
        id: &EntityId,
        patch: DriverPatch,
    ) -> Result<Option<Driver>, FleetServiceError> {
        if let Some(name) = &patch.name {
            require("name", name)?;
        }
        Ok(self.store.update(id, |driver: &mut Driver| patch.apply(driver))?)
    }

    /// Attach an uploaded scan to one of a driver's documents, marking it verified.
    pub fn attach_driver_document(
        &self,
        id: &EntityId,
        kind: DocumentKind,
        upload: DocumentUpload,
    ) -> Result<Option<Driver>, FleetServiceError> {
        let upload = upload.validated()?;
        let updated = self.store.try_update(id, |_: &[Driver], driver: &mut Driver| {
            let document = driver
                .documents
                .get_mut(kind)
                .ok_or_else(|| foreign_document(kind, "driver"))?;
            document.attach(upload.image, upload.expiry);
            Ok::<(), FleetServiceError>(())
        })?;

        if let Some(driver) = &updated {
            info!(id = %driver.id, document = kind.label(), "driver document uploaded");
        }
        Ok(updated)
    }

    pub fn delete_driver(&self, id: &EntityId) -> Result<bool, FleetServiceError> {
        Ok(self.store.delete::<Driver>(id)?)
    }

    pub fn add_vehicle(
        &self,
        draft: NewVehicle,
        today: NaiveDate,
    ) -> Result<Vehicle, FleetServiceError> {
        require("number", &draft.number)?;
        require("model", &draft.model)?;

        let vehicle = draft.into_vehicle(today);
        let stored = self.store.try_add(vehicle, ensure_unique_plate)?;
        info!(id = %stored.id, number = %stored.number, "vehicle added");
        Ok(stored)
    }

    pub fn update_vehicle(
        &self,
        id: &EntityId,
        patch: VehiclePatch,
    ) -> Result<Option<Vehicle>, FleetServiceError> {
        if let Some(number) = &patch.number {
            require("number", number)?;
        }
        let updated = self.store.try_update(id, |vehicles: &[Vehicle], vehicle: &mut Vehicle| {
            patch.apply(vehicle);
            ensure_unique_plate(vehicles, vehicle)
        })?;
        Ok(updated)
    }

    /// Attach an uploaded scan to one of a vehicle's documents, marking it verified.
    pub fn attach_vehicle_document(
        &self,
        id: &EntityId,
        kind: DocumentKind,
        upload: DocumentUpload,
    ) -> Result<Option<Vehicle>, FleetServiceError> {
        let upload = upload.validated()?;
        let updated = self.store.try_update(id, |_: &[Vehicle], vehicle: &mut Vehicle| {
            let document = vehicle
                .documents
                .get_mut(kind)
                .ok_or_else(|| foreign_document(kind, "vehicle"))?;
            document.attach(upload.image, upload.expiry);
            Ok::<(), FleetServiceError>(())
        })?;

        if let Some(vehicle) = &updated {
            info!(id = %vehicle.id, document = kind.label(), "vehicle document uploaded");
        }
        Ok(updated)
    }

    pub fn delete_vehicle(&self, id: &EntityId) -> Result<bool, FleetServiceError> {
        Ok(self.store.delete::<Vehicle>(id)?)
    }

    /// Send an active vehicle to the workshop, or bring a workshop vehicle back into service.
    pub fn toggle_maintenance(&self, id: &EntityId) -> Result<Option<Vehicle>, FleetServiceError> {
        Ok(self.store.update(id, |vehicle: &mut Vehicle| {
            vehicle.status = match vehicle.status {
                VehicleStatus::Maintenance => VehicleStatus::Active,
                _ => VehicleStatus::Maintenance,
            };
        })?)
    }

    /// Record a finished service: back to active, service dates moved to `today`.
    pub fn complete_service(
        &self,
        id: &EntityId,
        today: NaiveDate,
    ) -> Result<Option<Vehicle>, FleetServiceError> {
        Ok(self.store.update(id, |vehicle: &mut Vehicle| {
            vehicle.status = VehicleStatus::Active;
            vehicle.last_service = today;
            vehicle.maintenance.last_service = today;
            vehicle.maintenance.service_due = false;
        })?)
    }

    /// Settle a challan. Paying an already paid challan returns it unchanged.
    pub fn pay_challan(&self, id: &EntityId) -> Result<Option<Challan>, FleetServiceError> {
        let mut transitioned = false;
        let updated = self.store.update(id, |challan: &mut Challan| {
            transitioned = challan.mark_paid();
        })?;

        if let Some(challan) = &updated {
            if transitioned {
                info!(id = %challan.id, amount = challan.amount, "challan paid");
            } else {
                debug!(id = %challan.id, "challan already paid");
            }
        }
        Ok(updated)
    }

    /// Newest first: the notification is prepended, unread, stamped now.
    pub fn notify(&self, notification: NewNotification) -> Result<Notification, FleetServiceError> {
        require("title", &notification.title)?;

        let created = Notification {
            id: EntityId::generate(),
            title: notification.title,
            message: notification.message,
            kind: notification.kind,
            timestamp: Utc::now(),
            read: false,
        };
        self.store.modify(|notifications: &mut Vec<Notification>| {
            notifications.insert(0, created.clone());
        })?;
        Ok(created)
    }

    pub fn mark_notification_read(
        &self,
        id: &EntityId,
    ) -> Result<Option<Notification>, FleetServiceError> {
        Ok(self
            .store
            .update(id, |notification: &mut Notification| notification.read = true)?)
    }

    /// Returns how many notifications flipped from unread to read.
    pub fn mark_all_notifications_read(&self) -> Result<usize, FleetServiceError> {
        Ok(self.store.modify(|notifications: &mut Vec<Notification>| {
            let mut flipped = 0;
            for notification in notifications.iter_mut().filter(|n| !n.read) {
                notification.read = true;
                flipped += 1;
            }
            flipped
        })?)
    }

    pub fn delete_notification(&self, id: &EntityId) -> Result<bool, FleetServiceError> {
        Ok(self.store.delete::<Notification>(id)?)
    }

    pub fn clear_notifications(&self) -> Result<usize, FleetServiceError> {
        Ok(self.store.modify(|notifications: &mut Vec<Notification>| {
            let cleared = notifications.len();
            notifications.clear();
            cleared
        })?)
    }

    pub fn add_cluster(&self, mut cluster: Cluster) -> Result<Cluster, FleetServiceError> {
        require("name", &cluster.name)?;
        if !(cluster.radius.is_finite() && cluster.radius > 0.0) {
            return Err(FleetServiceError::InvalidRecord(
                "cluster radius must be a positive number of kilometres".to_string(),
            ));
        }

        cluster.name = cluster.name.trim().to_string();
        cluster.is_active = true;
        self.store.try_add(cluster, |clusters: &[Cluster], candidate: &Cluster| {
            if clusters
                .iter()
                .any(|existing| existing.matches_name(&candidate.name))
            {
                return Err(FleetServiceError::InvalidRecord(format!(
                    "cluster {} already exists",
                    candidate.name
                )));
            }
            Ok(())
        })
    }

    pub fn delete_cluster(&self, id: &EntityId) -> Result<bool, FleetServiceError> {
        Ok(self.store.delete::<Cluster>(id)?)
    }

    pub fn set_cluster_active(
        &self,
        id: &EntityId,
        active: bool,
    ) -> Result<Option<Cluster>, FleetServiceError> {
        Ok(self
            .store
            .update(id, |cluster: &mut Cluster| cluster.is_active = active)?)
    }

    pub fn summary(&self, today: NaiveDate) -> FleetSummary {
        let drivers = self.drivers();
        let vehicles = self.vehicles();
        let rides = self.rides();

        FleetSummary {
            drivers: DriverSummary::from_drivers(&drivers),
            vehicles: VehicleSummary::from_vehicles(&vehicles),
            maintenance_queue: maintenance_queue(&vehicles).len(),
            challans: ChallanSummary::from_challans(&self.challans()),
            notifications: NotificationSummary::from_notifications(&self.notifications()),
            clusters: cluster_stats(&self.clusters(), &drivers, &rides),
            document_alerts: self.aggregator.collect(&drivers, &vehicles, today).len(),
        }
    }
}

fn require(field: &'static str, value: &str) -> Result<(), FleetServiceError> {
    if value.trim().is_empty() {
        return Err(FleetServiceError::InvalidRecord(format!(
            "{field} must not be blank"
        )));
    }
    Ok(())
}

fn foreign_document(kind: DocumentKind, holder: &str) -> FleetServiceError {
    FleetServiceError::InvalidRecord(format!("{holder}s carry no {} document", kind.label()))
}

fn ensure_unique_plate(
    vehicles: &[Vehicle],
    candidate: &Vehicle,
) -> Result<(), FleetServiceError> {
    let plate = candidate.number.trim();
    let taken = vehicles.iter().any(|existing| {
        existing.id != candidate.id && existing.number.trim().eq_ignore_ascii_case(plate)
    });
    if taken {
        return Err(FleetServiceError::InvalidRecord(format!(
            "vehicle {plate} is already registered"
        )));
    }
    Ok(())
}

/// Error raised by the fleet service.
#[derive(Debug, thiserror::Error)]
pub enum FleetServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("embedded demo fleet is invalid: {0}")]
    Seed(#[from] serde_json::Error),
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}
