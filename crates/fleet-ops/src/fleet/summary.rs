use serde::Serialize;

use super::domain::{
    Challan, Cluster, Driver, DriverStatus, EntityId, Notification, Ride, Vehicle, VehicleStatus,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverSummary {
    pub total: usize,
    pub active: usize,
    pub unassigned: usize,
}

impl DriverSummary {
    pub fn from_drivers(drivers: &[Driver]) -> Self {
        Self {
            total: drivers.len(),
            active: drivers
                .iter()
                .filter(|driver| driver.status == DriverStatus::Active)
                .count(),
            unassigned: drivers.iter().filter(|driver| driver.is_unassigned()).count(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSummary {
    pub total: usize,
    pub active: usize,
    pub maintenance: usize,
    pub unassigned: usize,
}

impl VehicleSummary {
    pub fn from_vehicles(vehicles: &[Vehicle]) -> Self {
        let with_status = |status: VehicleStatus| {
            vehicles
                .iter()
                .filter(|vehicle| vehicle.status == status)
                .count()
        };

        Self {
            total: vehicles.len(),
            active: with_status(VehicleStatus::Active),
            maintenance: with_status(VehicleStatus::Maintenance),
            unassigned: vehicles
                .iter()
                .filter(|vehicle| vehicle.is_unassigned())
                .count(),
        }
    }
}

/// Vehicles in the workshop or due for service.
pub fn maintenance_queue(vehicles: &[Vehicle]) -> Vec<&Vehicle> {
    vehicles
        .iter()
        .filter(|vehicle| vehicle.needs_service())
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallanSummary {
    pub count: usize,
    pub total_amount: u64,
    /// Pending plus overdue.
    pub pending_amount: u64,
}

impl ChallanSummary {
    pub fn from_challans(challans: &[Challan]) -> Self {
        Self {
            count: challans.len(),
            total_amount: challans.iter().map(|challan| u64::from(challan.amount)).sum(),
            pending_amount: challans
                .iter()
                .filter(|challan| challan.status.is_outstanding())
                .map(|challan| u64::from(challan.amount))
                .sum(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSummary {
    pub total: usize,
    pub unread: usize,
    pub read: usize,
}

impl NotificationSummary {
    pub fn from_notifications(notifications: &[Notification]) -> Self {
        let unread = notifications
            .iter()
            .filter(|notification| !notification.read)
            .count();
        Self {
            total: notifications.len(),
            unread,
            read: notifications.len() - unread,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStats {
    pub cluster_id: EntityId,
    pub name: String,
    pub is_active: bool,
    pub drivers: usize,
    pub active_drivers: usize,
    pub rides: usize,
    pub revenue: f64,
    pub average_fare: f64,
}

/// Per-cluster counters derived from the driver and ride collections. Cluster names are
/// free text, matched case-insensitively.
pub fn cluster_stats(clusters: &[Cluster], drivers: &[Driver], rides: &[Ride]) -> Vec<ClusterStats> {
    clusters
        .iter()
        .map(|cluster| {
            let members: Vec<&Driver> = drivers
                .iter()
                .filter(|driver| cluster.matches_name(&driver.cluster))
                .collect();
            let cluster_rides: Vec<&Ride> = rides
                .iter()
                .filter(|ride| cluster.matches_name(&ride.cluster))
                .collect();
            let revenue: f64 = cluster_rides.iter().map(|ride| ride.fare).sum();
            let average_fare = if cluster_rides.is_empty() {
                0.0
            } else {
                revenue / cluster_rides.len() as f64
            };

            ClusterStats {
                cluster_id: cluster.id.clone(),
                name: cluster.name.clone(),
                is_active: cluster.is_active,
                drivers: members.len(),
                active_drivers: members
                    .iter()
                    .filter(|driver| driver.status == DriverStatus::Active)
                    .count(),
                rides: cluster_rides.len(),
                revenue,
                average_fare,
            }
        })
        .collect()
}

/// Dashboard header counters across every collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetSummary {
    pub drivers: DriverSummary,
    pub vehicles: VehicleSummary,
    pub maintenance_queue: usize,
    pub challans: ChallanSummary,
    pub notifications: NotificationSummary,
    pub clusters: Vec<ClusterStats>,
    pub document_alerts: usize,
}
