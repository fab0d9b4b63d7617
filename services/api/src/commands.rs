use crate::infra::{build_service, parse_date};
use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};
use fleet_ops::config::{AppConfig, StorageConfig};
use fleet_ops::error::AppError;
use fleet_ops::fleet::domain::{Challan, Driver, EntityId, Notification, Ride, Vehicle};
use fleet_ops::fleet::export::{export_csv, export_file_name, CsvExport};
use fleet_ops::fleet::listing::Listable;
use fleet_ops::fleet::store::Record;
use fleet_ops::fleet::{
    Category, DateRange, FleetService, ListQuery, ListResult, StoreBackend,
};
use fleet_ops::telemetry;
use std::fs::File;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct AlertsArgs {
    /// Evaluation date (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Number of alerts to print before summarising the rest
    #[arg(long, default_value_t = fleet_ops::fleet::compliance::DEFAULT_DIGEST_LIMIT)]
    pub(crate) limit: usize,
}

#[derive(Args, Debug)]
pub(crate) struct SummaryArgs {
    /// Evaluation date for document alerts (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum RecordKind {
    Drivers,
    Vehicles,
    Rides,
    Challans,
    Notifications,
}

#[derive(Args, Debug)]
pub(crate) struct ListArgs {
    /// Collection to list
    #[arg(value_enum)]
    pub(crate) kind: RecordKind,
    /// Case-insensitive text search
    #[arg(long)]
    pub(crate) search: Option<String>,
    /// Status filter (`all` for no constraint)
    #[arg(long)]
    pub(crate) status: Option<String>,
    /// Cluster name (drivers, rides)
    #[arg(long)]
    pub(crate) cluster: Option<String>,
    /// Payment method (rides)
    #[arg(long)]
    pub(crate) payment: Option<String>,
    /// Violation type substring (challans)
    #[arg(long)]
    pub(crate) violation: Option<String>,
    /// Fuel type (vehicles)
    #[arg(long)]
    pub(crate) fuel: Option<String>,
    /// Notification type (notifications)
    #[arg(long = "type")]
    pub(crate) notification_type: Option<String>,
    /// Inclusive start date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) from: Option<NaiveDate>,
    /// Inclusive end date (YYYY-MM-DD), requires --from
    #[arg(long, value_parser = parse_date)]
    pub(crate) to: Option<NaiveDate>,
    /// Write the filtered records as CSV into this directory
    #[arg(long)]
    pub(crate) export: Option<PathBuf>,
}

impl ListArgs {
    pub(crate) fn query(&self) -> Result<ListQuery, AppError> {
        let mut query = ListQuery::new();
        if let Some(text) = &self.search {
            query = query.with_text(text.clone());
        }
        if let Some(status) = &self.status {
            query = query.with_status(status.clone());
        }

        let categories = [
            (Category::Cluster, &self.cluster),
            (Category::PaymentMethod, &self.payment),
            (Category::ViolationType, &self.violation),
            (Category::FuelType, &self.fuel),
            (Category::NotificationType, &self.notification_type),
        ];
        for (category, value) in categories {
            if let Some(value) = value {
                query = query.with_category(category, value.clone());
            }
        }

        match (self.from, self.to) {
            (Some(from), Some(to)) => {
                if to < from {
                    return Err(AppError::InvalidInput(format!(
                        "--to {to} is before --from {from}"
                    )));
                }
                query = query.with_date_range(DateRange::between(from, to));
            }
            (Some(from), None) => query = query.with_date_range(DateRange::from(from)),
            (None, Some(_)) => {
                return Err(AppError::InvalidInput("--to requires --from".to_string()))
            }
            (None, None) => {}
        }

        Ok(query)
    }
}

#[derive(Args, Debug)]
pub(crate) struct PayArgs {
    /// Challan id
    pub(crate) id: String,
}

#[derive(Args, Debug)]
pub(crate) struct SeedArgs {
    /// Overwrite drivers and vehicles with the sample fleet
    #[arg(long)]
    pub(crate) reset: bool,
}

fn load_config() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

fn open_service() -> Result<FleetService<StoreBackend>, AppError> {
    build_service(&load_config()?)
}

/// Commands that change stored data need a data directory; the process-local store would
/// drop the change on exit.
pub(crate) fn ensure_persistent(storage: &StorageConfig, command: &str) -> Result<(), AppError> {
    if storage.data_dir.is_none() {
        return Err(AppError::InvalidInput(format!(
            "`{command}` changes stored data; set FLEET_DATA_DIR to a data directory first"
        )));
    }
    Ok(())
}

fn today_or_now(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

pub(crate) fn run_alerts(args: AlertsArgs) -> Result<(), AppError> {
    let service = open_service()?;
    let today = today_or_now(args.today);
    let digest = service.alert_digest(today, args.limit);

    println!("Document alerts as of {today}");
    if digest.total == 0 {
        println!("- nothing expires within {} days", service.policy().alert_window_days());
        return Ok(());
    }

    for alert in &digest.shown {
        println!(
            "- [{}] {}: {}",
            alert.severity.label(),
            alert.headline(),
            alert.message
        );
    }
    if digest.remaining > 0 {
        println!("  +{} more", digest.remaining);
    }
    Ok(())
}

pub(crate) fn run_summary(args: SummaryArgs) -> Result<(), AppError> {
    let service = open_service()?;
    let today = today_or_now(args.today);
    let summary = service.summary(today);

    println!("Fleet summary as of {today}");
    println!(
        "- Drivers: {} total | {} active | {} without a vehicle",
        summary.drivers.total, summary.drivers.active, summary.drivers.unassigned
    );
    println!(
        "- Vehicles: {} total | {} active | {} in maintenance | {} without a driver",
        summary.vehicles.total,
        summary.vehicles.active,
        summary.vehicles.maintenance,
        summary.vehicles.unassigned
    );
    println!("- Maintenance queue: {}", summary.maintenance_queue);
    println!(
        "- Challans: {} issued | Rs {} total | Rs {} outstanding",
        summary.challans.count, summary.challans.total_amount, summary.challans.pending_amount
    );
    println!(
        "- Notifications: {} unread of {}",
        summary.notifications.unread, summary.notifications.total
    );
    println!("- Document alerts: {}", summary.document_alerts);
    if !summary.clusters.is_empty() {
        println!("Clusters:");
        for cluster in &summary.clusters {
            println!(
                "  - {}{}: {} drivers ({} active) | {} rides | Rs {:.0} revenue | Rs {:.0} avg fare",
                cluster.name,
                if cluster.is_active { "" } else { " (paused)" },
                cluster.drivers,
                cluster.active_drivers,
                cluster.rides,
                cluster.revenue,
                cluster.average_fare
            );
        }
    }
    Ok(())
}

pub(crate) fn run_list(args: ListArgs) -> Result<(), AppError> {
    let query = args.query()?;
    let service = open_service()?;
    let export_dir = args.export.clone();

    match args.kind {
        RecordKind::Drivers => list::<Driver>(&service, &query, export_dir, |driver| {
            format!(
                "{:<8} {:<20} {:<9} {:<10} {}",
                driver.id.as_str(),
                driver.name,
                driver.status.as_str(),
                driver.cluster,
                driver.vehicle
            )
        }),
        RecordKind::Vehicles => list::<Vehicle>(&service, &query, export_dir, |vehicle| {
            format!(
                "{:<8} {:<15} {:<22} {:<12} {}",
                vehicle.id.as_str(),
                vehicle.number,
                vehicle.model,
                vehicle.status.as_str(),
                vehicle.driver
            )
        }),
        RecordKind::Rides => list::<Ride>(&service, &query, export_dir, |ride| {
            format!(
                "{:<8} {} {:<15} {} -> {} | Rs {:.0} | {}",
                ride.id.as_str(),
                ride.pickup_time.format("%Y-%m-%d %H:%M"),
                ride.driver_name,
                ride.pickup_location,
                ride.dropoff_location,
                ride.fare,
                ride.status.as_str()
            )
        }),
        RecordKind::Challans => list::<Challan>(&service, &query, export_dir, |challan| {
            format!(
                "{:<8} {:<15} {:<20} Rs {:<6} due {} | {}",
                challan.id.as_str(),
                challan.vehicle_number,
                challan.violation,
                challan.amount,
                challan.due_date,
                challan.status.as_str()
            )
        }),
        RecordKind::Notifications => {
            if export_dir.is_some() {
                return Err(AppError::InvalidInput(
                    "notifications cannot be exported".to_string(),
                ));
            }
            let result = service.search::<Notification>(&query);
            for notification in &result.items {
                println!(
                    "{:<8} [{}] {:<7} {}: {}",
                    notification.id.as_str(),
                    notification.kind.as_str(),
                    notification.read_state(),
                    notification.title,
                    notification.message
                );
            }
            print_aggregates(&result);
            Ok(())
        }
    }
}

fn list<T>(
    service: &FleetService<StoreBackend>,
    query: &ListQuery,
    export_dir: Option<PathBuf>,
    render: impl Fn(&T) -> String,
) -> Result<(), AppError>
where
    T: Record + Listable + CsvExport,
{
    let result = service.search::<T>(query);
    for record in &result.items {
        println!("{}", render(record));
    }
    print_aggregates(&result);

    if let Some(dir) = export_dir {
        let path = dir.join(export_file_name::<T>(Local::now().date_naive()));
        let file = File::create(&path)?;
        export_csv(file, &result.items)?;
        println!("Exported {} rows to {}", result.items.len(), path.display());
    }
    Ok(())
}

fn print_aggregates<T>(result: &ListResult<T>) {
    let aggregates = result.aggregates;
    println!(
        "{} records | total {:.2} | average {:.2}",
        aggregates.count, aggregates.total, aggregates.average
    );
}

pub(crate) fn run_pay(args: PayArgs) -> Result<(), AppError> {
    let config = load_config()?;
    ensure_persistent(&config.storage, "pay")?;
    let service = build_service(&config)?;
    let id = EntityId::from(args.id.trim());
    let challan = service
        .pay_challan(&id)?
        .ok_or_else(|| AppError::NotFound(format!("challan {id}")))?;

    println!(
        "Challan {} for {} (Rs {}) is {}",
        challan.id,
        challan.vehicle_number,
        challan.amount,
        challan.status.as_str()
    );
    Ok(())
}

pub(crate) fn run_seed(args: SeedArgs) -> Result<(), AppError> {
    let mut config = load_config()?;
    ensure_persistent(&config.storage, "seed")?;
    config.storage.seed_demo = false;
    let service = build_service(&config)?;

    if args.reset {
        service.reset_demo_data()?;
        println!("Restored sample drivers and vehicles");
        return Ok(());
    }

    let report = service.seed_demo_data()?;
    if report.any() {
        println!("Seeded sample fleet: {report:?}");
    } else {
        println!("Every collection already holds data; nothing seeded");
    }
    Ok(())
}
