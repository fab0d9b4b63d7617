use std::io::Write;

use chrono::NaiveDate;

use super::domain::{Challan, Driver, Ride, Vehicle};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("export write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("export produced invalid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// A record kind with a fixed CSV column layout.
pub trait CsvExport {
    const HEADERS: &'static [&'static str];
    const FILE_PREFIX: &'static str;

    fn csv_row(&self) -> Vec<String>;
}

/// Write a header row plus one fully quoted row per record.
pub fn export_csv<W: Write, T: CsvExport>(writer: W, records: &[T]) -> Result<(), ExportError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv_writer.write_record(T::HEADERS)?;
    for record in records {
        csv_writer.write_record(record.csv_row())?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn export_to_string<T: CsvExport>(records: &[T]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    export_csv(&mut buffer, records)?;
    Ok(String::from_utf8(buffer)?)
}

/// `<prefix>_export_<YYYY-MM-DD>.csv`
pub fn export_file_name<T: CsvExport>(date: NaiveDate) -> String {
    format!("{}_export_{}.csv", T::FILE_PREFIX, date.format("%Y-%m-%d"))
}

impl CsvExport for Ride {
    const HEADERS: &'static [&'static str] = &[
        "Ride ID",
        "Driver",
        "Vehicle",
        "Passenger",
        "Phone",
        "Pickup",
        "Dropoff",
        "Pickup Time",
        "Dropoff Time",
        "Distance (km)",
        "Fare (₹)",
        "Status",
        "Payment Method",
        "Rating",
        "Cluster",
    ];
    const FILE_PREFIX: &'static str = "rides";

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.driver_name.clone(),
            self.vehicle_number.clone(),
            self.passenger_name.clone(),
            self.passenger_phone.clone(),
            self.pickup_location.clone(),
            self.dropoff_location.clone(),
            self.pickup_time.format("%Y-%m-%d %H:%M").to_string(),
            self.dropoff_time.format("%Y-%m-%d %H:%M").to_string(),
            self.distance.to_string(),
            self.fare.to_string(),
            self.status.as_str().to_string(),
            self.payment_method.as_str().to_string(),
            self.rating.to_string(),
            self.cluster.clone(),
        ]
    }
}

impl CsvExport for Challan {
    const HEADERS: &'static [&'static str] = &[
        "Challan ID",
        "Vehicle Number",
        "Driver Name",
        "Amount",
        "Issue Date",
        "Due Date",
        "Status",
        "Type",
        "Location",
    ];
    const FILE_PREFIX: &'static str = "challans";

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.vehicle_number.clone(),
            self.driver_name.clone(),
            self.amount.to_string(),
            self.issue_date.to_string(),
            self.due_date.to_string(),
            self.status.as_str().to_string(),
            self.violation.clone(),
            self.location.clone(),
        ]
    }
}

impl CsvExport for Driver {
    const HEADERS: &'static [&'static str] = &[
        "Driver ID",
        "Name",
        "Phone",
        "Email",
        "License",
        "Vehicle",
        "Status",
        "Cluster",
        "Join Date",
        "Total Rides",
        "Rating",
    ];
    const FILE_PREFIX: &'static str = "drivers";

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.phone.clone(),
            self.email.clone(),
            self.license.clone(),
            self.vehicle.clone(),
            self.status.as_str().to_string(),
            self.cluster.clone(),
            self.join_date.to_string(),
            self.total_rides.to_string(),
            self.rating.to_string(),
        ]
    }
}

impl CsvExport for Vehicle {
    const HEADERS: &'static [&'static str] = &[
        "Vehicle ID",
        "Number",
        "Model",
        "Year",
        "Color",
        "Driver",
        "Status",
        "Fuel Type",
        "Last Service",
        "Next Service",
        "Mileage",
    ];
    const FILE_PREFIX: &'static str = "vehicles";

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.number.clone(),
            self.model.clone(),
            self.year.to_string(),
            self.color.clone(),
            self.driver.clone(),
            self.status.as_str().to_string(),
            self.fuel_type.clone(),
            self.maintenance.last_service.to_string(),
            self.maintenance.next_service.to_string(),
            self.mileage.to_string(),
        ]
    }
}
