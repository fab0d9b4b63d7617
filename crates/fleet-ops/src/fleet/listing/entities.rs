use chrono::NaiveDate;

use super::engine::{contains_ignore_case, eq_ignore_case, Listable};
use super::query::Category;
use crate::fleet::domain::{Challan, Driver, Notification, Ride, Vehicle};

impl Listable for Driver {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.phone.as_str(), self.email.as_str()]
    }

    fn status_label(&self) -> &str {
        self.status.as_str()
    }

    fn matches_category(&self, category: Category, wanted: &str) -> bool {
        match category {
            Category::Cluster => eq_ignore_case(self.cluster.as_str(), wanted),
            _ => false,
        }
    }

    fn listed_on(&self) -> Option<NaiveDate> {
        Some(self.join_date)
    }

    fn measure(&self) -> f64 {
        f64::from(self.total_rides)
    }

    fn score(&self) -> Option<f64> {
        Some(self.rating)
    }
}

impl Listable for Vehicle {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.number.as_str(), self.model.as_str(), self.driver.as_str()]
    }

    fn status_label(&self) -> &str {
        self.status.as_str()
    }

    fn matches_category(&self, category: Category, wanted: &str) -> bool {
        match category {
            Category::FuelType => eq_ignore_case(self.fuel_type.as_str(), wanted),
            _ => false,
        }
    }

    fn listed_on(&self) -> Option<NaiveDate> {
        Some(self.last_service)
    }

    fn measure(&self) -> f64 {
        f64::from(self.mileage)
    }
}

impl Listable for Ride {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.passenger_name.as_str(),
            self.driver_name.as_str(),
            self.vehicle_number.as_str(),
            self.pickup_location.as_str(),
            self.dropoff_location.as_str(),
        ]
    }

    fn status_label(&self) -> &str {
        self.status.as_str()
    }

    fn matches_category(&self, category: Category, wanted: &str) -> bool {
        match category {
            Category::Cluster => eq_ignore_case(self.cluster.as_str(), wanted),
            Category::PaymentMethod => eq_ignore_case(self.payment_method.as_str(), wanted),
            _ => false,
        }
    }

    fn listed_on(&self) -> Option<NaiveDate> {
        Some(self.pickup_time.date_naive())
    }

    fn measure(&self) -> f64 {
        self.fare
    }

    fn score(&self) -> Option<f64> {
        Some(self.rating)
    }
}

impl Listable for Challan {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.vehicle_number.as_str(),
            self.driver_name.as_str(),
            self.violation.as_str(),
            self.location.as_str(),
        ]
    }

    fn status_label(&self) -> &str {
        self.status.as_str()
    }

    fn matches_category(&self, category: Category, wanted: &str) -> bool {
        match category {
            // violation names are free text ("Speed Violation"), so the filter is a substring
            Category::ViolationType => {
                contains_ignore_case(self.violation.as_str(), &wanted.trim().to_lowercase())
            }
            _ => false,
        }
    }

    fn listed_on(&self) -> Option<NaiveDate> {
        Some(self.issue_date)
    }

    fn measure(&self) -> f64 {
        f64::from(self.amount)
    }
}

impl Listable for Notification {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.message.as_str()]
    }

    /// Notifications have no lifecycle; the status filter selects read or unread.
    fn status_label(&self) -> &str {
        self.read_state()
    }

    fn matches_category(&self, category: Category, wanted: &str) -> bool {
        match category {
            Category::NotificationType => eq_ignore_case(self.kind.as_str(), wanted),
            _ => false,
        }
    }

    fn listed_on(&self) -> Option<NaiveDate> {
        Some(self.timestamp.date_naive())
    }

    fn measure(&self) -> f64 {
        0.0
    }
}
