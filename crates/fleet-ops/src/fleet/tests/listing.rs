use super::common::*;

use crate::fleet::domain::{Challan, EntityId};
use crate::fleet::listing::{aggregate, filter, Category, DateRange, ListQuery, ANY};

fn ids<T>(items: &[T], id: impl Fn(&T) -> &EntityId) -> Vec<String> {
    items.iter().map(|item| id(item).to_string()).collect()
}

#[test]
fn pending_challans_matching_plate_prefix() {
    let fleet = fleet();
    let query = ListQuery::new().with_status("pending").with_text("HR-26");

    let result = filter(&fleet.challans, &query);
    assert_eq!(ids(&result.items, |c: &Challan| &c.id), vec!["1"]);
    assert_eq!(result.aggregates.count, 1);
    assert_eq!(result.aggregates.total, 2000.0);
}

#[test]
fn filtering_twice_yields_identical_results() {
    let fleet = fleet();
    let query = ListQuery::new()
        .with_text("raj")
        .with_category(Category::Cluster, "North");

    let first = filter(&fleet.rides, &query);
    let second = filter(&fleet.rides, &query);
    assert_eq!(first, second);
}

#[test]
fn empty_result_has_zero_aggregates() {
    let fleet = fleet();
    let result = filter(&fleet.rides, &ListQuery::new().with_text("no such passenger"));

    assert!(result.items.is_empty());
    assert_eq!(result.aggregates.count, 0);
    assert_eq!(result.aggregates.total, 0.0);
    assert_eq!(result.aggregates.average, 0.0);
}

#[test]
fn sentinel_and_blank_values_do_not_constrain() {
    let fleet = fleet();
    let query = ListQuery::new()
        .with_text("   ")
        .with_status(ANY)
        .with_category(Category::PaymentMethod, "ALL");

    assert_eq!(filter(&fleet.rides, &query).items.len(), fleet.rides.len());
}

#[test]
fn ride_cluster_filter_is_case_insensitive_and_aggregates_fares() {
    let fleet = fleet();
    let result = filter(
        &fleet.rides,
        &ListQuery::new().with_category(Category::Cluster, "north"),
    );

    assert_eq!(result.aggregates.count, 2);
    assert_eq!(result.aggregates.total, 1630.0);
    assert_eq!(result.aggregates.average, 5.0);
}

#[test]
fn predicates_combine_with_and() {
    let fleet = fleet();
    let query = ListQuery::new()
        .with_category(Category::Cluster, "North")
        .with_category(Category::PaymentMethod, "upi");

    let result = filter(&fleet.rides, &query);
    assert_eq!(result.items.len(), 1);
    assert_eq!(result.items[0].passenger_name, "Priya Sharma");
}

#[test]
fn text_search_covers_every_ride_field() {
    let fleet = fleet();
    for needle in ["priya", "AMIT", "cd-5678", "golf course", "karol bagh"] {
        let result = filter(&fleet.rides, &ListQuery::new().with_text(needle));
        assert_eq!(result.items.len(), 1, "needle {needle}");
    }
}

#[test]
fn violation_type_matches_by_substring() {
    let fleet = fleet();
    let result = filter(
        &fleet.challans,
        &ListQuery::new().with_category(Category::ViolationType, "violation"),
    );

    assert_eq!(ids(&result.items, |c: &Challan| &c.id), vec!["1", "2"]);
}

#[test]
fn challan_issue_date_range_is_inclusive() {
    let fleet = fleet();
    let bounded = ListQuery::new().with_date_range(DateRange::between(
        date(2024, 1, 10),
        date(2024, 1, 15),
    ));
    let open = ListQuery::new().with_date_range(DateRange::from(date(2024, 1, 10)));

    let result = filter(&fleet.challans, &bounded);
    assert_eq!(ids(&result.items, |c: &Challan| &c.id), vec!["1", "2"]);
    assert_eq!(filter(&fleet.challans, &open).items.len(), 2);
}

#[test]
fn unsupported_category_never_matches() {
    let fleet = fleet();
    let result = filter(
        &fleet.challans,
        &ListQuery::new().with_category(Category::FuelType, "Petrol"),
    );
    assert!(result.items.is_empty());
}

#[test]
fn notifications_filter_on_read_state_and_type() {
    let fleet = fleet();
    let unread = filter(&fleet.notifications, &ListQuery::new().with_status("unread"));
    assert_eq!(unread.items.len(), 2);

    let errors = filter(
        &fleet.notifications,
        &ListQuery::new().with_category(Category::NotificationType, "error"),
    );
    assert_eq!(errors.items.len(), 1);
    assert_eq!(errors.items[0].title, "New Challan Received");
}

#[test]
fn vehicle_fuel_and_driver_aggregates() {
    let fleet = fleet();
    let petrol = filter(
        &fleet.vehicles,
        &ListQuery::new().with_category(Category::FuelType, "petrol"),
    );
    assert_eq!(petrol.aggregates.count, 2);
    assert_eq!(petrol.aggregates.total, 113_000.0);

    let drivers = aggregate(&fleet.drivers);
    assert_eq!(drivers.count, 3);
    assert!((drivers.average - 4.766_666).abs() < 1e-3);
}

#[test]
fn json_query_filters_challans_end_to_end() {
    let query: ListQuery = serde_json::from_value(serde_json::json!({
        "text": "hr-26",
        "status": "pending",
        "categories": { "violationType": "speed" },
        "dateRange": { "from": "2024-01-01" }
    }))
    .expect("query deserializes");

    let fleet = fleet();
    let result = filter(&fleet.challans, &query);
    assert_eq!(ids(&result.items, |c: &Challan| &c.id), vec!["1"]);
}
