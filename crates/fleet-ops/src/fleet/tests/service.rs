use super::common::*;

use crate::fleet::domain::{
    Challan, ChallanStatus, Cluster, DocumentKind, DocumentStatus, Driver, DriverStatus, EntityId,
    NotificationKind, Ride, VehicleStatus,
};
use crate::fleet::listing::{Category, ListQuery};
use crate::fleet::patch::{DriverPatch, NewDriver, NewVehicle, VehiclePatch};
use crate::fleet::service::{DocumentUpload, FleetServiceError, NewNotification};

fn new_driver(name: &str) -> NewDriver {
    NewDriver {
        name: name.to_string(),
        phone: "+91 98765 43299".to_string(),
        email: String::new(),
        license: "HR-0999888777".to_string(),
        vehicle: None,
        cluster: "East".to_string(),
        address: String::new(),
        documents: None,
    }
}

fn new_vehicle(number: &str) -> NewVehicle {
    NewVehicle {
        number: number.to_string(),
        model: "Toyota Etios".to_string(),
        year: 2023,
        color: "Grey".to_string(),
        driver: None,
        status: None,
        fuel_type: "CNG".to_string(),
        last_service: None,
        mileage: 0,
        image: None,
        documents: None,
    }
}

#[test]
fn seeding_is_a_first_run_only_operation() {
    let service = empty_service();
    let first = service.seed_demo_data().expect("seeds");
    assert!(first.any());
    assert_eq!(service.drivers().len(), 3);

    let second = service.seed_demo_data().expect("seed is idempotent");
    assert!(!second.any());
    assert_eq!(service.clusters().len(), 3);
}

#[test]
fn service_alerts_match_the_demo_fleet() {
    let service = seeded_service();
    let digest = service.alert_digest(date(2024, 1, 20), 3);

    assert_eq!(digest.total, 4);
    assert_eq!(digest.shown.len(), 3);
    assert_eq!(digest.remaining, 1);
    assert_eq!(digest.shown[0].subject_name, "HR-26-EF-9012");
}

#[test]
fn search_runs_against_stored_collections() {
    let service = seeded_service();
    let result = service.search::<Challan>(
        &ListQuery::new().with_status("pending").with_text("HR-26"),
    );
    assert_eq!(result.items.len(), 1);
    assert_eq!(result.items[0].id, EntityId::from("1"));

    let rides = service.search::<Ride>(&ListQuery::new().with_category(Category::Cluster, "central"));
    assert_eq!(rides.aggregates.total, 620.0);
}

#[test]
fn added_driver_is_active_and_searchable() {
    let service = seeded_service();
    let driver = service
        .add_driver(new_driver("Vikram Rao"), date(2024, 2, 1))
        .expect("adds");

    assert_eq!(driver.status, DriverStatus::Active);
    assert_eq!(driver.join_date, date(2024, 2, 1));
    assert_eq!(driver.total_rides, 0);
    assert!(!driver.id.is_blank());

    let found = service.search::<Driver>(&ListQuery::new().with_text("vikram"));
    assert_eq!(found.items, vec![driver]);
}

#[test]
fn blank_driver_names_are_rejected() {
    let service = empty_service();
    let err = service
        .add_driver(new_driver("   "), date(2024, 2, 1))
        .expect_err("blank name rejected");
    assert!(matches!(err, FleetServiceError::InvalidRecord(_)));
    assert!(service.drivers().is_empty());
}

#[test]
fn driver_patch_updates_only_given_fields() {
    let service = seeded_service();
    let id = EntityId::from("3");
    let patch = DriverPatch {
        vehicle: Some("HR-26-EF-9012".to_string()),
        status: Some(DriverStatus::Active),
        ..DriverPatch::default()
    };

    let updated = service
        .update_driver(&id, patch)
        .expect("updates")
        .expect("known driver");
    assert_eq!(updated.vehicle, "HR-26-EF-9012");
    assert_eq!(updated.status, DriverStatus::Active);
    assert_eq!(updated.name, "Suresh Yadav");

    let missing = service
        .update_driver(&EntityId::from("404"), DriverPatch::default())
        .expect("no store failure");
    assert!(missing.is_none());
}

#[test]
fn deleting_reports_whether_anything_was_removed() {
    let service = seeded_service();
    assert!(service.delete_driver(&EntityId::from("2")).expect("deletes"));
    assert!(!service.delete_driver(&EntityId::from("2")).expect("no-op"));
    assert_eq!(service.drivers().len(), 2);
}

#[test]
fn duplicate_plates_are_rejected() {
    let service = seeded_service();
    let err = service
        .add_vehicle(new_vehicle("hr-26-ab-1234"), date(2024, 2, 1))
        .expect_err("duplicate plate");
    assert!(matches!(err, FleetServiceError::InvalidRecord(_)));

    let added = service
        .add_vehicle(new_vehicle("HR-26-GH-3456"), date(2024, 2, 1))
        .expect("adds");
    assert_eq!(added.status, VehicleStatus::Active);
    assert_eq!(service.vehicles().len(), 4);
}

#[test]
fn renaming_a_vehicle_onto_a_taken_plate_is_rejected() {
    let service = seeded_service();
    let before: Vec<String> = service.vehicles().into_iter().map(|v| v.number).collect();

    let err = service
        .update_vehicle(
            &EntityId::from("2"),
            VehiclePatch {
                number: Some(" hr-26-ab-1234 ".to_string()),
                ..VehiclePatch::default()
            },
        )
        .expect_err("plate belongs to vehicle 1");
    assert!(matches!(err, FleetServiceError::InvalidRecord(_)));

    let after: Vec<String> = service.vehicles().into_iter().map(|v| v.number).collect();
    assert_eq!(after, before);
}

#[test]
fn renamed_plates_are_normalized() {
    let service = seeded_service();
    let id = EntityId::from("2");

    let renamed = service
        .update_vehicle(
            &id,
            VehiclePatch {
                number: Some("  hr-26-zz-0001 ".to_string()),
                ..VehiclePatch::default()
            },
        )
        .expect("updates")
        .expect("known vehicle");
    assert_eq!(renamed.number, "HR-26-ZZ-0001");

    let unchanged = service
        .update_vehicle(
            &id,
            VehiclePatch {
                number: Some("hr-26-zz-0001".to_string()),
                ..VehiclePatch::default()
            },
        )
        .expect("a vehicle may keep its own plate");
    assert!(unchanged.is_some());

    let err = service
        .add_vehicle(new_vehicle("HR-26-ZZ-0001"), date(2024, 2, 1))
        .expect_err("renamed plate is now taken");
    assert!(matches!(err, FleetServiceError::InvalidRecord(_)));
}

#[test]
fn vehicle_patch_can_renew_a_document() {
    let service = seeded_service();
    let id = EntityId::from("3");
    let mut documents = service
        .vehicles()
        .into_iter()
        .find(|vehicle| vehicle.id == id)
        .expect("seeded vehicle")
        .documents;
    documents.pollution = verified_until("2025-01-15");

    service
        .update_vehicle(
            &id,
            VehiclePatch {
                documents: Some(documents),
                ..VehiclePatch::default()
            },
        )
        .expect("updates")
        .expect("known vehicle");

    let alerts = service.document_alerts(date(2024, 1, 20));
    assert!(alerts.iter().all(|alert| alert.subject_id != id));
    assert!(service
        .vehicle_compliance_issues(date(2024, 1, 20))
        .iter()
        .all(|issue| issue.subject_id != id || issue.status != DocumentStatus::Expired));
}

#[test]
fn uploading_a_renewal_clears_the_alert() {
    let service = seeded_service();
    let id = EntityId::from("3");

    let vehicle = service
        .attach_vehicle_document(
            &id,
            DocumentKind::Pollution,
            DocumentUpload {
                image: "documents/vehicles/3/pollution-2025.jpg".to_string(),
                expiry: Some(" 2025-01-15 ".to_string()),
            },
        )
        .expect("uploads")
        .expect("known vehicle");

    let pollution = &vehicle.documents.pollution;
    assert_eq!(pollution.status, DocumentStatus::Verified);
    assert_eq!(pollution.expiry.as_deref(), Some("2025-01-15"));
    assert_eq!(
        pollution.image.as_deref(),
        Some("documents/vehicles/3/pollution-2025.jpg")
    );
    let today = date(2024, 1, 20);
    assert!(service
        .document_alerts(today)
        .iter()
        .all(|alert| alert.subject_id != id));
    assert!(service
        .vehicle_compliance_issues(today)
        .iter()
        .all(|issue| issue.subject_id != id));
}

#[test]
fn uploads_without_an_expiry_keep_the_date_on_file() {
    let service = seeded_service();
    let driver = service
        .attach_driver_document(
            &EntityId::from("1"),
            DocumentKind::Medical,
            DocumentUpload {
                image: "documents/drivers/1/medical-v2.jpg".to_string(),
                expiry: None,
            },
        )
        .expect("uploads")
        .expect("known driver");

    assert_eq!(driver.documents.medical.status, DocumentStatus::Verified);
    assert_eq!(driver.documents.medical.expiry.as_deref(), Some("2024-06-20"));
}

#[test]
fn invalid_uploads_are_rejected_without_writing() {
    let service = seeded_service();
    let id = EntityId::from("1");
    let before = service.drivers();

    let bad_date = service.attach_driver_document(
        &id,
        DocumentKind::License,
        DocumentUpload {
            image: "documents/drivers/1/license.jpg".to_string(),
            expiry: Some("next march".to_string()),
        },
    );
    assert!(matches!(bad_date, Err(FleetServiceError::InvalidRecord(_))));

    let wrong_holder = service.attach_driver_document(
        &id,
        DocumentKind::Insurance,
        DocumentUpload {
            image: "documents/drivers/1/insurance.jpg".to_string(),
            expiry: None,
        },
    );
    assert!(matches!(wrong_holder, Err(FleetServiceError::InvalidRecord(_))));

    let unknown = service
        .attach_driver_document(
            &EntityId::from("missing"),
            DocumentKind::License,
            DocumentUpload {
                image: "documents/drivers/missing/license.jpg".to_string(),
                expiry: None,
            },
        )
        .expect("no store failure");
    assert!(unknown.is_none());
    assert_eq!(service.drivers(), before);
}

#[test]
fn completing_service_clears_the_maintenance_queue() {
    let service = seeded_service();
    assert_eq!(service.maintenance_queue().len(), 1);

    let id = EntityId::from("3");
    let vehicle = service
        .complete_service(&id, date(2024, 1, 22))
        .expect("updates")
        .expect("known vehicle");

    assert_eq!(vehicle.status, VehicleStatus::Active);
    assert_eq!(vehicle.last_service, date(2024, 1, 22));
    assert!(!vehicle.maintenance.service_due);
    assert!(service.maintenance_queue().is_empty());

    let toggled = service
        .toggle_maintenance(&id)
        .expect("updates")
        .expect("known vehicle");
    assert_eq!(toggled.status, VehicleStatus::Maintenance);
}

#[test]
fn paying_a_challan_is_idempotent() {
    let service = seeded_service();
    let id = EntityId::from("3");

    let paid = service
        .pay_challan(&id)
        .expect("pays")
        .expect("known challan");
    assert_eq!(paid.status, ChallanStatus::Paid);

    let again = service
        .pay_challan(&id)
        .expect("no store failure")
        .expect("known challan");
    assert_eq!(again, paid);

    assert!(service
        .pay_challan(&EntityId::from("404"))
        .expect("no store failure")
        .is_none());

    let summary = service.summary(date(2024, 1, 20));
    assert_eq!(summary.challans.pending_amount, 2000);
    assert_eq!(summary.challans.total_amount, 4000);
}

#[test]
fn notifications_are_prepended_unread() {
    let service = seeded_service();
    let created = service
        .notify(NewNotification {
            title: "Insurance Renewal".to_string(),
            message: "HR-26-CD-5678 insurance expires in 55 days".to_string(),
            kind: NotificationKind::Info,
        })
        .expect("notifies");

    let notifications = service.notifications();
    assert_eq!(notifications.len(), 4);
    assert_eq!(notifications[0], created);
    assert!(!created.read);
}

#[test]
fn notification_read_state_transitions() {
    let service = seeded_service();
    let read = service
        .mark_notification_read(&EntityId::from("1"))
        .expect("marks")
        .expect("known notification");
    assert!(read.read);

    assert_eq!(service.mark_all_notifications_read().expect("marks"), 1);
    assert_eq!(service.mark_all_notifications_read().expect("marks"), 0);

    assert!(service
        .delete_notification(&EntityId::from("2"))
        .expect("deletes"));
    assert_eq!(service.clear_notifications().expect("clears"), 2);
    assert!(service.notifications().is_empty());
}

#[test]
fn clusters_are_registered_with_unique_names() {
    let service = seeded_service();
    let cluster = Cluster {
        id: EntityId::default(),
        name: " North ".to_string(),
        center: [77.05, 28.70],
        radius: 4.0,
        color: "#8B5CF6".to_string(),
        is_active: false,
    };

    let added = service.add_cluster(cluster.clone()).expect("adds");
    assert_eq!(added.name, "North");
    assert!(added.is_active);

    let duplicate = Cluster {
        name: "north".to_string(),
        ..cluster
    };
    assert!(matches!(
        service.add_cluster(duplicate),
        Err(FleetServiceError::InvalidRecord(_))
    ));

    let summary = service.summary(date(2024, 1, 20));
    let north = summary
        .clusters
        .iter()
        .find(|stats| stats.name == "North")
        .expect("north stats");
    assert_eq!(north.drivers, 1);
    assert_eq!(north.rides, 2);
    assert_eq!(north.revenue, 1630.0);
    assert_eq!(north.average_fare, 815.0);

    let paused = service
        .set_cluster_active(&added.id, false)
        .expect("updates")
        .expect("known cluster");
    assert!(!paused.is_active);
    assert!(service.delete_cluster(&added.id).expect("deletes"));
}

#[test]
fn summary_counts_the_demo_fleet() {
    let service = seeded_service();
    let summary = service.summary(date(2024, 1, 20));

    assert_eq!(summary.drivers.total, 3);
    assert_eq!(summary.drivers.active, 2);
    assert_eq!(summary.drivers.unassigned, 1);
    assert_eq!(summary.vehicles.maintenance, 1);
    assert_eq!(summary.vehicles.unassigned, 1);
    assert_eq!(summary.maintenance_queue, 1);
    assert_eq!(summary.notifications.unread, 2);
    assert_eq!(summary.document_alerts, 4);
}
