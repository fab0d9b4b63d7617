use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use super::compliance::DEFAULT_DIGEST_LIMIT;
use super::domain::{
    Challan, Cluster, DocumentKind, Driver, EntityId, Notification, Ride, Vehicle,
};
use super::export::{export_file_name, export_to_string, CsvExport};
use super::listing::{ListQuery, Listable};
use super::patch::{DriverPatch, NewDriver, NewVehicle, VehiclePatch};
use super::service::{DocumentUpload, FleetService, FleetServiceError, NewNotification};
use super::store::{KeyValueStore, Record};

/// Router builder exposing the fleet views over HTTP.
pub fn fleet_router<S>(service: Arc<FleetService<S>>) -> Router
where
    S: KeyValueStore + 'static,
{
    Router::new()
        .route("/api/v1/alerts", get(alerts_handler::<S>))
        .route("/api/v1/summary", get(summary_handler::<S>))
        .route("/api/v1/drivers", post(add_driver_handler::<S>))
        .route("/api/v1/drivers/search", post(search_handler::<S, Driver>))
        .route("/api/v1/drivers/export", get(export_handler::<S, Driver>))
        .route(
            "/api/v1/drivers/compliance",
            get(driver_compliance_handler::<S>),
        )
        .route(
            "/api/v1/drivers/:id",
            patch(update_driver_handler::<S>).delete(delete_driver_handler::<S>),
        )
        .route(
            "/api/v1/drivers/:id/documents/:kind",
            post(driver_document_handler::<S>),
        )
        .route("/api/v1/vehicles", post(add_vehicle_handler::<S>))
        .route("/api/v1/vehicles/search", post(search_handler::<S, Vehicle>))
        .route("/api/v1/vehicles/export", get(export_handler::<S, Vehicle>))
        .route(
            "/api/v1/vehicles/maintenance",
            get(maintenance_queue_handler::<S>),
        )
        .route(
            "/api/v1/vehicles/compliance",
            get(vehicle_compliance_handler::<S>),
        )
        .route(
            "/api/v1/vehicles/:id",
            patch(update_vehicle_handler::<S>).delete(delete_vehicle_handler::<S>),
        )
        .route(
            "/api/v1/vehicles/:id/documents/:kind",
            post(vehicle_document_handler::<S>),
        )
        .route(
            "/api/v1/vehicles/:id/service",
            post(complete_service_handler::<S>),
        )
        .route(
            "/api/v1/vehicles/:id/maintenance",
            post(toggle_maintenance_handler::<S>),
        )
        .route("/api/v1/rides/search", post(search_handler::<S, Ride>))
        .route("/api/v1/rides/export", get(export_handler::<S, Ride>))
        .route("/api/v1/challans/search", post(search_handler::<S, Challan>))
        .route("/api/v1/challans/export", get(export_handler::<S, Challan>))
        .route("/api/v1/challans/:id/pay", post(pay_challan_handler::<S>))
        .route(
            "/api/v1/notifications",
            post(notify_handler::<S>).delete(clear_notifications_handler::<S>),
        )
        .route(
            "/api/v1/notifications/search",
            post(search_handler::<S, Notification>),
        )
        .route(
            "/api/v1/notifications/read",
            post(mark_all_read_handler::<S>),
        )
        .route(
            "/api/v1/notifications/:id",
            delete(delete_notification_handler::<S>),
        )
        .route(
            "/api/v1/notifications/:id/read",
            post(mark_read_handler::<S>),
        )
        .route(
            "/api/v1/clusters",
            get(clusters_handler::<S>).post(add_cluster_handler::<S>),
        )
        .route(
            "/api/v1/clusters/:id",
            patch(set_cluster_active_handler::<S>).delete(delete_cluster_handler::<S>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AlertParams {
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TodayParams {
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
}

fn resolve_today(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

pub(crate) async fn alerts_handler<S>(
    State(service): State<Arc<FleetService<S>>>,
    Query(params): Query<AlertParams>,
) -> Response
where
    S: KeyValueStore + 'static,
{
    let today = resolve_today(params.today);
    let digest = service.alert_digest(today, params.limit.unwrap_or(DEFAULT_DIGEST_LIMIT));
    (StatusCode::OK, axum::Json(digest)).into_response()
}

pub(crate) async fn summary_handler<S>(
    State(service): State<Arc<FleetService<S>>>,
    Query(params): Query<TodayParams>,
) -> Response
where
    S: KeyValueStore + 'static,
{
    let summary = service.summary(resolve_today(params.today));
    (StatusCode::OK, axum::Json(summary)).into_response()
}

pub(crate) async fn search_handler<S, T>(
    State(service): State<Arc<FleetService<S>>>,
    axum::Json(query): axum::Json<ListQuery>,
) -> Response
where
    S: KeyValueStore + 'static,
    T: Record + Listable + Send + 'static,
{
    let result = service.search::<T>(&query);
    (StatusCode::OK, axum::Json(result)).into_response()
}

pub(crate) async fn export_handler<S, T>(
    State(service): State<Arc<FleetService<S>>>,
    Query(params): Query<TodayParams>,
) -> Response
where
    S: KeyValueStore + 'static,
    T: Record + CsvExport + Send + 'static,
{
    let records = service.store().all::<T>();
    match export_to_string(&records) {
        Ok(body) => {
            let file_name = export_file_name::<T>(resolve_today(params.today));
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{file_name}\""),
                    ),
                ],
                body,
            )
                .into_response()
        }
        Err(err) => {
            error!(error = %err, "csv export failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

pub(crate) async fn add_driver_handler<S>(
    State(service): State<Arc<FleetService<S>>>,
    Query(params): Query<TodayParams>,
    axum::Json(draft): axum::Json<NewDriver>,
) -> Response
where
    S: KeyValueStore + 'static,
{
    created(service.add_driver(draft, resolve_today(params.today)))
}

pub(crate) async fn update_driver_handler<S>(
    State(service): State<Arc<FleetService<S>>>,
    Path(id): Path<String>,
    axum::Json(patch): axum::Json<DriverPatch>,
) -> Response
where
    S: KeyValueStore + 'static,
{
    let id = EntityId(id);
    found("driver", &id, service.update_driver(&id, patch))
}

pub(crate) async fn delete_driver_handler<S>(
    State(service): State<Arc<FleetService<S>>>,
    Path(id): Path<String>,
) -> Response
where
    S: KeyValueStore + 'static,
{
    let id = EntityId(id);
    removed("driver", &id, service.delete_driver(&id))
}

pub(crate) async fn driver_document_handler<S>(
    State(service): State<Arc<FleetService<S>>>,
    Path((id, kind)): Path<(String, DocumentKind)>,
    axum::Json(upload): axum::Json<DocumentUpload>,
) -> Response
where
    S: KeyValueStore + 'static,
{
    let id = EntityId(id);
    found("driver", &id, service.attach_driver_document(&id, kind, upload))
}

pub(crate) async fn driver_compliance_handler<S>(
    State(service): State<Arc<FleetService<S>>>,
    Query(params): Query<TodayParams>,
) -> Response
where
    S: KeyValueStore + 'static,
{
    let issues = service.driver_compliance_issues(resolve_today(params.today));
    (StatusCode::OK, axum::Json(issues)).into_response()
}

pub(crate) async fn add_vehicle_handler<S>(
    State(service): State<Arc<FleetService<S>>>,
    Query(params): Query<TodayParams>,
    axum::Json(draft): axum::Json<NewVehicle>,
) -> Response
where
    S: KeyValueStore + 'static,
{
    created(service.add_vehicle(draft, resolve_today(params.today)))
}

pub(crate) async fn update_vehicle_handler<S>(
    State(service): State<Arc<FleetService<S>>>,
    Path(id): Path<String>,
    axum::Json(patch): axum::Json<VehiclePatch>,
) -> Response
where
    S: KeyValueStore + 'static,
{
    let id = EntityId(id);
    found("vehicle", &id, service.update_vehicle(&id, patch))
}

pub(crate) async fn delete_vehicle_handler<S>(
    State(service): State<Arc<FleetService<S>>>,
    Path(id): Path<String>,
) -> Response
where
    S: KeyValueStore + 'static,
{
    let id = EntityId(id);
    removed("vehicle", &id, service.delete_vehicle(&id))
}

pub(crate) async fn complete_service_handler<S>(
    State(service): State<Arc<FleetService<S>>>,
    Path(id): Path<String>,
    Query(params): Query<TodayParams>,
) -> Response
where
    S: KeyValueStore + 'static,
{
    let id = EntityId(id);
    let outcome = service.complete_service(&id, resolve_today(params.today));
    found("vehicle", &id, outcome)
}

pub(crate) async fn toggle_maintenance_handler<S>(
    State(service): State<Arc<FleetService<S>>>,
    Path(id): Path<String>,
) -> Response
where
    S: KeyValueStore + 'static,
{
    let id = EntityId(id);
    found("vehicle", &id, service.toggle_maintenance(&id))
}

pub(crate) async fn maintenance_queue_handler<S>(
    State(service): State<Arc<FleetService<S>>>,
) -> Response
where
    S: KeyValueStore + 'static,
{
    (StatusCode::OK, axum::Json(service.maintenance_queue())).into_response()
}

pub(crate) async fn vehicle_compliance_handler<S>(
    State(service): State<Arc<FleetService<S>>>,
    Query(params): Query<TodayParams>,
) -> Response
where
    S: KeyValueStore + 'static,
{
    let issues = service.vehicle_compliance_issues(resolve_today(params.today));
    (StatusCode::OK, axum::Json(issues)).into_response()
}

pub(crate) async fn vehicle_document_handler<S>(
    State(service): State<Arc<FleetService<S>>>,
    Path((id, kind)): Path<(String, DocumentKind)>,
    axum::Json(upload): axum::Json<DocumentUpload>,
) -> Response
where
    S: KeyValueStore + 'static,
{
    let id = EntityId(id);
    found("vehicle", &id, service.attach_vehicle_document(&id, kind, upload))
}

pub(crate) async fn pay_challan_handler<S>(
    State(service): State<Arc<FleetService<S>>>,
    Path(id): Path<String>,
) -> Response
where
    S: KeyValueStore + 'static,
{
    let id = EntityId(id);
    found("challan", &id, service.pay_challan(&id))
}

pub(crate) async fn notify_handler<S>(
    State(service): State<Arc<FleetService<S>>>,
    axum::Json(notification): axum::Json<NewNotification>,
) -> Response
where
    S: KeyValueStore + 'static,
{
    created(service.notify(notification))
}

pub(crate) async fn mark_read_handler<S>(
    State(service): State<Arc<FleetService<S>>>,
    Path(id): Path<String>,
) -> Response
where
    S: KeyValueStore + 'static,
{
    let id = EntityId(id);
    found("notification", &id, service.mark_notification_read(&id))
}

pub(crate) async fn mark_all_read_handler<S>(
    State(service): State<Arc<FleetService<S>>>,
) -> Response
where
    S: KeyValueStore + 'static,
{
    match service.mark_all_notifications_read() {
        Ok(updated) => (StatusCode::OK, axum::Json(json!({ "updated": updated }))).into_response(),
        Err(err) => service_error(err),
    }
}

pub(crate) async fn clear_notifications_handler<S>(
    State(service): State<Arc<FleetService<S>>>,
) -> Response
where
    S: KeyValueStore + 'static,
{
    match service.clear_notifications() {
        Ok(cleared) => (StatusCode::OK, axum::Json(json!({ "cleared": cleared }))).into_response(),
        Err(err) => service_error(err),
    }
}

pub(crate) async fn delete_notification_handler<S>(
    State(service): State<Arc<FleetService<S>>>,
    Path(id): Path<String>,
) -> Response
where
    S: KeyValueStore + 'static,
{
    let id = EntityId(id);
    removed("notification", &id, service.delete_notification(&id))
}

pub(crate) async fn clusters_handler<S>(
    State(service): State<Arc<FleetService<S>>>,
) -> Response
where
    S: KeyValueStore + 'static,
{
    (StatusCode::OK, axum::Json(service.clusters())).into_response()
}

pub(crate) async fn add_cluster_handler<S>(
    State(service): State<Arc<FleetService<S>>>,
    axum::Json(cluster): axum::Json<Cluster>,
) -> Response
where
    S: KeyValueStore + 'static,
{
    created(service.add_cluster(cluster))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClusterActivation {
    pub(crate) is_active: bool,
}

pub(crate) async fn set_cluster_active_handler<S>(
    State(service): State<Arc<FleetService<S>>>,
    Path(id): Path<String>,
    axum::Json(body): axum::Json<ClusterActivation>,
) -> Response
where
    S: KeyValueStore + 'static,
{
    let id = EntityId(id);
    found("cluster", &id, service.set_cluster_active(&id, body.is_active))
}

pub(crate) async fn delete_cluster_handler<S>(
    State(service): State<Arc<FleetService<S>>>,
    Path(id): Path<String>,
) -> Response
where
    S: KeyValueStore + 'static,
{
    let id = EntityId(id);
    removed("cluster", &id, service.delete_cluster(&id))
}

fn created<T: Serialize>(outcome: Result<T, FleetServiceError>) -> Response {
    match outcome {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(err) => service_error(err),
    }
}

fn found<T: Serialize>(
    kind: &str,
    id: &EntityId,
    outcome: Result<Option<T>, FleetServiceError>,
) -> Response {
    match outcome {
        Ok(Some(record)) => (StatusCode::OK, axum::Json(record)).into_response(),
        Ok(None) => not_found(kind, id),
        Err(err) => service_error(err),
    }
}

fn removed(kind: &str, id: &EntityId, outcome: Result<bool, FleetServiceError>) -> Response {
    match outcome {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => not_found(kind, id),
        Err(err) => service_error(err),
    }
}

fn not_found(kind: &str, id: &EntityId) -> Response {
    let payload = json!({
        "error": format!("{kind} not found"),
        "id": id,
    });
    (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
}

fn service_error(err: FleetServiceError) -> Response {
    match err {
        FleetServiceError::InvalidRecord(reason) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, reason)
        }
        other => {
            error!(error = %other, "fleet operation failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, axum::Json(json!({ "error": message }))).into_response()
}
