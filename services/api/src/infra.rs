use chrono::NaiveDate;
use fleet_ops::config::AppConfig;
use fleet_ops::error::AppError;
use fleet_ops::fleet::{AlertPolicy, FleetService, StoreBackend};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Open the configured store and seed any collection that has never been written.
pub(crate) fn build_service(config: &AppConfig) -> Result<FleetService<StoreBackend>, AppError> {
    let backend = StoreBackend::from_config(&config.storage)?;
    let description = backend.describe();
    let service = FleetService::new(backend, AlertPolicy::from(&config.alerts));

    if config.storage.seed_demo {
        service.seed_demo_data()?;
    }

    info!(
        store = %description,
        alert_window_days = config.alerts.alert_window_days,
        critical_window_days = config.alerts.critical_window_days,
        "fleet store opened"
    );
    Ok(service)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
