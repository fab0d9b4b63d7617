//! Document expiry alerting for drivers and vehicles.

mod alerts;
mod evaluator;

pub use alerts::{
    collect_alerts, compliance_issues, AlertAggregator, AlertDigest, ComplianceIssue,
    DocumentAlert, DocumentHolder, SubjectType, DEFAULT_DIGEST_LIMIT,
};
pub use evaluator::{
    days_until, expiry_message, AlertClassification, AlertPolicy, AlertSeverity, Assessment,
    DocumentEvaluator, DEFAULT_ALERT_WINDOW_DAYS, DEFAULT_CRITICAL_WINDOW_DAYS,
};
