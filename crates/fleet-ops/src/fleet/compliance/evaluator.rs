use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::AlertConfig;
use crate::fleet::domain::{Document, DocumentStatus, InvalidDate};

pub const DEFAULT_ALERT_WINDOW_DAYS: i64 = 30;
pub const DEFAULT_CRITICAL_WINDOW_DAYS: i64 = 7;

/// Thresholds deciding which documents raise alerts and how urgent they are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertPolicy {
    alert_window_days: i64,
    critical_window_days: i64,
}

impl AlertPolicy {
    /// Negative windows fall back to the defaults and the critical window never exceeds the
    /// alert window.
    pub fn new(alert_window_days: i64, critical_window_days: i64) -> Self {
        let alert_window_days = if alert_window_days >= 0 {
            alert_window_days
        } else {
            DEFAULT_ALERT_WINDOW_DAYS
        };
        let critical_window_days = if critical_window_days >= 0 {
            critical_window_days
        } else {
            DEFAULT_CRITICAL_WINDOW_DAYS
        };

        Self {
            alert_window_days,
            critical_window_days: critical_window_days.min(alert_window_days),
        }
    }

    pub fn alert_window_days(&self) -> i64 {
        self.alert_window_days
    }

    pub fn critical_window_days(&self) -> i64 {
        self.critical_window_days
    }
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ALERT_WINDOW_DAYS, DEFAULT_CRITICAL_WINDOW_DAYS)
    }
}

impl From<&AlertConfig> for AlertPolicy {
    fn from(config: &AlertConfig) -> Self {
        Self::new(config.alert_window_days, config.critical_window_days)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Expired,
    Critical,
    Warning,
}

impl AlertSeverity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Expired => "Expired",
            Self::Critical => "Critical",
            Self::Warning => "Warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertClassification {
    pub expiry: Option<NaiveDate>,
    pub days_until_expiry: Option<i64>,
    pub severity: AlertSeverity,
    pub message: String,
}

/// Outcome of checking one document against a reference date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assessment {
    Clear,
    Alert(AlertClassification),
    Unclassifiable(InvalidDate),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentEvaluator {
    policy: AlertPolicy,
}

impl DocumentEvaluator {
    pub fn new(policy: AlertPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> AlertPolicy {
        self.policy
    }

    pub fn assess(&self, document: &Document, today: NaiveDate) -> Assessment {
        let expiry = match document.expiry_date() {
            Ok(expiry) => expiry,
            Err(err) => return Assessment::Unclassifiable(err),
        };
        let days = expiry.map(|expiry| days_until(expiry, today));

        let within_window = days.is_some_and(|days| days <= self.policy.alert_window_days);
        if !within_window && !document.status.forces_alert() {
            return Assessment::Clear;
        }

        Assessment::Alert(AlertClassification {
            expiry,
            days_until_expiry: days,
            severity: self.severity(document.status, days),
            message: expiry_message(document.status, days),
        })
    }

    /// Classify a document, logging and dropping documents whose expiry cannot be read.
    pub fn evaluate(&self, document: &Document, today: NaiveDate) -> Option<AlertClassification> {
        match self.assess(document, today) {
            Assessment::Alert(classification) => Some(classification),
            Assessment::Clear => None,
            Assessment::Unclassifiable(err) => {
                warn!(error = %err, "document expiry unreadable; excluded from alerts");
                None
            }
        }
    }

    pub fn severity(&self, status: DocumentStatus, days: Option<i64>) -> AlertSeverity {
        if status == DocumentStatus::Expired || days.is_some_and(|days| days < 0) {
            AlertSeverity::Expired
        } else if days.is_some_and(|days| days <= self.policy.critical_window_days) {
            AlertSeverity::Critical
        } else {
            AlertSeverity::Warning
        }
    }

    /// Merge the declared status with what the expiry date says. The date can escalate a
    /// document (to expiring or expired) but never clears a declared expiring/expired status.
    pub fn effective_status(&self, document: &Document, today: NaiveDate) -> DocumentStatus {
        let Ok(Some(expiry)) = document.expiry_date() else {
            return document.status;
        };

        let days = days_until(expiry, today);
        match document.status {
            DocumentStatus::Expired => DocumentStatus::Expired,
            _ if days < 0 => DocumentStatus::Expired,
            DocumentStatus::Verified if days <= self.policy.alert_window_days => {
                DocumentStatus::Expiring
            }
            status => status,
        }
    }
}

/// Whole days from `today` until `expiry`; negative once the date has passed.
pub fn days_until(expiry: NaiveDate, today: NaiveDate) -> i64 {
    (expiry - today).num_days()
}

pub fn expiry_message(status: DocumentStatus, days: Option<i64>) -> String {
    match days {
        Some(days) if days < 0 => format!("expired {} days ago", days.unsigned_abs()),
        Some(0) => "expires today".to_string(),
        Some(days) => format!("expires in {days} days"),
        None => format!("marked {}, no expiry date on file", status.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::domain::Document;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn alert(assessment: Assessment) -> AlertClassification {
        match assessment {
            Assessment::Alert(classification) => classification,
            other => panic!("expected alert, got {other:?}"),
        }
    }

    #[test]
    fn verified_document_five_days_out_is_critical() {
        let evaluator = DocumentEvaluator::default();
        let document = Document::new(DocumentStatus::Verified, Some("2024-01-15"));

        let classification = alert(evaluator.assess(&document, date(2024, 1, 10)));
        assert_eq!(classification.days_until_expiry, Some(5));
        assert_eq!(classification.severity, AlertSeverity::Critical);
        assert_eq!(classification.message, "expires in 5 days");
    }

    #[test]
    fn expired_document_reports_days_elapsed() {
        let evaluator = DocumentEvaluator::default();
        let document = Document::new(DocumentStatus::Expired, Some("2024-01-01"));

        let classification = alert(evaluator.assess(&document, date(2024, 1, 20)));
        assert_eq!(classification.days_until_expiry, Some(-19));
        assert_eq!(classification.severity, AlertSeverity::Expired);
        assert_eq!(classification.message, "expired 19 days ago");
    }

    #[test]
    fn window_boundary_is_inclusive() {
        let evaluator = DocumentEvaluator::default();
        let today = date(2024, 3, 1);
        let at_window = Document::new(DocumentStatus::Verified, Some("2024-03-31"));
        let past_window = Document::new(DocumentStatus::Verified, Some("2024-04-01"));

        let classification = alert(evaluator.assess(&at_window, today));
        assert_eq!(classification.days_until_expiry, Some(30));
        assert_eq!(classification.severity, AlertSeverity::Warning);
        assert_eq!(evaluator.assess(&past_window, today), Assessment::Clear);
    }

    #[test]
    fn status_forces_alert_beyond_window() {
        let evaluator = DocumentEvaluator::default();
        let today = date(2024, 1, 1);

        let expired = Document::new(DocumentStatus::Expired, Some("2026-01-01"));
        let classification = alert(evaluator.assess(&expired, today));
        assert_eq!(classification.severity, AlertSeverity::Expired);

        let expiring = Document::new(DocumentStatus::Expiring, Some("2025-01-01"));
        let classification = alert(evaluator.assess(&expiring, today));
        assert_eq!(classification.severity, AlertSeverity::Warning);
    }

    #[test]
    fn undated_documents_only_alert_on_status() {
        let evaluator = DocumentEvaluator::default();
        let today = date(2024, 1, 1);

        let verified = Document::new(DocumentStatus::Verified, None);
        assert_eq!(evaluator.assess(&verified, today), Assessment::Clear);

        let expired = Document::new(DocumentStatus::Expired, None);
        let classification = alert(evaluator.assess(&expired, today));
        assert_eq!(classification.days_until_expiry, None);
        assert_eq!(classification.severity, AlertSeverity::Expired);
        assert_eq!(
            classification.message,
            "marked expired, no expiry date on file"
        );
    }

    #[test]
    fn expiry_today_has_dedicated_message() {
        assert_eq!(
            expiry_message(DocumentStatus::Verified, Some(0)),
            "expires today"
        );
    }

    #[test]
    fn malformed_expiry_is_unclassifiable() {
        let evaluator = DocumentEvaluator::default();
        let document = Document::new(DocumentStatus::Expired, Some("31/12/2024"));

        assert!(matches!(
            evaluator.assess(&document, date(2024, 1, 1)),
            Assessment::Unclassifiable(_)
        ));
        assert!(evaluator.evaluate(&document, date(2024, 1, 1)).is_none());
    }

    #[test]
    fn policy_sanitizes_windows() {
        let policy = AlertPolicy::new(-1, 45);
        assert_eq!(policy.alert_window_days(), DEFAULT_ALERT_WINDOW_DAYS);
        assert_eq!(policy.critical_window_days(), DEFAULT_ALERT_WINDOW_DAYS);

        let narrow = AlertPolicy::new(14, 3);
        let evaluator = DocumentEvaluator::new(narrow);
        let document = Document::new(DocumentStatus::Verified, Some("2024-01-20"));
        assert_eq!(
            evaluator.assess(&document, date(2024, 1, 1)),
            Assessment::Clear
        );
    }

    #[test]
    fn effective_status_escalates_from_expiry() {
        let evaluator = DocumentEvaluator::default();
        let today = date(2024, 1, 10);

        let lapsed = Document::new(DocumentStatus::Verified, Some("2024-01-01"));
        assert_eq!(
            evaluator.effective_status(&lapsed, today),
            DocumentStatus::Expired
        );

        let soon = Document::new(DocumentStatus::Verified, Some("2024-01-25"));
        assert_eq!(
            evaluator.effective_status(&soon, today),
            DocumentStatus::Expiring
        );

        let pending = Document::new(DocumentStatus::Pending, Some("2024-01-25"));
        assert_eq!(
            evaluator.effective_status(&pending, today),
            DocumentStatus::Pending
        );

        let undated = Document::new(DocumentStatus::Expiring, None);
        assert_eq!(
            evaluator.effective_status(&undated, today),
            DocumentStatus::Expiring
        );
    }
}
