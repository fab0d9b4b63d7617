use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn_span;

use super::evaluator::{AlertPolicy, AlertSeverity, DocumentEvaluator};
use crate::fleet::domain::{
    Document, DocumentKind, DocumentStatus, Driver, EntityId, Vehicle,
};

/// Number of alerts a dashboard digest shows before collapsing the rest.
pub const DEFAULT_DIGEST_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectType {
    Driver,
    Vehicle,
}

impl SubjectType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Driver => "driver",
            Self::Vehicle => "vehicle",
        }
    }
}

/// Anything carrying a fixed set of compliance documents.
pub trait DocumentHolder {
    fn subject_type(&self) -> SubjectType;
    fn subject_id(&self) -> &EntityId;
    fn subject_name(&self) -> &str;
    fn documents(&self) -> Vec<(DocumentKind, &Document)>;
}

impl DocumentHolder for Driver {
    fn subject_type(&self) -> SubjectType {
        SubjectType::Driver
    }

    fn subject_id(&self) -> &EntityId {
        &self.id
    }

    fn subject_name(&self) -> &str {
        &self.name
    }

    fn documents(&self) -> Vec<(DocumentKind, &Document)> {
        self.documents.entries().to_vec()
    }
}

impl DocumentHolder for Vehicle {
    fn subject_type(&self) -> SubjectType {
        SubjectType::Vehicle
    }

    fn subject_id(&self) -> &EntityId {
        &self.id
    }

    fn subject_name(&self) -> &str {
        &self.number
    }

    fn documents(&self) -> Vec<(DocumentKind, &Document)> {
        self.documents.entries().to_vec()
    }
}

/// Derived signal that a document needs attention. Recomputed on every pass, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAlert {
    pub id: String,
    pub subject_type: SubjectType,
    pub subject_id: EntityId,
    pub subject_name: String,
    pub document: DocumentKind,
    /// Declared status escalated by the expiry date.
    pub status: DocumentStatus,
    pub expiry: Option<NaiveDate>,
    pub days_until_expiry: Option<i64>,
    pub severity: AlertSeverity,
    pub message: String,
}

impl DocumentAlert {
    pub fn headline(&self) -> String {
        format!("{} - {}", self.subject_name, self.document.label())
    }

    fn sort_key(&self) -> (bool, i64) {
        match self.days_until_expiry {
            Some(days) => (false, days),
            None => (true, 0),
        }
    }
}

/// Bounded view over a sorted alert list that keeps the true total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertDigest {
    pub total: usize,
    pub shown: Vec<DocumentAlert>,
    pub remaining: usize,
}

impl AlertDigest {
    pub fn from_alerts(alerts: Vec<DocumentAlert>, limit: usize) -> Self {
        let total = alerts.len();
        let shown: Vec<_> = alerts.into_iter().take(limit).collect();
        let remaining = total - shown.len();
        Self {
            total,
            shown,
            remaining,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlertAggregator {
    evaluator: DocumentEvaluator,
}

impl AlertAggregator {
    pub fn new(policy: AlertPolicy) -> Self {
        Self {
            evaluator: DocumentEvaluator::new(policy),
        }
    }

    pub fn evaluator(&self) -> &DocumentEvaluator {
        &self.evaluator
    }

    /// Scan every driver and vehicle document and return the qualifying alerts, most urgent
    /// first. Alerts without an expiry date follow all dated alerts in scan order.
    pub fn collect(
        &self,
        drivers: &[Driver],
        vehicles: &[Vehicle],
        today: NaiveDate,
    ) -> Vec<DocumentAlert> {
        let mut alerts = Vec::new();
        self.scan(drivers, today, &mut alerts);
        self.scan(vehicles, today, &mut alerts);
        alerts.sort_by_key(DocumentAlert::sort_key);
        alerts
    }

    fn scan<H: DocumentHolder>(
        &self,
        holders: &[H],
        today: NaiveDate,
        alerts: &mut Vec<DocumentAlert>,
    ) {
        for holder in holders {
            for (kind, document) in holder.documents() {
                let _span = warn_span!(
                    "document",
                    subject = holder.subject_type().as_str(),
                    id = %holder.subject_id(),
                    document = kind.label()
                )
                .entered();
                let Some(classification) = self.evaluator.evaluate(document, today) else {
                    continue;
                };

                alerts.push(DocumentAlert {
                    id: format!(
                        "{}-{}-{}",
                        holder.subject_type().as_str(),
                        holder.subject_id(),
                        kind.label()
                    ),
                    subject_type: holder.subject_type(),
                    subject_id: holder.subject_id().clone(),
                    subject_name: holder.subject_name().to_string(),
                    document: kind,
                    status: self.evaluator.effective_status(document, today),
                    expiry: classification.expiry,
                    days_until_expiry: classification.days_until_expiry,
                    severity: classification.severity,
                    message: classification.message,
                });
            }
        }
    }
}

/// Collect alerts using the default 30/7 day policy.
pub fn collect_alerts(
    drivers: &[Driver],
    vehicles: &[Vehicle],
    today: NaiveDate,
) -> Vec<DocumentAlert> {
    AlertAggregator::default().collect(drivers, vehicles, today)
}

/// A document that is not verified once its expiry date is taken into account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceIssue {
    pub subject_type: SubjectType,
    pub subject_id: EntityId,
    pub subject_name: String,
    pub document: DocumentKind,
    pub status: DocumentStatus,
    pub declared_status: DocumentStatus,
    pub expiry: Option<String>,
}

impl AlertAggregator {
    /// Every document whose effective status as of `today` is not verified, in holder order.
    pub fn compliance_issues<H: DocumentHolder>(
        &self,
        holders: &[H],
        today: NaiveDate,
    ) -> Vec<ComplianceIssue> {
        let mut issues = Vec::new();
        for holder in holders {
            for (kind, document) in holder.documents() {
                let status = self.evaluator.effective_status(document, today);
                if status == DocumentStatus::Verified {
                    continue;
                }

                issues.push(ComplianceIssue {
                    subject_type: holder.subject_type(),
                    subject_id: holder.subject_id().clone(),
                    subject_name: holder.subject_name().to_string(),
                    document: kind,
                    status,
                    declared_status: document.status,
                    expiry: document.expiry.clone(),
                });
            }
        }
        issues
    }
}

/// Compliance issues under the default 30/7 day policy.
pub fn compliance_issues<H: DocumentHolder>(
    holders: &[H],
    today: NaiveDate,
) -> Vec<ComplianceIssue> {
    AlertAggregator::default().compliance_issues(holders, today)
}
