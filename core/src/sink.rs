//! The audit-sink contract and the flat row shapes written through it.
//!
//! The sink owns idempotent schema creation and timestamps rows at insert
//! time; the engine only appends and never reads back. Ratio values are
//! rounded to four decimals here — this is the reporting boundary.

use crate::{
    error::AuditResult,
    metrics::{round4, RulePerformanceMetrics},
    reconciliation::ComplianceFinding,
};
use serde::Serialize;

/// One rule-performance row, matching the `fraud_rule_metrics` table.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsRow {
    pub rule_type: String,
    pub period: String,
    pub true_positives: i64,
    pub false_positives: i64,
    pub true_negatives: i64,
    pub false_negatives: i64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub false_positive_rate: f64,
    pub false_negative_rate: f64,
    pub accuracy: f64,
    pub unprocessable: i64,
    /// JSON snapshot of the threshold config the rule ran with.
    pub threshold_config: Option<String>,
    pub notes: Option<String>,
}

impl MetricsRow {
    pub fn from_metrics(m: &RulePerformanceMetrics, threshold_config: Option<String>) -> Self {
        Self {
            rule_type: m.rule_type.to_string(),
            period: m.period.clone(),
            true_positives: m.matrix.tp as i64,
            false_positives: m.matrix.fp as i64,
            true_negatives: m.matrix.tn as i64,
            false_negatives: m.matrix.fn_ as i64,
            precision: round4(m.precision()),
            recall: round4(m.recall()),
            f1_score: round4(m.f1_score()),
            false_positive_rate: round4(m.false_positive_rate()),
            false_negative_rate: round4(m.false_negative_rate()),
            accuracy: round4(m.accuracy()),
            unprocessable: m.unprocessable as i64,
            threshold_config,
            notes: None,
        }
    }
}

/// One finding row, matching the `audit_logs` table.
#[derive(Debug, Clone, Serialize)]
pub struct FindingRow {
    pub entity_id: String,
    pub rule_code: String,
    pub severity: String,
    pub detail: String,
}

impl From<&ComplianceFinding> for FindingRow {
    fn from(f: &ComplianceFinding) -> Self {
        Self {
            entity_id: f.entity_id.clone(),
            rule_code: f.rule_code.to_string(),
            severity: f.severity.as_str().to_string(),
            detail: f.detail.clone(),
        }
    }
}

pub trait AuditSink {
    fn append_metrics(&self, rows: &[MetricsRow]) -> AuditResult<()>;

    fn append_findings(&self, rows: &[FindingRow]) -> AuditResult<()>;
}
