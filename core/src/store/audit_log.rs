//! Audit-database persistence: rule metrics history and the finding log,
//! plus the `AuditSink` implementation. Append-only; rows are stamped by
//! the database at insert time.

use super::AuditStore;
use crate::{
    error::AuditResult,
    sink::{AuditSink, FindingRow, MetricsRow},
};
use rusqlite::params;

/// Fixed provenance columns for automated findings.
const AUDIT_TYPE: &str = "Automated";
const SOURCE_SYSTEM: &str = "Financial_Control_Tower";
const ENTITY_TYPE: &str = "Order";

impl AuditStore {
    fn append_metrics_row(&self, m: &MetricsRow) -> AuditResult<()> {
        self.audit().execute(
            "INSERT INTO fraud_rule_metrics
             (rule_type, evaluation_period,
              true_positives, false_positives, true_negatives, false_negatives,
              precision, recall, f1_score,
              false_positive_rate, false_negative_rate, accuracy,
              unprocessable, threshold_config, notes)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15)",
            params![
                m.rule_type,
                m.period,
                m.true_positives,
                m.false_positives,
                m.true_negatives,
                m.false_negatives,
                m.precision,
                m.recall,
                m.f1_score,
                m.false_positive_rate,
                m.false_negative_rate,
                m.accuracy,
                m.unprocessable,
                m.threshold_config,
                m.notes,
            ],
        )?;
        Ok(())
    }

    fn append_finding_row(&self, f: &FindingRow) -> AuditResult<()> {
        self.audit().execute(
            "INSERT INTO audit_logs
             (audit_type, source_system, entity_type, entity_id, action, notes, risk_level)
             VALUES (?1,?2,?3,?4,?5,?6,?7)",
            params![
                AUDIT_TYPE,
                SOURCE_SYSTEM,
                ENTITY_TYPE,
                f.entity_id,
                f.rule_code,
                f.detail,
                f.severity,
            ],
        )?;
        Ok(())
    }

    // ── Test and tooling helpers ────────────────────────────────────────

    pub fn metrics_row_count(&self) -> AuditResult<i64> {
        let count = self.audit().query_row(
            "SELECT COUNT(*) FROM fraud_rule_metrics",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn audit_log_count(&self) -> AuditResult<i64> {
        let count = self
            .audit()
            .query_row("SELECT COUNT(*) FROM audit_logs", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn audit_log_count_for_action(&self, action: &str) -> AuditResult<i64> {
        let count = self.audit().query_row(
            "SELECT COUNT(*) FROM audit_logs WHERE action = ?1",
            params![action],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// (entity_id, risk_level) pairs logged for an action, ordered by entity.
    pub fn audit_log_entities(&self, action: &str) -> AuditResult<Vec<(String, String)>> {
        let mut stmt = self.audit().prepare(
            "SELECT entity_id, risk_level FROM audit_logs
             WHERE action = ?1 ORDER BY entity_id",
        )?;
        let rows = stmt
            .query_map(params![action], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl AuditSink for AuditStore {
    fn append_metrics(&self, rows: &[MetricsRow]) -> AuditResult<()> {
        for row in rows {
            self.append_metrics_row(row)?;
        }
        Ok(())
    }

    fn append_findings(&self, rows: &[FindingRow]) -> AuditResult<()> {
        for row in rows {
            self.append_finding_row(row)?;
        }
        Ok(())
    }
}
