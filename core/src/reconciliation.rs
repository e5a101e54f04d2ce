//! Cross-ledger reconciliation — operations (shipped orders, the source of
//! truth for revenue) against finance (booked receivables) — plus the two
//! supply-chain compliance checks that run on the source records directly.
//!
//! Classification semantics are fixed for audit reproducibility:
//!   - no counterparty row        → missing_counterparty, HIGH
//!     (value recognised on one side only: unrecorded revenue)
//!   - |sales - invoice| > tol    → amount_mismatch, MEDIUM, signed delta
//!   - otherwise                  → matched
//! Every screened source record lands in exactly one bucket.

use crate::{
    record::{FinanceRecord, OperationsRecord, Screened},
    thresholds::ThresholdRegistry,
    types::{EntityId, RuleType, Severity},
};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

// Rule codes written verbatim to the audit log.
pub const RECON_MISSING_AR: &str = "RECON_MISSING_AR";
pub const RECON_AMOUNT_MISMATCH: &str = "RECON_AMOUNT_MISMATCH";
pub const SC_TIMING_FRAUD: &str = "SC_TIMING_FRAUD";
pub const SC_NEGATIVE_MARGIN: &str = "SC_NEGATIVE_MARGIN";

/// How a source record failed reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BreakKind {
    MissingCounterparty,
    AmountMismatch { delta: f64 },
}

/// One reconciliation break, carrying enough context to audit it.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerBreak {
    pub order_id: EntityId,
    pub expected_revenue: f64,
    pub booked_revenue: Option<f64>,
    pub kind: BreakKind,
    pub severity: Severity,
}

/// One compliance finding, written verbatim to the audit sink.
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceFinding {
    pub rule_code: &'static str,
    pub entity_id: EntityId,
    pub severity: Severity,
    pub detail: String,
}

/// A loss-making order surfaced as a representative sample.
#[derive(Debug, Clone, Serialize)]
pub struct MarginOffender {
    pub order_id: EntityId,
    pub sales: f64,
    pub profit: f64,
    pub margin_pct: f64,
}

/// Aggregate view of the negative-margin findings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MarginStats {
    /// Absolute cumulative loss across all negative-margin orders.
    pub total_loss: f64,
    /// The N most negative orders, ascending by profit, ties broken by
    /// ascending order id.
    pub worst: Vec<MarginOffender>,
}

/// Full reconciliation output for one window.
/// Invariant: `matched + missing_counterparty + amount_mismatch ==
/// source_considered`.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationReport {
    pub period: String,
    pub source_considered: u64,
    pub counterparty_considered: u64,
    pub matched: u64,
    pub missing_counterparty: u64,
    pub amount_mismatch: u64,
    pub source_unprocessable: u64,
    pub counterparty_unprocessable: u64,
    pub breaks: Vec<LedgerBreak>,
    pub timing_findings: Vec<ComplianceFinding>,
    pub margin_findings: Vec<ComplianceFinding>,
    pub margin_stats: MarginStats,
}

impl ReconciliationReport {
    /// Every finding this run produced, reconciliation breaks included, in
    /// sink-ready form.
    pub fn findings(&self) -> Vec<ComplianceFinding> {
        let mut out: Vec<ComplianceFinding> = Vec::with_capacity(
            self.breaks.len() + self.timing_findings.len() + self.margin_findings.len(),
        );
        for b in &self.breaks {
            out.push(match b.kind {
                BreakKind::MissingCounterparty => ComplianceFinding {
                    rule_code: RECON_MISSING_AR,
                    entity_id: b.order_id.clone(),
                    severity: b.severity,
                    detail: format!(
                        "Order shipped but not booked in AR (expected ${:.2})",
                        b.expected_revenue
                    ),
                },
                BreakKind::AmountMismatch { delta } => ComplianceFinding {
                    rule_code: RECON_AMOUNT_MISMATCH,
                    entity_id: b.order_id.clone(),
                    severity: b.severity,
                    detail: format!(
                        "Sales ${:.2} differs from booked ${:.2} (delta ${:+.2})",
                        b.expected_revenue,
                        b.booked_revenue.unwrap_or(0.0),
                        delta
                    ),
                },
            });
        }
        out.extend(self.timing_findings.iter().cloned());
        out.extend(self.margin_findings.iter().cloned());
        out
    }
}

pub struct ReconciliationEngine {
    /// Absolute amount tolerance for the match test.
    tolerance: f64,
    /// How many worst negative-margin orders to surface.
    worst_offender_count: usize,
}

impl ReconciliationEngine {
    pub fn new(tolerance: f64, worst_offender_count: usize) -> Self {
        Self {
            tolerance,
            worst_offender_count,
        }
    }

    /// Reconcile the two screened views and run the compliance checks.
    pub fn reconcile(
        &self,
        ops: &Screened<OperationsRecord>,
        fin: &Screened<FinanceRecord>,
        registry: &ThresholdRegistry,
        period: &str,
    ) -> ReconciliationReport {
        let by_key: HashMap<&str, &FinanceRecord> = fin
            .records
            .iter()
            .map(|r| (r.order_id.as_str(), r))
            .collect();

        let mut matched = 0u64;
        let mut breaks: Vec<LedgerBreak> = Vec::new();

        for record in &ops.records {
            match by_key.get(record.order_id.as_str()) {
                None => breaks.push(LedgerBreak {
                    order_id: record.order_id.clone(),
                    expected_revenue: record.sales,
                    booked_revenue: None,
                    kind: BreakKind::MissingCounterparty,
                    severity: Severity::High,
                }),
                Some(fin_record) => {
                    let delta = record.sales - fin_record.invoice_amount;
                    if delta.abs() > self.tolerance {
                        breaks.push(LedgerBreak {
                            order_id: record.order_id.clone(),
                            expected_revenue: record.sales,
                            booked_revenue: Some(fin_record.invoice_amount),
                            kind: BreakKind::AmountMismatch { delta },
                            severity: Severity::Medium,
                        });
                    } else {
                        matched += 1;
                    }
                }
            }
        }

        let missing = breaks
            .iter()
            .filter(|b| matches!(b.kind, BreakKind::MissingCounterparty))
            .count() as u64;
        let mismatched = breaks.len() as u64 - missing;

        let timing_findings = self.check_timing(&ops.records, registry);
        let (margin_findings, margin_stats) = self.check_margin(&ops.records, registry);

        log::info!(
            "reconcile period={period}: source={} counterparty={} matched={matched} \
             missing={missing} mismatched={mismatched} timing={} margin={}",
            ops.records.len(),
            fin.records.len(),
            timing_findings.len(),
            margin_findings.len(),
        );

        ReconciliationReport {
            period: period.to_string(),
            source_considered: ops.records.len() as u64,
            counterparty_considered: fin.records.len() as u64,
            matched,
            missing_counterparty: missing,
            amount_mismatch: mismatched,
            source_unprocessable: ops.unprocessable,
            counterparty_unprocessable: fin.unprocessable,
            breaks,
            timing_findings,
            margin_findings,
            margin_stats,
        }
    }

    /// Timing check: shipping date earlier than order date. One finding per
    /// offending record, banded over the day offset (always CRITICAL under
    /// the standard bands).
    fn check_timing(
        &self,
        records: &[OperationsRecord],
        registry: &ThresholdRegistry,
    ) -> Vec<ComplianceFinding> {
        let mut findings = Vec::new();
        for r in records {
            let (Some(order), Some(ship)) = (r.order_date, r.shipping_date) else {
                continue;
            };
            if ship >= order {
                continue;
            }
            let offset_days = (ship - order).num_days();
            findings.push(ComplianceFinding {
                rule_code: SC_TIMING_FRAUD,
                entity_id: r.order_id.clone(),
                severity: registry.get_severity(RuleType::TimingFraud, offset_days as f64),
                detail: format!(
                    "Shipping Date < Order Date: shipped {} days before order (ordered {order}, shipped {ship})",
                    -offset_days
                ),
            });
        }
        findings
    }

    /// Margin check: loss-making orders. One finding per record, banded over
    /// the profit, plus the aggregate loss and the worst offenders.
    fn check_margin(
        &self,
        records: &[OperationsRecord],
        registry: &ThresholdRegistry,
    ) -> (Vec<ComplianceFinding>, MarginStats) {
        let mut findings = Vec::new();
        let mut offenders: Vec<MarginOffender> = Vec::new();
        let mut total_loss = 0.0f64;

        for r in records {
            if r.profit >= 0.0 {
                continue;
            }
            total_loss += -r.profit;
            let margin_pct = if r.sales > 0.0 {
                r.profit / r.sales * 100.0
            } else {
                0.0
            };
            findings.push(ComplianceFinding {
                rule_code: SC_NEGATIVE_MARGIN,
                entity_id: r.order_id.clone(),
                severity: registry.get_severity(RuleType::NegativeMargin, r.profit),
                detail: format!(
                    "Profit < 0 on active order: sales ${:.2}, profit ${:.2}, margin {margin_pct:.1}%",
                    r.sales, r.profit
                ),
            });
            offenders.push(MarginOffender {
                order_id: r.order_id.clone(),
                sales: r.sales,
                profit: r.profit,
                margin_pct,
            });
        }

        offenders.sort_by(|a, b| {
            a.profit
                .partial_cmp(&b.profit)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.order_id.cmp(&b.order_id))
        });
        offenders.truncate(self.worst_offender_count);

        (
            findings,
            MarginStats {
                total_loss,
                worst: offenders,
            },
        )
    }
}
