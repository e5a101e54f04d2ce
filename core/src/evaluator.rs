//! Rule evaluation — scores each detection rule's trigger decisions against
//! a heuristic ground truth and aggregates a confusion matrix.
//!
//! The "truth" label is a stricter cut on the same raw signal as the trigger
//! (e.g. trigger = shipped before ordered at all, truth = shipped more than
//! N days before ordered). It stands in for human-verified labels and
//! structurally inflates apparent precision near the boundary; the
//! parameters live in [`HeuristicParams`] so a real labelled set can replace
//! them without touching the matrix math. Known limitation, kept on purpose.
//!
//! RULE: adding a detection rule means adding one arm to [`RuleSpec::for_rule`]
//! — nothing else dispatches on the rule type.

use crate::{
    metrics::RulePerformanceMetrics,
    record::{OperationsRecord, Screened},
    types::RuleType,
};
use serde::{Deserialize, Serialize};

/// Tunable cutoffs for the heuristic truth labels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HeuristicParams {
    /// Days shipped-before-ordered beyond which timing fraud is "confirmed".
    pub early_ship_days: i64,
    /// Profit below which a negative margin is "confirmed" (a loss cutoff,
    /// so negative).
    pub loss_floor: f64,
}

impl Default for HeuristicParams {
    fn default() -> Self {
        Self {
            early_ship_days: 7,
            loss_floor: -1000.0,
        }
    }
}

/// A record-level predicate. `None` means the record lacks the fields this
/// rule needs and must be counted as unprocessable, not classified.
type Predicate = fn(&OperationsRecord, &HeuristicParams) -> Option<bool>;

/// One rule's pair of predicates: the live trigger condition and the
/// stricter heuristic-truth condition.
pub struct RuleSpec {
    pub rule_type: RuleType,
    triggered: Predicate,
    truth: Predicate,
}

impl RuleSpec {
    /// The single registration point for evaluable rules. Declared rule
    /// types without an entry here (amount/frequency/customer-risk) are
    /// placeholders: callers treat the `None` as a no-op, not an error.
    pub fn for_rule(rule_type: RuleType) -> Option<Self> {
        match rule_type {
            RuleType::TimingFraud => Some(Self {
                rule_type,
                triggered: timing_triggered,
                truth: timing_truth,
            }),
            RuleType::NegativeMargin => Some(Self {
                rule_type,
                triggered: margin_triggered,
                truth: margin_truth,
            }),
            RuleType::AmountAnomaly | RuleType::FrequencyAnomaly | RuleType::CustomerRisk => None,
        }
    }
}

// ── Timing fraud: shipping date earlier than order date ─────────────────────

fn timing_triggered(r: &OperationsRecord, _p: &HeuristicParams) -> Option<bool> {
    let (order, ship) = (r.order_date?, r.shipping_date?);
    Some(ship < order)
}

fn timing_truth(r: &OperationsRecord, p: &HeuristicParams) -> Option<bool> {
    let (order, ship) = (r.order_date?, r.shipping_date?);
    Some((order - ship).num_days() > p.early_ship_days)
}

// ── Negative margin: loss-making order ──────────────────────────────────────

fn margin_triggered(r: &OperationsRecord, _p: &HeuristicParams) -> Option<bool> {
    Some(r.profit < 0.0)
}

fn margin_truth(r: &OperationsRecord, p: &HeuristicParams) -> Option<bool> {
    Some(r.profit < p.loss_floor)
}

// ── Evaluator ───────────────────────────────────────────────────────────────

pub struct RuleEvaluator {
    heuristic: HeuristicParams,
}

impl RuleEvaluator {
    pub fn new(heuristic: HeuristicParams) -> Self {
        Self { heuristic }
    }

    /// Evaluate one rule over a screened record set. An empty set yields the
    /// all-zero matrix (and all-zero derived ratios downstream).
    pub fn evaluate(
        &self,
        spec: &RuleSpec,
        screened: &Screened<OperationsRecord>,
        period: &str,
    ) -> RulePerformanceMetrics {
        let mut out = RulePerformanceMetrics::empty(spec.rule_type, period.to_string());
        out.unprocessable = screened.unprocessable;

        for record in &screened.records {
            match (
                (spec.triggered)(record, &self.heuristic),
                (spec.truth)(record, &self.heuristic),
            ) {
                (Some(triggered), Some(truth)) => out.matrix.record(triggered, truth),
                _ => out.unprocessable += 1,
            }
        }

        log::debug!(
            "rule={} period={} tp={} fp={} tn={} fn={} unprocessable={}",
            spec.rule_type,
            out.period,
            out.matrix.tp,
            out.matrix.fp,
            out.matrix.tn,
            out.matrix.fn_,
            out.unprocessable
        );

        out
    }
}
