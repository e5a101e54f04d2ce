//! The audit engine — wires screening, rule evaluation, reconciliation and
//! the business-analysis statements together, and appends the results to the
//! audit sink.
//!
//! RULES:
//!   - Every batch call closes over its own record snapshot; nothing is
//!     cached or mutated between calls, so re-running a window over the same
//!     data is bit-identical.
//!   - Configuration and I/O failures propagate unchanged. A call returns a
//!     complete result or an error — never a silent partial.
//!   - Per-record data problems are screened out and counted, never raised.

use crate::{
    config::AuditConfig,
    error::AuditResult,
    evaluator::{RuleEvaluator, RuleSpec},
    metrics::RulePerformanceMetrics,
    provider::RecordProvider,
    reconciliation::{ReconciliationEngine, ReconciliationReport},
    record::{screen_finance, screen_operations, FinanceRecord, OperationsRecord, Screened},
    sink::{AuditSink, FindingRow, MetricsRow},
    statements::{self, FinancialStatements},
    thresholds::ThresholdRegistry,
    types::Window,
};

/// Everything one full audit run produced.
#[derive(Debug, Clone)]
pub struct AuditReport {
    pub period: String,
    pub metrics: Vec<RulePerformanceMetrics>,
    pub reconciliation: ReconciliationReport,
    pub statements: FinancialStatements,
}

pub struct AuditEngine<'a> {
    config: AuditConfig,
    registry: ThresholdRegistry,
    evaluator: RuleEvaluator,
    reconciler: ReconciliationEngine,
    provider: &'a dyn RecordProvider,
    sink: &'a dyn AuditSink,
}

impl<'a> AuditEngine<'a> {
    /// Build a fully wired engine. Fails fast on a malformed threshold
    /// table; nothing is fetched yet.
    pub fn new(
        config: AuditConfig,
        provider: &'a dyn RecordProvider,
        sink: &'a dyn AuditSink,
    ) -> AuditResult<Self> {
        let registry = ThresholdRegistry::new(config.thresholds.clone())?;
        let evaluator = RuleEvaluator::new(config.heuristic);
        let reconciler =
            ReconciliationEngine::new(config.amount_tolerance, config.worst_offender_count);
        Ok(Self {
            config,
            registry,
            evaluator,
            reconciler,
            provider,
            sink,
        })
    }

    pub fn registry(&self) -> &ThresholdRegistry {
        &self.registry
    }

    /// Evaluate every enabled, implemented rule over the window.
    pub fn evaluate_all_rules(&self, window: &Window) -> AuditResult<Vec<RulePerformanceMetrics>> {
        let ops = self.screened_operations(window)?;
        Ok(self.evaluate_screened(&ops, &window.period_label()))
    }

    /// Reconcile the operations view against the finance view over the
    /// window and run the compliance checks.
    pub fn reconcile(&self, window: &Window) -> AuditResult<ReconciliationReport> {
        let ops = self.screened_operations(window)?;
        let fin = self.screened_finance(window)?;
        Ok(self
            .reconciler
            .reconcile(&ops, &fin, &self.registry, &window.period_label()))
    }

    /// Run the full batch: rule metrics, reconciliation, statements; append
    /// metrics and findings to the sink; return everything.
    pub fn run_full_audit(&self, window: &Window) -> AuditResult<AuditReport> {
        let period = window.period_label();
        log::info!("audit batch starting, period={period}");

        // One snapshot feeds all three stages.
        let ops = self.screened_operations(window)?;
        let fin = self.screened_finance(window)?;

        let metrics = self.evaluate_screened(&ops, &period);
        let reconciliation = self
            .reconciler
            .reconcile(&ops, &fin, &self.registry, &period);
        let statements = statements::compute(&ops.records);

        let metric_rows = metrics
            .iter()
            .map(|m| {
                let snapshot = self
                    .registry
                    .get(m.rule_type)
                    .and_then(|cfg| serde_json::to_string(cfg).ok());
                MetricsRow::from_metrics(m, snapshot)
            })
            .collect::<Vec<_>>();
        self.sink.append_metrics(&metric_rows)?;

        let finding_rows = reconciliation
            .findings()
            .iter()
            .map(FindingRow::from)
            .collect::<Vec<_>>();
        self.sink.append_findings(&finding_rows)?;

        log::info!(
            "audit batch complete, period={period}: {} metric rows, {} findings",
            metric_rows.len(),
            finding_rows.len()
        );

        Ok(AuditReport {
            period,
            metrics,
            reconciliation,
            statements,
        })
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn screened_operations(&self, window: &Window) -> AuditResult<Screened<OperationsRecord>> {
        let rows = self.provider.operations_rows(window)?;
        Ok(screen_operations(rows, &self.config.status_filter()))
    }

    fn screened_finance(&self, window: &Window) -> AuditResult<Screened<FinanceRecord>> {
        let rows = self.provider.finance_rows(window)?;
        Ok(screen_finance(rows, &self.config.status_filter()))
    }

    fn evaluate_screened(
        &self,
        ops: &Screened<OperationsRecord>,
        period: &str,
    ) -> Vec<RulePerformanceMetrics> {
        self.registry
            .configs()
            .iter()
            .filter(|cfg| cfg.enabled)
            .filter_map(|cfg| RuleSpec::for_rule(cfg.rule_type))
            .map(|spec| self.evaluator.evaluate(&spec, ops, period))
            .collect()
    }
}
