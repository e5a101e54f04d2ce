//! End-to-end tests over the SQLite store:
//! 1. A seeded store audits to the expected matrices, tallies and findings
//! 2. Metrics and findings actually land in the audit database
//! 3. Re-running the same window is bit-identical
//! 4. Window filtering, disabled rules and unavailable views behave

use chrono::NaiveDate;
use controltower_core::{
    config::AuditConfig,
    engine::AuditEngine,
    error::AuditError,
    store::{AuditStore, ReceivableRow, SalesOrderRow, ShippingLogRow},
    types::{RuleType, Window},
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).expect("valid date")
}

fn order(
    store: &AuditStore,
    id: &str,
    order_date: NaiveDate,
    ship_date: NaiveDate,
    sales: f64,
    profit: f64,
    status: &str,
    country: Option<&str>,
) {
    store
        .insert_sales_order(&SalesOrderRow {
            order_id: Some(id.to_string()),
            order_date: Some(order_date),
            sales: Some(sales),
            profit: Some(profit),
            order_status: Some(status.to_string()),
            customer_country: country.map(|c| c.to_string()),
            ..Default::default()
        })
        .unwrap();
    store
        .insert_shipping_log(&ShippingLogRow {
            order_id: id.to_string(),
            shipping_date: Some(ship_date),
            shipping_mode: None,
        })
        .unwrap();
}

fn receivable(store: &AuditStore, id: &str, invoice_date: NaiveDate, amount: f64, status: &str) {
    store
        .insert_receivable(&ReceivableRow {
            order_id: Some(id.to_string()),
            invoice_date: Some(invoice_date),
            invoice_amount: Some(amount),
            payment_status: Some(status.to_string()),
            ..Default::default()
        })
        .unwrap();
}

/// A small ledger with one of everything:
/// confirmed timing fraud, borderline timing, clean orders, a deep loss,
/// an unbooked order, a mis-booked order, a cancelled order, a keyless row.
fn seeded_store() -> AuditStore {
    let store = AuditStore::in_memory().expect("in-memory store");
    store.migrate().expect("migrate");

    order(&store, "O-TP", d(2024, 1, 10), d(2024, 1, 1), 120.0, 12.0, "COMPLETE", None);
    order(&store, "O-FP", d(2024, 1, 10), d(2024, 1, 8), 80.0, 8.0, "COMPLETE", None);
    order(&store, "O-OK", d(2024, 1, 5), d(2024, 1, 9), 200.0, 20.0, "COMPLETE", Some("Germany"));
    order(&store, "O-LOSS", d(2024, 2, 1), d(2024, 2, 3), 300.0, -1500.0, "COMPLETE", Some("Brazil"));
    order(&store, "O-MISS", d(2024, 2, 10), d(2024, 2, 12), 150.0, 15.0, "COMPLETE", None);
    order(&store, "O-DIFF", d(2024, 3, 1), d(2024, 3, 2), 100.0, 10.0, "COMPLETE", Some("Brazil"));
    order(&store, "O-CANC", d(2024, 3, 5), d(2024, 3, 6), 50.0, 5.0, "CANCELLED", None);

    // A row the source system should never have produced: no order id.
    store
        .insert_sales_order(&SalesOrderRow {
            order_id: None,
            order_date: Some(d(2024, 3, 9)),
            sales: Some(10.0),
            profit: Some(1.0),
            order_status: Some("COMPLETE".to_string()),
            ..Default::default()
        })
        .unwrap();

    receivable(&store, "O-TP", d(2024, 1, 10), 120.0, "Paid");
    receivable(&store, "O-FP", d(2024, 1, 10), 80.0, "Paid");
    receivable(&store, "O-OK", d(2024, 1, 5), 200.0, "Outstanding");
    receivable(&store, "O-LOSS", d(2024, 2, 1), 300.0, "Paid");
    receivable(&store, "O-DIFF", d(2024, 3, 1), 90.0, "Paid");
    receivable(&store, "O-CANC", d(2024, 3, 5), 50.0, "Paid");

    store
}

// ─────────────────────────────────────────────────────────────────────────────
// Full audit over the seeded ledger
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn full_audit_produces_expected_matrices_and_tallies() {
    let store = seeded_store();
    let engine = AuditEngine::new(AuditConfig::standard(), &store, &store).unwrap();

    let report = engine.run_full_audit(&Window::open()).unwrap();

    assert_eq!(report.metrics.len(), 2, "timing + margin evaluate");
    let timing = report
        .metrics
        .iter()
        .find(|m| m.rule_type == RuleType::TimingFraud)
        .unwrap();
    assert_eq!(
        (timing.matrix.tp, timing.matrix.fp, timing.matrix.tn, timing.matrix.fn_),
        (1, 1, 4, 0)
    );
    assert_eq!(timing.unprocessable, 1, "the keyless row");

    let margin = report
        .metrics
        .iter()
        .find(|m| m.rule_type == RuleType::NegativeMargin)
        .unwrap();
    assert_eq!(
        (margin.matrix.tp, margin.matrix.fp, margin.matrix.tn, margin.matrix.fn_),
        (1, 0, 5, 0)
    );

    let recon = &report.reconciliation;
    assert_eq!(recon.source_considered, 6);
    assert_eq!(recon.matched, 4);
    assert_eq!(recon.missing_counterparty, 1);
    assert_eq!(recon.amount_mismatch, 1);
    assert_eq!(
        recon.matched + recon.missing_counterparty + recon.amount_mismatch,
        recon.source_considered
    );
    assert_eq!(recon.source_unprocessable, 1);
    assert_eq!(recon.timing_findings.len(), 2);
    assert_eq!(recon.margin_findings.len(), 1);
    assert!((recon.margin_stats.total_loss - 1500.0).abs() < 1e-9);
}

#[test]
fn full_audit_appends_to_the_audit_database() {
    let store = seeded_store();
    let engine = AuditEngine::new(AuditConfig::standard(), &store, &store).unwrap();
    engine.run_full_audit(&Window::open()).unwrap();

    assert_eq!(store.metrics_row_count().unwrap(), 2);
    // 1 missing + 1 mismatch + 2 timing + 1 margin.
    assert_eq!(store.audit_log_count().unwrap(), 5);
    assert_eq!(store.audit_log_count_for_action("RECON_MISSING_AR").unwrap(), 1);
    assert_eq!(store.audit_log_count_for_action("RECON_AMOUNT_MISMATCH").unwrap(), 1);

    let timing = store.audit_log_entities("SC_TIMING_FRAUD").unwrap();
    assert_eq!(
        timing,
        vec![
            ("O-FP".to_string(), "CRITICAL".to_string()),
            ("O-TP".to_string(), "CRITICAL".to_string()),
        ]
    );
    let margin = store.audit_log_entities("SC_NEGATIVE_MARGIN").unwrap();
    assert_eq!(margin, vec![("O-LOSS".to_string(), "CRITICAL".to_string())]);
}

#[test]
fn statements_aggregate_monthly_and_regional() {
    let store = seeded_store();
    let engine = AuditEngine::new(AuditConfig::standard(), &store, &store).unwrap();
    let report = engine.run_full_audit(&Window::open()).unwrap();

    let january = report
        .statements
        .monthly
        .iter()
        .find(|m| m.month == "2024-01")
        .expect("January row");
    assert_eq!(january.orders, 3);
    assert!((january.revenue - 400.0).abs() < 1e-9);
    assert!((january.net_profit - 40.0).abs() < 1e-9);

    // Germany (+20) outranks Brazil (-1490).
    let regions: Vec<&str> = report
        .statements
        .regional
        .iter()
        .map(|r| r.region.as_str())
        .collect();
    assert_eq!(regions, ["Germany", "Brazil"]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Determinism and windowing
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn rerunning_the_same_window_is_bit_identical() {
    let store = seeded_store();
    let engine = AuditEngine::new(AuditConfig::standard(), &store, &store).unwrap();
    let window = Window::open();

    let first = engine.reconcile(&window).unwrap();
    let second = engine.reconcile(&window).unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );

    let metrics_a = engine.evaluate_all_rules(&window).unwrap();
    let metrics_b = engine.evaluate_all_rules(&window).unwrap();
    assert_eq!(
        serde_json::to_string(&metrics_a).unwrap(),
        serde_json::to_string(&metrics_b).unwrap()
    );
}

#[test]
fn window_restricts_the_snapshot() {
    let store = seeded_store();
    let engine = AuditEngine::new(AuditConfig::standard(), &store, &store).unwrap();

    let feb_onward = Window::new(d(2024, 2, 1), d(2024, 3, 31));
    let report = engine.reconcile(&feb_onward).unwrap();
    // Only O-LOSS, O-MISS and O-DIFF fall in the window (O-CANC is excluded).
    assert_eq!(report.source_considered, 3);
    assert_eq!(report.period, "2024-02-01 to 2024-03-31");

    let metrics = engine.evaluate_all_rules(&feb_onward).unwrap();
    for m in &metrics {
        assert_eq!(m.matrix.total(), 3, "rule {} sees the windowed set", m.rule_type);
    }
}

#[test]
fn empty_window_yields_zero_metrics_without_error() {
    let store = seeded_store();
    let engine = AuditEngine::new(AuditConfig::standard(), &store, &store).unwrap();

    let far_future = Window::new(d(2030, 1, 1), d(2030, 12, 31));
    let metrics = engine.evaluate_all_rules(&far_future).unwrap();
    assert_eq!(metrics.len(), 2);
    for m in metrics {
        assert_eq!(m.matrix.total(), 0);
        assert_eq!(m.precision(), 0.0);
        assert_eq!(m.accuracy(), 0.0);
    }

    let recon = engine.reconcile(&far_future).unwrap();
    assert_eq!(recon.source_considered, 0);
    assert_eq!(recon.matched, 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration behaviour
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn disabled_rules_are_skipped_in_batch_evaluation() {
    let store = seeded_store();
    let mut config = AuditConfig::standard();
    for threshold in &mut config.thresholds {
        if threshold.rule_type == RuleType::NegativeMargin {
            threshold.enabled = false;
        }
    }
    let engine = AuditEngine::new(config, &store, &store).unwrap();

    let metrics = engine.evaluate_all_rules(&Window::open()).unwrap();
    assert_eq!(metrics.len(), 1);
    assert_eq!(metrics[0].rule_type, RuleType::TimingFraud);
}

#[test]
fn config_file_overrides_and_defaults() {
    let path = std::env::temp_dir().join("controltower_config_test.json");
    std::fs::write(
        &path,
        r#"{
            "amount_tolerance": 0.05,
            "heuristic": { "early_ship_days": 14, "loss_floor": -500.0 },
            "exclusion_statuses": ["VOID"]
        }"#,
    )
    .unwrap();

    let config = AuditConfig::load(path.to_str().unwrap()).unwrap();
    assert!((config.amount_tolerance - 0.05).abs() < 1e-12);
    assert_eq!(config.heuristic.early_ship_days, 14);
    assert_eq!(config.exclusion_statuses, vec!["VOID".to_string()]);
    // Rules not given in the file: the standard table stays.
    assert_eq!(config.thresholds.len(), 4);

    std::fs::remove_file(&path).ok();
}

// ─────────────────────────────────────────────────────────────────────────────
// Failure propagation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn missing_view_surfaces_data_unavailable() {
    // No migrate(): the operations tables do not exist.
    let store = AuditStore::in_memory().unwrap();
    let engine = AuditEngine::new(AuditConfig::standard(), &store, &store).unwrap();

    let err = engine.evaluate_all_rules(&Window::open()).unwrap_err();
    match err {
        AuditError::DataUnavailable { view, .. } => assert_eq!(view, "operations"),
        other => panic!("expected DataUnavailable, got {other}"),
    }
}
