//! audit-runner: headless batch runner for the Financial Control Tower.
//!
//! Usage:
//!   audit-runner --data-dir ./data
//!   audit-runner --demo --demo-seed 42 --demo-orders 500
//!   audit-runner --start 2023-01-01 --end 2023-12-31 --config audit.json

mod demo;

use anyhow::Result;
use chrono::NaiveDate;
use controltower_core::{
    config::AuditConfig,
    engine::{AuditEngine, AuditReport},
    store::AuditStore,
    types::Window,
};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let data_dir = str_arg(&args, "--data-dir").unwrap_or("./data");
    let demo_mode = args.iter().any(|a| a == "--demo");
    let demo_seed = parse_arg(&args, "--demo-seed", 42u64);
    let demo_orders = parse_arg(&args, "--demo-orders", 500usize);
    let start = date_arg(&args, "--start")?;
    let end = date_arg(&args, "--end")?;

    let config = match str_arg(&args, "--config") {
        Some(path) => AuditConfig::load(path)?,
        None => AuditConfig::standard(),
    };

    let run_id = uuid::Uuid::new_v4();
    println!("Financial Control Tower — audit-runner");
    println!("  run id:    {run_id}");
    println!("  data dir:  {data_dir}");
    println!();

    std::fs::create_dir_all(data_dir)?;
    let store = AuditStore::open(data_dir)?;
    store.migrate()?;

    if demo_mode {
        println!("Seeding demo data (seed {demo_seed}, {demo_orders} orders)...");
        demo::seed(&store, demo_seed, demo_orders)?;
        println!(
            "  {} orders, {} receivables",
            store.sales_order_count()?,
            store.receivable_count()?
        );
        println!();
    }

    let engine = AuditEngine::new(config, &store, &store)?;
    let window = Window { start, end };
    log::info!("run {run_id}: auditing period '{}'", window.period_label());

    let report = engine.run_full_audit(&window)?;
    print_report(&report);

    println!("Findings and metrics appended to audit.db (audit_logs, fraud_rule_metrics).");
    Ok(())
}

fn print_report(report: &AuditReport) {
    let recon = &report.reconciliation;

    println!("=== RECONCILIATION (Operations vs Finance) — {} ===", report.period);
    println!("  source orders:       {}", recon.source_considered);
    println!("  finance invoices:    {}", recon.counterparty_considered);
    println!("  matched:             {}", recon.matched);
    println!("  missing in AR:       {}  (HIGH — shipped but never booked)", recon.missing_counterparty);
    println!("  amount mismatches:   {}  (MEDIUM)", recon.amount_mismatch);
    println!(
        "  unprocessable rows:  {} ops / {} finance",
        recon.source_unprocessable, recon.counterparty_unprocessable
    );

    println!();
    println!("=== COMPLIANCE CHECKS ===");
    println!("  timing violations:   {}", recon.timing_findings.len());
    println!("  negative margins:    {}", recon.margin_findings.len());
    if !recon.margin_findings.is_empty() {
        println!("  cumulative loss:     ${:.2}", recon.margin_stats.total_loss);
        println!("  worst offenders:");
        for o in &recon.margin_stats.worst {
            println!(
                "    - {}: sales ${:.2} | profit ${:.2} | margin {:.1}%",
                o.order_id, o.sales, o.profit, o.margin_pct
            );
        }
    }

    println!();
    println!("=== RULE PERFORMANCE ===");
    for m in &report.metrics {
        println!("  {} [{}]", m.rule_type, m.period);
        println!(
            "    TP {} | FP {} | TN {} | FN {} | unprocessable {}",
            m.matrix.tp, m.matrix.fp, m.matrix.tn, m.matrix.fn_, m.unprocessable
        );
        println!(
            "    precision {:.2}% | recall {:.2}% | F1 {:.4} | FPR {:.2}% | FNR {:.2}% | accuracy {:.2}%",
            m.precision() * 100.0,
            m.recall() * 100.0,
            m.f1_score(),
            m.false_positive_rate() * 100.0,
            m.false_negative_rate() * 100.0,
            m.accuracy() * 100.0
        );
        if m.matrix.total() > 0 {
            if m.false_positive_rate() > 0.05 {
                println!("    WARNING: false-positive rate above 5% — tune the rule threshold");
            }
            if m.recall() < 0.80 {
                println!("    WARNING: recall below 80% — the rule may be missing fraud cases");
            }
        }
    }

    println!();
    println!("=== MONTHLY P&L (most recent) ===");
    if report.statements.monthly.is_empty() {
        println!("  (no dated orders in window)");
    } else {
        println!("  {:<10} {:>8} {:>14} {:>14} {:>9}", "month", "orders", "revenue", "profit", "margin");
        for row in &report.statements.monthly {
            println!(
                "  {:<10} {:>8} {:>13.2} {:>13.2} {:>8.2}%",
                row.month, row.orders, row.revenue, row.net_profit, row.margin_pct()
            );
        }
    }

    println!();
    println!("=== TOP REGIONS BY PROFIT ===");
    for row in &report.statements.regional {
        println!(
            "  {:<20} {:>6} orders | revenue ${:>12.2} | profit ${:>12.2} | margin {:>6.2}%",
            row.region, row.orders, row.revenue, row.profit, row.margin_pct()
        );
    }
    println!();
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn date_arg(args: &[String], flag: &str) -> Result<Option<NaiveDate>> {
    match str_arg(args, flag) {
        None => Ok(None),
        Some(raw) => Ok(Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(
            |e| anyhow::anyhow!("{flag} expects YYYY-MM-DD, got '{raw}': {e}"),
        )?)),
    }
}
