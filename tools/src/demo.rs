//! Deterministic demo-data seeder.
//!
//! Populates the three databases with synthetic orders carrying a known mix
//! of anomalies (early shipments, deep negative margins, unbooked and
//! mismatched receivables) so a fresh checkout can produce a meaningful
//! audit. Same seed = same data.

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use controltower_core::store::{AuditStore, ReceivableRow, SalesOrderRow, ShippingLogRow};
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

const CUSTOMERS: &[&str] = &[
    "Maria Garcia", "James Wilson", "Chen Wei", "Aisha Khan", "Lucas Martin",
    "Emma Brown", "Noah Schmidt", "Olivia Rossi", "Liam Murphy", "Sofia Silva",
    "Ethan Clark", "Ava Johnson", "Mateo Lopez", "Mia Anderson", "Yuki Tanaka",
    "Fatima Ali",
];

const COUNTRIES: &[&str] = &[
    "United States", "Germany", "France", "Brazil", "Japan",
    "United Kingdom", "India", "Mexico", "Spain", "Australia",
];

const PRODUCTS: &[&str] = &[
    "Field Hockey Stick", "Trail Running Shoes", "Camping Stove", "Road Bike Helmet",
    "Fishing Rod Combo", "Yoga Mat Pro", "Climbing Harness", "Insulated Water Bottle",
];

/// Deterministic RNG for demo seeding.
struct DemoRng {
    inner: Pcg64Mcg,
}

impl DemoRng {
    fn new(seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    fn below(&mut self, n: u64) -> u64 {
        self.inner.next_u64() % n
    }

    /// Bernoulli trial: returns true with probability p.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len() as u64) as usize]
    }
}

/// Seed `order_count` synthetic orders plus shipping logs and receivables.
pub fn seed(store: &AuditStore, seed: u64, order_count: usize) -> Result<()> {
    let mut rng = DemoRng::new(seed);
    let first_day = NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid date");

    let mut anomalies = 0usize;

    for i in 0..order_count {
        let order_id = format!("ORD-{i:05}");
        let order_date = first_day + Duration::days(rng.below(540) as i64);
        let sales = cents(20.0 + rng.next_f64() * 1980.0);

        // Mostly healthy margins; a small tail of deep losses.
        let mut profit = cents(sales * (-0.05 + rng.next_f64() * 0.40));
        if rng.chance(0.02) {
            profit = cents(-(1000.0 + rng.next_f64() * 2000.0));
            anomalies += 1;
        }

        let order_status = if rng.chance(0.04) {
            "CANCELLED"
        } else if rng.chance(0.01) {
            "SUSPECTED_FRAUD"
        } else {
            "COMPLETE"
        };

        // Normal shipping lands 1-10 days after the order; a few records
        // ship before the order was placed at all.
        let ship_offset = if rng.chance(0.03) {
            anomalies += 1;
            -(1 + rng.below(14) as i64)
        } else {
            1 + rng.below(10) as i64
        };
        let shipping_date = order_date + Duration::days(ship_offset);

        store.insert_sales_order(&SalesOrderRow {
            order_id: Some(order_id.clone()),
            order_date: Some(order_date),
            customer_id: Some(format!("CUST-{:03}", rng.below(200))),
            customer_name: Some(rng.pick(CUSTOMERS).to_string()),
            customer_country: Some(rng.pick(COUNTRIES).to_string()),
            product_name: Some(rng.pick(PRODUCTS).to_string()),
            order_quantity: Some(1 + rng.below(5) as i64),
            sales: Some(sales),
            discount: Some(0.0),
            profit: Some(profit),
            order_status: Some(order_status.to_string()),
        })?;

        store.insert_shipping_log(&ShippingLogRow {
            order_id: order_id.clone(),
            shipping_date: Some(shipping_date),
            shipping_mode: Some("Standard Class".to_string()),
        })?;

        // Most orders are invoiced; a few never reach the finance ledger,
        // and a few are booked at the wrong amount.
        if rng.chance(0.04) {
            anomalies += 1;
            continue;
        }
        let invoice_amount = if rng.chance(0.03) {
            anomalies += 1;
            cents(sales + (rng.next_f64() * 100.0 - 50.0))
        } else {
            sales
        };
        let paid = order_status == "COMPLETE" && rng.chance(0.8);

        store.insert_receivable(&ReceivableRow {
            order_id: Some(order_id),
            customer_id: None,
            customer_name: None,
            invoice_date: Some(order_date),
            due_date: Some(order_date + Duration::days(30)),
            invoice_amount: Some(invoice_amount),
            paid_amount: if paid { invoice_amount } else { 0.0 },
            outstanding_amount: if paid { 0.0 } else { invoice_amount },
            payment_status: Some(if paid { "Paid" } else { "Outstanding" }.to_string()),
        })?;
    }

    log::info!("demo seed complete: {order_count} orders, {anomalies} injected anomalies");
    Ok(())
}

fn cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
