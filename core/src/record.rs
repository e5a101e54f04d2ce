//! Record shapes and pre-evaluation screening.
//!
//! RULE: The evaluator and the reconciler must see the SAME screening.
//! Both call [`screen_operations`] / [`screen_finance`] so their record
//! populations (and therefore their denominators) can never diverge.

use crate::types::EntityId;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

// ── Raw rows (provider output, not yet validated) ───────────────────────────

/// An operations-side row as fetched. Every field is optional because the
/// source system does not enforce completeness; screening decides what is
/// usable.
#[derive(Debug, Clone, Default)]
pub struct OperationsRow {
    pub order_id: Option<String>,
    pub order_date: Option<NaiveDate>,
    pub shipping_date: Option<NaiveDate>,
    pub sales: Option<f64>,
    pub profit: Option<f64>,
    pub status: Option<String>,
    pub customer_name: Option<String>,
    pub customer_country: Option<String>,
}

/// A finance-side (accounts receivable) row as fetched.
#[derive(Debug, Clone, Default)]
pub struct FinanceRow {
    pub order_id: Option<String>,
    pub invoice_amount: Option<f64>,
    pub payment_status: Option<String>,
}

// ── Screened records ────────────────────────────────────────────────────────

/// A validated operations record. `order_id`, `sales` and `profit` are
/// guaranteed present; dates stay optional (not every rule needs them).
#[derive(Debug, Clone, Serialize)]
pub struct OperationsRecord {
    pub order_id: EntityId,
    pub order_date: Option<NaiveDate>,
    pub shipping_date: Option<NaiveDate>,
    pub sales: f64,
    pub profit: f64,
    pub status: String,
    pub customer_name: Option<String>,
    pub customer_country: Option<String>,
}

/// A validated finance record.
#[derive(Debug, Clone, Serialize)]
pub struct FinanceRecord {
    pub order_id: EntityId,
    pub invoice_amount: f64,
    pub payment_status: String,
}

/// Screening outcome: the usable records plus tallies of what was dropped.
/// `unprocessable` rows are counted, never folded into any other bucket.
#[derive(Debug, Clone)]
pub struct Screened<T> {
    pub records: Vec<T>,
    pub unprocessable: u64,
    pub excluded: u64,
}

// ── Status exclusion ────────────────────────────────────────────────────────

/// Case-insensitive status exclusion set. The operations side writes
/// `CANCELLED`, the finance side `Cancelled`; one filter covers both.
#[derive(Debug, Clone)]
pub struct StatusFilter {
    lowered: HashSet<String>,
}

impl StatusFilter {
    pub fn new<I, S>(statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            lowered: statuses
                .into_iter()
                .map(|s| s.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn is_excluded(&self, status: &str) -> bool {
        self.lowered.contains(&status.to_lowercase())
    }
}

// ── Screening ───────────────────────────────────────────────────────────────

/// Screen operations rows: drop rows with no usable key or amounts
/// (unprocessable) and rows in an excluded status.
pub fn screen_operations(rows: Vec<OperationsRow>, filter: &StatusFilter) -> Screened<OperationsRecord> {
    let mut records = Vec::with_capacity(rows.len());
    let mut unprocessable = 0u64;
    let mut excluded = 0u64;

    for row in rows {
        let order_id = match usable_id(row.order_id) {
            Some(id) => id,
            None => {
                unprocessable += 1;
                continue;
            }
        };
        let (sales, profit) = match (row.sales, row.profit) {
            (Some(s), Some(p)) => (s, p),
            _ => {
                unprocessable += 1;
                continue;
            }
        };
        // A missing status can only under-exclude.
        let status = row.status.unwrap_or_default();
        if filter.is_excluded(&status) {
            excluded += 1;
            continue;
        }
        records.push(OperationsRecord {
            order_id,
            order_date: row.order_date,
            shipping_date: row.shipping_date,
            sales,
            profit,
            status,
            customer_name: row.customer_name,
            customer_country: row.customer_country,
        });
    }

    Screened {
        records,
        unprocessable,
        excluded,
    }
}

/// Screen finance rows with the same policy.
pub fn screen_finance(rows: Vec<FinanceRow>, filter: &StatusFilter) -> Screened<FinanceRecord> {
    let mut records = Vec::with_capacity(rows.len());
    let mut unprocessable = 0u64;
    let mut excluded = 0u64;

    for row in rows {
        let order_id = match usable_id(row.order_id) {
            Some(id) => id,
            None => {
                unprocessable += 1;
                continue;
            }
        };
        let invoice_amount = match row.invoice_amount {
            Some(a) => a,
            None => {
                unprocessable += 1;
                continue;
            }
        };
        let payment_status = row.payment_status.unwrap_or_default();
        if filter.is_excluded(&payment_status) {
            excluded += 1;
            continue;
        }
        records.push(FinanceRecord {
            order_id,
            invoice_amount,
            payment_status,
        });
    }

    Screened {
        records,
        unprocessable,
        excluded,
    }
}

fn usable_id(id: Option<String>) -> Option<String> {
    match id {
        Some(s) if !s.trim().is_empty() => Some(s),
        _ => None,
    }
}
