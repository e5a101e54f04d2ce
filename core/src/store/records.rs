//! Record queries and insert helpers for the operations and finance
//! databases, plus the `RecordProvider` implementation.

use super::AuditStore;
use crate::{
    error::{AuditError, AuditResult},
    provider::RecordProvider,
    record::{FinanceRow, OperationsRow},
    types::Window,
};
use chrono::NaiveDate;
use rusqlite::params;

// ── Insert rows (tests and demo seeding) ────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct SalesOrderRow {
    pub order_id: Option<String>,
    pub order_date: Option<NaiveDate>,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_country: Option<String>,
    pub product_name: Option<String>,
    pub order_quantity: Option<i64>,
    pub sales: Option<f64>,
    pub discount: Option<f64>,
    pub profit: Option<f64>,
    pub order_status: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ShippingLogRow {
    pub order_id: String,
    pub shipping_date: Option<NaiveDate>,
    pub shipping_mode: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ReceivableRow {
    pub order_id: Option<String>,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub invoice_amount: Option<f64>,
    pub paid_amount: f64,
    pub outstanding_amount: f64,
    pub payment_status: Option<String>,
}

impl AuditStore {
    pub fn insert_sales_order(&self, row: &SalesOrderRow) -> AuditResult<()> {
        self.ops().execute(
            "INSERT INTO sales_orders
             (order_id, order_date, customer_id, customer_name, customer_country,
              product_name, order_quantity, sales, discount, profit, order_status)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)",
            params![
                row.order_id,
                row.order_date.map(|d| d.to_string()),
                row.customer_id,
                row.customer_name,
                row.customer_country,
                row.product_name,
                row.order_quantity,
                row.sales,
                row.discount,
                row.profit,
                row.order_status,
            ],
        )?;
        Ok(())
    }

    pub fn insert_shipping_log(&self, row: &ShippingLogRow) -> AuditResult<()> {
        self.ops().execute(
            "INSERT INTO shipping_logs (order_id, shipping_date, shipping_mode)
             VALUES (?1, ?2, ?3)",
            params![
                row.order_id,
                row.shipping_date.map(|d| d.to_string()),
                row.shipping_mode,
            ],
        )?;
        Ok(())
    }

    pub fn insert_receivable(&self, row: &ReceivableRow) -> AuditResult<()> {
        self.fin().execute(
            "INSERT OR REPLACE INTO accounts_receivable
             (order_id, customer_id, customer_name, invoice_date, due_date,
              invoice_amount, paid_amount, outstanding_amount, payment_status)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)",
            params![
                row.order_id,
                row.customer_id,
                row.customer_name,
                row.invoice_date.map(|d| d.to_string()),
                row.due_date.map(|d| d.to_string()),
                row.invoice_amount,
                row.paid_amount,
                row.outstanding_amount,
                row.payment_status,
            ],
        )?;
        Ok(())
    }

    pub fn sales_order_count(&self) -> AuditResult<i64> {
        let count = self
            .ops()
            .query_row("SELECT COUNT(*) FROM sales_orders", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn receivable_count(&self) -> AuditResult<i64> {
        let count = self.fin().query_row(
            "SELECT COUNT(*) FROM accounts_receivable",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // ── Queries behind the provider ─────────────────────────────────────

    fn query_operations(&self, window: &Window) -> AuditResult<Vec<OperationsRow>> {
        let mut stmt = self.ops().prepare(
            "SELECT t1.order_id, t1.order_date, t2.shipping_date,
                    t1.sales, t1.profit, t1.order_status,
                    t1.customer_name, t1.customer_country
             FROM sales_orders t1
             LEFT JOIN shipping_logs t2 ON t1.order_id = t2.order_id
             WHERE (?1 IS NULL OR t1.order_date >= ?1)
               AND (?2 IS NULL OR t1.order_date <= ?2)
             ORDER BY t1.order_id",
        )?;
        let rows = stmt
            .query_map(
                params![
                    window.start.map(|d| d.to_string()),
                    window.end.map(|d| d.to_string()),
                ],
                |row| {
                    Ok(OperationsRow {
                        order_id: row.get(0)?,
                        order_date: parse_date(row.get::<_, Option<String>>(1)?),
                        shipping_date: parse_date(row.get::<_, Option<String>>(2)?),
                        sales: row.get(3)?,
                        profit: row.get(4)?,
                        status: row.get(5)?,
                        customer_name: row.get(6)?,
                        customer_country: row.get(7)?,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn query_finance(&self, window: &Window) -> AuditResult<Vec<FinanceRow>> {
        // The finance view is windowed by invoice date, which mirrors the
        // operations order date in this source system.
        let mut stmt = self.fin().prepare(
            "SELECT order_id, invoice_amount, payment_status
             FROM accounts_receivable
             WHERE (?1 IS NULL OR invoice_date >= ?1)
               AND (?2 IS NULL OR invoice_date <= ?2)
             ORDER BY order_id",
        )?;
        let rows = stmt
            .query_map(
                params![
                    window.start.map(|d| d.to_string()),
                    window.end.map(|d| d.to_string()),
                ],
                |row| {
                    Ok(FinanceRow {
                        order_id: row.get(0)?,
                        invoice_amount: row.get(1)?,
                        payment_status: row.get(2)?,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl RecordProvider for AuditStore {
    fn operations_rows(&self, window: &Window) -> AuditResult<Vec<OperationsRow>> {
        self.query_operations(window)
            .map_err(|e| AuditError::DataUnavailable {
                view: "operations".into(),
                reason: e.to_string(),
            })
    }

    fn finance_rows(&self, window: &Window) -> AuditResult<Vec<FinanceRow>> {
        self.query_finance(window)
            .map_err(|e| AuditError::DataUnavailable {
                view: "finance".into(),
                reason: e.to_string(),
            })
    }
}

/// Dates are stored as ISO-8601 text; anything unparseable reads as absent.
fn parse_date(value: Option<String>) -> Option<NaiveDate> {
    value.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
}
