//! Business-analysis statements: monthly P&L and regional profit ranking,
//! computed from the screened operations records. Printing is the runner's
//! job; this module only aggregates.

use crate::{metrics::safe_ratio, record::OperationsRecord};
use chrono::Datelike;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Months shown in the P&L overview (most recent first).
pub const RECENT_MONTHS: usize = 6;
/// Regions shown in the profitability ranking.
pub const TOP_REGIONS: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyPnl {
    /// `YYYY-MM`.
    pub month: String,
    pub orders: u64,
    pub revenue: f64,
    pub net_profit: f64,
}

impl MonthlyPnl {
    pub fn margin_pct(&self) -> f64 {
        safe_ratio(self.net_profit, self.revenue) * 100.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionalPnl {
    pub region: String,
    pub orders: u64,
    pub revenue: f64,
    pub profit: f64,
}

impl RegionalPnl {
    pub fn margin_pct(&self) -> f64 {
        safe_ratio(self.profit, self.revenue) * 100.0
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FinancialStatements {
    /// Most recent months first, at most [`RECENT_MONTHS`].
    pub monthly: Vec<MonthlyPnl>,
    /// Highest profit first, at most [`TOP_REGIONS`].
    pub regional: Vec<RegionalPnl>,
}

/// Aggregate the P&L overview and the regional ranking. Records with no
/// order date are left out of the monthly view; records with no country out
/// of the regional one.
pub fn compute(records: &[OperationsRecord]) -> FinancialStatements {
    let mut by_month: BTreeMap<String, MonthlyPnl> = BTreeMap::new();
    let mut by_region: BTreeMap<String, RegionalPnl> = BTreeMap::new();

    for r in records {
        if let Some(date) = r.order_date {
            let key = format!("{:04}-{:02}", date.year(), date.month());
            let entry = by_month.entry(key.clone()).or_insert_with(|| MonthlyPnl {
                month: key,
                orders: 0,
                revenue: 0.0,
                net_profit: 0.0,
            });
            entry.orders += 1;
            entry.revenue += r.sales;
            entry.net_profit += r.profit;
        }

        if let Some(region) = r.customer_country.as_deref() {
            if region.is_empty() {
                continue;
            }
            let entry = by_region
                .entry(region.to_string())
                .or_insert_with(|| RegionalPnl {
                    region: region.to_string(),
                    orders: 0,
                    revenue: 0.0,
                    profit: 0.0,
                });
            entry.orders += 1;
            entry.revenue += r.sales;
            entry.profit += r.profit;
        }
    }

    // BTreeMap iterates months ascending; take the tail, newest first.
    let mut monthly: Vec<MonthlyPnl> = by_month.into_values().collect();
    monthly.reverse();
    monthly.truncate(RECENT_MONTHS);

    let mut regional: Vec<RegionalPnl> = by_region.into_values().collect();
    regional.sort_by(|a, b| {
        b.profit
            .partial_cmp(&a.profit)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.region.cmp(&b.region))
    });
    regional.truncate(TOP_REGIONS);

    FinancialStatements { monthly, regional }
}
