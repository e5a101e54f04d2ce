//! Shared primitive types used across the whole audit engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A stable, unique identifier for any audited entity (orders, invoices).
pub type EntityId = String;

/// Qualitative risk label attached to findings and severity bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detection rule families. Only `TimingFraud` and `NegativeMargin` evaluate
/// today; the remaining variants are declared placeholders and batch
/// evaluation skips them silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    TimingFraud,
    NegativeMargin,
    AmountAnomaly,
    FrequencyAnomaly,
    CustomerRisk,
}

impl RuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TimingFraud => "timing_fraud",
            Self::NegativeMargin => "negative_margin",
            Self::AmountAnomaly => "amount_anomaly",
            Self::FrequencyAnomaly => "frequency_anomaly",
            Self::CustomerRisk => "customer_risk",
        }
    }
}

impl std::fmt::Display for RuleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evaluation window over `order_date`. Both ends optional; an open window
/// audits the full history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Window {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl Window {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn open() -> Self {
        Self::default()
    }

    /// Human-readable period label, persisted alongside metrics rows.
    pub fn period_label(&self) -> String {
        match (self.start, self.end) {
            (Some(s), Some(e)) => format!("{s} to {e}"),
            (Some(s), None) => format!("{s} onward"),
            (None, Some(e)) => format!("through {e}"),
            (None, None) => "all".to_string(),
        }
    }
}
