//! Engine configuration.
//!
//! Everything tunable travels in one immutable [`AuditConfig`] handed to the
//! engine at construction — no globals, no process-wide defaults. Tests and
//! tools start from [`AuditConfig::standard`]; deployments may load a JSON
//! file in the same shape.

use crate::{
    evaluator::HeuristicParams,
    record::StatusFilter,
    thresholds::{standard_thresholds, SeverityBand, ThresholdConfig},
    types::{RuleType, Severity},
};
use serde::Deserialize;

/// Statuses excluded from every evaluation and both reconciliation sides.
pub const STANDARD_EXCLUSIONS: &[&str] = &["CANCELED", "CANCELLED", "SUSPECTED_FRAUD"];

#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub thresholds: Vec<ThresholdConfig>,
    pub exclusion_statuses: Vec<String>,
    /// Absolute tolerance on |sales - invoice_amount| before a mismatch.
    pub amount_tolerance: f64,
    pub heuristic: HeuristicParams,
    /// Worst negative-margin orders surfaced as samples.
    pub worst_offender_count: usize,
}

impl AuditConfig {
    /// The production-standard configuration.
    pub fn standard() -> Self {
        Self {
            thresholds: standard_thresholds(),
            exclusion_statuses: STANDARD_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
            amount_tolerance: 0.01,
            heuristic: HeuristicParams::default(),
            worst_offender_count: 3,
        }
    }

    /// Load from a JSON file. Omitted sections fall back to the standard
    /// values; rules given in the file replace the standard table entirely.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let file: AuditConfigFile = serde_json::from_str(&content)?;
        let standard = Self::standard();

        let thresholds = match file.rules {
            Some(rules) => rules.into_iter().map(RuleFile::into_config).collect(),
            None => standard.thresholds,
        };

        Ok(Self {
            thresholds,
            exclusion_statuses: file
                .exclusion_statuses
                .unwrap_or(standard.exclusion_statuses),
            amount_tolerance: file.amount_tolerance.unwrap_or(standard.amount_tolerance),
            heuristic: file.heuristic.unwrap_or(standard.heuristic),
            worst_offender_count: file
                .worst_offender_count
                .unwrap_or(standard.worst_offender_count),
        })
    }

    pub fn status_filter(&self) -> StatusFilter {
        StatusFilter::new(&self.exclusion_statuses)
    }
}

// ── File shapes ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
struct AuditConfigFile {
    rules: Option<Vec<RuleFile>>,
    exclusion_statuses: Option<Vec<String>>,
    amount_tolerance: Option<f64>,
    heuristic: Option<HeuristicParams>,
    worst_offender_count: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
struct RuleFile {
    rule_type: RuleType,
    trigger_value: f64,
    description: String,
    #[serde(default = "default_enabled")]
    enabled: bool,
    bands: Vec<BandFile>,
}

impl RuleFile {
    fn into_config(self) -> ThresholdConfig {
        ThresholdConfig {
            rule_type: self.rule_type,
            trigger_value: self.trigger_value,
            bands: self.bands.into_iter().map(BandFile::into_band).collect(),
            description: self.description,
            enabled: self.enabled,
        }
    }
}

/// Band bounds in the file: `null` means unbounded on that side.
#[derive(Debug, Clone, Deserialize)]
struct BandFile {
    severity: Severity,
    lower: Option<f64>,
    upper: Option<f64>,
}

impl BandFile {
    fn into_band(self) -> SeverityBand {
        SeverityBand::new(
            self.severity,
            self.lower.unwrap_or(f64::NEG_INFINITY),
            self.upper.unwrap_or(f64::INFINITY),
        )
    }
}

fn default_enabled() -> bool {
    true
}
