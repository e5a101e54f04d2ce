//! Severity thresholds — immutable rule configuration and band lookup.
//!
//! Bands are half-open ranges `lower <= value < upper` scanned in declared
//! order; the declared order must be ascending and non-overlapping, which is
//! validated when the registry is built (a malformed table is a fatal
//! configuration error, not a per-call surprise). Gaps are tolerated and fall
//! through to a `LOW` default at lookup.

use crate::{
    error::{AuditError, AuditResult},
    types::{RuleType, Severity},
};
use serde::Serialize;

/// One half-open severity range. Unbounded ends use ±infinity.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SeverityBand {
    pub severity: Severity,
    pub lower: f64,
    pub upper: f64,
}

impl SeverityBand {
    pub fn new(severity: Severity, lower: f64, upper: f64) -> Self {
        Self {
            severity,
            lower,
            upper,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value < self.upper
    }
}

/// Immutable per-rule configuration: the trigger threshold, the severity
/// bands and whether the rule participates in batch evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct ThresholdConfig {
    pub rule_type: RuleType,
    pub trigger_value: f64,
    pub bands: Vec<SeverityBand>,
    pub description: String,
    pub enabled: bool,
}

/// The production-standard threshold table.
pub fn standard_thresholds() -> Vec<ThresholdConfig> {
    use Severity::*;
    const INF: f64 = f64::INFINITY;

    vec![
        ThresholdConfig {
            rule_type: RuleType::TimingFraud,
            trigger_value: 0.0,
            // Banded over the shipping offset in days (shipping - order).
            bands: vec![
                SeverityBand::new(Critical, -INF, 0.0),
                SeverityBand::new(High, 0.0, 1.0),
                SeverityBand::new(Medium, 1.0, 7.0),
                SeverityBand::new(Low, 7.0, INF),
            ],
            description: "Shipping date earlier than order date".into(),
            enabled: true,
        },
        ThresholdConfig {
            rule_type: RuleType::NegativeMargin,
            trigger_value: 0.0,
            // Banded over per-order profit.
            bands: vec![
                SeverityBand::new(Critical, -INF, -1000.0),
                SeverityBand::new(High, -1000.0, -500.0),
                SeverityBand::new(Medium, -500.0, 0.0),
                SeverityBand::new(Low, 0.0, INF),
            ],
            description: "Negative-margin order, possible mispricing or fraud".into(),
            enabled: true,
        },
        ThresholdConfig {
            rule_type: RuleType::AmountAnomaly,
            trigger_value: 3.0,
            // Banded over the amount z-score.
            bands: vec![
                SeverityBand::new(Low, -INF, 3.0),
                SeverityBand::new(Medium, 3.0, 4.0),
                SeverityBand::new(High, 4.0, 5.0),
                SeverityBand::new(Critical, 5.0, INF),
            ],
            description: "Statistical amount anomaly (z-score)".into(),
            enabled: true,
        },
        ThresholdConfig {
            rule_type: RuleType::FrequencyAnomaly,
            trigger_value: 10.0,
            // Banded over orders per customer per day.
            bands: vec![
                SeverityBand::new(Low, -INF, 15.0),
                SeverityBand::new(Medium, 15.0, 30.0),
                SeverityBand::new(High, 30.0, 50.0),
                SeverityBand::new(Critical, 50.0, INF),
            ],
            description: "Abnormal daily order frequency per customer".into(),
            enabled: true,
        },
    ]
}

/// Validated, immutable lookup over all rule thresholds.
#[derive(Debug)]
pub struct ThresholdRegistry {
    configs: Vec<ThresholdConfig>,
}

impl ThresholdRegistry {
    /// Build the registry, rejecting band tables that are empty, unordered,
    /// inverted or overlapping.
    pub fn new(configs: Vec<ThresholdConfig>) -> AuditResult<Self> {
        for cfg in &configs {
            validate_bands(cfg)?;
        }
        Ok(Self { configs })
    }

    pub fn configs(&self) -> &[ThresholdConfig] {
        &self.configs
    }

    pub fn get(&self, rule_type: RuleType) -> Option<&ThresholdConfig> {
        self.configs.iter().find(|c| c.rule_type == rule_type)
    }

    /// Map a value to its severity for a rule: first declared band containing
    /// the value wins. Total: an unmatched value (band gap, or a rule with no
    /// configured bands) resolves to `LOW`.
    pub fn get_severity(&self, rule_type: RuleType, value: f64) -> Severity {
        self.get(rule_type)
            .and_then(|cfg| cfg.bands.iter().find(|b| b.contains(value)))
            .map(|b| b.severity)
            .unwrap_or(Severity::Low)
    }
}

fn validate_bands(cfg: &ThresholdConfig) -> AuditResult<()> {
    let fail = |reason: String| AuditError::Config {
        rule: cfg.rule_type.to_string(),
        reason,
    };

    if cfg.bands.is_empty() {
        return Err(fail("no severity bands declared".into()));
    }

    for band in &cfg.bands {
        if !(band.lower < band.upper) {
            return Err(fail(format!(
                "band {} has lower {} >= upper {}",
                band.severity, band.lower, band.upper
            )));
        }
    }

    for pair in cfg.bands.windows(2) {
        if pair[1].lower < pair[0].lower {
            return Err(fail(format!(
                "bands not in ascending order at {}",
                pair[1].severity
            )));
        }
        if pair[1].lower < pair[0].upper {
            return Err(fail(format!(
                "bands {} and {} overlap",
                pair[0].severity, pair[1].severity
            )));
        }
    }

    Ok(())
}
