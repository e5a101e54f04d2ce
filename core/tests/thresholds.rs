//! Tests for severity-band configuration and lookup:
//! 1. The standard table validates and maps values to the expected labels
//! 2. Lookup is total — every input resolves to exactly one label
//! 3. Malformed band tables are rejected at construction, not at lookup

use controltower_core::{
    error::AuditError,
    thresholds::{standard_thresholds, SeverityBand, ThresholdConfig, ThresholdRegistry},
    types::{RuleType, Severity},
};

fn standard_registry() -> ThresholdRegistry {
    ThresholdRegistry::new(standard_thresholds()).expect("standard thresholds must validate")
}

fn one_rule(bands: Vec<SeverityBand>) -> Vec<ThresholdConfig> {
    vec![ThresholdConfig {
        rule_type: RuleType::NegativeMargin,
        trigger_value: 0.0,
        bands,
        description: "test".into(),
        enabled: true,
    }]
}

// ─────────────────────────────────────────────────────────────────────────────
// Standard table mapping
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn timing_bands_map_day_offsets() {
    let reg = standard_registry();
    assert_eq!(reg.get_severity(RuleType::TimingFraud, -9.0), Severity::Critical);
    assert_eq!(reg.get_severity(RuleType::TimingFraud, 0.0), Severity::High);
    assert_eq!(reg.get_severity(RuleType::TimingFraud, 3.0), Severity::Medium);
    assert_eq!(reg.get_severity(RuleType::TimingFraud, 30.0), Severity::Low);
}

#[test]
fn margin_bands_map_profit() {
    let reg = standard_registry();
    assert_eq!(reg.get_severity(RuleType::NegativeMargin, -1500.0), Severity::Critical);
    assert_eq!(reg.get_severity(RuleType::NegativeMargin, -700.0), Severity::High);
    assert_eq!(reg.get_severity(RuleType::NegativeMargin, -200.0), Severity::Medium);
    assert_eq!(reg.get_severity(RuleType::NegativeMargin, 50.0), Severity::Low);
}

#[test]
fn band_bounds_are_half_open() {
    let reg = standard_registry();
    // Lower bound inclusive, upper exclusive.
    assert_eq!(reg.get_severity(RuleType::NegativeMargin, -1000.0), Severity::High);
    assert_eq!(reg.get_severity(RuleType::NegativeMargin, 0.0), Severity::Low);
}

// ─────────────────────────────────────────────────────────────────────────────
// Totality
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn lookup_is_total_for_every_rule_and_value() {
    let reg = standard_registry();
    let rules = [
        RuleType::TimingFraud,
        RuleType::NegativeMargin,
        RuleType::AmountAnomaly,
        RuleType::FrequencyAnomaly,
        RuleType::CustomerRisk, // no configured bands at all
    ];
    let values = [
        f64::NEG_INFINITY,
        -1e12,
        -1000.0,
        -0.0001,
        0.0,
        0.0001,
        7.0,
        1e12,
    ];
    for rule in rules {
        for v in values {
            // Must return exactly one label, never panic.
            let _ = reg.get_severity(rule, v);
        }
    }
}

#[test]
fn gap_in_bands_falls_back_to_low() {
    // Bands cover (-inf, 0) and [10, inf); the [0, 10) gap is tolerated and
    // resolves to the default label.
    let reg = ThresholdRegistry::new(one_rule(vec![
        SeverityBand::new(Severity::Critical, f64::NEG_INFINITY, 0.0),
        SeverityBand::new(Severity::High, 10.0, f64::INFINITY),
    ]))
    .expect("gapped bands are legal");
    assert_eq!(reg.get_severity(RuleType::NegativeMargin, 5.0), Severity::Low);
    assert_eq!(reg.get_severity(RuleType::NegativeMargin, -5.0), Severity::Critical);
    assert_eq!(reg.get_severity(RuleType::NegativeMargin, 10.0), Severity::High);
}

// ─────────────────────────────────────────────────────────────────────────────
// Construction-time validation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn rejects_unordered_bands() {
    let result = ThresholdRegistry::new(one_rule(vec![
        SeverityBand::new(Severity::High, 10.0, 20.0),
        SeverityBand::new(Severity::Critical, 0.0, 10.0),
    ]));
    assert!(matches!(result, Err(AuditError::Config { .. })));
}

#[test]
fn rejects_overlapping_bands() {
    let result = ThresholdRegistry::new(one_rule(vec![
        SeverityBand::new(Severity::Critical, 0.0, 10.0),
        SeverityBand::new(Severity::High, 5.0, 20.0),
    ]));
    assert!(matches!(result, Err(AuditError::Config { .. })));
}

#[test]
fn rejects_inverted_band_bounds() {
    let result = ThresholdRegistry::new(one_rule(vec![SeverityBand::new(
        Severity::Critical,
        10.0,
        0.0,
    )]));
    assert!(matches!(result, Err(AuditError::Config { .. })));
}

#[test]
fn rejects_empty_band_table() {
    let result = ThresholdRegistry::new(one_rule(vec![]));
    assert!(matches!(result, Err(AuditError::Config { .. })));
}

#[test]
fn config_error_names_the_rule() {
    let err = ThresholdRegistry::new(one_rule(vec![])).unwrap_err();
    let message = err.to_string();
    assert!(
        message.contains("negative_margin"),
        "error should name the offending rule: {message}"
    );
}
