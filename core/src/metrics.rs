//! Confusion-matrix arithmetic for rule performance evaluation.
//!
//! Every ratio guards its denominator: a quiet period with no qualifying
//! records yields 0.0 across the board, never a panic or an error. Values are
//! rounded to four decimals only at the reporting boundary; anything that
//! compares metrics must use the unrounded accessors.

use crate::types::RuleType;
use serde::Serialize;

/// TP/FP/TN/FN tallies for one rule over one record set.
/// Invariant: the four counts sum to the number of evaluated records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub tp: u64,
    pub fp: u64,
    pub tn: u64,
    pub fn_: u64,
}

impl ConfusionMatrix {
    pub fn total(&self) -> u64 {
        self.tp + self.fp + self.tn + self.fn_
    }

    /// Tally one (triggered, truth) observation.
    pub fn record(&mut self, triggered: bool, truth: bool) {
        match (triggered, truth) {
            (true, true) => self.tp += 1,
            (true, false) => self.fp += 1,
            (false, false) => self.tn += 1,
            (false, true) => self.fn_ += 1,
        }
    }

    pub fn precision(&self) -> f64 {
        safe_ratio(self.tp as f64, (self.tp + self.fp) as f64)
    }

    pub fn recall(&self) -> f64 {
        safe_ratio(self.tp as f64, (self.tp + self.fn_) as f64)
    }

    pub fn f1_score(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        safe_ratio(2.0 * p * r, p + r)
    }

    pub fn false_positive_rate(&self) -> f64 {
        safe_ratio(self.fp as f64, (self.fp + self.tn) as f64)
    }

    pub fn false_negative_rate(&self) -> f64 {
        safe_ratio(self.fn_ as f64, (self.fn_ + self.tp) as f64)
    }

    pub fn accuracy(&self) -> f64 {
        safe_ratio((self.tp + self.tn) as f64, self.total() as f64)
    }
}

/// Performance of one rule over one evaluation period. The six ratios are
/// derived from the matrix on demand — they are never stored, so they can
/// never go stale against the counts.
#[derive(Debug, Clone, Serialize)]
pub struct RulePerformanceMetrics {
    pub rule_type: RuleType,
    pub period: String,
    pub matrix: ConfusionMatrix,
    /// Rows skipped because a field this rule needs was missing. Counted
    /// apart from the matrix — never folded into TN.
    pub unprocessable: u64,
}

impl RulePerformanceMetrics {
    pub fn empty(rule_type: RuleType, period: String) -> Self {
        Self {
            rule_type,
            period,
            matrix: ConfusionMatrix::default(),
            unprocessable: 0,
        }
    }

    pub fn precision(&self) -> f64 {
        self.matrix.precision()
    }

    pub fn recall(&self) -> f64 {
        self.matrix.recall()
    }

    pub fn f1_score(&self) -> f64 {
        self.matrix.f1_score()
    }

    pub fn false_positive_rate(&self) -> f64 {
        self.matrix.false_positive_rate()
    }

    pub fn false_negative_rate(&self) -> f64 {
        self.matrix.false_negative_rate()
    }

    pub fn accuracy(&self) -> f64 {
        self.matrix.accuracy()
    }
}

/// `numerator / denominator`, or 0.0 when the denominator is zero.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Round to 4 decimal places for reporting.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
