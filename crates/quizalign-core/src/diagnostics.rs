//! Per-request diagnostics collected across attempts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::QuestionItem;
use crate::validator::{coverage_score, ReasonKind, ValidationVerdict};

/// Outcome for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDiagnostic {
    /// 1-based attempt that produced the candidate.
    pub attempt: u32,
    pub coverage: f64,
    /// Rendered reason codes, e.g. `coverage:41%`.
    pub reasons: Vec<String>,
    pub passed: bool,
}

/// Aggregate view over every candidate evaluated for a request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub per_item: Vec<ItemDiagnostic>,
    /// Mean coverage over the returned set; 0 when it is empty.
    pub avg_coverage: f64,
    /// Passed candidates over evaluated candidates.
    pub pass_rate: f64,
    pub requested_count: usize,
    pub accepted_count: usize,
    /// Attempts actually made.
    pub attempts: u32,
    /// How often each reason kind occurred.
    pub reason_counts: BTreeMap<String, usize>,
    /// Last feedback sent to the generator, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl Diagnostics {
    pub fn new(requested_count: usize) -> Self {
        Self {
            requested_count,
            ..Self::default()
        }
    }

    /// Record the verdict for one candidate.
    pub fn record(&mut self, attempt: u32, coverage: f64, verdict: &ValidationVerdict) {
        for reason in &verdict.reasons {
            *self
                .reason_counts
                .entry(reason.kind().to_string())
                .or_default() += 1;
        }
        self.per_item.push(ItemDiagnostic {
            attempt,
            coverage,
            reasons: verdict.reasons.iter().map(ToString::to_string).collect(),
            passed: verdict.ok,
        });
    }

    /// Count a rejection that has no per-item verdict, such as a duplicate
    /// prompt.
    pub fn count_reason(&mut self, kind: &str) {
        *self.reason_counts.entry(kind.to_string()).or_default() += 1;
    }

    pub fn count_of(&self, kind: ReasonKind) -> usize {
        self.reason_counts
            .get(&kind.to_string())
            .copied()
            .unwrap_or(0)
    }

    /// Fill in the aggregate figures for the final set.
    pub fn finish(&mut self, attempts: u32, accepted: &[QuestionItem], keywords: &[String]) {
        self.attempts = attempts;
        self.accepted_count = accepted.len();
        self.avg_coverage = mean_coverage(accepted, keywords);
        let passed = self.per_item.iter().filter(|d| d.passed).count();
        self.pass_rate = if self.per_item.is_empty() {
            0.0
        } else {
            passed as f64 / self.per_item.len() as f64
        };
    }
}

/// Mean prompt coverage over `items`; 0 for an empty set.
pub fn mean_coverage(items: &[QuestionItem], keywords: &[String]) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    let total: f64 = items
        .iter()
        .map(|item| coverage_score(&item.prompt, keywords))
        .sum();
    total / items.len() as f64
}
