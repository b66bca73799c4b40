//! Alignment context: everything the validator needs to judge an item.

use serde::{Deserialize, Serialize};

use crate::band::{classify, ClassBand};
use crate::keywords::{extract_keywords_with, TokenFilter};
use crate::model::{Difficulty, GenerationRequest};
use crate::ontology::KeywordBank;

/// Thresholds applied by the validator and the strict-mode gate.
///
/// A single coverage threshold is used for both the per-item and the
/// aggregate check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignmentPolicy {
    /// Minimum keyword coverage for a single item.
    #[serde(default = "default_coverage")]
    pub min_item_coverage: f64,
    /// Minimum mean coverage over the returned set (strict mode).
    #[serde(default = "default_coverage")]
    pub min_avg_coverage: f64,
    /// Fraction of the requested count that must be returned (strict mode).
    #[serde(default = "default_accept_ratio")]
    pub min_accept_ratio: f64,
    /// Filter applied to topic and description tokens.
    #[serde(default)]
    pub token_filter: TokenFilter,
}

fn default_coverage() -> f64 {
    0.65
}

fn default_accept_ratio() -> f64 {
    0.7
}

impl Default for AlignmentPolicy {
    fn default() -> Self {
        Self {
            min_item_coverage: default_coverage(),
            min_avg_coverage: default_coverage(),
            min_accept_ratio: default_accept_ratio(),
            token_filter: TokenFilter::default(),
        }
    }
}

impl AlignmentPolicy {
    /// Smallest number of items strict mode accepts for a request of `count`.
    pub fn min_accepted(&self, count: usize) -> usize {
        (self.min_accept_ratio * count as f64).ceil() as usize
    }
}

/// Immutable per-request alignment context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentContext {
    pub subject: String,
    pub topic: String,
    pub class_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub class_band: ClassBand,
    pub min_item_coverage: f64,
    pub min_avg_coverage: f64,
    pub difficulty: Difficulty,
}

impl AlignmentContext {
    /// Build the context for a request.
    pub fn build(bank: &KeywordBank, request: &GenerationRequest, policy: &AlignmentPolicy) -> Self {
        let description = request
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());
        Self {
            subject: request.subject.trim().to_string(),
            topic: request.topic.trim().to_string(),
            class_label: request.class_label.trim().to_string(),
            description: description.map(str::to_string),
            keywords: extract_keywords_with(
                bank,
                &request.subject,
                &request.topic,
                description,
                policy.token_filter,
            ),
            class_band: classify(&request.class_label),
            min_item_coverage: policy.min_item_coverage,
            min_avg_coverage: policy.min_avg_coverage,
            difficulty: request.difficulty,
        }
    }

    /// The first `n` keywords, for feedback and prompts.
    pub fn top_keywords(&self, n: usize) -> &[String] {
        &self.keywords[..n.min(self.keywords.len())]
    }
}
