//! The generation capability trait.
//!
//! Backends live in the `quizalign-providers` crate; the engine only sees
//! this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::Difficulty;

/// A backend that produces batches of candidate quiz items.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// Human-readable backend name (e.g. "openai").
    fn name(&self) -> &str;

    /// Produce a batch for the request. The response should carry a JSON
    /// object with a `questions` array.
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse>;
}

/// One call to a generation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub subject: String,
    pub topic: String,
    pub class_label: String,
    #[serde(default)]
    pub description: Option<String>,
    pub difficulty: Difficulty,
    /// How many items are still needed.
    pub count: usize,
    pub mix: bool,
    /// Corrective instructions from the previous attempt.
    #[serde(default)]
    pub feedback: Option<String>,
}

/// What a backend answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    /// The raw response text.
    pub content: String,
    /// The JSON object extracted from `content`.
    pub extracted_json: String,
    /// Model that actually produced the response.
    pub model: String,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// Extract the first balanced `{...}` object from an LLM response.
///
/// Handles:
/// - JSON wrapped in prose or markdown fences
/// - braces inside string literals, including escaped quotes
/// - raw text with no object at all (returned as-is)
pub fn extract_json_object(response: &str) -> String {
    let Some(start) = response.find('{') else {
        return response.to_string();
    };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in response[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return response[start..start + offset + 1].to_string();
                }
            }
            _ => {}
        }
    }

    // Unbalanced: let the batch parser report it.
    response.to_string()
}
