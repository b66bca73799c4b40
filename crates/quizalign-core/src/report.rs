//! Generation report with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::diagnostics::Diagnostics;
use crate::engine::GenerationOutcome;
use crate::model::{GenerationRequest, QuestionItem};

/// A persisted record of one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// The request as the caller made it.
    pub request: GenerationRequest,
    /// Name of the generator that produced the items.
    pub provider: String,
    pub questions: Vec<QuestionItem>,
    pub diagnostics: Diagnostics,
}

impl GenerationReport {
    pub fn new(request: GenerationRequest, provider: &str, outcome: GenerationOutcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            request,
            provider: provider.to_string(),
            questions: outcome.questions,
            diagnostics: outcome.diagnostics,
        }
    }

    /// Default file name, e.g. `report-20260101-120000.json`.
    pub fn file_name(&self) -> String {
        format!("report-{}.json", self.created_at.format("%Y%m%d-%H%M%S"))
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: GenerationReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}
