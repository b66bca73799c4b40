//! Generation orchestrator.
//!
//! Drives a bounded generate → validate → retry loop against a
//! [`QuestionGenerator`], then ranks, rebalances and gates the accepted
//! items.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::align::{AlignmentContext, AlignmentPolicy};
use crate::batch::{parse_batch, Candidate};
use crate::diagnostics::Diagnostics;
use crate::error::{GenerationError, ProviderError};
use crate::feedback::{
    build_feedback, remediation, CAPABILITY_ERROR_FEEDBACK, MALFORMED_BATCH_FEEDBACK,
};
use crate::model::{GenerationRequest, QuestionItem, QuestionType};
use crate::normalize::{post_process, prompt_key};
use crate::ontology::KeywordBank;
use crate::scorer::score_item;
use crate::traits::{GenerateRequest, GenerateResponse, QuestionGenerator};
use crate::validator::{coverage_score, validate_item, ReasonKind, ValidationVerdict};

/// Hard upper bound on generation attempts per request.
pub const MAX_ATTEMPTS: u32 = 3;

/// Configuration for the generation engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Attempts per request; clamped to `1..=MAX_ATTEMPTS`.
    pub max_attempts: u32,
    /// Upper bound on a single generator call.
    pub attempt_timeout: Duration,
    /// Coverage and acceptance thresholds.
    pub policy: AlignmentPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            attempt_timeout: Duration::from_secs(60),
            policy: AlignmentPolicy::default(),
        }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_attempt_start(&self, attempt: u32, remaining: usize);
    fn on_attempt_complete(&self, attempt: u32, accepted: usize, rejected: usize);
    fn on_attempt_error(&self, attempt: u32, error: &str);
    fn on_generation_complete(&self, diagnostics: &Diagnostics, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_attempt_start(&self, _: u32, _: usize) {}
    fn on_attempt_complete(&self, _: u32, _: usize, _: usize) {}
    fn on_attempt_error(&self, _: u32, _: &str) {}
    fn on_generation_complete(&self, _: &Diagnostics, _: Duration) {}
}

/// Accepted items plus the diagnostics that led to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutcome {
    pub questions: Vec<QuestionItem>,
    pub diagnostics: Diagnostics,
}

/// The generation engine.
pub struct GenerationEngine {
    generator: Arc<dyn QuestionGenerator>,
    bank: Arc<KeywordBank>,
    config: EngineConfig,
}

impl GenerationEngine {
    pub fn new(
        generator: Arc<dyn QuestionGenerator>,
        bank: Arc<KeywordBank>,
        config: EngineConfig,
    ) -> Self {
        Self {
            generator,
            bank,
            config,
        }
    }

    /// Name of the underlying generator.
    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    /// The alignment context a request would be judged against.
    pub fn context(&self, request: &GenerationRequest) -> AlignmentContext {
        AlignmentContext::build(&self.bank, request, &self.config.policy)
    }

    /// Generate an aligned item set for a request.
    pub async fn generate_aligned(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, GenerationError> {
        self.generate_aligned_with_progress(request, &NoopReporter)
            .await
    }

    /// Like [`generate_aligned`](Self::generate_aligned), reporting progress
    /// as attempts run.
    #[tracing::instrument(
        skip_all,
        fields(subject = %request.subject, topic = %request.topic, class = %request.class_label)
    )]
    pub async fn generate_aligned_with_progress(
        &self,
        request: &GenerationRequest,
        progress: &dyn ProgressReporter,
    ) -> Result<GenerationOutcome, GenerationError> {
        check_request(request)?;

        let start = Instant::now();
        let count = request.effective_count();
        let ctx = self.context(request);
        let max_attempts = self.config.max_attempts.clamp(1, MAX_ATTEMPTS);

        let mut accepted: Vec<QuestionItem> = Vec::new();
        let mut seen = HashSet::new();
        let mut feedback: Option<String> = None;
        let mut diagnostics = Diagnostics::new(count);
        let mut attempts = 0;

        for attempt in 1..=max_attempts {
            let remaining = count.saturating_sub(accepted.len());
            if remaining == 0 {
                break;
            }
            attempts = attempt;
            progress.on_attempt_start(attempt, remaining);

            let call = GenerateRequest {
                subject: ctx.subject.clone(),
                topic: ctx.topic.clone(),
                class_label: ctx.class_label.clone(),
                description: ctx.description.clone(),
                difficulty: request.difficulty,
                count: remaining,
                mix: request.mix,
                feedback: feedback.clone(),
            };

            let response = match self.call_generator(&call).await {
                Ok(response) => response,
                Err(e) => {
                    let message = format!("{e:#}");
                    warn!(attempt, error = %message, "generation attempt failed");
                    progress.on_attempt_error(attempt, &message);
                    if attempt == max_attempts {
                        return Err(GenerationError::Capability { attempt, source: e });
                    }
                    feedback = Some(CAPABILITY_ERROR_FEEDBACK.to_string());
                    diagnostics.feedback = feedback.clone();
                    continue;
                }
            };

            let candidates = match parse_batch(&response.extracted_json) {
                Ok(candidates) => candidates,
                Err(e) => {
                    warn!(attempt, error = %e, "malformed batch");
                    progress.on_attempt_error(attempt, &e.to_string());
                    if attempt == max_attempts {
                        return Err(GenerationError::MalformedBatch(e.to_string()));
                    }
                    feedback = Some(MALFORMED_BATCH_FEEDBACK.to_string());
                    diagnostics.feedback = feedback.clone();
                    continue;
                }
            };

            let mut kinds = BTreeSet::new();
            let mut newly_accepted = 0;
            let mut rejected = 0;

            for candidate in candidates {
                let item = match candidate {
                    Candidate::Item(raw) => post_process(raw),
                    Candidate::Undecodable(reason) => {
                        debug!(attempt, %reason, "undecodable item");
                        diagnostics.record(attempt, 0.0, &ValidationVerdict::schema_failure());
                        kinds.insert(ReasonKind::Schema);
                        rejected += 1;
                        continue;
                    }
                };

                let verdict = validate_item(&item, &ctx);
                let coverage = coverage_score(&item.prompt, &ctx.keywords);
                diagnostics.record(attempt, coverage, &verdict);

                if !verdict.ok {
                    debug!(attempt, prompt = %item.prompt, reasons = ?verdict.reasons, "item rejected");
                    kinds.extend(verdict.reasons.iter().map(|r| r.kind()));
                    rejected += 1;
                    continue;
                }
                if !seen.insert(prompt_key(&item.prompt)) {
                    debug!(attempt, prompt = %item.prompt, "duplicate prompt dropped");
                    diagnostics.count_reason("duplicate");
                    continue;
                }
                accepted.push(item);
                newly_accepted += 1;
            }

            feedback = if kinds.is_empty() {
                None
            } else {
                Some(build_feedback(&ctx, &kinds))
            };
            if feedback.is_some() {
                diagnostics.feedback = feedback.clone();
            }

            info!(
                attempt,
                accepted = newly_accepted,
                rejected,
                remaining = count.saturating_sub(accepted.len()),
                latency_ms = response.latency_ms,
                "attempt complete"
            );
            progress.on_attempt_complete(attempt, newly_accepted, rejected);
        }

        let ranked = rank(accepted, &ctx);
        let final_items = if request.mix && count >= 5 {
            enforce_mix(ranked, count)
        } else {
            ranked.into_iter().take(count).collect()
        };

        for (index, item) in final_items.iter().enumerate() {
            let verdict = validate_item(item, &ctx);
            if !verdict.ok {
                let reasons = verdict
                    .reasons
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(GenerationError::PostValidateFail { index, reasons });
            }
        }

        diagnostics.finish(attempts, &final_items, &ctx.keywords);
        progress.on_generation_complete(&diagnostics, start.elapsed());

        let min_accepted = self.config.policy.min_accepted(count);
        if request.strict
            && (diagnostics.accepted_count < min_accepted
                || diagnostics.avg_coverage < ctx.min_avg_coverage)
        {
            warn!(
                accepted = diagnostics.accepted_count,
                requested = count,
                avg_coverage = diagnostics.avg_coverage,
                "generated set is misaligned"
            );
            return Err(GenerationError::Misaligned {
                accepted_count: diagnostics.accepted_count,
                requested_count: count,
                avg_coverage: diagnostics.avg_coverage,
                suggestion: remediation(&ctx),
            });
        }

        info!(
            accepted = diagnostics.accepted_count,
            requested = count,
            attempts,
            avg_coverage = diagnostics.avg_coverage,
            "generation complete"
        );

        Ok(GenerationOutcome {
            questions: final_items,
            diagnostics,
        })
    }

    async fn call_generator(&self, call: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let timeout = self.config.attempt_timeout;
        match tokio::time::timeout(timeout, self.generator.generate(call)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(timeout.as_secs()).into()),
        }
    }
}

fn check_request(request: &GenerationRequest) -> Result<(), GenerationError> {
    for (field, value) in [
        ("subject", &request.subject),
        ("topic", &request.topic),
        ("classLabel", &request.class_label),
    ] {
        if value.trim().is_empty() {
            return Err(GenerationError::Validation(format!("{field} must not be empty")));
        }
    }
    Ok(())
}

/// Stable sort by score, best first.
fn rank(items: Vec<QuestionItem>, ctx: &AlignmentContext) -> Vec<QuestionItem> {
    let mut scored: Vec<(f64, QuestionItem)> = items
        .into_iter()
        .map(|item| (score_item(&item, ctx), item))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().map(|(_, item)| item).collect()
}

fn quota(count: usize, share: f64, floor: usize) -> usize {
    ((count as f64 * share).ceil() as usize).max(floor)
}

/// Rebalance ranked items toward the target type distribution.
///
/// Quotas are taken per type in rank order, then any free slots are filled
/// with the best leftover items. Never returns more than `count` items.
pub fn enforce_mix(ranked: Vec<QuestionItem>, count: usize) -> Vec<QuestionItem> {
    let quotas = [
        (QuestionType::Mcq, quota(count, 0.6, 3)),
        (QuestionType::TrueFalse, quota(count, 0.2, 1)),
        (QuestionType::Short, quota(count, 0.2, 1)),
    ];

    let mut taken = vec![false; ranked.len()];
    let mut order = Vec::with_capacity(ranked.len());
    for (kind, quota) in quotas {
        let picks: Vec<usize> = ranked
            .iter()
            .enumerate()
            .filter(|(_, item)| item.kind == kind)
            .map(|(i, _)| i)
            .take(quota)
            .collect();
        for i in picks {
            taken[i] = true;
            order.push(i);
        }
    }
    order.extend((0..ranked.len()).filter(|&i| !taken[i]));
    order.truncate(count);

    let mut slots: Vec<Option<QuestionItem>> = ranked.into_iter().map(Some).collect();
    order.into_iter().filter_map(|i| slots[i].take()).collect()
}
