//! Offline generator built from fixed templates.
//!
//! Produces deterministic batches without network access. Prompts name the
//! request's top keywords so that the output is aligned by construction.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use quizalign_core::band::{classify, ClassBand};
use quizalign_core::keywords::extract_keywords;
use quizalign_core::model::{CorrectAnswer, QuestionItem, QuestionType};
use quizalign_core::ontology::KeywordBank;
use quizalign_core::traits::{
    extract_json_object, GenerateRequest, GenerateResponse, QuestionGenerator,
};
use quizalign_core::validator::{word_count, COVERAGE_WINDOW};

/// Deterministic template-based generator.
pub struct TemplateGenerator {
    bank: Arc<KeywordBank>,
    sequence: AtomicUsize,
}

struct TemplateContext<'a> {
    request: &'a GenerateRequest,
    keywords: Vec<String>,
    class_band: ClassBand,
    math: bool,
}

impl TemplateGenerator {
    pub fn new(bank: Arc<KeywordBank>) -> Self {
        Self {
            bank,
            sequence: AtomicUsize::new(0),
        }
    }

    fn build_item(&self, kind: QuestionType, n: usize, ctx: &TemplateContext<'_>) -> QuestionItem {
        let topic = ctx.request.topic.trim();
        let keyword = ctx
            .keywords
            .get(n % ctx.keywords.len().max(1))
            .map(String::as_str)
            .unwrap_or(topic);

        // Small linear equations: x in 2..=10, 2x + b = c.
        let x = n % 9 + 2;
        let b = (n * 3) % 11 + 1;
        let c = 2 * x + b;

        let (stem, options, answer) = match (kind, ctx.math) {
            (QuestionType::Mcq, true) => (
                format!("Risolvi l'equazione 2x + {b} = {c}."),
                Some((x - 1..=x + 2).map(|v| format!("x = {v}")).collect()),
                CorrectAnswer::Selected { selected: 1 },
            ),
            (QuestionType::TrueFalse, true) => {
                let claimed = if n % 2 == 0 { x } else { x + 1 };
                (
                    format!("Vero o falso? Il numero {claimed} è la soluzione di 2x + {b} = {c}."),
                    None,
                    CorrectAnswer::Value {
                        value: claimed == x,
                    },
                )
            }
            (_, true) => (
                format!("Risolvi {} = 3x e scrivi il valore dell'incognita.", 3 * x),
                None,
                CorrectAnswer::Expected {
                    expected: format!("x = {x}"),
                },
            ),
            (QuestionType::Mcq, false) => (
                format!("Domanda {}. Quale affermazione su «{keyword}» è corretta per {topic}?", n + 1),
                Some(vec![
                    format!("È un concetto chiave di {topic}"),
                    "Riguarda un'altra disciplina".to_string(),
                    "Non ha legami con l'argomento".to_string(),
                    "È un errore comune da evitare".to_string(),
                ]),
                CorrectAnswer::Selected { selected: 0 },
            ),
            (QuestionType::TrueFalse, false) => (
                format!("Domanda {}. Vero o falso? «{keyword}» è legato a {topic}.", n + 1),
                None,
                CorrectAnswer::Value { value: true },
            ),
            (_, false) => (
                format!("Domanda {}. Spiega con parole tue che cosa significa «{keyword}».", n + 1),
                None,
                CorrectAnswer::Expected {
                    expected: format!("Definizione di {keyword} con un esempio"),
                },
            ),
        };

        QuestionItem {
            kind,
            prompt: with_concepts(&stem, &ctx.keywords, ctx.class_band.max_prompt_words),
            options,
            correct_answer: Some(answer),
            points: ctx.request.difficulty.default_points(),
            teacher_explanation: Some(format!("Esercizio su {topic}, classe {}", ctx.request.class_label)),
        }
    }
}

/// Item kinds for a batch: mostly MCQ, the rest split between TF and SHORT.
fn plan(count: usize, mix: bool) -> Vec<QuestionType> {
    if !mix {
        return vec![QuestionType::Mcq; count];
    }
    let mcq = (count as f64 * 0.6).ceil() as usize;
    let tf = (count - mcq).div_ceil(2);
    let short = count - mcq - tf;
    [
        (QuestionType::Mcq, mcq),
        (QuestionType::TrueFalse, tf),
        (QuestionType::Short, short),
    ]
    .into_iter()
    .flat_map(|(kind, n)| std::iter::repeat(kind).take(n))
    .collect()
}

/// Append as many top keywords as fit the word budget.
fn with_concepts(stem: &str, keywords: &[String], max_words: usize) -> String {
    let mut budget = max_words.saturating_sub(word_count(stem) + 1);
    let mut concepts = Vec::new();
    for keyword in keywords.iter().take(COVERAGE_WINDOW) {
        let words = word_count(keyword);
        if words > budget {
            break;
        }
        budget -= words;
        concepts.push(keyword.as_str());
    }
    if concepts.is_empty() {
        stem.to_string()
    } else {
        format!("{stem} (Concetti: {})", concepts.join(", "))
    }
}

#[async_trait]
impl QuestionGenerator for TemplateGenerator {
    fn name(&self) -> &str {
        "template"
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let start = Instant::now();
        let ctx = TemplateContext {
            request,
            keywords: extract_keywords(
                &self.bank,
                &request.subject,
                &request.topic,
                request.description.as_deref(),
            ),
            class_band: classify(&request.class_label),
            math: request.subject.trim().eq_ignore_ascii_case("matematica"),
        };

        let first = self.sequence.fetch_add(request.count, Ordering::Relaxed);
        let questions: Vec<QuestionItem> = plan(request.count, request.mix)
            .into_iter()
            .enumerate()
            .map(|(i, kind)| self.build_item(kind, first + i, &ctx))
            .collect();

        let content = serde_json::to_string_pretty(&serde_json::json!({ "questions": questions }))?;
        let extracted_json = extract_json_object(&content);

        Ok(GenerateResponse {
            content,
            extracted_json,
            model: "template".to_string(),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}
