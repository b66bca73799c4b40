//! OpenAI chat-completions generator.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use quizalign_core::band::classify;
use quizalign_core::error::ProviderError;
use quizalign_core::traits::{
    extract_json_object, GenerateRequest, GenerateResponse, QuestionGenerator,
};

use crate::fewshot::few_shot_examples;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4.1-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const TEMPERATURE: f64 = 0.1;
const TOP_P: f64 = 0.9;
const MAX_TOKENS: u32 = 2000;

const SYSTEM_PROMPT: &str = "Sei un generatore di domande per docenti italiani. \
Devi restituire solo JSON valido conforme allo schema. \
Domande sempre in italiano, senza soluzione nel prompt. \
Rispetta rigorosamente Disciplina, Argomento e Classe. \
Per MCQ usa sempre 4 opzioni plausibili e tutte diverse. \
Evita spoiler della risposta nel testo della domanda.";

const SCHEMA_HINT: &str = r#"{
  "questions": [
    {
      "type": "MCQ|TF|SHORT|LONG",
      "prompt": "string",
      "options": ["string", "string", "string", "string"],
      "correctAnswer": {"selected": 0} | {"value": true} | {"expected": "string"},
      "points": 1-10,
      "explainForTeacher": "string opzionale"
    }
  ]
}"#;

/// OpenAI-compatible chat-completions backend.
pub struct OpenAiGenerator {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiGenerator {
    pub fn new(api_key: &str, base_url: Option<String>, model: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            api_key: api_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            client,
        }
    }
}

/// Build the user prompt for one generation call.
pub fn build_user_prompt(request: &GenerateRequest) -> String {
    let class_band = classify(&request.class_label);
    let examples = serde_json::json!({
        "questions": few_shot_examples(&request.subject, class_band.band)
    });

    let mut prompt = format!(
        "Genera {} domande per:\nDISCIPLINA: {}\nARGOMENTO: {}\nCLASSE: {} (scuola {}, età {}-{})\n",
        request.count,
        request.subject,
        request.topic,
        request.class_label,
        class_band.band.label(),
        class_band.min_age,
        class_band.max_age,
    );
    if let Some(description) = &request.description {
        prompt.push_str(&format!("DESCRIZIONE: {description}\n"));
    }
    prompt.push_str(&format!("DIFFICOLTÀ: {}\n", request.difficulty));
    prompt.push_str(if request.mix {
        "MIX: Varia i tipi di domanda (soprattutto MCQ, poi TF e SHORT)\n"
    } else {
        "MIX: Solo MCQ\n"
    });
    prompt.push_str(&format!(
        "LEGGIBILITÀ: massimo {} parole per domanda, lessico {}\n",
        class_band.max_prompt_words, class_band.lexicon
    ));
    if let Some(feedback) = &request.feedback {
        prompt.push_str(&format!("\nFEEDBACK PRECEDENTE: {feedback}\n"));
    }
    prompt.push_str(&format!(
        "\nSCHEMA JSON:\n{SCHEMA_HINT}\n\nESEMPIO PERTINENTE:\n{examples}\n\n\
         Rispondi solo con JSON valido, senza testo extra."
    ));
    prompt
}

#[derive(Serialize)]
struct OpenAiRequest {
    model: String,
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
    messages: Vec<OpenAiMessage>,
}

#[derive(Serialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    model: String,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiChoiceMessage,
}

#[derive(Deserialize)]
struct OpenAiChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl QuestionGenerator for OpenAiGenerator {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, request), fields(model = %self.model, count = request.count))]
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let start = Instant::now();

        let body = OpenAiRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            top_p: TOP_P,
            messages: vec![
                OpenAiMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                OpenAiMessage {
                    role: "user".to_string(),
                    content: build_user_prompt(request),
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    ProviderError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                .saturating_mul(1000);
            return Err(ProviderError::RateLimited {
                retry_after_ms: retry_after,
            }
            .into());
        }
        if status == 401 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::AuthenticationFailed(body).into());
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status,
                message: body,
            }
            .into());
        }

        let api_response: OpenAiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status,
                message: format!("failed to parse response: {e}"),
            })?;

        let content = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ProviderError::EmptyResponse(self.name().to_string()))?;
        let extracted_json = extract_json_object(&content);

        Ok(GenerateResponse {
            content,
            extracted_json,
            model: api_response.model,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}
