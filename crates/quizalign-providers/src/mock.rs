//! Mock generator for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use quizalign_core::error::ProviderError;
use quizalign_core::traits::{
    extract_json_object, GenerateRequest, GenerateResponse, QuestionGenerator,
};

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Raw response text.
    Content(String),
    /// A transport failure.
    Fail(String),
}

/// A mock generator for exercising the engine without real API calls.
///
/// Replies are served in order; once the script runs out the last reply
/// repeats.
pub struct MockGenerator {
    script: Vec<MockReply>,
    delay: Option<Duration>,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Every request received, in order.
    requests: Mutex<Vec<GenerateRequest>>,
}

impl MockGenerator {
    /// Create a mock that replays the given script.
    pub fn scripted(script: Vec<MockReply>) -> Self {
        Self {
            script,
            delay: None,
            call_count: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that always returns the same response.
    pub fn with_fixed_response(response: &str) -> Self {
        Self::scripted(vec![MockReply::Content(response.to_string())])
    }

    /// Create a mock whose every call fails.
    pub fn failing(message: &str) -> Self {
        Self::scripted(vec![MockReply::Fail(message.to_string())])
    }

    /// Sleep this long before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get the number of calls made to this generator.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this generator.
    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Get every request made to this generator.
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuestionGenerator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let call = self.call_count.fetch_add(1, Ordering::Relaxed) as usize;
        self.requests.lock().unwrap().push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self
            .script
            .get(call)
            .or_else(|| self.script.last())
            .ok_or_else(|| ProviderError::EmptyResponse(self.name().to_string()))?;

        match reply {
            MockReply::Content(content) => Ok(GenerateResponse {
                content: content.clone(),
                extracted_json: extract_json_object(content),
                model: "mock-model".to_string(),
                latency_ms: 1,
            }),
            MockReply::Fail(message) => Err(ProviderError::NetworkError(message.clone()).into()),
        }
    }
}
