//! Error types.
//!
//! [`ProviderError`] covers transport failures of a generation backend.
//! [`GenerationError`] is what the orchestrator returns; it maps onto the
//! caller-facing [`ErrorResponse`].

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Errors that can occur when talking to a generation backend.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The backend answered without any content.
    #[error("empty response from {0}")]
    EmptyResponse(String),
}

impl ProviderError {
    /// Returns `true` if retrying cannot help.
    pub fn is_permanent(&self) -> bool {
        matches!(self, ProviderError::AuthenticationFailed(_))
    }
}

/// Caller-facing error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Misaligned,
    Validation,
    PostValidateFail,
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::Misaligned => write!(f, "MISALIGNED"),
            ErrorCode::Validation => write!(f, "VALIDATION"),
            ErrorCode::PostValidateFail => write!(f, "POST_VALIDATE_FAIL"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// Structured failure returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub details: Value,
}

/// Failure of an orchestration call.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The request itself is unusable.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Strict mode rejected the final set.
    #[error(
        "generated set is not aligned: {accepted_count}/{requested_count} items, \
         average coverage {avg_coverage:.2}"
    )]
    Misaligned {
        accepted_count: usize,
        requested_count: usize,
        avg_coverage: f64,
        suggestion: String,
    },

    /// An outgoing item failed its final re-check.
    #[error("item {index} failed post-validation: {reasons}")]
    PostValidateFail { index: usize, reasons: String },

    /// The final attempt produced no usable batch.
    #[error("malformed batch on final attempt: {0}")]
    MalformedBatch(String),

    /// The generation backend failed on the final attempt.
    #[error("generation failed on attempt {attempt}")]
    Capability {
        attempt: u32,
        #[source]
        source: anyhow::Error,
    },
}

impl GenerationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            GenerationError::Validation(_) => ErrorCode::Validation,
            GenerationError::Misaligned { .. } => ErrorCode::Misaligned,
            GenerationError::PostValidateFail { .. } => ErrorCode::PostValidateFail,
            GenerationError::MalformedBatch(_) | GenerationError::Capability { .. } => {
                ErrorCode::InternalError
            }
        }
    }

    /// Build the caller-facing response for this error.
    pub fn to_response(&self) -> ErrorResponse {
        let details = match self {
            GenerationError::Misaligned {
                accepted_count,
                requested_count,
                avg_coverage,
                suggestion,
            } => json!({
                "acceptedCount": accepted_count,
                "requestedCount": requested_count,
                "avgCoverage": avg_coverage,
                "suggestion": suggestion,
            }),
            GenerationError::PostValidateFail { index, reasons } => json!({
                "index": index,
                "reasons": reasons,
            }),
            GenerationError::Capability { attempt, source } => json!({
                "attempt": attempt,
                "cause": format!("{source:#}"),
            }),
            GenerationError::Validation(_) | GenerationError::MalformedBatch(_) => Value::Null,
        };
        ErrorResponse {
            error_code: self.code(),
            message: self.to_string(),
            details,
        }
    }
}
