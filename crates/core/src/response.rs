//! Answer Service
//!
//! Wraps an [`LLMClient`] with the fixed accountant instruction and sampling
//! settings, and folds provider faults into a [`ResponseResult`] the session
//! can show directly. Nothing here returns `Err`: every fault becomes a
//! user-visible message.

use crate::llm_client::{CompletionRequest, LLMClient, ProviderFault};
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub const SYSTEM_INSTRUCTION: &str =
    "You are a helpful accountant and you give detailed tax breakdown and also the percentage.";
pub const MAX_OUTPUT_TOKENS: u32 = 300;
pub const TEMPERATURE: f32 = 0.7;

pub const RATE_LIMITED_MESSAGE: &str = "Rate limit exceeded. Please try again later.";
pub const TIMEOUT_MESSAGE: &str = "Request timed out. Please try again later.";

/// Recoverable failure kinds surfaced to the user in place of an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    RateLimited,
    InvalidRequest,
    UnclassifiedServiceFault,
}

/// Outcome of one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseResult {
    Answer(String),
    Failure { kind: FailureKind, detail: String },
}

impl ResponseResult {
    fn failure(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            detail: detail.into(),
        }
    }
}

impl From<ProviderFault> for ResponseResult {
    fn from(fault: ProviderFault) -> Self {
        match fault {
            ProviderFault::RateLimited(_) => {
                Self::failure(FailureKind::RateLimited, RATE_LIMITED_MESSAGE)
            }
            ProviderFault::InvalidRequest(detail) => Self::failure(
                FailureKind::InvalidRequest,
                format!("Invalid request: {detail}"),
            ),
            ProviderFault::Timeout => {
                Self::failure(FailureKind::UnclassifiedServiceFault, TIMEOUT_MESSAGE)
            }
            ProviderFault::Other(detail) => Self::failure(
                FailureKind::UnclassifiedServiceFault,
                format!("Service error: {detail}"),
            ),
        }
    }
}

/// Sends one question per call. Never retries.
#[derive(Clone)]
pub struct ResponseService {
    client: Arc<dyn LLMClient>,
}

impl ResponseService {
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self { client }
    }

    /// The exact request sent for `question`.
    pub fn request_for(question: &str) -> CompletionRequest {
        CompletionRequest {
            system_prompt: SYSTEM_INSTRUCTION.to_string(),
            user_message: question.to_string(),
            max_tokens: MAX_OUTPUT_TOKENS,
            temperature: TEMPERATURE,
        }
    }

    #[instrument(name = "ask", skip_all, fields(question_len = question.len()))]
    pub async fn ask(&self, question: &str) -> ResponseResult {
        match self.client.complete(Self::request_for(question)).await {
            Ok(text) => {
                let answer = text.trim().to_string();
                info!(answer_len = answer.len(), "Answer received");
                ResponseResult::Answer(answer)
            }
            Err(fault) => {
                warn!(error = %fault, "Answer service failed");
                fault.into()
            }
        }
    }
}
