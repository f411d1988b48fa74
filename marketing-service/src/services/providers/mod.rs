//! Chat model provider abstractions and implementations.
//!
//! The agent talks to models through [`ChatProvider`], so the Ollama backend
//! can be swapped for the mock in tests.

pub mod mock;
pub mod ollama;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use service_core::retry::Retryable;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error("Rate limited")]
    RateLimited,

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl Retryable for ProviderError {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::ServerError { .. }
                | ProviderError::RateLimited
                | ProviderError::NetworkError(_)
        )
    }
}

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of a chat conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// JSON schema the reply must follow.
#[derive(Debug, Clone)]
pub struct OutputSchema {
    pub name: String,
    pub schema: Value,
}

/// Generation parameters for chat requests.
#[derive(Debug, Clone, Default)]
pub struct CompletionParams {
    /// Structured output constraint.
    pub output_schema: Option<OutputSchema>,
}

/// Reason why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Complete,
    Length,
    ContentFilter,
}

/// Result of a provider response.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// Assistant message content.
    pub text: Option<String>,

    /// Input tokens consumed.
    pub input_tokens: u32,

    /// Output tokens generated.
    pub output_tokens: u32,

    pub finish_reason: FinishReason,
}

/// Trait for chat completion providers (e.g., Ollama).
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Run one chat completion over the full conversation.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &CompletionParams,
    ) -> Result<ProviderResponse, ProviderError>;

    /// Check that the backend is reachable and serves the configured model.
    async fn health_check(&self) -> Result<(), ProviderError>;

    /// Provider name reported on `/health`.
    fn name(&self) -> &str;

    fn model(&self) -> &str;
}
