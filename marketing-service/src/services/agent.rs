//! Structured-output agent bound to [`AdMessage`].
//!
//! The agent owns the system instruction and the retry budgets. Each run is a
//! short conversation: the user prompt, and on malformed replies a correction
//! turn, until the model produces a JSON object or the budget runs out.

use super::generation::GenerationError;
use super::providers::{ChatMessage, ChatProvider, CompletionParams, FinishReason, OutputSchema};
use crate::config::AgentConfig;
use crate::models::{AdCoercionError, AdMessage};
use serde_json::{Map, Value};
use service_core::retry::{retry_call, RetryConfig};
use std::sync::Arc;
use validator::Validate;

pub const SYSTEM_PROMPT: &str = "Generate a short, catchy ATM advertisement in English. \
Output must be valid JSON strictly matching AdMessage: \
{\"title\": \"...\", \"description\": \"...\", \"min_purchase\": ..., \"reward\": \"...\"}";

/// Output of a successful agent run.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentOutput {
    /// Reply deserialized and validated as an ad.
    Structured(AdMessage),
    /// JSON object that did not deserialize as an ad and still needs coercion.
    /// Returned when coercion succeeds, or as-is on the last attempt.
    Mapping(Map<String, Value>),
}

impl AgentOutput {
    pub fn into_ad(self) -> Result<AdMessage, AdCoercionError> {
        match self {
            AgentOutput::Structured(ad) => Ok(ad),
            AgentOutput::Mapping(map) => AdMessage::from_mapping(&map),
        }
    }
}

enum Reply {
    Ad(AdMessage),
    Object(Map<String, Value>),
    Invalid(String),
}

pub struct AdAgent {
    provider: Arc<dyn ChatProvider>,
    system_prompt: String,
    retry: RetryConfig,
    output_retries: u32,
}

impl AdAgent {
    pub fn new(provider: Arc<dyn ChatProvider>, config: &AgentConfig) -> Self {
        Self {
            provider,
            system_prompt: SYSTEM_PROMPT.to_string(),
            retry: RetryConfig::with_max_retries(config.retries),
            output_retries: config.output_retries,
        }
    }

    /// Override transport retry timing.
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn provider(&self) -> &dyn ChatProvider {
        self.provider.as_ref()
    }

    /// Send `prompt` and return the model's structured answer.
    pub async fn run(&self, prompt: &str) -> Result<AgentOutput, GenerationError> {
        let params = CompletionParams {
            output_schema: Some(OutputSchema {
                name: "AdMessage".to_string(),
                schema: AdMessage::json_schema(),
            }),
        };

        let mut messages = vec![
            ChatMessage::system(self.system_prompt.as_str()),
            ChatMessage::user(prompt),
        ];
        let attempts = self.output_retries + 1;
        let mut last_reason = String::new();

        for attempt in 1..=attempts {
            let response = {
                let conversation = &messages;
                let params = &params;
                retry_call(&self.retry, "chat_completion", || {
                    self.provider.complete(conversation, params)
                })
                .await?
            };

            tracing::debug!(
                attempt,
                input_tokens = response.input_tokens,
                output_tokens = response.output_tokens,
                finish_reason = ?response.finish_reason,
                "Model replied"
            );

            let truncated = response.finish_reason == FinishReason::Length;
            let text = response.text.unwrap_or_default();
            let mut reason = match parse_reply(&text) {
                Reply::Ad(ad) => return Ok(AgentOutput::Structured(ad)),
                Reply::Object(map) => match AdMessage::from_mapping(&map) {
                    Ok(_) => return Ok(AgentOutput::Mapping(map)),
                    // Out of budget: hand the object back and let coercion fail upstream.
                    Err(_) if attempt == attempts => return Ok(AgentOutput::Mapping(map)),
                    Err(e) => e.to_string(),
                },
                Reply::Invalid(reason) => reason,
            };
            if truncated {
                reason.push_str("; the reply was cut off at the token limit, keep it shorter");
            }

            tracing::warn!(
                attempt,
                max_attempts = attempts,
                reason = %reason,
                "Model reply rejected"
            );
            messages.push(ChatMessage::assistant(text));
            messages.push(ChatMessage::user(format!(
                "Your previous reply was invalid: {}. \
                 Reply with only a JSON object matching AdMessage.",
                reason
            )));
            last_reason = reason;
        }

        Err(GenerationError::OutputRetriesExhausted {
            attempts,
            reason: last_reason,
        })
    }
}

/// Remove a surrounding Markdown code fence, if any.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    // Drop the info string ("json") on the opening line.
    match inner.find('\n') {
        Some(newline) if !inner[..newline].trim_start().starts_with('{') => {
            inner[newline + 1..].trim()
        }
        _ => inner.trim(),
    }
}

fn parse_reply(text: &str) -> Reply {
    let value: Value = match serde_json::from_str(strip_code_fence(text)) {
        Ok(value) => value,
        Err(e) => return Reply::Invalid(format!("not valid JSON ({})", e)),
    };

    let Value::Object(map) = value else {
        return Reply::Invalid("expected a JSON object".to_string());
    };

    match serde_json::from_value::<AdMessage>(Value::Object(map.clone())) {
        Ok(ad) => match ad.validate() {
            Ok(()) => Reply::Ad(ad),
            Err(e) => Reply::Invalid(format!("validation failed ({})", e)),
        },
        Err(_) => Reply::Object(map),
    }
}
