//! Ollama provider implementation.
//!
//! Talks to Ollama through its OpenAI-compatible `/v1` API.

use super::{
    ChatMessage, ChatProvider, CompletionParams, FinishReason, OutputSchema, ProviderError,
    ProviderResponse,
};
use crate::config::OllamaConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

const PROVIDER_NAME: &str = "ollama";

/// Ollama chat provider.
#[derive(Debug)]
pub struct OllamaChatProvider {
    api_base: String,
    model: String,
    client: Client,
}

impl OllamaChatProvider {
    /// Build the provider without contacting the server.
    pub fn new(config: &OllamaConfig) -> Result<Self, ProviderError> {
        if config.model.trim().is_empty() {
            return Err(ProviderError::NotConfigured(
                "model name is empty".to_string(),
            ));
        }

        let api_base = config.api_base();
        let url = Url::parse(&api_base).map_err(|e| {
            ProviderError::NotConfigured(format!("invalid base URL {}: {}", config.base_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ProviderError::NotConfigured(format!(
                "unsupported URL scheme: {}",
                url.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self {
            api_base,
            model: config.model.clone(),
            client,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    fn response_format(schema: &OutputSchema) -> Value {
        json!({
            "type": "json_schema",
            "json_schema": {
                "name": schema.name,
                "schema": schema.schema,
            }
        })
    }

    async fn error_for_status(response: reqwest::Response) -> ProviderError {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return ProviderError::RateLimited;
        }

        if status.is_server_error() {
            return ProviderError::ServerError {
                status: status.as_u16(),
                message: error_text,
            };
        }

        ProviderError::ApiError(format!("Ollama API error {}: {}", status, error_text))
    }
}

fn network_error(e: reqwest::Error) -> ProviderError {
    ProviderError::NetworkError(e.to_string())
}

#[async_trait]
impl ChatProvider for OllamaChatProvider {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &CompletionParams,
    ) -> Result<ProviderResponse, ProviderError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            stream: false,
            response_format: params.output_schema.as_ref().map(Self::response_format),
        };

        tracing::debug!(
            model = %self.model,
            message_count = messages.len(),
            "Sending chat completion request to Ollama"
        );

        let response = self
            .client
            .post(self.api_url("chat/completions"))
            .json(&request)
            .send()
            .await
            .map_err(network_error)?;

        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }

        let api_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ApiError("response has no choices".to_string()))?;

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("length") => FinishReason::Length,
            Some("content_filter") => FinishReason::ContentFilter,
            _ => FinishReason::Complete,
        };

        let usage = api_response.usage.unwrap_or_default();

        Ok(ProviderResponse {
            text: choice.message.content,
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
            finish_reason,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        let response = self
            .client
            .get(self.api_url("models"))
            .send()
            .await
            .map_err(network_error)?;

        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }

        let models: ModelList = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse model list: {}", e)))?;

        if models.data.iter().any(|m| m.id == self.model) {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(format!(
                "model {} is not served by {}",
                self.model, self.api_base
            )))
        }
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// OpenAI-compatible wire types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}
