//! Process-wide generation state.
//!
//! Computed once at startup and shared read-only with the handlers. A failed
//! initialization leaves generation disabled until the process exits.

use super::agent::AdAgent;
use super::providers::ollama::OllamaChatProvider;
use super::providers::{ChatProvider, ProviderError};
use crate::config::{AgentConfig, OllamaConfig};
use crate::models::health::NO_MODEL;
use crate::models::{AdCoercionError, AdMessage, HealthStatus};
use std::sync::Arc;
use thiserror::Error;

/// User prompt sent for every ad.
pub const AD_PROMPT: &str = "Generate a short, catchy ATM advertisement in English. \
Include: title (5-100 chars), description (10-300 chars), min_purchase, reward. \
Return STRICTLY valid JSON matching AdMessage.";

const FALLBACK_PROVIDER: &str = "fallback";

/// Why a single ad could not be generated.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("generation is disabled")]
    Disabled,

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("model output rejected after {attempts} attempts: {reason}")]
    OutputRetriesExhausted { attempts: u32, reason: String },

    #[error("model output could not be coerced: {0}")]
    Coercion(#[from] AdCoercionError),
}

/// Outcome of startup initialization.
pub struct GenerationState {
    enabled: bool,
    agent: Option<AdAgent>,
}

impl GenerationState {
    /// Build the generation client described by `config`.
    ///
    /// Never fails: any initialization error is logged and yields a disabled
    /// state.
    pub async fn initialize(config: &OllamaConfig, agent_config: &AgentConfig) -> Self {
        if !config.enabled {
            tracing::info!("Ollama generation disabled, using fallback ad");
            return Self::disabled();
        }

        match connect(config).await {
            Ok(provider) => {
                tracing::info!(
                    model = %config.model,
                    base_url = %config.base_url,
                    "Ollama generation enabled"
                );
                Self::with_provider(Arc::new(provider), agent_config)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    model = %config.model,
                    base_url = %config.base_url,
                    "Ollama init failed, generation disabled for this process"
                );
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            agent: None,
        }
    }

    pub fn with_provider(provider: Arc<dyn ChatProvider>, agent_config: &AgentConfig) -> Self {
        Self::with_agent(AdAgent::new(provider, agent_config))
    }

    pub fn with_agent(agent: AdAgent) -> Self {
        Self {
            enabled: true,
            agent: Some(agent),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn provider_name(&self) -> &str {
        match &self.agent {
            Some(agent) if self.enabled => agent.provider().name(),
            _ => FALLBACK_PROVIDER,
        }
    }

    pub fn model_name(&self) -> &str {
        match &self.agent {
            Some(agent) if self.enabled => agent.provider().model(),
            _ => NO_MODEL,
        }
    }

    /// Generate one ad. Every failure is reported, never papered over.
    pub async fn generate_ad(&self) -> Result<AdMessage, GenerationError> {
        let agent = match &self.agent {
            Some(agent) if self.enabled => agent,
            _ => return Err(GenerationError::Disabled),
        };

        let output = agent.run(AD_PROMPT).await?;
        Ok(output.into_ad()?)
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "ok",
            use_ollama: self.is_enabled(),
            provider: self.provider_name().to_string(),
            model_name: self.model_name().to_string(),
            runtime_version: env!("RUSTC_VERSION"),
            pid: std::process::id(),
        }
    }
}

async fn connect(config: &OllamaConfig) -> Result<OllamaChatProvider, ProviderError> {
    let provider = OllamaChatProvider::new(config)?;
    if config.verify_on_startup {
        provider.health_check().await?;
    }
    Ok(provider)
}
