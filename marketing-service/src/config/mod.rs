use serde::Deserialize;
use service_core::config::{self as core_config, get_env, parse_flag};
use service_core::error::AppError;

/// Port the ATM client expects the service on.
pub const DEFAULT_PORT: u16 = 8001;
const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5:1.5b-instruct";
const DEFAULT_OLLAMA_BASE: &str = "http://localhost:11434";

/// Matches the default timeout of the OpenAI client libraries.
const DEFAULT_TIMEOUT_SECS: u64 = 600;
const DEFAULT_RETRIES: u32 = 2;
const DEFAULT_OUTPUT_RETRIES: u32 = 3;

#[derive(Debug, Clone, Deserialize)]
pub struct MarketingConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub ollama: OllamaConfig,
    pub agent: AgentConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OllamaConfig {
    /// Generation on/off switch, fixed for the process lifetime.
    pub enabled: bool,
    /// Model served by Ollama (e.g., qwen2.5:1.5b-instruct).
    pub model: String,
    /// Server root without the `/v1` suffix.
    pub base_url: String,
    /// Check `/v1/models` during startup and disable generation if it fails.
    pub verify_on_startup: bool,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Transport-level retries per model call.
    pub retries: u32,
    /// Re-prompts after a malformed or invalid reply.
    pub output_retries: u32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            base_url: DEFAULT_OLLAMA_BASE.to_string(),
            verify_on_startup: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            output_retries: DEFAULT_OUTPUT_RETRIES,
        }
    }
}

impl OllamaConfig {
    /// OpenAI-compatible API root.
    pub fn api_base(&self) -> String {
        format!("{}/v1", self.base_url.trim_end_matches('/'))
    }
}

impl MarketingConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load_with_default_port(DEFAULT_PORT)?;
        let is_prod = core_config::is_production();

        Ok(MarketingConfig {
            common: common_config,
            ollama: OllamaConfig {
                enabled: parse_flag(&get_env("USE_OLLAMA", Some("1"), is_prod)?),
                model: get_env("OLLAMA_MODEL", Some(DEFAULT_OLLAMA_MODEL), is_prod)?,
                base_url: get_env("OLLAMA_BASE", Some(DEFAULT_OLLAMA_BASE), is_prod)?,
                verify_on_startup: parse_flag(&get_env(
                    "OLLAMA_VERIFY_ON_STARTUP",
                    Some("false"),
                    is_prod,
                )?),
                timeout_secs: get_env(
                    "OLLAMA_TIMEOUT_SECS",
                    Some(&DEFAULT_TIMEOUT_SECS.to_string()),
                    is_prod,
                )?
                .parse()
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            },
            agent: AgentConfig {
                retries: get_env("AGENT_RETRIES", Some(&DEFAULT_RETRIES.to_string()), is_prod)?
                    .parse()
                    .unwrap_or(DEFAULT_RETRIES),
                output_retries: get_env(
                    "AGENT_OUTPUT_RETRIES",
                    Some(&DEFAULT_OUTPUT_RETRIES.to_string()),
                    is_prod,
                )?
                .parse()
                .unwrap_or(DEFAULT_OUTPUT_RETRIES),
            },
        })
    }

    /// Config with generation switched off; used by tests and local runs.
    pub fn fallback_only() -> Self {
        Self {
            common: core_config::Config::with_port(DEFAULT_PORT),
            ollama: OllamaConfig {
                enabled: false,
                ..OllamaConfig::default()
            },
            agent: AgentConfig::default(),
        }
    }
}
