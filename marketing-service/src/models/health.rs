use serde::Serialize;

/// Marker reported as `model_name` when generation is disabled.
pub const NO_MODEL: &str = "None";

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub use_ollama: bool,
    pub provider: String,
    pub model_name: String,
    /// The key name is part of the public health contract.
    #[serde(rename = "python_version")]
    pub runtime_version: &'static str,
    pub pid: u32,
}
