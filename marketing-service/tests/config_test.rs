use marketing_service::config::MarketingConfig;
use std::env;

// Environment variables are process-wide, so this file holds a single test.
#[test]
fn load_reads_service_variables_from_environment() {
    env::remove_var("ENVIRONMENT");
    env::remove_var("APP__PORT");
    env::set_var("USE_OLLAMA", "false");
    env::set_var("OLLAMA_MODEL", "llama3.2:1b");
    env::set_var("OLLAMA_BASE", "http://ollama:11434");
    env::set_var("AGENT_OUTPUT_RETRIES", "5");

    let config = MarketingConfig::load().unwrap();

    assert!(!config.ollama.enabled);
    assert_eq!(config.ollama.model, "llama3.2:1b");
    assert_eq!(config.ollama.api_base(), "http://ollama:11434/v1");
    assert_eq!(config.agent.output_retries, 5);
    assert_eq!(config.agent.retries, 2);
    assert_eq!(config.common.port, 8001);
}
