#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use marketing_service::config::{AgentConfig, MarketingConfig};
use marketing_service::services::providers::ChatProvider;
use marketing_service::services::GenerationState;
use marketing_service::startup::{build_router, AppState};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const WIN_BIG_AD: &str = r#"{"title": "Win Big!", "description": "Spend and win rewards today!", "min_purchase": 300, "reward": "free coffee"}"#;

/// Agent settings that never sleep between attempts.
pub fn agent_config() -> AgentConfig {
    AgentConfig {
        retries: 0,
        output_retries: 1,
    }
}

pub fn test_config() -> MarketingConfig {
    let mut config = MarketingConfig::fallback_only();
    config.common.host = "127.0.0.1".to_string();
    config.common.port = 0;
    config
}

pub fn router_with(generation: GenerationState) -> Router {
    build_router(AppState::new(generation))
}

pub fn router_with_provider(provider: Arc<dyn ChatProvider>) -> Router {
    router_with(GenerationState::with_provider(provider, &agent_config()))
}

/// Send a GET and return status plus parsed JSON body.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// Assert a JSON body is a valid ad.
pub fn assert_valid_ad(body: &Value) {
    let title = body["title"].as_str().expect("title is a string");
    let description = body["description"].as_str().expect("description is a string");
    let reward = body["reward"].as_str().expect("reward is a string");

    assert!((5..=100).contains(&title.chars().count()), "title length: {title:?}");
    assert!(
        (10..=300).contains(&description.chars().count()),
        "description length: {description:?}"
    );
    assert!(body["min_purchase"].is_number());
    assert!(!reward.is_empty());
}

pub fn assert_fallback_ad(body: &Value) {
    assert_valid_ad(body);
    assert_eq!(body["title"], "ATM Promotion!");
    assert_eq!(
        body["description"],
        "Make purchases of at least 500 lei and you could win a vacation in Dubai!"
    );
    assert_eq!(body["min_purchase"].as_f64(), Some(500.0));
    assert_eq!(body["reward"], "vacation in Dubai");
}
