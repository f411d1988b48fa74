//! `/ad` behavior across generation outcomes, exercised through the router.

mod common;

use axum::http::StatusCode;
use common::{
    assert_fallback_ad, assert_valid_ad, get_json, router_with, router_with_provider, WIN_BIG_AD,
};
use marketing_service::services::providers::mock::MockChatProvider;
use marketing_service::services::GenerationState;
use std::sync::Arc;

#[tokio::test]
async fn disabled_generation_returns_fallback() {
    for _ in 0..3 {
        let (status, body) = get_json(router_with(GenerationState::disabled()), "/ad").await;
        assert_eq!(status, StatusCode::OK);
        assert_fallback_ad(&body);
    }
}

#[tokio::test]
async fn failed_initialization_returns_fallback() {
    let config = marketing_service::config::OllamaConfig {
        base_url: "::not-a-url::".to_string(),
        ..Default::default()
    };
    let generation = GenerationState::initialize(&config, &common::agent_config()).await;
    assert!(!generation.is_enabled());

    let (status, body) = get_json(router_with(generation), "/ad").await;
    assert_eq!(status, StatusCode::OK);
    assert_fallback_ad(&body);
}

#[tokio::test]
async fn provider_errors_return_fallback_not_error() {
    let provider = Arc::new(MockChatProvider::failing());
    let app = router_with_provider(provider.clone());

    for _ in 0..3 {
        let (status, body) = get_json(app.clone(), "/ad").await;
        assert_eq!(status, StatusCode::OK);
        assert_fallback_ad(&body);
    }
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test]
async fn valid_generated_ad_is_returned_unchanged() {
    let app = router_with_provider(Arc::new(MockChatProvider::with_reply(WIN_BIG_AD)));

    let (status, body) = get_json(app, "/ad").await;
    assert_eq!(status, StatusCode::OK);
    assert_valid_ad(&body);
    assert_eq!(body["title"], "Win Big!");
    assert_eq!(body["description"], "Spend and win rewards today!");
    assert_eq!(body["min_purchase"].as_f64(), Some(300.0));
    assert_eq!(body["reward"], "free coffee");
}

#[tokio::test]
async fn loosely_typed_mapping_is_coerced() {
    let reply = r#"{"title": "Win Big!", "description": "Spend and win rewards today!", "min_purchase": "300", "reward": "free coffee"}"#;
    let app = router_with_provider(Arc::new(MockChatProvider::with_reply(reply)));

    let (_, body) = get_json(app, "/ad").await;
    assert_eq!(body["title"], "Win Big!");
    assert_eq!(body["min_purchase"].as_f64(), Some(300.0));
}

#[tokio::test]
async fn mapping_with_missing_keys_falls_back() {
    let reply = r#"{"headline": "Win Big!", "min_purchase": 300}"#;
    let provider = Arc::new(MockChatProvider::with_reply(reply));
    let app = router_with_provider(provider.clone());

    let (status, body) = get_json(app, "/ad").await;
    assert_eq!(status, StatusCode::OK);
    assert_fallback_ad(&body);
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn mapping_with_missing_keys_is_retried_then_generated() {
    let missing_key = r#"{"title": "Win Big!", "reward": "free coffee"}"#;
    let provider = Arc::new(MockChatProvider::with_replies(vec![
        missing_key.to_string(),
        WIN_BIG_AD.to_string(),
    ]));
    let app = router_with_provider(provider.clone());

    let (status, body) = get_json(app, "/ad").await;
    assert_eq!(status, StatusCode::OK);
    assert_valid_ad(&body);
    assert_eq!(body["title"], "Win Big!");
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn out_of_bounds_output_is_retried_then_falls_back() {
    let too_short = r#"{"title": "Win", "description": "Short", "min_purchase": 300, "reward": "coffee"}"#;
    let provider = Arc::new(MockChatProvider::with_reply(too_short));
    let app = router_with_provider(provider.clone());

    let (status, body) = get_json(app, "/ad").await;
    assert_eq!(status, StatusCode::OK);
    assert_fallback_ad(&body);
    // initial attempt + one output retry
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn malformed_then_valid_output_recovers() {
    let provider = Arc::new(MockChatProvider::with_replies(vec![
        "Here is a great ad for you!".to_string(),
        WIN_BIG_AD.to_string(),
    ]));
    let app = router_with_provider(provider.clone());

    let (_, body) = get_json(app, "/ad").await;
    assert_eq!(body["title"], "Win Big!");
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn unknown_route_returns_json_404() {
    let (status, body) = get_json(router_with(GenerationState::disabled()), "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("/nope"));
}
