//! Application startup and lifecycle management.

use crate::config::MarketingConfig;
use crate::handlers::{ad::get_ad, health::health_check, not_found};
use crate::services::GenerationState;
use axum::{body::Body, middleware, routing::get, Router};
use service_core::error::AppError;
use service_core::middleware::{make_request_span, request_id_middleware};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub generation: Arc<GenerationState>,
}

impl AppState {
    pub fn new(generation: GenerationState) -> Self {
        Self {
            generation: Arc::new(generation),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ad", get(get_ad))
        .route("/health", get(health_check))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application, initializing the generation client from config.
    pub async fn build(config: MarketingConfig) -> Result<Self, AppError> {
        let generation = GenerationState::initialize(&config.ollama, &config.agent).await;
        Self::build_with_generation(config, generation).await
    }

    /// Build the application around an already initialized generation state.
    pub async fn build_with_generation(
        config: MarketingConfig,
        generation: GenerationState,
    ) -> Result<Self, AppError> {
        let host = config.common.host.as_str();
        let port = config.common.port;

        // Port 0 = random port for testing
        let listener = TcpListener::bind((host, port)).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}:{}: {}", host, port, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port,
            use_ollama = generation.is_enabled(),
            model = generation.model_name(),
            "Marketing service listening"
        );

        Ok(Self {
            port,
            listener,
            state: AppState::new(generation),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Run until `shutdown` resolves, then drain in-flight requests.
    pub async fn run_with_shutdown<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = build_router(self.state);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
}
