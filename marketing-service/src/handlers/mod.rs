//! HTTP handlers for the marketing service.

pub mod ad;
pub mod health;

use axum::http::Uri;
use service_core::error::AppError;

/// Fallback for unknown routes.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(anyhow::anyhow!("no route for {}", uri.path()))
}
