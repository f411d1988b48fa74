use crate::models::HealthStatus;
use crate::startup::AppState;
use axum::{extract::State, Json};

/// `GET /health`: static status, no upstream calls.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(state.generation.health())
}
