use crate::models::{fallback_ad, AdMessage};
use crate::services::GenerationError;
use crate::startup::AppState;
use axum::{extract::State, Json};

/// `GET /ad`: a generated ad, or the fallback when generation is off or fails.
pub async fn get_ad(State(state): State<AppState>) -> Json<AdMessage> {
    let ad = match state.generation.generate_ad().await {
        Ok(ad) => ad,
        Err(GenerationError::Disabled) => fallback_ad().clone(),
        Err(e) => {
            tracing::warn!(error = %e, "Ad generation failed, serving fallback");
            fallback_ad().clone()
        }
    };

    Json(ad)
}
