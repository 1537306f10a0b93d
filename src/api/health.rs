//! Health check endpoint

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// Current status of the service
    pub status: String,
    /// Version of the service
    pub version: String,
    /// Where the tracked appointments snapshot is kept
    pub state_file: String,
    /// Cadence of offered booking slots
    pub sample_rate_minutes: u32,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        state_file: state.config.scheduling.state_file.clone(),
        sample_rate_minutes: state.config.scheduling.sample_rate_minutes,
    })
}
