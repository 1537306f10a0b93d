//! Change detection trigger

use axum::{extract::State, Json};

use crate::{
    error::{AppResult, ResultExt},
    models::ChangeEvent,
    AppState,
};

/// Reconcile the tracked snapshot against the current appointments
pub async fn detect_changes(State(state): State<AppState>) -> AppResult<Json<Vec<ChangeEvent>>> {
    let actual = state
        .records
        .load_actual_records()
        .await
        .context("failed to load actual records")?;
    let events = state.services.tracking.detect_changes(actual).await?;
    Ok(Json(events))
}
