//! Schedule and slot endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    error::AppResult,
    models::{SampledSlots, Schedule, ServiceEntity, ServiceId},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    /// Preferred day (YYYY-MM-DD), today when absent
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
}

/// Schedule of the first open day from the requested date on
pub async fn get_schedule(
    State(state): State<AppState>,
    Query(query): Query<ScheduleQuery>,
) -> AppResult<Json<Schedule>> {
    let now = state.now();
    let date = query.date.unwrap_or_else(|| now.date());
    let schedule = state.services.scheduling.schedule(now, date).await?;
    Ok(Json(schedule))
}

pub async fn list_services(State(state): State<AppState>) -> AppResult<Json<Vec<ServiceEntity>>> {
    let services = state.services.scheduling.services().await?;
    Ok(Json(services))
}

/// Bookable slots of a day for one service
pub async fn get_slots(
    State(state): State<AppState>,
    Path(service_id): Path<ServiceId>,
    Query(query): Query<SlotsQuery>,
) -> AppResult<Json<SampledSlots>> {
    let slots = state
        .services
        .scheduling
        .sampled_free_time_slots(state.now(), query.date, service_id)
        .await?;
    Ok(Json(slots))
}
