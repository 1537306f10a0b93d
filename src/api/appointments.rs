//! Customer and appointment endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{customer::CreateCustomer, CustomerEntity, CustomerId, RecordEntity, ServiceId},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct CustomerQuery {
    pub identity: String,
}

/// Book appointment request
#[derive(Debug, Deserialize)]
pub struct CreateAppointment {
    pub customer_id: CustomerId,
    pub service_id: ServiceId,
    /// Start (YYYY-MM-DDTHH:MM:SS)
    pub start: NaiveDateTime,
}

pub async fn register_customer(
    State(state): State<AppState>,
    Json(data): Json<CreateCustomer>,
) -> AppResult<(StatusCode, Json<CustomerEntity>)> {
    let customer = state.services.scheduling.register_customer(data).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn find_customer(
    State(state): State<AppState>,
    Query(query): Query<CustomerQuery>,
) -> AppResult<Json<CustomerEntity>> {
    state
        .services
        .scheduling
        .customer_by_identity(&query.identity)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Customer {} not found", query.identity)))
}

/// Book an appointment and record it in the tracked snapshot
pub async fn create_appointment(
    State(state): State<AppState>,
    Json(data): Json<CreateAppointment>,
) -> AppResult<(StatusCode, Json<RecordEntity>)> {
    let record = state
        .services
        .scheduling
        .make_appointment(state.now(), data.start, data.customer_id, data.service_id)
        .await?;
    state.services.tracking.add_appointment(record.clone()).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn get_active_appointment(
    State(state): State<AppState>,
    Path(customer_id): Path<CustomerId>,
) -> AppResult<Json<RecordEntity>> {
    state
        .services
        .scheduling
        .active_appointment(customer_id)
        .await?
        .map(Json)
        .ok_or_else(|| {
            AppError::NotFound(format!("No active appointment for customer {}", customer_id))
        })
}

/// Cancel the customer's appointment and drop it from the tracked snapshot
pub async fn cancel_appointment(
    State(state): State<AppState>,
    Path(customer_id): Path<CustomerId>,
) -> AppResult<Json<RecordEntity>> {
    let record = state
        .services
        .scheduling
        .cancel_appointment_for_customer(customer_id)
        .await?;
    state.services.tracking.remove_appointment(record.id).await?;
    Ok(Json(record))
}
