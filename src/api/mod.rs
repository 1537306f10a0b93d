//! HTTP adapter over the scheduling services

pub mod appointments;
pub mod health;
pub mod schedule;
pub mod tracking;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Services and schedule
        .route("/services", get(schedule::list_services))
        .route("/services/:id/slots", get(schedule::get_slots))
        .route("/schedule", get(schedule::get_schedule))
        // Customers and appointments
        .route(
            "/customers",
            get(appointments::find_customer).post(appointments::register_customer),
        )
        .route(
            "/customers/:id/appointment",
            get(appointments::get_active_appointment).delete(appointments::cancel_appointment),
        )
        .route("/appointments", post(appointments::create_appointment))
        // Change tracking
        .route("/tracking/detect", post(tracking::detect_changes))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .layer(TraceLayer::new_for_http())
}
