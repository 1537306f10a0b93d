//! Appointment scheduler
//!
//! Computes bookable time slots from opening hours, a production calendar,
//! work breaks and existing bookings, books appointments without double
//! booking, and detects appointment changes made elsewhere.

use std::sync::Arc;

use chrono::NaiveDateTime;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Source of the current business-local time
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(|| chrono::Local::now().naive_local())
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub records: Arc<dyn repository::ActualRecordsLoader>,
    pub clock: Clock,
}

impl AppState {
    pub fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }
}
