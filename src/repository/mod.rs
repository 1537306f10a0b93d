//! Collaborator contracts consumed by the scheduling core
//!
//! Every data source the services depend on is reached through one of these
//! narrow traits. [`Repository`] bundles one handle per contract.

pub mod memory;
pub mod state_file;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    error::AppResult,
    models::{
        AppointmentsState, BusyPeriod, CustomerEntity, CustomerId, ProductionCalendar,
        RecordEntity, RecordId, ServiceEntity, ServiceId, WorkBreak, WorkingHours,
    },
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceLoader: Send + Sync {
    async fn load_service(&self, id: ServiceId) -> AppResult<ServiceEntity>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServicesLoader: Send + Sync {
    async fn load_services(&self) -> AppResult<Vec<ServiceEntity>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerLoader: Send + Sync {
    async fn load_customer(&self, id: CustomerId) -> AppResult<CustomerEntity>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerByIdentityLoader: Send + Sync {
    async fn load_customer_by_identity(&self, identity: String)
        -> AppResult<Option<CustomerEntity>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerCreator: Send + Sync {
    async fn create_customer(&self, identity: String, name: String) -> AppResult<CustomerEntity>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerActiveAppointmentLoader: Send + Sync {
    async fn load_active_appointment(
        &self,
        customer_id: CustomerId,
    ) -> AppResult<Option<RecordEntity>>;
}

/// Persists a new appointment and returns it with its assigned id
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentCreator: Send + Sync {
    async fn create_appointment(&self, record: RecordEntity) -> AppResult<RecordEntity>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentRemover: Send + Sync {
    async fn remove_appointment(&self, id: RecordId) -> AppResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductionCalendarLoader: Send + Sync {
    async fn load_production_calendar(&self) -> AppResult<ProductionCalendar>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkingHoursLoader: Send + Sync {
    async fn load_working_hours(&self) -> AppResult<WorkingHours>;
}

/// Already booked spans of a day
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BusyPeriodsLoader: Send + Sync {
    async fn load_busy_periods(&self, date: NaiveDate) -> AppResult<Vec<BusyPeriod>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkBreaksLoader: Send + Sync {
    async fn load_work_breaks(&self) -> AppResult<Vec<WorkBreak>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentsStateLoader: Send + Sync {
    async fn load_state(&self) -> AppResult<AppointmentsState>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentsStateSaver: Send + Sync {
    async fn save_state(&self, state: &AppointmentsState) -> AppResult<()>;
}

/// Authoritative current appointments, fed to change detection
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActualRecordsLoader: Send + Sync {
    async fn load_actual_records(&self) -> AppResult<Vec<RecordEntity>>;
}

/// Calendar data feeds
#[derive(Clone)]
pub struct CalendarRepository {
    pub production_calendar: Arc<dyn ProductionCalendarLoader>,
    pub working_hours: Arc<dyn WorkingHoursLoader>,
    pub busy_periods: Arc<dyn BusyPeriodsLoader>,
    pub work_breaks: Arc<dyn WorkBreaksLoader>,
}

/// Service and customer lookups plus appointment persistence
#[derive(Clone)]
pub struct BookingRepository {
    pub service: Arc<dyn ServiceLoader>,
    pub services: Arc<dyn ServicesLoader>,
    pub customer: Arc<dyn CustomerLoader>,
    pub customer_by_identity: Arc<dyn CustomerByIdentityLoader>,
    pub customer_creator: Arc<dyn CustomerCreator>,
    pub active_appointment: Arc<dyn CustomerActiveAppointmentLoader>,
    pub appointment_creator: Arc<dyn AppointmentCreator>,
    pub appointment_remover: Arc<dyn AppointmentRemover>,
}

/// Snapshot I/O for change detection
#[derive(Clone)]
pub struct StateRepository {
    pub loader: Arc<dyn AppointmentsStateLoader>,
    pub saver: Arc<dyn AppointmentsStateSaver>,
}

/// Every collaborator the services need
#[derive(Clone)]
pub struct Repository {
    pub calendar: CalendarRepository,
    pub booking: BookingRepository,
    pub state: StateRepository,
    pub actual_records: Arc<dyn ActualRecordsLoader>,
}

impl Repository {
    /// Wire every contract to a single in-memory store
    pub fn in_memory(store: Arc<memory::InMemoryStore>) -> Self {
        Self {
            calendar: CalendarRepository {
                production_calendar: store.clone(),
                working_hours: store.clone(),
                busy_periods: store.clone(),
                work_breaks: store.clone(),
            },
            booking: BookingRepository {
                service: store.clone(),
                services: store.clone(),
                customer: store.clone(),
                customer_by_identity: store.clone(),
                customer_creator: store.clone(),
                active_appointment: store.clone(),
                appointment_creator: store.clone(),
                appointment_remover: store.clone(),
            },
            state: StateRepository {
                loader: store.clone(),
                saver: store.clone(),
            },
            actual_records: store,
        }
    }

    /// Replace the snapshot storage, keeping every other collaborator
    pub fn with_state_store<S>(mut self, store: Arc<S>) -> Self
    where
        S: AppointmentsStateLoader + AppointmentsStateSaver + 'static,
    {
        self.state = StateRepository {
            loader: store.clone(),
            saver: store,
        };
        self
    }
}
