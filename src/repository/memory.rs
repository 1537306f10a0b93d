//! In-memory implementation of every collaborator contract

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use tokio::sync::RwLock;

use super::{
    ActualRecordsLoader, AppointmentCreator, AppointmentRemover, AppointmentsStateLoader,
    AppointmentsStateSaver, BusyPeriodsLoader, CustomerActiveAppointmentLoader,
    CustomerByIdentityLoader, CustomerCreator, CustomerLoader, ProductionCalendarLoader,
    ServiceLoader, ServicesLoader, WorkBreaksLoader, WorkingHoursLoader,
};
use crate::{
    error::{AppError, AppResult},
    models::{
        AppointmentsState, BusyPeriod, CustomerEntity, CustomerId, DateTimePeriod, Period,
        ProductionCalendar, RecordEntity, RecordId, RecordStatus, ServiceEntity, ServiceId,
        TimePeriod, WorkBreak, WorkingHours,
    },
};

/// Initial content of an [`InMemoryStore`]
#[derive(Debug, Clone, Default)]
pub struct StoreSeed {
    pub working_hours: WorkingHours,
    pub production_calendar: ProductionCalendar,
    pub work_breaks: Vec<WorkBreak>,
    pub services: Vec<ServiceEntity>,
}

/// Process-local store backing every loader, creator and remover
pub struct InMemoryStore {
    working_hours: RwLock<WorkingHours>,
    production_calendar: RwLock<ProductionCalendar>,
    work_breaks: RwLock<Vec<WorkBreak>>,
    services: RwLock<BTreeMap<ServiceId, ServiceEntity>>,
    customers: RwLock<BTreeMap<CustomerId, CustomerEntity>>,
    records: RwLock<BTreeMap<RecordId, RecordEntity>>,
    state: RwLock<AppointmentsState>,
    next_record_id: AtomicI64,
    next_customer_id: AtomicI64,
}

impl InMemoryStore {
    pub fn new(seed: StoreSeed) -> Self {
        Self {
            working_hours: RwLock::new(seed.working_hours),
            production_calendar: RwLock::new(seed.production_calendar),
            work_breaks: RwLock::new(seed.work_breaks),
            services: RwLock::new(seed.services.into_iter().map(|s| (s.id, s)).collect()),
            customers: RwLock::new(BTreeMap::new()),
            records: RwLock::new(BTreeMap::new()),
            state: RwLock::new(AppointmentsState::new()),
            next_record_id: AtomicI64::new(1),
            next_customer_id: AtomicI64::new(1),
        }
    }

    /// Store a record made outside the booking flow, assigning it an id
    pub async fn insert_record(&self, mut record: RecordEntity) -> RecordEntity {
        record.id = self.next_record_id.fetch_add(1, Ordering::SeqCst);
        self.records.write().await.insert(record.id, record.clone());
        record
    }

    pub async fn record(&self, id: RecordId) -> AppResult<RecordEntity> {
        self.records
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Record {} not found", id)))
    }

    pub async fn records(&self) -> Vec<RecordEntity> {
        self.records.read().await.values().cloned().collect()
    }

    pub async fn set_record_status(&self, id: RecordId, status: RecordStatus) -> AppResult<()> {
        self.update_record(id, |r| r.set_status(status)).await
    }

    pub async fn reschedule_record(&self, id: RecordId, period: DateTimePeriod) -> AppResult<()> {
        self.update_record(id, |r| r.reschedule(period)).await
    }

    pub async fn archive_record(&self, id: RecordId) -> AppResult<()> {
        self.update_record(id, |r| r.archive()).await
    }

    /// Drop a record without going through the remover contract
    pub async fn delete_record(&self, id: RecordId) -> AppResult<()> {
        self.records
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Record {} not found", id)))
    }

    async fn update_record<F>(&self, id: RecordId, update: F) -> AppResult<()>
    where
        F: FnOnce(&mut RecordEntity) -> AppResult<()>,
    {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Record {} not found", id)))?;
        update(record)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(StoreSeed::default())
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default()
}

/// Part of `period` falling on `date`, as clock times
fn busy_part_on(period: &DateTimePeriod, date: NaiveDate) -> Option<TimePeriod> {
    if period.start.date() > date || period.end.date() < date {
        return None;
    }

    let start = if period.start.date() == date {
        period.start.time()
    } else {
        NaiveTime::default()
    };
    let end = if period.end.date() == date {
        period.end.time()
    } else {
        end_of_day()
    };

    let part = Period { start, end };
    part.is_valid().then_some(part)
}

#[async_trait]
impl ServiceLoader for InMemoryStore {
    async fn load_service(&self, id: ServiceId) -> AppResult<ServiceEntity> {
        self.services
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Service {} not found", id)))
    }
}

#[async_trait]
impl ServicesLoader for InMemoryStore {
    async fn load_services(&self) -> AppResult<Vec<ServiceEntity>> {
        Ok(self.services.read().await.values().cloned().collect())
    }
}

#[async_trait]
impl CustomerLoader for InMemoryStore {
    async fn load_customer(&self, id: CustomerId) -> AppResult<CustomerEntity> {
        self.customers
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Customer {} not found", id)))
    }
}

#[async_trait]
impl CustomerByIdentityLoader for InMemoryStore {
    async fn load_customer_by_identity(
        &self,
        identity: String,
    ) -> AppResult<Option<CustomerEntity>> {
        Ok(self
            .customers
            .read()
            .await
            .values()
            .find(|c| c.identity == identity)
            .cloned())
    }
}

#[async_trait]
impl CustomerCreator for InMemoryStore {
    async fn create_customer(&self, identity: String, name: String) -> AppResult<CustomerEntity> {
        let mut customers = self.customers.write().await;
        if customers.values().any(|c| c.identity == identity) {
            return Err(AppError::Validation(format!(
                "Customer with identity {} already exists",
                identity
            )));
        }

        let customer = CustomerEntity {
            id: self.next_customer_id.fetch_add(1, Ordering::SeqCst),
            identity,
            name,
        };
        customers.insert(customer.id, customer.clone());
        Ok(customer)
    }
}

#[async_trait]
impl CustomerActiveAppointmentLoader for InMemoryStore {
    async fn load_active_appointment(
        &self,
        customer_id: CustomerId,
    ) -> AppResult<Option<RecordEntity>> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.customer_id == customer_id && !r.is_archived)
            .min_by_key(|r| r.period)
            .cloned())
    }
}

#[async_trait]
impl AppointmentCreator for InMemoryStore {
    async fn create_appointment(&self, record: RecordEntity) -> AppResult<RecordEntity> {
        Ok(self.insert_record(record).await)
    }
}

#[async_trait]
impl AppointmentRemover for InMemoryStore {
    async fn remove_appointment(&self, id: RecordId) -> AppResult<()> {
        self.delete_record(id).await
    }
}

#[async_trait]
impl ProductionCalendarLoader for InMemoryStore {
    async fn load_production_calendar(&self) -> AppResult<ProductionCalendar> {
        Ok(self.production_calendar.read().await.clone())
    }
}

#[async_trait]
impl WorkingHoursLoader for InMemoryStore {
    async fn load_working_hours(&self) -> AppResult<WorkingHours> {
        Ok(self.working_hours.read().await.clone())
    }
}

#[async_trait]
impl BusyPeriodsLoader for InMemoryStore {
    async fn load_busy_periods(&self, date: NaiveDate) -> AppResult<Vec<BusyPeriod>> {
        let records = self.records.read().await;
        let busy = records
            .values()
            .filter(|r| !r.is_archived)
            .filter_map(|r| {
                busy_part_on(&r.period, date).map(|period| BusyPeriod {
                    period,
                    title: r.title.clone(),
                })
            })
            .collect();
        Ok(busy)
    }
}

#[async_trait]
impl WorkBreaksLoader for InMemoryStore {
    async fn load_work_breaks(&self) -> AppResult<Vec<WorkBreak>> {
        Ok(self.work_breaks.read().await.clone())
    }
}

#[async_trait]
impl AppointmentsStateLoader for InMemoryStore {
    async fn load_state(&self) -> AppResult<AppointmentsState> {
        Ok(self.state.read().await.clone())
    }
}

#[async_trait]
impl AppointmentsStateSaver for InMemoryStore {
    async fn save_state(&self, state: &AppointmentsState) -> AppResult<()> {
        *self.state.write().await = state.clone();
        Ok(())
    }
}

#[async_trait]
impl ActualRecordsLoader for InMemoryStore {
    async fn load_actual_records(&self) -> AppResult<Vec<RecordEntity>> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|r| !r.is_archived)
            .cloned()
            .collect())
    }
}
