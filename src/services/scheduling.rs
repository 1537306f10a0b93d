//! Scheduling service: schedules, bookable slots, booking and cancellation

use std::cmp::max;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use super::{calendar, free_slots, locker::PeriodLocker, sampler, work_breaks};
use crate::{
    error::{AppError, AppResult, ResultExt},
    models::{
        customer::CreateCustomer, record::PLACEHOLDER_RECORD_ID, CustomerEntity, CustomerId,
        Period, ProductionCalendar, RecordEntity, RecordStatus, SampledSlots, Schedule,
        ServiceEntity, ServiceId, TimePeriod, WorkingHours,
    },
    repository::Repository,
};

/// Tunables of the scheduling service
#[derive(Debug, Clone)]
pub struct SchedulingSettings {
    /// Cadence at which booking slots are offered
    pub sample_rate: Duration,
    /// How many days ahead to look for an open day
    pub search_horizon_days: i64,
}

impl Default for SchedulingSettings {
    fn default() -> Self {
        Self {
            sample_rate: Duration::minutes(30),
            search_horizon_days: 60,
        }
    }
}

#[derive(Clone)]
pub struct SchedulingService {
    repository: Repository,
    locker: PeriodLocker,
    settings: SchedulingSettings,
}

struct CalendarData {
    working_hours: WorkingHours,
    production_calendar: ProductionCalendar,
}

impl CalendarData {
    fn available(&self, date: NaiveDate, now: NaiveDateTime) -> Vec<TimePeriod> {
        calendar::available_periods(date, &self.working_hours, &self.production_calendar, now)
    }

    fn is_open(&self, date: NaiveDate, now: NaiveDateTime) -> bool {
        !self.available(date, now).is_empty()
    }
}

impl SchedulingService {
    pub fn new(repository: Repository, settings: SchedulingSettings) -> Self {
        Self {
            repository,
            locker: PeriodLocker::new(),
            settings,
        }
    }

    pub fn locker(&self) -> &PeriodLocker {
        &self.locker
    }

    async fn load_calendar(&self) -> AppResult<CalendarData> {
        let working_hours = self
            .repository
            .calendar
            .working_hours
            .load_working_hours()
            .await
            .context("failed to load working hours")?;
        let production_calendar = self
            .repository
            .calendar
            .production_calendar
            .load_production_calendar()
            .await
            .context("failed to load production calendar")?;

        Ok(CalendarData {
            working_hours,
            production_calendar,
        })
    }

    /// Free slots of `date`, as seen at `now`
    pub async fn free_time_slots(
        &self,
        now: NaiveDateTime,
        date: NaiveDate,
    ) -> AppResult<Vec<TimePeriod>> {
        let available = self.load_calendar().await?.available(date, now);
        if available.is_empty() {
            return Ok(Vec::new());
        }

        let busy: Vec<TimePeriod> = self
            .repository
            .calendar
            .busy_periods
            .load_busy_periods(date)
            .await
            .context("failed to load busy periods")?
            .into_iter()
            .map(|b| b.period)
            .collect();
        let breaks = self
            .repository
            .calendar
            .work_breaks
            .load_work_breaks()
            .await
            .context("failed to load work breaks")?;
        let break_periods = work_breaks::resolve(date, &breaks)?;

        let free = free_slots::free_time_slots(&available, &busy, &break_periods);
        tracing::debug!("Free slots on {}: {:?}", date, free);
        Ok(free)
    }

    /// Labelled schedule of the first open day from `preferred_date` on
    pub async fn schedule(
        &self,
        now: NaiveDateTime,
        preferred_date: NaiveDate,
    ) -> AppResult<Schedule> {
        let calendar = self.load_calendar().await?;
        let today = now.date();
        let horizon = self.settings.search_horizon_days;

        let from = max(preferred_date, today);
        let date = (0..=horizon)
            .map_while(|i| from.checked_add_signed(Duration::days(i)))
            .find(|d| calendar.is_open(*d, now))
            .unwrap_or(from);

        let available = calendar.available(date, now);
        let periods = if available.is_empty() {
            Vec::new()
        } else {
            let busy = self
                .repository
                .calendar
                .busy_periods
                .load_busy_periods(date)
                .await
                .context("failed to load busy periods")?;
            let breaks = self
                .repository
                .calendar
                .work_breaks
                .load_work_breaks()
                .await
                .context("failed to load work breaks")?;
            let matched = work_breaks::matching_breaks(date, &breaks)?;
            free_slots::day_schedule(&available, &busy, &matched)
        };

        let next_date = (1..=horizon)
            .map_while(|i| date.checked_add_signed(Duration::days(i)))
            .find(|d| calendar.is_open(*d, now));
        let prev_date = (1..=horizon)
            .map_while(|i| date.checked_sub_signed(Duration::days(i)))
            .take_while(|d| *d >= today)
            .find(|d| calendar.is_open(*d, now));

        Ok(Schedule {
            date,
            periods,
            prev_date,
            next_date,
        })
    }

    /// Bookable slots of `date` sized for the given service
    pub async fn sampled_free_time_slots(
        &self,
        now: NaiveDateTime,
        date: NaiveDate,
        service_id: ServiceId,
    ) -> AppResult<SampledSlots> {
        let service = self.load_service(service_id).await?;
        let free = self.free_time_slots(now, date).await?;
        let slots = sampler::sample(&free, service.duration(), self.settings.sample_rate);

        Ok(SampledSlots { date, slots })
    }

    /// Book `service_id` for `customer_id` starting at `start`
    pub async fn make_appointment(
        &self,
        now: NaiveDateTime,
        start: NaiveDateTime,
        customer_id: CustomerId,
        service_id: ServiceId,
    ) -> AppResult<RecordEntity> {
        let service = self.load_service(service_id).await?;
        let customer = self
            .repository
            .booking
            .customer
            .load_customer(customer_id)
            .await
            .context("failed to load customer")?;

        let end = start
            .checked_add_signed(service.duration())
            .ok_or(AppError::InvalidDateTimePeriod)?;
        let period = Period::new(start, end)?;

        // Held until this function returns, whatever the outcome
        let _guard = self.locker.lock(period).map_err(|e| {
            tracing::warn!("Period {} is being booked concurrently", period);
            e
        })?;

        if let Some(active) = self
            .repository
            .booking
            .active_appointment
            .load_active_appointment(customer.id)
            .await
            .context("failed to load active appointment")?
        {
            tracing::warn!(
                "Customer {} already has appointment {} at {}",
                customer.id,
                active.id,
                active.period
            );
            return Err(AppError::AnotherAppointmentIsAlreadyScheduled);
        }

        let free = self.free_time_slots(now, start.date()).await?;
        let fits = period
            .time_of_day()
            .map(|requested| free.iter().any(|slot| slot.contains(&requested)))
            .unwrap_or(false);
        if !fits {
            tracing::warn!("Period {} is not free", period);
            return Err(AppError::DateTimePeriodIsOccupied);
        }

        let record = RecordEntity::new_placeholder(
            service.title.clone(),
            period,
            customer.id,
            service.id,
            now,
        );
        let created = self
            .repository
            .booking
            .appointment_creator
            .create_appointment(record)
            .await
            .context("failed to create appointment")?;

        if created.id <= PLACEHOLDER_RECORD_ID {
            return Err(AppError::InvalidRecordId);
        }

        tracing::info!(
            "Appointment {} booked for customer {}: {} at {}",
            created.id,
            customer.id,
            service.title,
            created.period
        );
        Ok(created)
    }

    /// Cancel the customer's active appointment if it is still awaited
    pub async fn cancel_appointment_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> AppResult<RecordEntity> {
        let appointment = self
            .active_appointment(customer_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No active appointment for customer {}", customer_id))
            })?;

        if appointment.status != RecordStatus::Awaits {
            return Err(AppError::InvalidAppointmentStatusForCancel);
        }

        self.repository
            .booking
            .appointment_remover
            .remove_appointment(appointment.id)
            .await
            .context("failed to remove appointment")?;

        tracing::info!(
            "Appointment {} of customer {} cancelled",
            appointment.id,
            customer_id
        );
        Ok(appointment)
    }

    pub async fn active_appointment(
        &self,
        customer_id: CustomerId,
    ) -> AppResult<Option<RecordEntity>> {
        self.repository
            .booking
            .active_appointment
            .load_active_appointment(customer_id)
            .await
            .context("failed to load active appointment")
    }

    pub async fn services(&self) -> AppResult<Vec<ServiceEntity>> {
        self.repository
            .booking
            .services
            .load_services()
            .await
            .context("failed to load services")
    }

    pub async fn customer_by_identity(&self, identity: &str) -> AppResult<Option<CustomerEntity>> {
        self.repository
            .booking
            .customer_by_identity
            .load_customer_by_identity(identity.to_string())
            .await
            .context("failed to load customer")
    }

    pub async fn register_customer(&self, data: CreateCustomer) -> AppResult<CustomerEntity> {
        let customer = self
            .repository
            .booking
            .customer_creator
            .create_customer(data.identity, data.name)
            .await
            .context("failed to create customer")?;
        tracing::info!("Customer {} registered", customer.id);
        Ok(customer)
    }

    async fn load_service(&self, id: ServiceId) -> AppResult<ServiceEntity> {
        self.repository
            .booking
            .service
            .load_service(id)
            .await
            .context("failed to load service")
    }
}
