//! Data models for the appointment scheduler

pub mod calendar;
pub mod customer;
pub mod period;
pub mod record;
pub mod schedule;
pub mod service;

// Re-export commonly used types
pub use calendar::{DayType, ProductionCalendar, WorkBreak, WorkingHours};
pub use customer::{CustomerEntity, CustomerId};
pub use period::{DateTimePeriod, Period, TimePeriod};
pub use record::{RecordEntity, RecordId, RecordStatus};
pub use schedule::{
    AppointmentsState, BusyPeriod, ChangeEvent, ChangeType, PeriodKind, SampledSlots, Schedule,
    SchedulePeriod,
};
pub use service::{ServiceEntity, ServiceId};
