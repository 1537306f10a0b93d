//! Appointment record model

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::period::DateTimePeriod;
use super::{CustomerId, ServiceId};
use crate::error::{AppError, AppResult};

pub type RecordId = i64;

/// Id carried by a record until the persistence layer assigns a real one
pub const PLACEHOLDER_RECORD_ID: RecordId = 0;

/// Appointment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Awaits,
    Done,
    NotAppear,
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RecordStatus::Awaits => "awaits",
            RecordStatus::Done => "done",
            RecordStatus::NotAppear => "not_appear",
        };
        write!(f, "{}", label)
    }
}

/// A booked appointment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEntity {
    pub id: RecordId,
    pub title: String,
    pub status: RecordStatus,
    pub is_archived: bool,
    pub period: DateTimePeriod,
    pub customer_id: CustomerId,
    pub service_id: ServiceId,
    pub created_at: NaiveDateTime,
}

impl RecordEntity {
    /// New awaiting appointment that has not been persisted yet
    pub fn new_placeholder(
        title: String,
        period: DateTimePeriod,
        customer_id: CustomerId,
        service_id: ServiceId,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: PLACEHOLDER_RECORD_ID,
            title,
            status: RecordStatus::Awaits,
            is_archived: false,
            period,
            customer_id,
            service_id,
            created_at,
        }
    }

    pub fn set_status(&mut self, status: RecordStatus) -> AppResult<()> {
        if self.is_archived {
            return Err(AppError::RecordIsArchived);
        }
        self.status = status;
        Ok(())
    }

    pub fn reschedule(&mut self, period: DateTimePeriod) -> AppResult<()> {
        if self.is_archived {
            return Err(AppError::RecordIsArchived);
        }
        if !period.is_valid() {
            return Err(AppError::InvalidDateTimePeriod);
        }
        self.period = period;
        Ok(())
    }

    /// Archive a finished appointment; awaiting ones cannot be archived
    pub fn archive(&mut self) -> AppResult<()> {
        if self.status == RecordStatus::Awaits {
            return Err(AppError::InvalidStatusForArchivedRecord);
        }
        self.is_archived = true;
        Ok(())
    }
}
