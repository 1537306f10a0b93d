//! Schedule view and change tracking models

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::period::TimePeriod;
use super::record::{RecordEntity, RecordId};

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    Free,
    Busy,
}

/// A labelled period of a day's schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulePeriod {
    pub period: TimePeriod,
    pub kind: PeriodKind,
    pub title: Option<String>,
}

impl SchedulePeriod {
    pub fn free(period: TimePeriod) -> Self {
        Self {
            period,
            kind: PeriodKind::Free,
            title: None,
        }
    }

    pub fn busy(period: TimePeriod, title: impl Into<String>) -> Self {
        Self {
            period,
            kind: PeriodKind::Busy,
            title: Some(title.into()),
        }
    }
}

/// Busy span of a day as reported by the busy periods feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyPeriod {
    pub period: TimePeriod,
    pub title: String,
}

/// Human-facing schedule of one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub date: NaiveDate,
    pub periods: Vec<SchedulePeriod>,
    pub prev_date: Option<NaiveDate>,
    pub next_date: Option<NaiveDate>,
}

impl Schedule {
    pub fn free_periods(&self) -> impl Iterator<Item = &TimePeriod> {
        self.periods
            .iter()
            .filter(|p| p.kind == PeriodKind::Free)
            .map(|p| &p.period)
    }
}

/// Offerable booking slots of a day for one service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampledSlots {
    pub date: NaiveDate,
    pub slots: Vec<TimePeriod>,
}

impl SampledSlots {
    pub fn starts(&self) -> Vec<NaiveTime> {
        self.slots.iter().map(|p| p.start).collect()
    }
}

// ---------------------------------------------------------------------------
// Change tracking
// ---------------------------------------------------------------------------

/// Last known appointments, keyed by record id
pub type AppointmentsState = BTreeMap<RecordId, RecordEntity>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Created,
    StatusChanged,
    DateTimeChanged,
    Removed,
}

/// A detected appointment change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    pub record: RecordEntity,
}

impl ChangeEvent {
    pub fn new(change_type: ChangeType, record: RecordEntity) -> Self {
        Self {
            change_type,
            record,
        }
    }
}
