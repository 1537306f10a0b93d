//! Generic period (interval) algebra
//!
//! A [`Period`] is a half-open interval `[start, end)` over any totally ordered
//! point type. The same operations serve clock times within one day
//! (`Period<NaiveTime>`) and absolute booking spans (`Period<NaiveDateTime>`).

use std::cmp::{max, min};
use std::fmt;

use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Half-open interval `[start, end)`
///
/// Ordering compares starts first and ends second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period<T> {
    pub start: T,
    pub end: T,
}

pub type TimePeriod = Period<NaiveTime>;
pub type DateTimePeriod = Period<NaiveDateTime>;

impl<T: Ord + Copy> Period<T> {
    /// Build a period, rejecting empty or reversed bounds
    pub fn new(start: T, end: T) -> AppResult<Self> {
        let period = Self { start, end };
        if !period.is_valid() {
            return Err(AppError::InvalidDateTimePeriod);
        }
        Ok(period)
    }

    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    /// Smallest period covering both; only meaningful when they overlap or touch
    pub fn union(&self, other: &Self) -> Self {
        Self {
            start: min(self.start, other.start),
            end: max(self.end, other.end),
        }
    }

    /// Common part of both periods. The result may be invalid when they do
    /// not overlap, so check [`Period::is_valid`] before using it.
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            start: max(self.start, other.start),
            end: min(self.end, other.end),
        }
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.intersect(other).is_valid()
    }

    pub fn contains(&self, inner: &Self) -> bool {
        self.start <= inner.start && inner.end <= self.end
    }

    /// What is left of `self` once `other` is cut out: zero, one or two periods
    pub fn subtract(&self, other: &Self) -> Vec<Self> {
        let intersection = self.intersect(other);
        if !intersection.is_valid() {
            return vec![*self];
        }

        let before = Self {
            start: self.start,
            end: intersection.start,
        };
        let after = Self {
            start: intersection.end,
            end: self.end,
        };

        [before, after]
            .into_iter()
            .filter(|p| p.is_valid())
            .collect()
    }
}

/// Sort periods and merge every run of overlapping ones.
///
/// Periods that merely touch (`a.end == b.start`) stay separate.
pub fn sort_and_merge<T: Ord + Copy>(periods: &[Period<T>]) -> Vec<Period<T>> {
    let mut sorted = periods.to_vec();
    sorted.sort();

    let mut merged: Vec<Period<T>> = Vec::with_capacity(sorted.len());
    for period in sorted {
        match merged.last_mut() {
            Some(last) if last.intersects(&period) => *last = last.union(&period),
            _ => merged.push(period),
        }
    }
    merged
}

/// Cut every subtrahend out of every base period, one subtrahend at a time
pub fn subtract_many<T: Ord + Copy>(
    base: &[Period<T>],
    subtrahends: &[Period<T>],
) -> Vec<Period<T>> {
    subtrahends.iter().fold(base.to_vec(), |acc, sub| {
        acc.iter().flat_map(|p| p.subtract(sub)).collect()
    })
}

impl Period<NaiveTime> {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Anchor this clock-time period on a calendar day
    pub fn on(&self, date: chrono::NaiveDate) -> Period<NaiveDateTime> {
        Period {
            start: date.and_time(self.start),
            end: date.and_time(self.end),
        }
    }
}

impl Period<NaiveDateTime> {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// The clock-time part of a period lying within a single day
    pub fn time_of_day(&self) -> Option<Period<NaiveTime>> {
        if self.start.date() != self.end.date() {
            return None;
        }
        Some(Period {
            start: self.start.time(),
            end: self.end.time(),
        })
    }
}

impl fmt::Display for Period<NaiveTime> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

impl fmt::Display for Period<NaiveDateTime> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%Y-%m-%d %H:%M")
        )
    }
}
