//! Calendar models (opening hours, production calendar, work breaks)

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::period::TimePeriod;
use crate::error::{AppError, AppResult};

// ---------------------------------------------------------------------------
// ProductionCalendar
// ---------------------------------------------------------------------------

/// Override applied to a specific calendar date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    Weekend,
    Holiday,
    PreHoliday,
}

impl FromStr for DayType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekend" => Ok(DayType::Weekend),
            "holiday" => Ok(DayType::Holiday),
            "pre_holiday" | "preholiday" | "pre-holiday" => Ok(DayType::PreHoliday),
            _ => Err(AppError::UnknownDayType(s.to_string())),
        }
    }
}

impl std::fmt::Display for DayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DayType::Weekend => "weekend",
            DayType::Holiday => "holiday",
            DayType::PreHoliday => "pre_holiday",
        };
        write!(f, "{}", label)
    }
}

/// Dates whose opening differs from the weekly schedule.
/// Dates without an entry are ordinary days.
pub type ProductionCalendar = HashMap<NaiveDate, DayType>;

// ---------------------------------------------------------------------------
// WorkingHours
// ---------------------------------------------------------------------------

/// Nominal opening window per weekday; missing weekdays are closed
pub type WorkingHours = HashMap<Weekday, TimePeriod>;

// ---------------------------------------------------------------------------
// WorkBreak
// ---------------------------------------------------------------------------

/// A recurring or one-off break rule.
///
/// `match_expression` is a regular expression tested against
/// `"{weekday} {date}T00:00:00"` where weekday counts from Sunday = 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkBreak {
    pub id: String,
    pub title: String,
    pub match_expression: String,
    pub period: TimePeriod,
}

/// Regex alternation matching every date of the inclusive range `from..=to`.
///
/// A reversed range is rejected, so the alternation is never empty.
pub fn date_range_expression(from: NaiveDate, to: NaiveDate) -> AppResult<String> {
    if to < from {
        return Err(AppError::Config(format!(
            "Date range {} to {} ends before it starts",
            from, to
        )));
    }

    let dates: Vec<String> = from
        .iter_days()
        .take_while(|d| *d <= to)
        .map(|d| regex::escape(&d.format("%Y-%m-%d").to_string()))
        .collect();
    Ok(format!("({})", dates.join("|")))
}
