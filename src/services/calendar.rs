//! Day window computation from opening hours and the production calendar

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::{
    period::{sort_and_merge, subtract_many},
    DayType, Period, ProductionCalendar, TimePeriod, WorkingHours,
};

/// Time cut from the end of a pre-holiday day
pub const PRE_HOLIDAY_SHORTENING_MINUTES: i64 = 60;

/// Available opening periods of `date` as seen at `now`.
///
/// Past days are empty and today loses its elapsed part.
pub fn available_periods(
    date: NaiveDate,
    working_hours: &WorkingHours,
    calendar: &ProductionCalendar,
    now: NaiveDateTime,
) -> Vec<TimePeriod> {
    if date < now.date() {
        return Vec::new();
    }

    let mut periods: Vec<TimePeriod> = working_hours
        .get(&date.weekday())
        .copied()
        .into_iter()
        .collect();

    if date == now.date() {
        // midnight up to now
        let elapsed = Period {
            start: NaiveTime::default(),
            end: now.time(),
        };
        periods = sort_and_merge(&subtract_many(&periods, &[elapsed]));
    }

    match calendar.get(&date) {
        Some(DayType::Weekend) | Some(DayType::Holiday) => Vec::new(),
        Some(DayType::PreHoliday) => {
            shorten_from_end(periods, Duration::minutes(PRE_HOLIDAY_SHORTENING_MINUTES))
        }
        None => periods,
    }
}

/// Remove `cut` of total time from the latest periods backwards
fn shorten_from_end(mut periods: Vec<TimePeriod>, cut: Duration) -> Vec<TimePeriod> {
    let mut remaining = cut;
    while remaining > Duration::zero() {
        let Some(last) = periods.pop() else {
            // Not enough time left to shorten: the whole day is gone
            return Vec::new();
        };

        let length = last.duration();
        if length > remaining {
            periods.push(Period {
                start: last.start,
                end: last.end - remaining,
            });
            remaining = Duration::zero();
        } else {
            remaining = remaining - length;
        }
    }
    periods
}
