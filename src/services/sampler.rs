//! Discretisation of free time into offerable booking slots

use chrono::{Duration, NaiveTime, Timelike};

use crate::models::{Period, TimePeriod};

/// Split free periods into service-long slots starting every `sample_rate`.
///
/// Slot starts are aligned to the `sample_rate` grid counted from midnight.
/// When what is left of a free period is shorter than the service, that
/// remainder is offered as is.
pub fn sample(
    free: &[TimePeriod],
    service_duration: Duration,
    sample_rate: Duration,
) -> Vec<TimePeriod> {
    let duration = service_duration.num_seconds();
    let rate = sample_rate.num_seconds();
    if duration <= 0 || rate <= 0 {
        return Vec::new();
    }

    let mut slots = Vec::new();
    for period in free {
        let end = i64::from(period.end.num_seconds_from_midnight());
        let mut start = align_up(i64::from(period.start.num_seconds_from_midnight()), rate);

        while start < end {
            if end - start < duration {
                slots.extend(slot(start, end));
                break;
            }
            slots.extend(slot(start, start + duration));
            start += rate;
        }
    }
    slots
}

fn align_up(seconds: i64, rate: i64) -> i64 {
    match seconds % rate {
        0 => seconds,
        rem => seconds + rate - rem,
    }
}

fn slot(start: i64, end: i64) -> Option<TimePeriod> {
    let to_time = |s: i64| NaiveTime::from_num_seconds_from_midnight_opt(u32::try_from(s).ok()?, 0);
    Some(Period {
        start: to_time(start)?,
        end: to_time(end)?,
    })
}
