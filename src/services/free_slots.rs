//! Free time slot calculation and the labelled day schedule

use crate::models::{
    period::{sort_and_merge, subtract_many},
    BusyPeriod, PeriodKind, SchedulePeriod, TimePeriod, WorkBreak,
};

/// Parts of the available periods not covered by any busy period or break
pub fn free_time_slots(
    available: &[TimePeriod],
    busy: &[TimePeriod],
    breaks: &[TimePeriod],
) -> Vec<TimePeriod> {
    let subtrahends: Vec<TimePeriod> = busy.iter().chain(breaks).copied().collect();
    sort_and_merge(&subtract_many(available, &subtrahends))
}

/// Labelled schedule of a day: free slots plus the busy periods and breaks
/// falling inside the available window, ordered by start.
pub fn day_schedule(
    available: &[TimePeriod],
    busy: &[BusyPeriod],
    breaks: &[&WorkBreak],
) -> Vec<SchedulePeriod> {
    let busy_periods: Vec<TimePeriod> = busy.iter().map(|b| b.period).collect();
    let break_periods: Vec<TimePeriod> = breaks.iter().map(|b| b.period).collect();

    let occupied = busy
        .iter()
        .map(|b| (b.period, b.title.as_str()))
        .chain(breaks.iter().map(|b| (b.period, b.title.as_str())));

    let mut tagged: Vec<SchedulePeriod> = free_time_slots(available, &busy_periods, &break_periods)
        .into_iter()
        .map(SchedulePeriod::free)
        .collect();

    for (period, title) in occupied {
        for window in available {
            let clipped = period.intersect(window);
            if clipped.is_valid() {
                tagged.push(SchedulePeriod::busy(clipped, title));
            }
        }
    }

    flatten(tagged)
}

/// Resolve overlaps between labelled periods: busy ones win and trim the
/// edges of any free period they overlap.
pub fn flatten(periods: Vec<SchedulePeriod>) -> Vec<SchedulePeriod> {
    let busy: Vec<TimePeriod> = periods
        .iter()
        .filter(|p| p.kind == PeriodKind::Busy)
        .map(|p| p.period)
        .collect();

    let mut resolved = Vec::with_capacity(periods.len());
    for item in periods {
        match item.kind {
            PeriodKind::Busy => resolved.push(item),
            PeriodKind::Free => resolved.extend(
                subtract_many(&[item.period], &busy)
                    .into_iter()
                    .map(SchedulePeriod::free),
            ),
        }
    }

    resolved.sort_by(|a, b| a.period.cmp(&b.period));
    resolved
}
