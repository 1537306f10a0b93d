//! Work break resolution for a given day

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::{
    error::{AppError, AppResult},
    models::{TimePeriod, WorkBreak},
};

/// String the break expressions are matched against, e.g.
/// `"1 2024-01-15T00:00:00"` for a Monday
pub fn match_string(date: NaiveDate) -> String {
    format!(
        "{} {}",
        date.weekday().num_days_from_sunday(),
        date.and_time(chrono::NaiveTime::default()).format("%Y-%m-%dT%H:%M:%S")
    )
}

/// Breaks whose rule matches `date`
pub fn matching_breaks<'a>(
    date: NaiveDate,
    breaks: &'a [WorkBreak],
) -> AppResult<Vec<&'a WorkBreak>> {
    let subject = match_string(date);
    let mut matched = Vec::new();

    for work_break in breaks {
        let re = Regex::new(&work_break.match_expression).map_err(|source| {
            AppError::FailedToCompileMatchExpression {
                expression: work_break.match_expression.clone(),
                source,
            }
        })?;

        if re.is_match(&subject) {
            matched.push(work_break);
        }
    }

    Ok(matched)
}

/// Break periods applying to `date`
pub fn resolve(date: NaiveDate, breaks: &[WorkBreak]) -> AppResult<Vec<TimePeriod>> {
    Ok(matching_breaks(date, breaks)?
        .into_iter()
        .map(|b| b.period)
        .collect())
}
