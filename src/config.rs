//! Configuration management for the appointment scheduler

use std::collections::HashMap;
use std::env;

use chrono::{NaiveDate, NaiveTime, Weekday};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{
        calendar::date_range_expression, DayType, Period, ProductionCalendar, ServiceEntity,
        TimePeriod, WorkBreak, WorkingHours,
    },
    repository::memory::StoreSeed,
    services::scheduling::SchedulingSettings,
};

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SchedulingConfig {
    pub sample_rate_minutes: u32,
    pub search_horizon_days: u32,
    pub reconcile_interval_secs: u64,
    pub state_file: String,
}

/// Opening window of a weekday, times as `HH:MM`
#[derive(Debug, Deserialize, Clone)]
pub struct OpeningHoursEntry {
    pub open: String,
    pub close: String,
}

/// Production calendar override, date as `YYYY-MM-DD`
#[derive(Debug, Deserialize, Clone)]
pub struct CalendarDayEntry {
    pub date: String,
    pub day_type: String,
}

/// Work break rule: either a raw match expression or an inclusive date range
#[derive(Debug, Deserialize, Clone)]
pub struct WorkBreakEntry {
    pub id: String,
    pub title: String,
    pub match_expression: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CalendarConfig {
    /// Keyed by weekday name (`mon`, `tuesday`, ...)
    #[serde(default)]
    pub working_hours: HashMap<String, OpeningHoursEntry>,
    #[serde(default)]
    pub production_calendar: Vec<CalendarDayEntry>,
    #[serde(default)]
    pub work_breaks: Vec<WorkBreakEntry>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub id: i64,
    pub title: String,
    pub duration_minutes: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cost_description: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub scheduling: SchedulingConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (e.g. SCHEDULER_SERVER__PORT)
            .add_source(
                Environment::with_prefix("SCHEDULER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            // Override state file from STATE_FILE env var if present
            .set_override_option("scheduling.state_file", env::var("STATE_FILE").ok())?
            .build()?;

        config.try_deserialize()
    }

    pub fn scheduling_settings(&self) -> AppResult<SchedulingSettings> {
        if self.scheduling.sample_rate_minutes == 0 {
            return Err(AppError::Config(
                "scheduling.sample_rate_minutes must be positive".to_string(),
            ));
        }

        Ok(SchedulingSettings {
            sample_rate: chrono::Duration::minutes(i64::from(self.scheduling.sample_rate_minutes)),
            search_horizon_days: i64::from(self.scheduling.search_horizon_days),
        })
    }

    /// Convert the calendar and service sections into store content
    pub fn store_seed(&self) -> AppResult<StoreSeed> {
        Ok(StoreSeed {
            working_hours: self.calendar.working_hours()?,
            production_calendar: self.calendar.production_calendar()?,
            work_breaks: self.calendar.work_breaks()?,
            services: self.services.iter().map(ServiceConfig::to_entity).collect(),
        })
    }
}

impl CalendarConfig {
    pub fn working_hours(&self) -> AppResult<WorkingHours> {
        self.working_hours
            .iter()
            .map(|(day, entry)| -> AppResult<(Weekday, TimePeriod)> {
                let weekday = day
                    .parse::<Weekday>()
                    .map_err(|_| AppError::Config(format!("Invalid weekday: {}", day)))?;
                Ok((weekday, parse_period(&entry.open, &entry.close)?))
            })
            .collect()
    }

    pub fn production_calendar(&self) -> AppResult<ProductionCalendar> {
        self.production_calendar
            .iter()
            .map(|entry| -> AppResult<(NaiveDate, DayType)> {
                Ok((parse_date(&entry.date)?, entry.day_type.parse::<DayType>()?))
            })
            .collect()
    }

    pub fn work_breaks(&self) -> AppResult<Vec<WorkBreak>> {
        self.work_breaks
            .iter()
            .map(|entry| -> AppResult<WorkBreak> {
                let match_expression = match (
                    &entry.match_expression,
                    &entry.from_date,
                    &entry.to_date,
                ) {
                    (Some(expression), None, None) => expression.clone(),
                    (None, Some(from), to) => {
                        let from = parse_date(from)?;
                        let to = to.as_deref().map(parse_date).transpose()?.unwrap_or(from);
                        if to < from {
                            return Err(AppError::Config(format!(
                                "Work break {}: from_date after to_date",
                                entry.id
                            )));
                        }
                        date_range_expression(from, to)?
                    }
                    _ => {
                        return Err(AppError::Config(format!(
                            "Work break {} needs either match_expression or from_date",
                            entry.id
                        )))
                    }
                };

                Ok(WorkBreak {
                    id: entry.id.clone(),
                    title: entry.title.clone(),
                    match_expression,
                    period: parse_period(&entry.start, &entry.end)?,
                })
            })
            .collect()
    }
}

impl ServiceConfig {
    fn to_entity(&self) -> ServiceEntity {
        ServiceEntity {
            id: self.id,
            title: self.title.clone(),
            duration_minutes: self.duration_minutes,
            description: self.description.clone(),
            cost_description: self.cost_description.clone(),
        }
    }
}

fn parse_time(value: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| AppError::Config(format!("Invalid time (use HH:MM): {}", value)))
}

fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::Config(format!("Invalid date (use YYYY-MM-DD): {}", value)))
}

fn parse_period(start: &str, end: &str) -> AppResult<TimePeriod> {
    Period::new(parse_time(start)?, parse_time(end)?)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            sample_rate_minutes: 30,
            search_horizon_days: 60,
            reconcile_interval_secs: 60,
            state_file: "data/appointments_state.json".to_string(),
        }
    }
}
