//! Integration tests for the appointment scheduler

mod api_tests;
mod scheduling_tests;

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use appointment_scheduler::{
    config::AppConfig,
    repository::{memory::InMemoryStore, Repository},
    services::Services,
    AppState,
};

/// Monday and Tuesday open 09:30-17:00, lunch on weekdays, Tuesday
/// 2024-01-16 is a pre-holiday and Monday 2024-01-22 a holiday.
pub const TEST_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 0

[logging]
level = "debug"
format = "pretty"

[scheduling]
sample_rate_minutes = 30
search_horizon_days = 14
reconcile_interval_secs = 1
state_file = "unused.json"

[calendar.working_hours]
mon = { open = "09:30", close = "17:00" }
tue = { open = "09:30", close = "17:00" }

[[calendar.production_calendar]]
date = "2024-01-16"
day_type = "pre_holiday"

[[calendar.production_calendar]]
date = "2024-01-22"
day_type = "holiday"

[[calendar.work_breaks]]
id = "lunch"
title = "Lunch"
match_expression = "^[1-5] "
start = "12:30"
end = "13:30"

[[services]]
id = 1
title = "Consultation"
duration_minutes = 60
cost_description = "30 EUR"

[[services]]
id = 2
title = "Express"
duration_minutes = 30
"#;

pub fn test_config() -> AppConfig {
    config::Config::builder()
        .add_source(config::File::from_str(TEST_CONFIG, config::FileFormat::Toml))
        .build()
        .and_then(|c| c.try_deserialize())
        .expect("test configuration is valid")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(date: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
    date.and_hms_opt(h, m, 0).unwrap()
}

/// 2024-01-15
pub fn monday() -> NaiveDate {
    date(2024, 1, 15)
}

/// The Friday evening before [`monday`]
pub fn friday_evening() -> NaiveDateTime {
    at(date(2024, 1, 12), 18, 0)
}

pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub repository: Repository,
    pub services: Arc<Services>,
}

impl Harness {
    pub fn new() -> Self {
        let config = test_config();
        let store = Arc::new(InMemoryStore::new(config.store_seed().unwrap()));
        let repository = Repository::in_memory(store.clone());
        let services = Arc::new(Services::new(
            repository.clone(),
            config.scheduling_settings().unwrap(),
        ));

        Self {
            store,
            repository,
            services,
        }
    }

    /// Handler state with the clock frozen at `now`
    pub fn app_state(&self, now: NaiveDateTime) -> AppState {
        AppState {
            config: Arc::new(test_config()),
            services: self.services.clone(),
            records: self.repository.actual_records.clone(),
            clock: Arc::new(move || now),
        }
    }
}
