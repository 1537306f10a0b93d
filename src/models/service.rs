//! Bookable service model

use chrono::Duration;
use serde::{Deserialize, Serialize};

pub type ServiceId = i64;

/// A service customers can book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEntity {
    pub id: ServiceId,
    pub title: String,
    pub duration_minutes: u32,
    pub description: String,
    pub cost_description: String,
}

impl ServiceEntity {
    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.duration_minutes))
    }
}
