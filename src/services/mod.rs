//! Scheduling core: calendar computation, booking and change tracking

pub mod calendar;
pub mod free_slots;
pub mod locker;
pub mod sampler;
pub mod scheduling;
pub mod tracking;
pub mod work_breaks;

use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub scheduling: scheduling::SchedulingService,
    pub tracking: tracking::TrackingService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, settings: scheduling::SchedulingSettings) -> Self {
        Self {
            tracking: tracking::TrackingService::new(repository.state.clone()),
            scheduling: scheduling::SchedulingService::new(repository, settings),
        }
    }
}
