//! Process-local advisory locks over booking periods

use std::sync::{Arc, Mutex};

use crate::{
    error::{AppError, AppResult},
    models::DateTimePeriod,
};

/// Set of periods currently being booked.
///
/// Only guards against double booking inside one process.
#[derive(Clone, Default)]
pub struct PeriodLocker {
    locked: Arc<Mutex<Vec<DateTimePeriod>>>,
}

/// Holds a locked period until dropped
#[must_use = "the period is unlocked as soon as the guard is dropped"]
pub struct PeriodGuard {
    locked: Arc<Mutex<Vec<DateTimePeriod>>>,
    period: DateTimePeriod,
}

impl PeriodLocker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock `period`, failing if it intersects a period already locked
    pub fn lock(&self, period: DateTimePeriod) -> AppResult<PeriodGuard> {
        let mut locked = self
            .locked
            .lock()
            .map_err(|_| AppError::Internal("period lock poisoned".to_string()))?;

        if locked.iter().any(|p| p.intersects(&period)) {
            return Err(AppError::PeriodIsLocked);
        }
        locked.push(period);

        Ok(PeriodGuard {
            locked: self.locked.clone(),
            period,
        })
    }

    pub fn locked_count(&self) -> usize {
        self.locked.lock().map(|l| l.len()).unwrap_or_default()
    }
}

impl PeriodGuard {
    pub fn period(&self) -> &DateTimePeriod {
        &self.period
    }
}

impl Drop for PeriodGuard {
    fn drop(&mut self) {
        let mut locked = match self.locked.lock() {
            Ok(locked) => locked,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(pos) = locked.iter().position(|p| *p == self.period) {
            locked.swap_remove(pos);
        }
    }
}
