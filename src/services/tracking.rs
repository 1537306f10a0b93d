//! Change detection over the appointments snapshot

use std::sync::Arc;
use std::time::Duration;

use tokio::{sync::Mutex, task::JoinHandle};

use crate::{
    error::{AppResult, ResultExt},
    models::{AppointmentsState, ChangeEvent, ChangeType, RecordEntity, RecordId},
    repository::{ActualRecordsLoader, StateRepository},
};

/// Diff `actual` against `state`, updating `state` in place.
///
/// Removed records are reported in ascending id order, after every other event.
pub fn reconcile(state: &mut AppointmentsState, actual: Vec<RecordEntity>) -> Vec<ChangeEvent> {
    let mut unseen = state.clone();
    let mut events = Vec::new();

    for record in actual {
        let change = match unseen.remove(&record.id) {
            None => Some(ChangeType::Created),
            Some(known) if known.status != record.status => Some(ChangeType::StatusChanged),
            Some(known) if known.period != record.period => Some(ChangeType::DateTimeChanged),
            Some(_) => None,
        };

        state.insert(record.id, record.clone());
        if let Some(change) = change {
            events.push(ChangeEvent::new(change, record));
        }
    }

    for (id, record) in unseen {
        state.remove(&id);
        events.push(ChangeEvent::new(ChangeType::Removed, record));
    }

    events
}

/// Owner of the appointments snapshot.
///
/// Each mutating call loads, mutates and saves the snapshot while holding a
/// single lock, so concurrent calls never interleave.
#[derive(Clone)]
pub struct TrackingService {
    state: StateRepository,
    lock: Arc<Mutex<()>>,
}

impl TrackingService {
    pub fn new(state: StateRepository) -> Self {
        Self {
            state,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Reconcile freshly loaded records against the snapshot
    pub async fn detect_changes(&self, actual: Vec<RecordEntity>) -> AppResult<Vec<ChangeEvent>> {
        self.mutate(|state| reconcile(state, actual)).await
    }

    /// Record a locally made appointment so it is not reported as created
    pub async fn add_appointment(&self, record: RecordEntity) -> AppResult<()> {
        self.mutate(|state| {
            state.insert(record.id, record);
        })
        .await
    }

    /// Forget a locally removed appointment so it is not reported as removed
    pub async fn remove_appointment(&self, id: RecordId) -> AppResult<()> {
        self.mutate(|state| {
            state.remove(&id);
        })
        .await
    }

    pub async fn snapshot(&self) -> AppResult<AppointmentsState> {
        let _guard = self.lock.lock().await;
        self.state
            .loader
            .load_state()
            .await
            .context("failed to load appointments state")
    }

    async fn mutate<T, F>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&mut AppointmentsState) -> T,
    {
        let _guard = self.lock.lock().await;

        let mut state = self
            .state
            .loader
            .load_state()
            .await
            .context("failed to load appointments state")?;
        let result = f(&mut state);
        self.state
            .saver
            .save_state(&state)
            .await
            .context("failed to save appointments state")?;

        Ok(result)
    }
}

/// Run change detection every `period`, handing non-empty event batches to
/// `notify`. Failed rounds are logged and retried on the next tick.
pub fn spawn_change_tracker<F>(
    tracking: TrackingService,
    records: Arc<dyn ActualRecordsLoader>,
    period: Duration,
    notify: F,
) -> JoinHandle<()>
where
    F: Fn(Vec<ChangeEvent>) + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let actual = match records.load_actual_records().await {
                Ok(actual) => actual,
                Err(e) => {
                    tracing::error!("Failed to load actual records: {}", e);
                    continue;
                }
            };

            match tracking.detect_changes(actual).await {
                Ok(events) if events.is_empty() => {}
                Ok(events) => {
                    tracing::info!("Detected {} appointment changes", events.len());
                    notify(events);
                }
                Err(e) => tracing::error!("Change detection failed: {}", e),
            }
        }
    })
}
