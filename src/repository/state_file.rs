//! JSON file storage for the appointments snapshot

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{AppointmentsStateLoader, AppointmentsStateSaver};
use crate::{error::AppResult, models::AppointmentsState};

#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AppointmentsStateLoader for JsonStateStore {
    async fn load_state(&self) -> AppResult<AppointmentsState> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            // First run: nothing saved yet
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppointmentsState::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl AppointmentsStateSaver for JsonStateStore {
    async fn save_state(&self, state: &AppointmentsState) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // Write then rename so a crash never leaves a truncated snapshot
        let bytes = serde_json::to_vec_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::debug!("Saved {} appointments to {}", state.len(), self.path.display());
        Ok(())
    }
}
