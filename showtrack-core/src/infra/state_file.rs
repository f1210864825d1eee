use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use showtrack_model::ShowId;

use crate::error::StateError;
use crate::updates::{LastCheckedStore, TrackedShowsStore};

use super::fs::{read_json, write_json_atomic};

pub const STATE_FILE: &str = "state.json";

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    #[serde(default)]
    pub tracked: BTreeSet<ShowId>,
    #[serde(default)]
    pub last_checked: Option<DateTime<Utc>>,
}

/// Tracked shows and the last-checked slot in one JSON document.
#[derive(Debug)]
pub struct JsonStateFile {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonStateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn in_dir(state_dir: &Path) -> Self {
        Self::new(state_dir.join(STATE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<StateDocument, StateError> {
        match read_json::<StateDocument>(&self.path).await? {
            Some(document) => Ok(document?),
            None => Ok(StateDocument::default()),
        }
    }

    pub async fn snapshot(&self) -> Result<StateDocument, StateError> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    async fn update<F>(&self, mutate: F) -> Result<bool, StateError>
    where
        F: FnOnce(&mut StateDocument) -> bool + Send,
    {
        let _guard = self.lock.lock().await;
        let mut document = self.read().await?;
        if !mutate(&mut document) {
            return Ok(false);
        }
        write_json_atomic(&self.path, &document).await?;
        Ok(true)
    }

    /// Returns `false` if the show was already tracked.
    pub async fn track(&self, id: ShowId) -> Result<bool, StateError> {
        self.update(|document| document.tracked.insert(id)).await
    }

    pub async fn untrack(&self, id: ShowId) -> Result<bool, StateError> {
        self.update(|document| document.tracked.remove(&id)).await
    }
}

#[async_trait]
impl TrackedShowsStore for JsonStateFile {
    async fn tracked_show_ids(&self) -> Result<Vec<ShowId>, StateError> {
        Ok(self.snapshot().await?.tracked.into_iter().collect())
    }
}

#[async_trait]
impl LastCheckedStore for JsonStateFile {
    async fn load(&self) -> Result<Option<DateTime<Utc>>, StateError> {
        Ok(self.snapshot().await?.last_checked)
    }

    async fn store(&self, checked_at: DateTime<Utc>) -> Result<(), StateError> {
        self.update(|document| {
            document.last_checked = Some(checked_at);
            true
        })
        .await
        .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn track_untrack_and_timestamp_persist() {
        let dir = tempfile::tempdir().unwrap();
        let state = JsonStateFile::in_dir(dir.path());

        assert!(state.track(42).await.unwrap());
        assert!(!state.track(42).await.unwrap());
        assert!(state.track(7).await.unwrap());
        assert!(state.untrack(42).await.unwrap());
        assert!(!state.untrack(42).await.unwrap());

        let at = Utc.with_ymd_and_hms(2024, 4, 2, 10, 30, 0).unwrap();
        state.store(at).await.unwrap();

        let reopened = JsonStateFile::in_dir(dir.path());
        assert_eq!(reopened.tracked_show_ids().await.unwrap(), vec![7]);
        assert_eq!(reopened.load().await.unwrap(), Some(at));
    }

    #[tokio::test]
    async fn missing_file_means_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let state = JsonStateFile::in_dir(dir.path());
        assert!(state.tracked_show_ids().await.unwrap().is_empty());
        assert_eq!(state.load().await.unwrap(), None);
    }
}
