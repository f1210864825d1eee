use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::ReminderError;
use crate::reminders::{Reminder, ReminderStore};

use super::fs::{read_json, write_json_atomic};

pub const REMINDERS_FILE: &str = "reminders.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct ReminderDocument {
    #[serde(default)]
    reminders: BTreeMap<String, Reminder>,
}

/// Reminder backend persisted to a single JSON document.
///
/// Every mutation rewrites the document through a temp file and rename, so
/// a crash leaves either the old or the new contents.
#[derive(Debug)]
pub struct JsonFileReminderStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileReminderStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn in_dir(state_dir: &Path) -> Self {
        Self::new(state_dir.join(REMINDERS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<ReminderDocument, ReminderError> {
        match read_json::<ReminderDocument>(&self.path).await? {
            Some(document) => Ok(document?),
            None => Ok(ReminderDocument::default()),
        }
    }

    async fn save(&self, document: &ReminderDocument) -> Result<(), ReminderError> {
        write_json_atomic(&self.path, document).await?;
        Ok(())
    }
}

#[async_trait]
impl ReminderStore for JsonFileReminderStore {
    async fn schedule(&self, reminder: Reminder) -> Result<(), ReminderError> {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;
        document
            .reminders
            .insert(reminder.identifier.clone(), reminder);
        self.save(&document).await
    }

    async fn cancel(
        &self,
        identifiers: &HashSet<String>,
    ) -> Result<(), ReminderError> {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;
        let before = document.reminders.len();
        document
            .reminders
            .retain(|identifier, _| !identifiers.contains(identifier));
        if document.reminders.len() == before {
            return Ok(());
        }
        self.save(&document).await
    }

    async fn pending_identifiers(&self) -> Result<Vec<String>, ReminderError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.reminders.into_keys().collect())
    }

    async fn reschedule(
        &self,
        identifier: &str,
        fire_at: DateTime<Utc>,
    ) -> Result<Reminder, ReminderError> {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;
        let reminder = document
            .reminders
            .get_mut(identifier)
            .ok_or_else(|| ReminderError::NotFound(identifier.to_string()))?;
        reminder.fire_at = fire_at;
        let updated = reminder.clone();
        self.save(&document).await?;
        Ok(updated)
    }

    async fn pending_reminders(&self) -> Result<Vec<Reminder>, ReminderError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.reminders.into_values().collect())
    }
}
