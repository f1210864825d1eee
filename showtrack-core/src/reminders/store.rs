use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::ReminderError;

/// One locally scheduled alert. `identifier` is the wire-level key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub identifier: String,
    pub fire_at: DateTime<Utc>,
    pub title: String,
    pub body: String,
}

/// Local notification backend.
///
/// `schedule` is an upsert: writing an identifier that is already pending
/// replaces the earlier reminder.
#[async_trait]
pub trait ReminderStore: Send + Sync {
    async fn schedule(&self, reminder: Reminder) -> Result<(), ReminderError>;

    /// Remove every listed identifier; unknown ones are ignored.
    async fn cancel(&self, identifiers: &HashSet<String>)
    -> Result<(), ReminderError>;

    async fn pending_identifiers(&self) -> Result<Vec<String>, ReminderError>;

    /// Move a pending reminder to `fire_at`, keeping its identifier and content.
    async fn reschedule(
        &self,
        identifier: &str,
        fire_at: DateTime<Utc>,
    ) -> Result<Reminder, ReminderError>;

    async fn pending_reminders(&self) -> Result<Vec<Reminder>, ReminderError>;
}

/// Reminders kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryReminderStore {
    reminders: Mutex<BTreeMap<String, Reminder>>,
}

impl InMemoryReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reminders(&self) -> Vec<Reminder> {
        self.reminders.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.reminders.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reminders.lock().is_empty()
    }
}

#[async_trait]
impl ReminderStore for InMemoryReminderStore {
    async fn schedule(&self, reminder: Reminder) -> Result<(), ReminderError> {
        self.reminders
            .lock()
            .insert(reminder.identifier.clone(), reminder);
        Ok(())
    }

    async fn cancel(
        &self,
        identifiers: &HashSet<String>,
    ) -> Result<(), ReminderError> {
        self.reminders
            .lock()
            .retain(|identifier, _| !identifiers.contains(identifier));
        Ok(())
    }

    async fn pending_identifiers(&self) -> Result<Vec<String>, ReminderError> {
        Ok(self.reminders.lock().keys().cloned().collect())
    }

    async fn reschedule(
        &self,
        identifier: &str,
        fire_at: DateTime<Utc>,
    ) -> Result<Reminder, ReminderError> {
        let mut reminders = self.reminders.lock();
        let reminder = reminders
            .get_mut(identifier)
            .ok_or_else(|| ReminderError::NotFound(identifier.to_string()))?;
        reminder.fire_at = fire_at;
        Ok(reminder.clone())
    }

    async fn pending_reminders(&self) -> Result<Vec<Reminder>, ReminderError> {
        Ok(self.reminders())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reminder(identifier: &str, title: &str) -> Reminder {
        Reminder {
            identifier: identifier.to_string(),
            fire_at: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            title: title.to_string(),
            body: String::new(),
        }
    }

    #[tokio::test]
    async fn schedule_is_an_upsert() {
        let store = InMemoryReminderStore::new();
        store.schedule(reminder("1.1.1", "old")).await.unwrap();
        store.schedule(reminder("1.1.1", "new")).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.reminders()[0].title, "new");
    }

    #[tokio::test]
    async fn reschedule_missing_identifier_is_not_found() {
        let store = InMemoryReminderStore::new();
        let err = store
            .reschedule("9.9.9", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ReminderError::NotFound(id) if id == "9.9.9"));
    }

    #[tokio::test]
    async fn cancel_ignores_unknown_identifiers() {
        let store = InMemoryReminderStore::new();
        store.schedule(reminder("1.1.1", "a")).await.unwrap();
        store.schedule(reminder("1.1.2", "b")).await.unwrap();

        let ids = HashSet::from(["1.1.2".to_string(), "7.7.7".to_string()]);
        store.cancel(&ids).await.unwrap();
        assert_eq!(store.pending_identifiers().await.unwrap(), vec!["1.1.1"]);
    }
}
