use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use showtrack_model::ShowId;

use crate::error::StateError;

/// Source of the user's tracked (liked or archived) shows.
#[async_trait]
pub trait TrackedShowsStore: Send + Sync {
    async fn tracked_show_ids(&self) -> Result<Vec<ShowId>, StateError>;
}

/// Single persisted slot holding the instant of the last completed pass.
#[async_trait]
pub trait LastCheckedStore: Send + Sync {
    async fn load(&self) -> Result<Option<DateTime<Utc>>, StateError>;

    async fn store(&self, checked_at: DateTime<Utc>) -> Result<(), StateError>;
}

/// Both ports backed by process memory.
#[derive(Debug, Default)]
pub struct InMemoryState {
    tracked: Mutex<BTreeSet<ShowId>>,
    last_checked: Mutex<Option<DateTime<Utc>>>,
}

impl InMemoryState {
    pub fn new(
        tracked: impl IntoIterator<Item = ShowId>,
        last_checked: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            tracked: Mutex::new(tracked.into_iter().collect()),
            last_checked: Mutex::new(last_checked),
        }
    }

    pub fn track(&self, id: ShowId) -> bool {
        self.tracked.lock().insert(id)
    }

    pub fn untrack(&self, id: ShowId) -> bool {
        self.tracked.lock().remove(&id)
    }

    pub fn last_checked(&self) -> Option<DateTime<Utc>> {
        *self.last_checked.lock()
    }
}

#[async_trait]
impl TrackedShowsStore for InMemoryState {
    async fn tracked_show_ids(&self) -> Result<Vec<ShowId>, StateError> {
        Ok(self.tracked.lock().iter().copied().collect())
    }
}

#[async_trait]
impl LastCheckedStore for InMemoryState {
    async fn load(&self) -> Result<Option<DateTime<Utc>>, StateError> {
        Ok(self.last_checked())
    }

    async fn store(&self, checked_at: DateTime<Utc>) -> Result<(), StateError> {
        *self.last_checked.lock() = Some(checked_at);
        Ok(())
    }
}
