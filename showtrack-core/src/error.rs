use thiserror::Error;

use showtrack_model::RepresentationKind;

use crate::providers::ProviderError;

/// Failures surfaced by [`crate::catalog::CatalogPager`].
///
/// Exhaustion, coalesced calls and superseded fetches are not errors; see
/// [`crate::catalog::PageLoad`].
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog source error: {0}")]
    Provider(#[from] ProviderError),

    #[error("{0} representation has no active query")]
    InactiveRepresentation(RepresentationKind),
}

impl CatalogError {
    /// Whether a retry affordance makes sense for this failure.
    pub fn is_transient(&self) -> bool {
        match self {
            CatalogError::Provider(err) => err.is_transient(),
            CatalogError::InactiveRepresentation(_) => false,
        }
    }
}

pub type Result<T, E = CatalogError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum ReminderError {
    #[error("reminder backend error: {0}")]
    Backend(String),

    #[error("reminder not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures of the tracked-show and last-checked persistence ports.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("state unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache entry failed integrity check: {0}")]
    Corrupt(String),

    #[error("cache error: {0}")]
    Internal(String),
}

/// Fatal failures of a reconciliation pass. Any of these leaves the
/// last-checked timestamp untouched.
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("a reconciliation pass is already running")]
    AlreadyRunning,

    #[error("failed to read tracked shows: {0}")]
    TrackedShows(#[source] StateError),

    #[error("failed to access last-checked timestamp: {0}")]
    LastChecked(#[source] StateError),

    #[error("failed to list pending reminders: {0}")]
    PendingReminders(#[source] ReminderError),
}
