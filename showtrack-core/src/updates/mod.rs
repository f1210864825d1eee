//! Update detection and missed-reminder repair across tracked shows.

pub mod phase;
pub mod ports;
pub mod reconciler;

pub use phase::{PassResult, ReconcilePhase};
pub use ports::{InMemoryState, LastCheckedStore, TrackedShowsStore};
pub use reconciler::{
    ReconcileOptions, ReconcileOutcome, RepairReport, UpdateReconciler,
};
