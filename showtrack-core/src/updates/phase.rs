use std::fmt;

/// Progress of a reconciliation pass, observable through
/// [`super::UpdateReconciler::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcilePhase {
    #[default]
    Idle,
    FetchingDetails,
    FetchingSeasons,
    Filtering,
    Reconciling,
    Done(PassResult),
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassResult {
    Updated,
    NoUpdates,
}

impl ReconcilePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReconcilePhase::Done(_) | ReconcilePhase::Failed)
    }
}

impl fmt::Display for ReconcilePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReconcilePhase::Idle => "idle",
            ReconcilePhase::FetchingDetails => "fetching details",
            ReconcilePhase::FetchingSeasons => "fetching seasons",
            ReconcilePhase::Filtering => "filtering",
            ReconcilePhase::Reconciling => "reconciling",
            ReconcilePhase::Done(PassResult::Updated) => "done (updated)",
            ReconcilePhase::Done(PassResult::NoUpdates) => "done (no updates)",
            ReconcilePhase::Failed => "failed",
        };
        f.write_str(label)
    }
}
