use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use futures::{StreamExt, future, stream};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use showtrack_model::{
    Artwork, FeedEntry, ReminderId, Season, ShowDetails, ShowId, UpdatesFeed,
};

use crate::context::CoreContext;
use crate::episode_clock;
use crate::error::ReconcileError;
use crate::providers::{CatalogSource, PosterLoader};
use crate::reminders::NotificationScheduler;

use super::phase::{PassResult, ReconcilePhase};
use super::ports::{LastCheckedStore, TrackedShowsStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Upper bound on concurrent remote fetches per fan-out step.
    pub max_concurrent_fetches: usize,
    /// How far back repair looks on a first run or after a long gap.
    pub repair_lookback: TimeDelta,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 8,
            repair_lookback: TimeDelta::days(7),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    pub scheduled: Vec<ReminderId>,
    pub failed: Vec<ReminderId>,
    /// Episodes in the window that already had a pending reminder.
    pub already_pending: usize,
    /// Fired reminders of aired episodes removed from the backend.
    pub pruned: Vec<ReminderId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    Updates {
        feed: UpdatesFeed,
        repair: RepairReport,
        checked_at: DateTime<Utc>,
    },
    /// Nothing new; `since` is the timestamp the pass compared against.
    NoUpdates {
        since: Option<DateTime<Utc>>,
        repair: RepairReport,
        checked_at: DateTime<Utc>,
    },
}

impl ReconcileOutcome {
    pub fn repair(&self) -> &RepairReport {
        match self {
            ReconcileOutcome::Updates { repair, .. }
            | ReconcileOutcome::NoUpdates { repair, .. } => repair,
        }
    }

    pub fn feed(&self) -> Option<&UpdatesFeed> {
        match self {
            ReconcileOutcome::Updates { feed, .. } => Some(feed),
            ReconcileOutcome::NoUpdates { .. } => None,
        }
    }

    pub fn checked_at(&self) -> DateTime<Utc> {
        match self {
            ReconcileOutcome::Updates { checked_at, .. }
            | ReconcileOutcome::NoUpdates { checked_at, .. } => *checked_at,
        }
    }
}

/// A tracked show whose latest season was fetched.
struct FetchedShow {
    details: ShowDetails,
    season: Season,
}

/// Runs reconciliation passes: updates feed plus missed-reminder repair.
///
/// Only one pass runs at a time; a concurrent call fails fast with
/// [`ReconcileError::AlreadyRunning`].
pub struct UpdateReconciler {
    context: CoreContext,
    options: ReconcileOptions,
    source: Arc<dyn CatalogSource>,
    posters: Arc<dyn PosterLoader>,
    scheduler: Arc<NotificationScheduler>,
    tracked: Arc<dyn TrackedShowsStore>,
    last_checked: Arc<dyn LastCheckedStore>,
    running: Mutex<()>,
    phase: watch::Sender<ReconcilePhase>,
}

impl std::fmt::Debug for UpdateReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateReconciler")
            .field("context", &self.context)
            .field("options", &self.options)
            .field("phase", &*self.phase.borrow())
            .finish_non_exhaustive()
    }
}

impl UpdateReconciler {
    pub fn new(
        context: CoreContext,
        options: ReconcileOptions,
        source: Arc<dyn CatalogSource>,
        posters: Arc<dyn PosterLoader>,
        scheduler: Arc<NotificationScheduler>,
        tracked: Arc<dyn TrackedShowsStore>,
        last_checked: Arc<dyn LastCheckedStore>,
    ) -> Self {
        let (phase, _) = watch::channel(ReconcilePhase::Idle);
        Self {
            context,
            options,
            source,
            posters,
            scheduler,
            tracked,
            last_checked,
            running: Mutex::new(()),
            phase,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ReconcilePhase> {
        self.phase.subscribe()
    }

    pub fn phase(&self) -> ReconcilePhase {
        *self.phase.borrow()
    }

    fn enter(&self, phase: ReconcilePhase) {
        debug!(%phase, "reconcile phase");
        self.phase.send_replace(phase);
    }

    fn parallelism(&self) -> usize {
        self.options.max_concurrent_fetches.max(1)
    }

    /// Run one pass.
    ///
    /// The last-checked timestamp advances only when the pass completes; on
    /// any error it is left as it was.
    pub async fn reconcile(&self) -> Result<ReconcileOutcome, ReconcileError> {
        let Ok(_running) = self.running.try_lock() else {
            return Err(ReconcileError::AlreadyRunning);
        };

        match self.run_pass().await {
            Ok(outcome) => {
                let result = match outcome {
                    ReconcileOutcome::Updates { .. } => PassResult::Updated,
                    ReconcileOutcome::NoUpdates { .. } => PassResult::NoUpdates,
                };
                self.enter(ReconcilePhase::Done(result));
                Ok(outcome)
            }
            Err(err) => {
                warn!("reconciliation pass failed: {err}");
                self.enter(ReconcilePhase::Failed);
                Err(err)
            }
        }
    }

    async fn run_pass(&self) -> Result<ReconcileOutcome, ReconcileError> {
        let now = self.context.now();
        let since = self
            .last_checked
            .load()
            .await
            .map_err(ReconcileError::LastChecked)?;
        let ids = self
            .tracked
            .tracked_show_ids()
            .await
            .map_err(ReconcileError::TrackedShows)?;
        let ids = dedup_preserving_order(ids);
        info!(tracked = ids.len(), since = ?since, "starting reconciliation pass");

        self.enter(ReconcilePhase::FetchingDetails);
        let details = self.fetch_details(&ids).await;
        let candidates: Vec<ShowDetails> = details
            .into_iter()
            .filter(|show| match since {
                Some(since) => {
                    episode_clock::aired_after(show.last_air_date.as_deref(), since)
                }
                None => true,
            })
            .collect();
        debug!(candidates = candidates.len(), "shows aired since last check");

        self.enter(ReconcilePhase::FetchingSeasons);
        let fetched = self.fetch_latest_seasons(candidates).await;

        self.enter(ReconcilePhase::Filtering);
        let floor = since.unwrap_or(DateTime::<Utc>::MIN_UTC);
        let updated: Vec<&FetchedShow> = fetched
            .iter()
            .filter(|show| !episode_clock::episodes_after(&show.season, floor).is_empty())
            .collect();
        let entries = self.build_entries(&updated, since).await;

        self.enter(ReconcilePhase::Reconciling);
        let mut repair = self.repair(&fetched, since, now).await?;

        self.last_checked
            .store(now)
            .await
            .map_err(ReconcileError::LastChecked)?;
        repair.pruned = self.prune(&fetched, now).await;

        info!(
            updated = entries.len(),
            repaired = repair.scheduled.len(),
            repair_failures = repair.failed.len(),
            pruned = repair.pruned.len(),
            "reconciliation pass complete"
        );

        if entries.is_empty() {
            Ok(ReconcileOutcome::NoUpdates {
                since,
                repair,
                checked_at: now,
            })
        } else {
            Ok(ReconcileOutcome::Updates {
                feed: UpdatesFeed { since, entries },
                repair,
                checked_at: now,
            })
        }
    }

    async fn fetch_details(&self, ids: &[ShowId]) -> Vec<ShowDetails> {
        let language = self.context.language();
        stream::iter(ids.iter().copied())
            .map(|id| async move {
                match self.source.show_details(id, language).await {
                    Ok(details) => Some(details),
                    Err(err) => {
                        warn!(show_id = id, "dropping show, details fetch failed: {err}");
                        None
                    }
                }
            })
            .buffered(self.parallelism())
            .filter_map(future::ready)
            .collect()
            .await
    }

    async fn fetch_latest_seasons(&self, shows: Vec<ShowDetails>) -> Vec<FetchedShow> {
        let language = self.context.language();
        stream::iter(shows)
            .map(|details| async move {
                let Some(latest) = details.latest_season() else {
                    debug!(show_id = details.id, "show has no seasons");
                    return None;
                };
                let season_number = latest.season_number;
                match self
                    .source
                    .season(details.id, season_number, language)
                    .await
                {
                    Ok(season) => Some(FetchedShow { details, season }),
                    Err(err) => {
                        warn!(
                            show_id = details.id,
                            season = season_number,
                            "dropping show, season fetch failed: {err}"
                        );
                        None
                    }
                }
            })
            .buffered(self.parallelism())
            .filter_map(future::ready)
            .collect()
            .await
    }

    async fn load_poster(&self, show: &FetchedShow) -> Artwork {
        let path = show
            .season
            .poster_path
            .as_deref()
            .or(show.details.poster_path.as_deref());
        let Some(path) = path else {
            return Artwork::Placeholder;
        };
        match self.posters.load(path).await {
            Ok(bytes) => Artwork::Loaded { bytes },
            Err(err) => {
                debug!(show_id = show.details.id, "poster unavailable: {err}");
                Artwork::Placeholder
            }
        }
    }

    async fn build_entries(
        &self,
        shows: &[&FetchedShow],
        since: Option<DateTime<Utc>>,
    ) -> Vec<FeedEntry> {
        let floor = since.unwrap_or(DateTime::<Utc>::MIN_UTC);
        stream::iter(shows.iter().copied())
            .map(|show| async move {
                let poster = self.load_poster(show).await;
                let season_is_new = episode_clock::aired_after(
                    show.season.air_date.as_deref(),
                    floor,
                );
                FeedEntry {
                    show_id: show.details.id,
                    show_name: show.details.name.clone(),
                    season_number: show.season.season_number,
                    new_season_name: season_is_new
                        .then(|| show.season.display_name()),
                    new_episode_names: episode_clock::episodes_after(&show.season, floor)
                        .into_iter()
                        .map(|episode| episode.display_name())
                        .collect(),
                    poster,
                }
            })
            .buffered(self.parallelism())
            .boxed()
            .collect()
            .await
    }

    /// Schedule every episode in the repair window that has no pending
    /// reminder.
    async fn repair(
        &self,
        shows: &[FetchedShow],
        since: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<RepairReport, ReconcileError> {
        let pending: HashSet<ReminderId> = self
            .scheduler
            .pending_ids()
            .await
            .map_err(ReconcileError::PendingReminders)?
            .into_iter()
            .collect();

        let lookback_start = now
            .checked_sub_signed(self.options.repair_lookback)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let window_start = since.map_or(lookback_start, |since| since.max(lookback_start));

        let mut report = RepairReport::default();
        for show in shows {
            for episode in episode_clock::episodes_after(&show.season, window_start) {
                let id = ReminderId::new(
                    show.season.show_id,
                    show.season.season_number,
                    episode.episode_number,
                );
                if pending.contains(&id) {
                    report.already_pending += 1;
                    continue;
                }
                match self
                    .scheduler
                    .schedule_episode(&show.details.name, &show.season, episode)
                    .await
                {
                    Ok(id) => {
                        info!(reminder = %id, "repaired missing reminder");
                        report.scheduled.push(id);
                    }
                    Err(err) => {
                        warn!(reminder = %id, "failed to repair reminder: {err}");
                        report.failed.push(id);
                    }
                }
            }
        }
        Ok(report)
    }

    /// Drop reminders that already fired.
    ///
    /// Episodes of the fetched seasons that are still ahead are kept even
    /// if a snooze left their reminder in the past; anything else is judged
    /// by its fire instant. Failures are logged and leave the backend as is.
    async fn prune(&self, shows: &[FetchedShow], now: DateTime<Utc>) -> Vec<ReminderId> {
        let upcoming: HashSet<ReminderId> = shows
            .iter()
            .flat_map(|show| {
                let season = &show.season;
                episode_clock::future_episodes(season, now)
                    .into_iter()
                    .map(move |episode| {
                        ReminderId::new(
                            season.show_id,
                            season.season_number,
                            episode.episode_number,
                        )
                    })
            })
            .collect();

        match self.scheduler.prune_fired(now, &upcoming).await {
            Ok(pruned) => pruned,
            Err(err) => {
                warn!("failed to prune fired reminders: {err}");
                Vec::new()
            }
        }
    }
}

fn dedup_preserving_order(ids: Vec<ShowId>) -> Vec<ShowId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
