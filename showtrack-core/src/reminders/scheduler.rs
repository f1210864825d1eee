use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use tracing::{debug, info, warn};

use showtrack_model::{
    Episode, ReminderId, Season, SeasonKey, SeasonReminderStatus, ShowId,
};

use crate::context::CoreContext;
use crate::episode_clock;
use crate::error::ReminderError;

use super::store::{Reminder, ReminderStore};

/// When reminders fire relative to an episode's air date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderPolicy {
    /// Wall-clock time (UTC) on the air date.
    pub fire_time: NaiveTime,
    /// Lead time for a reminder whose natural fire instant already passed.
    pub repair_delay: TimeDelta,
}

impl Default for ReminderPolicy {
    fn default() -> Self {
        Self {
            fire_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            repair_delay: TimeDelta::minutes(1),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleReport {
    pub scheduled: Vec<ReminderId>,
    pub failed: Vec<ReminderId>,
}

impl ScheduleReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Pending identifier as listed by the backend, paired with its raw form.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Pending {
    raw: String,
    id: ReminderId,
}

/// Turns season-level intent into reminder backend calls.
pub struct NotificationScheduler {
    store: Arc<dyn ReminderStore>,
    context: CoreContext,
    policy: ReminderPolicy,
}

impl std::fmt::Debug for NotificationScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationScheduler")
            .field("context", &self.context)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl NotificationScheduler {
    pub fn new(
        store: Arc<dyn ReminderStore>,
        context: CoreContext,
        policy: ReminderPolicy,
    ) -> Self {
        Self {
            store,
            context,
            policy,
        }
    }

    pub fn policy(&self) -> &ReminderPolicy {
        &self.policy
    }

    pub fn store(&self) -> &Arc<dyn ReminderStore> {
        &self.store
    }

    /// Reminder state of `season` given the currently pending identifiers.
    ///
    /// Only identifiers of episodes that have not aired count; a leftover
    /// reminder for an aired episode does not turn the season on.
    pub fn status_of(
        season: &Season,
        now: DateTime<Utc>,
        pending: &[ReminderId],
    ) -> SeasonReminderStatus {
        let upcoming: HashSet<u32> = episode_clock::future_episodes(season, now)
            .into_iter()
            .map(|episode| episode.episode_number)
            .collect();
        if upcoming.is_empty() {
            return SeasonReminderStatus::NotApplicable;
        }
        let key = SeasonKey::new(season.show_id, season.season_number);
        if pending
            .iter()
            .any(|id| id.belongs_to(key) && upcoming.contains(&id.episode_number))
        {
            SeasonReminderStatus::On
        } else {
            SeasonReminderStatus::Off
        }
    }

    pub async fn season_status(
        &self,
        season: &Season,
    ) -> Result<SeasonReminderStatus, ReminderError> {
        let pending = self.pending_ids().await?;
        Ok(Self::status_of(season, self.context.now(), &pending))
    }

    async fn pending(&self) -> Result<Vec<Pending>, ReminderError> {
        let raw = self.store.pending_identifiers().await?;
        Ok(raw
            .into_iter()
            .filter_map(|raw| match raw.parse::<ReminderId>() {
                Ok(id) => Some(Pending { raw, id }),
                Err(err) => {
                    debug!(identifier = %raw, "ignoring foreign reminder: {err}");
                    None
                }
            })
            .collect())
    }

    /// Pending identifiers that belong to this engine.
    pub async fn pending_ids(&self) -> Result<Vec<ReminderId>, ReminderError> {
        Ok(self.pending().await?.into_iter().map(|p| p.id).collect())
    }

    pub async fn pending_for_season(
        &self,
        key: SeasonKey,
    ) -> Result<Vec<ReminderId>, ReminderError> {
        Ok(self
            .pending_ids()
            .await?
            .into_iter()
            .filter(|id| id.belongs_to(key))
            .collect())
    }

    /// Instant the reminder for `episode` should fire, ignoring repairs.
    pub fn fire_instant(&self, episode: &Episode) -> Option<DateTime<Utc>> {
        let date = episode
            .air_date
            .as_deref()
            .and_then(episode_clock::parse_air_date)?;
        Some(date.and_time(self.policy.fire_time).and_utc())
    }

    fn reminder_for(
        &self,
        show_name: &str,
        season: &Season,
        episode: &Episode,
        fire_at: DateTime<Utc>,
    ) -> Reminder {
        let id = ReminderId::new(
            season.show_id,
            season.season_number,
            episode.episode_number,
        );
        Reminder {
            identifier: id.to_string(),
            fire_at,
            title: format!("New episode of {show_name}"),
            body: format!(
                "S{:02}E{:02} \"{}\" airs today",
                season.season_number,
                episode.episode_number,
                episode.display_name()
            ),
        }
    }

    /// Schedule one episode.
    ///
    /// A natural fire instant that has already passed is pushed to
    /// `now + repair_delay` so the reminder still fires.
    pub async fn schedule_episode(
        &self,
        show_name: &str,
        season: &Season,
        episode: &Episode,
    ) -> Result<ReminderId, ReminderError> {
        let id = ReminderId::new(
            season.show_id,
            season.season_number,
            episode.episode_number,
        );
        let now = self.context.now();
        let natural = self.fire_instant(episode).ok_or_else(|| {
            ReminderError::Backend(format!("episode {id} has no air date"))
        })?;
        let fire_at = if natural > now {
            natural
        } else {
            now + self.policy.repair_delay
        };

        self.store
            .schedule(self.reminder_for(show_name, season, episode, fire_at))
            .await?;
        debug!(reminder = %id, %fire_at, "reminder scheduled");
        Ok(id)
    }

    /// Schedule a reminder for every future episode of `season`.
    ///
    /// Individual failures are logged and skipped.
    pub async fn schedule(&self, show_name: &str, season: &Season) -> ScheduleReport {
        let now = self.context.now();
        let mut report = ScheduleReport::default();

        for episode in episode_clock::future_episodes(season, now) {
            match self.schedule_episode(show_name, season, episode).await {
                Ok(id) => report.scheduled.push(id),
                Err(err) => {
                    let id = ReminderId::new(
                        season.show_id,
                        season.season_number,
                        episode.episode_number,
                    );
                    warn!(reminder = %id, "failed to schedule reminder: {err}");
                    report.failed.push(id);
                }
            }
        }

        info!(
            show_id = season.show_id,
            season = season.season_number,
            scheduled = report.scheduled.len(),
            failed = report.failed.len(),
            "season reminders scheduled"
        );
        report
    }

    /// Cancel the reminders of exactly one season.
    pub async fn cancel(
        &self,
        show_id: ShowId,
        season_number: u32,
    ) -> Result<Vec<ReminderId>, ReminderError> {
        self.cancel_seasons(show_id, &[season_number]).await
    }

    pub async fn cancel_seasons(
        &self,
        show_id: ShowId,
        season_numbers: &[u32],
    ) -> Result<Vec<ReminderId>, ReminderError> {
        let keys: HashSet<SeasonKey> = season_numbers
            .iter()
            .map(|&season| SeasonKey::new(show_id, season))
            .collect();

        let matched: Vec<Pending> = self
            .pending()
            .await?
            .into_iter()
            .filter(|pending| keys.contains(&pending.id.season_key()))
            .collect();
        if matched.is_empty() {
            return Ok(Vec::new());
        }

        let raw: HashSet<String> =
            matched.iter().map(|pending| pending.raw.clone()).collect();
        self.store.cancel(&raw).await?;

        info!(show_id, cancelled = matched.len(), "season reminders cancelled");
        Ok(matched.into_iter().map(|pending| pending.id).collect())
    }

    /// Cancel every reminder of this engine that fired at or before `now`,
    /// except the identifiers in `upcoming`.
    ///
    /// Foreign identifiers are left alone.
    pub async fn prune_fired(
        &self,
        now: DateTime<Utc>,
        upcoming: &HashSet<ReminderId>,
    ) -> Result<Vec<ReminderId>, ReminderError> {
        let fired: Vec<Pending> = self
            .store
            .pending_reminders()
            .await?
            .into_iter()
            .filter(|reminder| reminder.fire_at <= now)
            .filter_map(|reminder| {
                let id = reminder.identifier.parse::<ReminderId>().ok()?;
                (!upcoming.contains(&id)).then_some(Pending {
                    raw: reminder.identifier,
                    id,
                })
            })
            .collect();
        if fired.is_empty() {
            return Ok(Vec::new());
        }

        let raw: HashSet<String> =
            fired.iter().map(|pending| pending.raw.clone()).collect();
        self.store.cancel(&raw).await?;

        info!(pruned = fired.len(), "fired reminders pruned");
        Ok(fired.into_iter().map(|pending| pending.id).collect())
    }

    /// Snooze: same identifier and content, fires at `now + delay`.
    pub async fn reschedule(
        &self,
        id: &ReminderId,
        delay: TimeDelta,
    ) -> Result<Reminder, ReminderError> {
        let fire_at = self.context.now() + delay;
        let reminder = self.store.reschedule(&id.to_string(), fire_at).await?;
        debug!(reminder = %id, %fire_at, "reminder snoozed");
        Ok(reminder)
    }
}
