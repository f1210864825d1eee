use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use showtrack_core::error::{ReminderError, StateError};
use showtrack_core::providers::{
    CatalogSource, PosterLoader, ProviderError, SourcePage, SourceQuery,
};
use showtrack_core::reminders::{InMemoryReminderStore, Reminder, ReminderStore};
use showtrack_core::updates::TrackedShowsStore;
use showtrack_model::{Season, ShowDetails, ShowId, ShowSummary};

/// Scripted response for one `(query, page)` call.
#[derive(Debug, Clone)]
pub enum Scripted {
    Page(SourcePage),
    Status(u16),
    Timeout,
}

#[derive(Debug, Clone, Copy)]
struct Uniform {
    total_pages: u32,
    per_page: u32,
    id_base: ShowId,
}

/// Catalog source driven entirely by test scripts.
///
/// Scripted responses are consumed first; once a `(query, page)` queue is
/// empty the uniform generator for the query (if any) answers.
#[derive(Default)]
pub struct ScriptedSource {
    scripted: Mutex<HashMap<(SourceQuery, u32), VecDeque<Scripted>>>,
    uniform: Mutex<HashMap<SourceQuery, Uniform>>,
    page_delays: Mutex<HashMap<SourceQuery, Duration>>,
    details: Mutex<HashMap<ShowId, ShowDetails>>,
    failing_details: Mutex<HashSet<ShowId>>,
    details_delay: Mutex<Option<Duration>>,
    seasons: Mutex<HashMap<(ShowId, u32), Season>>,
    page_calls: Mutex<Vec<(SourceQuery, u32)>>,
    detail_calls: Mutex<Vec<ShowId>>,
    season_calls: Mutex<Vec<(ShowId, u32)>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

/// Decrements the in-flight counter when a detail or season call ends.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every page of `query` returns `per_page` items until `total_pages`.
    pub fn uniform(
        self,
        query: SourceQuery,
        total_pages: u32,
        per_page: u32,
        id_base: ShowId,
    ) -> Self {
        self.uniform.lock().insert(
            query,
            Uniform {
                total_pages,
                per_page,
                id_base,
            },
        );
        self
    }

    pub fn script(self, query: SourceQuery, page: u32, response: Scripted) -> Self {
        self.scripted
            .lock()
            .entry((query, page))
            .or_default()
            .push_back(response);
        self
    }

    pub fn delay_pages(self, query: SourceQuery, delay: Duration) -> Self {
        self.page_delays.lock().insert(query, delay);
        self
    }

    pub fn with_show(self, details: ShowDetails) -> Self {
        self.details.lock().insert(details.id, details);
        self
    }

    pub fn fail_details(self, id: ShowId) -> Self {
        self.failing_details.lock().insert(id);
        self
    }

    pub fn delay_details(self, delay: Duration) -> Self {
        *self.details_delay.lock() = Some(delay);
        self
    }

    pub fn with_season(self, season: Season) -> Self {
        self.seasons
            .lock()
            .insert((season.show_id, season.season_number), season);
        self
    }

    pub fn page_calls(&self) -> Vec<(SourceQuery, u32)> {
        self.page_calls.lock().clone()
    }

    pub fn detail_calls(&self) -> Vec<ShowId> {
        self.detail_calls.lock().clone()
    }

    pub fn season_calls(&self) -> Vec<(ShowId, u32)> {
        self.season_calls.lock().clone()
    }

    /// Highest number of `show_details`/`season` calls seen running at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn enter(&self) -> InFlight<'_> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        InFlight(&self.in_flight)
    }

    fn uniform_page(&self, query: &SourceQuery, page: u32) -> Option<SourcePage> {
        let uniform = *self.uniform.lock().get(query)?;
        let items = if page >= 1 && page <= uniform.total_pages {
            let first = uniform.id_base + u64::from((page - 1) * uniform.per_page);
            (0..uniform.per_page)
                .map(|offset| summary(first + u64::from(offset)))
                .collect()
        } else {
            Vec::new()
        };
        Some(SourcePage {
            items,
            total_pages: uniform.total_pages,
        })
    }
}

pub fn summary(id: ShowId) -> ShowSummary {
    ShowSummary {
        id,
        poster_path: Some(format!("/poster-{id}.jpg")),
        name: Some(format!("Show {id}")),
        vote: Some(7.5),
        air_date: None,
    }
}

fn api_error(status: u16) -> ProviderError {
    ProviderError::Api {
        status,
        message: format!("scripted status {status}"),
    }
}

#[async_trait]
impl CatalogSource for ScriptedSource {
    async fn fetch_page(
        &self,
        query: &SourceQuery,
        page: u32,
        _language: Option<&str>,
    ) -> Result<SourcePage, ProviderError> {
        self.page_calls.lock().push((query.clone(), page));

        let delay = self.page_delays.lock().get(query).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self
            .scripted
            .lock()
            .get_mut(&(query.clone(), page))
            .and_then(VecDeque::pop_front);
        match scripted {
            Some(Scripted::Page(page)) => Ok(page),
            Some(Scripted::Status(404)) => Err(ProviderError::NotFound),
            Some(Scripted::Status(status)) => Err(api_error(status)),
            Some(Scripted::Timeout) => Err(ProviderError::Timeout),
            None => self
                .uniform_page(query, page)
                .ok_or(ProviderError::NotFound),
        }
    }

    async fn show_details(
        &self,
        id: ShowId,
        _language: Option<&str>,
    ) -> Result<ShowDetails, ProviderError> {
        self.detail_calls.lock().push(id);
        let _in_flight = self.enter();

        let delay = *self.details_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing_details.lock().contains(&id) {
            return Err(api_error(503));
        }
        self.details
            .lock()
            .get(&id)
            .cloned()
            .ok_or(ProviderError::NotFound)
    }

    async fn season(
        &self,
        show_id: ShowId,
        season_number: u32,
        _language: Option<&str>,
    ) -> Result<Season, ProviderError> {
        self.season_calls.lock().push((show_id, season_number));
        let _in_flight = self.enter();
        self.seasons
            .lock()
            .get(&(show_id, season_number))
            .cloned()
            .ok_or(ProviderError::NotFound)
    }
}

/// In-memory reminder backend that can be told to fail.
#[derive(Default)]
pub struct FlakyReminderStore {
    inner: InMemoryReminderStore,
    failing_schedules: Mutex<HashSet<String>>,
    fail_listing: Mutex<bool>,
}

impl FlakyReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_schedule_of(&self, identifier: &str) {
        self.failing_schedules.lock().insert(identifier.to_string());
    }

    pub fn fail_listing(&self, fail: bool) {
        *self.fail_listing.lock() = fail;
    }

    pub fn reminders(&self) -> Vec<Reminder> {
        self.inner.reminders()
    }

    pub fn identifiers(&self) -> Vec<String> {
        self.inner
            .reminders()
            .into_iter()
            .map(|reminder| reminder.identifier)
            .collect()
    }
}

#[async_trait]
impl ReminderStore for FlakyReminderStore {
    async fn schedule(&self, reminder: Reminder) -> Result<(), ReminderError> {
        if self.failing_schedules.lock().contains(&reminder.identifier) {
            return Err(ReminderError::Backend(format!(
                "permission denied for {}",
                reminder.identifier
            )));
        }
        self.inner.schedule(reminder).await
    }

    async fn cancel(
        &self,
        identifiers: &HashSet<String>,
    ) -> Result<(), ReminderError> {
        self.inner.cancel(identifiers).await
    }

    async fn pending_identifiers(&self) -> Result<Vec<String>, ReminderError> {
        if *self.fail_listing.lock() {
            return Err(ReminderError::Backend("listing unavailable".into()));
        }
        self.inner.pending_identifiers().await
    }

    async fn reschedule(
        &self,
        identifier: &str,
        fire_at: DateTime<Utc>,
    ) -> Result<Reminder, ReminderError> {
        self.inner.reschedule(identifier, fire_at).await
    }

    async fn pending_reminders(&self) -> Result<Vec<Reminder>, ReminderError> {
        self.inner.pending_reminders().await
    }
}

/// Poster loader answering from a fixed map and recording requests.
#[derive(Default)]
pub struct RecordingPosters {
    posters: Mutex<HashMap<String, Vec<u8>>>,
    requests: Mutex<Vec<String>>,
}

impl RecordingPosters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poster(self, path: &str, bytes: &[u8]) -> Self {
        self.posters.lock().insert(path.to_string(), bytes.to_vec());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl PosterLoader for RecordingPosters {
    async fn load(&self, poster_path: &str) -> Result<Vec<u8>, ProviderError> {
        self.requests.lock().push(poster_path.to_string());
        self.posters
            .lock()
            .get(poster_path)
            .cloned()
            .ok_or(ProviderError::NotFound)
    }
}

/// Tracked-shows port whose every read fails.
pub struct UnreadableTracked;

#[async_trait]
impl TrackedShowsStore for UnreadableTracked {
    async fn tracked_show_ids(&self) -> Result<Vec<ShowId>, StateError> {
        Err(StateError::Unavailable("tracked list locked".into()))
    }
}
