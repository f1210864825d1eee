use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use chrono::{NaiveTime, TimeDelta};
use showtrack_core::{
    CoreContext, SystemClock,
    providers::TmdbSettings,
    reminders::ReminderPolicy,
    updates::ReconcileOptions,
};

pub use showtrack_core::providers::tmdb::{
    TMDB_IMAGE_BASE as DEFAULT_TMDB_IMAGE_BASE_URL,
    TMDB_V3_BASE as DEFAULT_TMDB_BASE_URL,
};

pub const DEFAULT_POSTER_SIZE: &str = "w342";
pub const DEFAULT_LANGUAGE: &str = "en-US";
pub const DEFAULT_STATE_DIR: &str = "./.showtrack";

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub tmdb: TmdbConfig,
    pub reminders: RemindersConfig,
    pub reconcile: ReconcileConfig,
    pub storage: StorageConfig,
    pub metadata: ConfigMetadata,
}

#[derive(Clone)]
pub struct TmdbConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub image_base_url: String,
    pub poster_size: String,
    pub language: String,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for TmdbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("image_base_url", &self.image_base_url)
            .field("poster_size", &self.poster_size)
            .field("language", &self.language)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_TMDB_BASE_URL.to_string(),
            image_base_url: DEFAULT_TMDB_IMAGE_BASE_URL.to_string(),
            poster_size: DEFAULT_POSTER_SIZE.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            request_timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemindersConfig {
    /// Time of day (UTC) reminders fire on an episode's air date.
    pub fire_time: NaiveTime,
    pub default_snooze: TimeDelta,
    pub repair_lookback: TimeDelta,
    /// Lead time for repaired reminders whose natural fire time has passed.
    pub repair_delay: TimeDelta,
}

impl Default for RemindersConfig {
    fn default() -> Self {
        let policy = ReminderPolicy::default();
        Self {
            fire_time: policy.fire_time,
            default_snooze: TimeDelta::minutes(10),
            repair_lookback: ReconcileOptions::default().repair_lookback,
            repair_delay: policy.repair_delay,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileConfig {
    pub max_concurrent_fetches: usize,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: ReconcileOptions::default()
                .max_concurrent_fetches,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub state_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
        }
    }
}

impl StorageConfig {
    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn poster_cache_dir(&self) -> PathBuf {
        self.state_dir.join("posters")
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}

impl Config {
    /// Context for the core engine running on the wall clock.
    pub fn core_context(&self) -> CoreContext {
        CoreContext::new(
            Some(self.tmdb.language.clone()),
            Arc::new(SystemClock),
        )
    }

    pub fn reminder_policy(&self) -> ReminderPolicy {
        ReminderPolicy {
            fire_time: self.reminders.fire_time,
            repair_delay: self.reminders.repair_delay,
        }
    }

    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            max_concurrent_fetches: self.reconcile.max_concurrent_fetches,
            repair_lookback: self.reminders.repair_lookback,
        }
    }

    /// TMDB client settings; `None` while no API key is configured.
    pub fn tmdb_settings(&self) -> Option<TmdbSettings> {
        let api_key = self.tmdb.api_key.as_ref()?;
        let mut settings = TmdbSettings::new(api_key.clone())
            .with_base_url(self.tmdb.base_url.clone())
            .with_image_base_url(self.tmdb.image_base_url.clone());
        settings.poster_size = self.tmdb.poster_size.clone();
        settings.request_timeout = self.tmdb.request_timeout;
        Some(settings)
    }
}
