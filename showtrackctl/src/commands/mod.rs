pub mod browse;
pub mod remind;
pub mod track;
pub mod updates;

use std::sync::Arc;

use anyhow::{Context, Result};
use showtrack_config::Config;
use showtrack_core::{
    CoreContext,
    infra::{JsonFileReminderStore, JsonStateFile},
    providers::{TmdbCatalogSource, TmdbSettings},
    reminders::NotificationScheduler,
};

/// Wiring shared by every subcommand; all state lives under `state_dir`.
pub struct App {
    pub config: Config,
    pub context: CoreContext,
}

impl App {
    pub fn new(config: Config) -> Self {
        let context = config.core_context();
        Self { config, context }
    }

    pub fn tmdb_settings(&self) -> Result<TmdbSettings> {
        self.config.tmdb_settings().context(
            "TMDB API key not configured; set TMDB_API_KEY or [tmdb].api_key",
        )
    }

    pub fn catalog_source(&self) -> Result<Arc<TmdbCatalogSource>> {
        let source = TmdbCatalogSource::new(self.tmdb_settings()?)
            .context("failed to build TMDB client")?;
        Ok(Arc::new(source))
    }

    pub fn state(&self) -> Arc<JsonStateFile> {
        Arc::new(JsonStateFile::in_dir(self.config.storage.state_dir()))
    }

    pub fn reminder_store(&self) -> Arc<JsonFileReminderStore> {
        Arc::new(JsonFileReminderStore::in_dir(
            self.config.storage.state_dir(),
        ))
    }

    pub fn scheduler(&self) -> Arc<NotificationScheduler> {
        Arc::new(NotificationScheduler::new(
            self.reminder_store(),
            self.context.clone(),
            self.config.reminder_policy(),
        ))
    }
}
