use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub tmdb: FileTmdbConfig,
    #[serde(default)]
    pub reminders: FileRemindersConfig,
    #[serde(default)]
    pub reconcile: FileReconcileConfig,
    #[serde(default)]
    pub storage: FileStorageConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileTmdbConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Humantime duration, e.g. `15s`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileRemindersConfig {
    /// `HH:MM`, UTC.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fire_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_snooze: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repair_lookback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repair_delay: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileReconcileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrent_fetches: Option<usize>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileStorageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub tmdb_api_key: Option<String>,
    pub tmdb_base_url: Option<String>,
    pub tmdb_image_base_url: Option<String>,
    pub tmdb_request_timeout: Option<String>,
    pub language: Option<String>,
    pub fire_time: Option<String>,
    pub repair_lookback: Option<String>,
    pub max_concurrent_fetches: Option<String>,
    pub state_dir: Option<PathBuf>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads every variable through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            config_path: var("SHOWTRACK_CONFIG").map(PathBuf::from),
            tmdb_api_key: var("TMDB_API_KEY"),
            tmdb_base_url: var("TMDB_BASE_URL"),
            tmdb_image_base_url: var("TMDB_IMAGE_BASE_URL"),
            tmdb_request_timeout: var("TMDB_REQUEST_TIMEOUT"),
            language: var("SHOWTRACK_LANGUAGE"),
            fire_time: var("SHOWTRACK_FIRE_TIME"),
            repair_lookback: var("SHOWTRACK_REPAIR_LOOKBACK"),
            max_concurrent_fetches: var("SHOWTRACK_MAX_CONCURRENT_FETCHES"),
            state_dir: var("SHOWTRACK_STATE_DIR").map(PathBuf::from),
        }
    }
}
