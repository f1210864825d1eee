pub mod error;

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use self::error::ConfigLoadError;
use super::{
    models::{
        Config, ConfigMetadata, ReconcileConfig, RemindersConfig,
        StorageConfig, TmdbConfig,
    },
    sources::{EnvConfig, FileConfig},
    validation::{self, ConfigGuardRailError, ConfigWarnings},
};

const DEFAULT_CONFIG_LOCATIONS: [&str; 2] =
    ["showtrack.toml", "config/showtrack.toml"];

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    /// Replaces the process environment when set.
    pub process_env: Option<HashMap<String, String>>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    pub fn with_process_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.options.process_env = Some(
            vars.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let dotenv = self.read_env_file()?;
        let env_file_loaded = dotenv.is_some();
        let dotenv = dotenv.unwrap_or_default();

        // Process environment wins over the .env file.
        let env_config = EnvConfig::from_lookup(|name| {
            let process = match &self.options.process_env {
                Some(vars) => vars.get(name).cloned(),
                None => std::env::var(name).ok(),
            };
            process.or_else(|| dotenv.get(name).cloned())
        });

        let (file_config, config_path) = self.load_file_config(&env_config)?;
        let (config, warnings) = compose_config(
            file_config,
            env_config,
            config_path,
            env_file_loaded,
        )?;

        Ok(ConfigLoad { config, warnings })
    }

    fn read_env_file(
        &self,
    ) -> Result<Option<HashMap<String, String>>, ConfigLoadError> {
        let iter = match &self.options.env_file {
            Some(path) => dotenvy::from_path_iter(path),
            None => dotenvy::dotenv_iter(),
        };
        let iter = match iter {
            Ok(iter) => iter,
            Err(dotenvy::Error::Io(_)) => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let mut vars = HashMap::new();
        for item in iter {
            let (key, value) = item?;
            vars.insert(key, value);
        }
        Ok(Some(vars))
    }

    fn load_file_config(
        &self,
        env_config: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let (path, explicit) = match (
            &self.options.config_path,
            &env_config.config_path,
        ) {
            (Some(path), _) | (None, Some(path)) => (path.clone(), true),
            (None, None) => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .map(PathBuf::from)
                .find(|candidate| candidate.exists())
            {
                Some(path) => (path, false),
                None => return Ok((None, None)),
            },
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            return Ok((None, None));
        }

        debug!(path = %path.display(), "reading configuration file");
        let contents =
            fs::read_to_string(&path).map_err(|source| ConfigLoadError::Io {
                path: path.clone(),
                source,
            })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|source| {
                ConfigLoadError::Parse {
                    path: path.clone(),
                    source,
                }
            })?;

        Ok((Some(file_config), Some(path)))
    }
}

fn compose_config(
    file_config: Option<FileConfig>,
    env: EnvConfig,
    config_path: Option<PathBuf>,
    env_file_loaded: bool,
) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
    let mut warnings = ConfigWarnings::default();

    if config_path.is_none() {
        warnings.push_with_hint(
            "No showtrack.toml detected; using defaults and environment variables",
            "Create showtrack.toml or point SHOWTRACK_CONFIG at a configuration file",
        );
    }

    let FileConfig {
        tmdb: file_tmdb,
        reminders: file_reminders,
        reconcile: file_reconcile,
        storage: file_storage,
    } = file_config.unwrap_or_default();

    let tmdb_defaults = TmdbConfig::default();
    let tmdb = TmdbConfig {
        api_key: env
            .tmdb_api_key
            .or(file_tmdb.api_key)
            .filter(|key| !key.trim().is_empty()),
        base_url: env
            .tmdb_base_url
            .or(file_tmdb.base_url)
            .unwrap_or(tmdb_defaults.base_url),
        image_base_url: env
            .tmdb_image_base_url
            .or(file_tmdb.image_base_url)
            .unwrap_or(tmdb_defaults.image_base_url),
        poster_size: file_tmdb
            .poster_size
            .unwrap_or(tmdb_defaults.poster_size),
        language: env
            .language
            .or(file_tmdb.language)
            .unwrap_or(tmdb_defaults.language),
        request_timeout: match env
            .tmdb_request_timeout
            .or(file_tmdb.request_timeout)
        {
            Some(raw) => {
                validation::parse_duration("tmdb.request_timeout", &raw)?
            }
            None => tmdb_defaults.request_timeout,
        },
    };

    let reminder_defaults = RemindersConfig::default();
    let reminders = RemindersConfig {
        fire_time: match env.fire_time.or(file_reminders.fire_time) {
            Some(raw) => validation::parse_fire_time(&raw)?,
            None => reminder_defaults.fire_time,
        },
        default_snooze: optional_delta(
            "reminders.default_snooze",
            file_reminders.default_snooze,
        )?
        .unwrap_or(reminder_defaults.default_snooze),
        repair_lookback: optional_delta(
            "reminders.repair_lookback",
            env.repair_lookback.or(file_reminders.repair_lookback),
        )?
        .unwrap_or(reminder_defaults.repair_lookback),
        repair_delay: optional_delta(
            "reminders.repair_delay",
            file_reminders.repair_delay,
        )?
        .unwrap_or(reminder_defaults.repair_delay),
    };

    let max_concurrent_fetches = match env.max_concurrent_fetches {
        Some(raw) => validation::parse_count(
            "SHOWTRACK_MAX_CONCURRENT_FETCHES",
            &raw,
        )?,
        None => file_reconcile
            .max_concurrent_fetches
            .unwrap_or(ReconcileConfig::default().max_concurrent_fetches),
    };
    let reconcile = ReconcileConfig {
        max_concurrent_fetches,
    };

    let state_dir = match (env.state_dir, file_storage.state_dir) {
        (Some(from_env), _) => from_env,
        (None, Some(from_file)) => {
            anchor_to_config(from_file, config_path.as_deref())
        }
        (None, None) => StorageConfig::default().state_dir,
    };
    let storage = StorageConfig { state_dir };

    let config = Config {
        tmdb,
        reminders,
        reconcile,
        storage,
        metadata: ConfigMetadata {
            config_path,
            env_file_loaded,
        },
    };

    warnings.extend(validation::apply_guard_rails(&config)?);

    Ok((config, warnings))
}

fn optional_delta(
    field: &'static str,
    raw: Option<String>,
) -> Result<Option<chrono::TimeDelta>, ConfigGuardRailError> {
    raw.map(|raw| validation::parse_time_delta(field, &raw))
        .transpose()
}

/// Relative paths in a config file are relative to that file.
fn anchor_to_config(path: PathBuf, config_path: Option<&Path>) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match config_path.and_then(Path::parent) {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(path),
        _ => path,
    }
}
