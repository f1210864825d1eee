//! Configuration loading for showtrack.
//!
//! Values are layered from built-in defaults, an optional `showtrack.toml`,
//! an optional `.env` file and the process environment (highest precedence).
//! The resolved [`Config`] hands out the explicit context objects the core
//! engine expects instead of exposing global settings.

pub mod loader;
pub mod models;
pub mod sources;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoader, ConfigLoaderOptions, error::ConfigLoadError};
pub use models::{
    Config, ConfigMetadata, ReconcileConfig, RemindersConfig, StorageConfig,
    TmdbConfig,
};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};
