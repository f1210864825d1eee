use std::{fs, path::PathBuf, time::Duration};

use chrono::{NaiveTime, TimeDelta};
use showtrack_config::{ConfigGuardRailError, ConfigLoadError, ConfigLoader};

fn hermetic(dir: &tempfile::TempDir) -> ConfigLoader {
    ConfigLoader::new()
        .with_env_file(dir.path().join(".env"))
        .with_process_env(Vec::<(String, String)>::new())
}

fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

#[test]
fn defaults_apply_without_any_source() {
    let dir = tempfile::tempdir().unwrap();
    let load = hermetic(&dir).load().expect("defaults load");
    let config = load.config;

    assert_eq!(config.tmdb.language, "en-US");
    assert_eq!(config.tmdb.poster_size, "w342");
    assert_eq!(config.tmdb.request_timeout, Duration::from_secs(15));
    assert_eq!(
        config.reminders.fire_time,
        NaiveTime::from_hms_opt(9, 0, 0).unwrap()
    );
    assert_eq!(config.reminders.default_snooze, TimeDelta::minutes(10));
    assert_eq!(config.reminders.repair_lookback, TimeDelta::days(7));
    assert_eq!(config.reminders.repair_delay, TimeDelta::minutes(1));
    assert_eq!(config.reconcile.max_concurrent_fetches, 8);
    assert_eq!(config.storage.state_dir, PathBuf::from("./.showtrack"));
    assert!(config.tmdb_settings().is_none());
    assert!(!config.metadata.env_file_loaded);

    let messages: Vec<_> =
        load.warnings.iter().map(|w| w.message.as_str()).collect();
    assert!(messages.iter().any(|m| m.contains("showtrack.toml")));
    assert!(messages.iter().any(|m| m.contains("TMDB_API_KEY")));
}

#[test]
fn file_values_are_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        &dir,
        "showtrack.toml",
        r#"
        [tmdb]
        api_key = "from-file"
        language = "de-DE"
        poster_size = "w500"
        request_timeout = "3s"

        [reminders]
        fire_time = "18:30"
        default_snooze = "1h"
        repair_lookback = "2days"
        repair_delay = "30s"

        [reconcile]
        max_concurrent_fetches = 3

        [storage]
        state_dir = "state"
        "#,
    );

    let load = hermetic(&dir).with_config_path(&path).load().unwrap();
    let config = load.config;

    assert_eq!(config.tmdb.api_key.as_deref(), Some("from-file"));
    assert_eq!(config.tmdb.request_timeout, Duration::from_secs(3));
    assert_eq!(
        config.reminders.fire_time,
        NaiveTime::from_hms_opt(18, 30, 0).unwrap()
    );
    assert_eq!(config.reminders.default_snooze, TimeDelta::hours(1));
    assert_eq!(config.reminders.repair_delay, TimeDelta::seconds(30));
    assert_eq!(config.storage.state_dir, dir.path().join("state"));
    assert_eq!(config.metadata.config_path, Some(path));
    assert!(load.warnings.is_empty());

    let policy = config.reminder_policy();
    assert_eq!(policy.fire_time, config.reminders.fire_time);
    let options = config.reconcile_options();
    assert_eq!(options.max_concurrent_fetches, 3);
    assert_eq!(options.repair_lookback, TimeDelta::days(2));
    let settings = config.tmdb_settings().expect("key configured");
    assert_eq!(settings.poster_size, "w500");
    assert_eq!(config.core_context().language(), Some("de-DE"));
}

#[test]
fn environment_beats_env_file_beats_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        &dir,
        "showtrack.toml",
        r#"
        [tmdb]
        api_key = "from-file"
        language = "de-DE"

        [storage]
        state_dir = "/from/file"
        "#,
    );
    write(
        &dir,
        ".env",
        "TMDB_API_KEY=from-dotenv\nSHOWTRACK_LANGUAGE=fr-FR\n",
    );

    let config = ConfigLoader::new()
        .with_config_path(&path)
        .with_env_file(dir.path().join(".env"))
        .with_process_env([("SHOWTRACK_LANGUAGE", "ja-JP")])
        .load()
        .unwrap()
        .config;

    assert_eq!(config.tmdb.api_key.as_deref(), Some("from-dotenv"));
    assert_eq!(config.tmdb.language, "ja-JP");
    assert_eq!(config.storage.state_dir, PathBuf::from("/from/file"));
    assert!(config.metadata.env_file_loaded);
}

#[test]
fn config_path_from_environment_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    let err = ConfigLoader::new()
        .with_env_file(dir.path().join(".env"))
        .with_process_env([(
            "SHOWTRACK_CONFIG",
            missing.to_string_lossy().into_owned(),
        )])
        .load()
        .unwrap_err();

    assert!(
        matches!(err, ConfigLoadError::MissingConfig { path } if path == missing)
    );
}

#[test]
fn zero_concurrency_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        &dir,
        "showtrack.toml",
        "[reconcile]\nmax_concurrent_fetches = 0\n",
    );

    let err = hermetic(&dir).with_config_path(path).load().unwrap_err();
    assert!(matches!(
        err,
        ConfigLoadError::GuardRail(ConfigGuardRailError::ZeroConcurrency)
    ));
}

#[test]
fn malformed_values_are_hard_errors() {
    let dir = tempfile::tempdir().unwrap();
    let bad_time =
        write(&dir, "time.toml", "[reminders]\nfire_time = \"noon\"\n");
    let bad_duration = write(
        &dir,
        "duration.toml",
        "[reminders]\nrepair_lookback = \"a while\"\n",
    );
    let unknown = write(&dir, "unknown.toml", "[server]\nport = 1\n");

    assert!(matches!(
        hermetic(&dir).with_config_path(bad_time).load(),
        Err(ConfigLoadError::GuardRail(
            ConfigGuardRailError::InvalidFireTime { .. }
        ))
    ));
    assert!(matches!(
        hermetic(&dir).with_config_path(bad_duration).load(),
        Err(ConfigLoadError::GuardRail(
            ConfigGuardRailError::InvalidDuration {
                field: "reminders.repair_lookback",
                ..
            }
        ))
    ));
    assert!(matches!(
        hermetic(&dir).with_config_path(unknown).load(),
        Err(ConfigLoadError::Parse { .. })
    ));
}

#[test]
fn concurrency_override_from_environment_is_validated() {
    let dir = tempfile::tempdir().unwrap();

    let config = hermetic(&dir)
        .with_process_env([("SHOWTRACK_MAX_CONCURRENT_FETCHES", "2")])
        .load()
        .unwrap()
        .config;
    assert_eq!(config.reconcile.max_concurrent_fetches, 2);

    let err = hermetic(&dir)
        .with_process_env([("SHOWTRACK_MAX_CONCURRENT_FETCHES", "lots")])
        .load()
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigLoadError::GuardRail(ConfigGuardRailError::InvalidNumber { .. })
    ));
}
