//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. `CLINISYNC_CONFIG` names an explicit file, which must exist
//! 2. Otherwise environment variables are used when `CLINISYNC_DB_PATH` is set
//! 3. Otherwise the standard locations are probed for a config file
//! 4. With no file anywhere, [`Config::default`] is used
//!
//! Every loaded configuration is validated before it is returned.
//!
//! ## Environment Variables
//! - `CLINISYNC_DB_PATH`: Database file path (required)
//! - `CLINISYNC_DB_POOL_SIZE`: Connection pool size (required)
//! - `CLINISYNC_CALENDAR_ID`: Calendar the sessions are mirrored to (required)
//! - `CLINISYNC_TIME_ZONE`: IANA zone for remote writes (required)
//! - `CLINISYNC_ALERT_USER_ID`: User receiving conflict alerts (required)
//! - `CLINISYNC_CALENDAR_API_BASE`: Calendar API base URL
//! - `CLINISYNC_REQUEST_TIMEOUT_SECS`: HTTP timeout in seconds
//! - `CLINISYNC_SESSION_DURATION_MINUTES`: Length of written events
//! - `CLINISYNC_LOG_LEVEL`: Default tracing level
//! - `CLINISYNC_LOG_JSON`: Emit JSON logs (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.{json,toml}` and `./clinisync.{json,toml}`
//! 2. `../config.{json,toml}` and `../../config.{json,toml}`
//! 3. The same names relative to the executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use clinisync_domain::constants::{
    DEFAULT_CALENDAR_API_BASE, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SESSION_DURATION_MINUTES,
};
use clinisync_domain::{
    CalendarConfig, CliniSyncError, Config, DatabaseConfig, LoggingConfig, ReconcileConfig, Result,
};

const CONFIG_PATH_VAR: &str = "CLINISYNC_CONFIG";

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `CliniSyncError::Config` if the chosen source is invalid or the
/// resulting configuration fails validation.
pub fn load() -> Result<Config> {
    let config = if let Ok(path) = std::env::var(CONFIG_PATH_VAR) {
        load_from_file(Some(PathBuf::from(path)))?
    } else if std::env::var("CLINISYNC_DB_PATH").is_ok() {
        let config = load_from_env()?;
        tracing::info!("Configuration loaded from environment variables");
        config
    } else if let Some(path) = probe_config_paths() {
        load_from_file(Some(path))?
    } else {
        tracing::info!("No configuration found, using defaults");
        Config::default()
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `CliniSyncError::Config` if required variables are missing or have
/// invalid values.
pub fn load_from_env() -> Result<Config> {
    let db_path = env_var("CLINISYNC_DB_PATH")?;
    let pool_size = env_parse::<u32>("CLINISYNC_DB_POOL_SIZE")?;
    let calendar_id = env_var("CLINISYNC_CALENDAR_ID")?;
    let time_zone = env_var("CLINISYNC_TIME_ZONE")?;
    let alert_user_id = env_var("CLINISYNC_ALERT_USER_ID")?;

    let api_base_url = std::env::var("CLINISYNC_CALENDAR_API_BASE")
        .unwrap_or_else(|_| DEFAULT_CALENDAR_API_BASE.to_string());
    let request_timeout_secs = env_parse_or(
        "CLINISYNC_REQUEST_TIMEOUT_SECS",
        DEFAULT_REQUEST_TIMEOUT_SECS,
    )?;
    let session_duration_minutes = env_parse_or(
        "CLINISYNC_SESSION_DURATION_MINUTES",
        DEFAULT_SESSION_DURATION_MINUTES,
    )?;

    let logging = LoggingConfig {
        level: std::env::var("CLINISYNC_LOG_LEVEL")
            .unwrap_or_else(|_| LoggingConfig::default().level),
        json: env_bool("CLINISYNC_LOG_JSON", false),
    };

    Ok(Config {
        database: DatabaseConfig { path: db_path, pool_size },
        calendar: CalendarConfig { api_base_url, calendar_id, request_timeout_secs },
        reconcile: ReconcileConfig { alert_user_id, time_zone, session_duration_minutes },
        logging,
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. JSON and TOML are
/// supported, detected by file extension.
///
/// # Errors
/// Returns `CliniSyncError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CliniSyncError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            CliniSyncError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CliniSyncError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CliniSyncError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CliniSyncError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(CliniSyncError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a configuration file
///
/// Returns the first existing candidate, or `None`.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("clinisync.json"),
        dir.join("clinisync.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
        dir.join("../../config.json"),
        dir.join("../../config.toml"),
    ]
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        CliniSyncError::Config(format!("Missing required environment variable: {key}"))
    })
}

fn env_parse<T>(key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_var(key)?
        .trim()
        .parse::<T>()
        .map_err(|e| CliniSyncError::Config(format!("Invalid value for {key}: {e}")))
}

fn env_parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(_) => env_parse(key),
        Err(_) => Ok(default),
    }
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
