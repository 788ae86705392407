//! Configuration management

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CALENDAR_API_BASE, DEFAULT_CALENDAR_ID, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SESSION_DURATION_MINUTES, DEFAULT_TIME_ZONE,
};
use crate::errors::{CliniSyncError, Result};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub calendar: CalendarConfig,
    pub reconcile: ReconcileConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Local session store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

/// External calendar API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default = "default_api_base")]
    pub api_base_url: String,
    pub calendar_id: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Reconciliation engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// User that receives conflict alerts
    pub alert_user_id: String,
    /// IANA zone attached to event start/end on remote writes
    pub time_zone: String,
    /// Length of the event written back to the calendar
    #[serde(default = "default_session_duration")]
    pub session_duration_minutes: u32,
}

/// Tracing configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "clinisync.db".to_string(), pool_size: 4 }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base(),
            calendar_id: DEFAULT_CALENDAR_ID.to_string(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            alert_user_id: "local-user".to_string(),
            time_zone: DEFAULT_TIME_ZONE.to_string(),
            session_duration_minutes: default_session_duration(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

impl ReconcileConfig {
    /// Parsed time zone.
    pub fn tz(&self) -> Result<Tz> {
        self.time_zone
            .parse::<Tz>()
            .map_err(|e| CliniSyncError::Config(format!("Invalid time zone '{}': {e}", self.time_zone)))
    }
}

impl Config {
    /// Reject values the engine and adapters cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.database.pool_size == 0 {
            return Err(CliniSyncError::Config("database pool size must be positive".into()));
        }
        if self.calendar.calendar_id.trim().is_empty() {
            return Err(CliniSyncError::Config("calendar id must not be empty".into()));
        }
        if self.reconcile.alert_user_id.trim().is_empty() {
            return Err(CliniSyncError::Config("alert user id must not be empty".into()));
        }
        if self.reconcile.session_duration_minutes == 0 {
            return Err(CliniSyncError::Config("session duration must be positive".into()));
        }
        self.reconcile.tz()?;
        Ok(())
    }
}

fn default_api_base() -> String {
    DEFAULT_CALENDAR_API_BASE.to_string()
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_session_duration() -> u32 {
    DEFAULT_SESSION_DURATION_MINUTES
}
