//! Domain constants
//!
//! Centralized location for reconciliation constants shared by the engine and
//! its adapters.

use chrono::NaiveTime;

/// Wall-clock time assumed for remote events that only carry a date.
pub const ALL_DAY_DEFAULT_HOUR: u32 = 9;

/// Storage/wire format for local session times (second precision).
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Storage/wire format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// Calendar writer defaults
pub const DEFAULT_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
pub const DEFAULT_CALENDAR_ID: &str = "primary";
pub const DEFAULT_TIME_ZONE: &str = "UTC";
pub const DEFAULT_SESSION_DURATION_MINUTES: u32 = 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// Event summary wording
pub const SESSION_SUMMARY_PREFIX: &str = "Session with";
pub const SESSION_SUMMARY_FALLBACK: &str = "Session";

/// 09:00:00, the time all-day remote events compare and resolve as.
pub fn all_day_default_time() -> NaiveTime {
    NaiveTime::from_hms_opt(ALL_DAY_DEFAULT_HOUR, 0, 0).unwrap_or(NaiveTime::MIN)
}
