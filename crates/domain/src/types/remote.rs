//! External calendar events
//!
//! The remote calendar's view of a mirrored session, and the full-overwrite
//! body written back to it.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

use super::session::truncate_to_seconds;
use crate::constants::all_day_default_time;

/// Start of a remote event: a timestamp or an all-day date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub enum EventStart {
    DateTime(#[cfg_attr(feature = "ts-gen", ts(type = "string"))] NaiveDateTime),
    AllDay(#[cfg_attr(feature = "ts-gen", ts(type = "string"))] NaiveDate),
}

impl EventStart {
    /// Calendar date of the start.
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::DateTime(at) => at.date(),
            Self::AllDay(date) => *date,
        }
    }

    /// Wall-clock time of the start, second precision.
    ///
    /// All-day events have no time of day and read as 09:00:00.
    pub fn time(&self) -> NaiveTime {
        match self {
            Self::DateTime(at) => truncate_to_seconds(at.time()),
            Self::AllDay(_) => all_day_default_time(),
        }
    }

    /// True for date-only events.
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::AllDay(_))
    }
}

/// An event on the linked external calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export, rename_all = "camelCase"))]
pub struct RemoteEvent {
    pub id: String,
    pub start: EventStart,
    pub description: Option<String>,
    pub location: Option<String>,
}

impl RemoteEvent {
    /// Description as free text, empty when unset.
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    /// Location as free text, empty when unset.
    pub fn location_text(&self) -> &str {
        self.location.as_deref().unwrap_or_default()
    }
}

/// Body of a full-overwrite event write
///
/// Every field is sent; empty strings clear the remote value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEventBody {
    pub summary: String,
    pub description: String,
    pub location: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// IANA time zone attached to both `start` and `end`.
    pub time_zone: String,
}
