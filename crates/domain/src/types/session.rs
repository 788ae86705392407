//! Local session records
//!
//! The platform's own view of a scheduled session, plus the partial update
//! applied to it by resolution.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

use crate::impl_domain_status_conversions;

/// How a session is linked to the external calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub enum MirrorMode {
    #[default]
    None,
    Mirrored,
}

impl_domain_status_conversions!(MirrorMode {
    None => "none",
    Mirrored => "mirrored",
});

/// A scheduled session owned by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export, rename_all = "camelCase"))]
pub struct SessionRecord {
    pub id: String,
    pub client_name: String,
    #[cfg_attr(feature = "ts-gen", ts(type = "string"))]
    pub date: NaiveDate,
    #[cfg_attr(feature = "ts-gen", ts(type = "string"))]
    pub time: NaiveTime,
    pub notes: String,
    pub location: Option<String>,
    pub mirror_event_id: Option<String>,
    pub mirror_mode: MirrorMode,
    #[cfg_attr(feature = "ts-gen", ts(type = "string", optional))]
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    /// Linked event id, if the record takes part in conflict detection.
    ///
    /// A record is eligible only when it is mirrored and carries a non-empty
    /// event id.
    pub fn mirrored_event_id(&self) -> Option<&str> {
        if self.mirror_mode != MirrorMode::Mirrored {
            return None;
        }
        self.mirror_event_id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    /// Session time truncated to whole seconds.
    pub fn normalized_time(&self) -> NaiveTime {
        truncate_to_seconds(self.time)
    }

    /// Location as free text, empty when unset.
    pub fn location_text(&self) -> &str {
        self.location.as_deref().unwrap_or_default()
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, update: &SessionUpdate) {
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(time) = update.time {
            self.time = truncate_to_seconds(time);
        }
        if let Some(notes) = &update.notes {
            self.notes.clone_from(notes);
        }
        if let Some(location) = &update.location {
            self.location = if location.is_empty() { None } else { Some(location.clone()) };
        }
        if let Some(synced) = update.last_synced_at {
            self.last_synced_at = Some(synced);
        }
    }
}

/// Partial update of a session's mutable fields
///
/// `None` leaves a field untouched. An empty `location` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdate {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub notes: Option<String>,
    pub location: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl SessionUpdate {
    /// True when the update would not change anything.
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.time.is_none()
            && self.notes.is_none()
            && self.location.is_none()
            && self.last_synced_at.is_none()
    }

    /// Update that only stamps the last-synced marker.
    pub fn synced_at(at: DateTime<Utc>) -> Self {
        Self { last_synced_at: Some(at), ..Self::default() }
    }
}

/// Drop sub-second precision from a wall-clock time.
pub fn truncate_to_seconds(time: NaiveTime) -> NaiveTime {
    time.with_nanosecond(0).unwrap_or(time)
}
