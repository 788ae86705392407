//! Google event payload parsing

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use clinisync_domain::constants::DATE_FORMAT;
use clinisync_domain::{CliniSyncError, EventStart, RemoteEvent, Result};
use serde::Deserialize;
use tracing::warn;

const CANCELLED_STATUS: &str = "cancelled";

/// Event as returned by the Google Calendar API
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleEvent {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start: Option<EventDateTime>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventDateTime {
    #[serde(rename = "dateTime", default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleEventsResponse {
    #[serde(default)]
    items: Vec<GoogleEvent>,
}

/// Convert one Google event into a [`RemoteEvent`].
///
/// A `dateTime` with an offset keeps the wall-clock time of that offset.
///
/// # Errors
/// `InvalidInput` for cancelled events and for missing or malformed starts.
pub fn parse_event(event: GoogleEvent) -> Result<RemoteEvent> {
    if event.status.as_deref() == Some(CANCELLED_STATUS) {
        return Err(CliniSyncError::InvalidInput(format!("event {} is cancelled", event.id)));
    }

    let start = event
        .start
        .as_ref()
        .ok_or_else(|| CliniSyncError::InvalidInput(format!("event {} has no start", event.id)))
        .and_then(|start| parse_start(&event.id, start))?;

    Ok(RemoteEvent {
        id: event.id,
        start,
        description: event.description,
        location: event.location,
    })
}

/// Parse an events list response, skipping entries that cannot be used.
pub fn parse_events_response(json: &str) -> Result<Vec<RemoteEvent>> {
    let response: GoogleEventsResponse = serde_json::from_str(json).map_err(|e| {
        CliniSyncError::InvalidInput(format!("Failed to parse Google response: {e}"))
    })?;

    Ok(response
        .items
        .into_iter()
        .filter_map(|event| match parse_event(event) {
            Ok(event) => Some(event),
            Err(err) => {
                warn!(error = %err, "skipping calendar event");
                None
            }
        })
        .collect())
}

fn parse_start(event_id: &str, start: &EventDateTime) -> Result<EventStart> {
    if let Some(raw) = start.date_time.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        return parse_date_time(raw).map(EventStart::DateTime).ok_or_else(|| {
            CliniSyncError::InvalidInput(format!("event {event_id} has malformed start '{raw}'"))
        });
    }

    if let Some(raw) = start.date.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        return NaiveDate::parse_from_str(raw, DATE_FORMAT).map(EventStart::AllDay).map_err(|e| {
            CliniSyncError::InvalidInput(format!("event {event_id} has malformed date '{raw}': {e}"))
        });
    }

    Err(CliniSyncError::InvalidInput(format!("event {event_id} has an empty start")))
}

fn parse_date_time(raw: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_local())
        .ok()
        .or_else(|| raw.parse::<NaiveDateTime>().ok())
}
