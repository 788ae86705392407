//! Google Calendar event writer

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use clinisync_core::CalendarEventWriter;
use clinisync_domain::{CalendarConfig, CliniSyncError, RemoteEventBody, Result};
use reqwest::Method;
use serde::Serialize;
use tracing::{debug, instrument};
use url::Url;

use crate::http::HttpClient;

const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const USER_AGENT: &str = concat!("clinisync/", env!("CARGO_PKG_VERSION"));

/// Overwrites mirrored events through the Google Calendar v3 API
pub struct GoogleCalendarWriter {
    http: HttpClient,
    api_base: Url,
    calendar_id: String,
}

impl GoogleCalendarWriter {
    pub fn new(config: &CalendarConfig) -> Result<Self> {
        let api_base = Url::parse(config.api_base_url.trim()).map_err(|e| {
            CliniSyncError::Config(format!("Invalid calendar API base '{}': {e}", config.api_base_url))
        })?;
        if api_base.cannot_be_a_base() {
            return Err(CliniSyncError::Config(format!(
                "Calendar API base '{}' cannot carry a path",
                config.api_base_url
            )));
        }

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { http, api_base, calendar_id: config.calendar_id.clone() })
    }

    /// `{base}/calendars/{calendar_id}/events/{event_id}` with both ids
    /// percent-encoded as single path segments.
    pub fn event_url(&self, event_id: &str) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|()| CliniSyncError::Config("calendar API base cannot carry a path".into()))?
            .pop_if_empty()
            .extend(["calendars", self.calendar_id.as_str(), "events", event_id]);
        Ok(url)
    }
}

#[async_trait]
impl CalendarEventWriter for GoogleCalendarWriter {
    #[instrument(skip(self, access_token, body), fields(calendar_id = %self.calendar_id))]
    async fn put_event(
        &self,
        event_id: &str,
        access_token: &str,
        body: &RemoteEventBody,
    ) -> Result<()> {
        let url = self.event_url(event_id)?;
        let payload = GoogleEventPayload::from(body);

        let request = self.http.request(Method::PUT, url).bearer_auth(access_token).json(&payload);
        self.http.send_checked(request).await?;

        debug!(event_id, "calendar event overwritten");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct GoogleEventPayload<'a> {
    summary: &'a str,
    description: &'a str,
    location: &'a str,
    start: GoogleEventTime<'a>,
    end: GoogleEventTime<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleEventTime<'a> {
    date_time: String,
    time_zone: &'a str,
}

impl<'a> GoogleEventTime<'a> {
    fn new(at: NaiveDateTime, time_zone: &'a str) -> Self {
        Self { date_time: at.format(DATE_TIME_FORMAT).to_string(), time_zone }
    }
}

impl<'a> From<&'a RemoteEventBody> for GoogleEventPayload<'a> {
    fn from(body: &'a RemoteEventBody) -> Self {
        Self {
            summary: &body.summary,
            description: &body.description,
            location: &body.location,
            start: GoogleEventTime::new(body.start, &body.time_zone),
            end: GoogleEventTime::new(body.end, &body.time_zone),
        }
    }
}
