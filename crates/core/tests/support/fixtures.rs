use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clinisync_core::ReconciliationService;
use clinisync_domain::{EventStart, MirrorMode, ReconcileConfig, RemoteEvent, SessionRecord};

use super::ports::{MockAlertSink, MockCalendarWriter, MockSessionStore};

pub const ALERT_USER: &str = "therapist-1";
pub const TOKEN: &str = "access-token-123";

pub fn date(value: &str) -> NaiveDate {
    value.parse().expect("valid date")
}

pub fn time(value: &str) -> NaiveTime {
    value.parse().expect("valid time")
}

pub fn at(day: &str, clock: &str) -> NaiveDateTime {
    date(day).and_time(time(clock))
}

/// Mirrored session on 2024-03-01 at 14:00 with no notes or location.
pub fn session(id: &str) -> SessionRecord {
    SessionRecord {
        id: id.to_string(),
        client_name: format!("Client {id}"),
        date: date("2024-03-01"),
        time: time("14:00:00"),
        notes: String::new(),
        location: None,
        mirror_event_id: Some(format!("evt-{id}")),
        mirror_mode: MirrorMode::Mirrored,
        last_synced_at: None,
    }
}

/// Linked event matching [`session`].
pub fn event_for(id: &str) -> RemoteEvent {
    RemoteEvent {
        id: format!("evt-{id}"),
        start: EventStart::DateTime(at("2024-03-01", "14:00:00")),
        description: Some(String::new()),
        location: Some(String::new()),
    }
}

pub struct Harness {
    pub service: ReconciliationService,
    pub store: MockSessionStore,
    pub calendar: MockCalendarWriter,
    pub alerts: MockAlertSink,
}

impl Harness {
    pub fn new(records: &[SessionRecord]) -> Self {
        let config = ReconcileConfig {
            alert_user_id: ALERT_USER.to_string(),
            time_zone: "America/Chicago".to_string(),
            session_duration_minutes: 50,
        };
        Self::with_config(records, &config)
    }

    pub fn with_config(records: &[SessionRecord], config: &ReconcileConfig) -> Self {
        let store = MockSessionStore::new(records);
        let calendar = MockCalendarWriter::default();
        let alerts = MockAlertSink::default();
        let mut service = ReconciliationService::new(
            Arc::new(store.clone()),
            Arc::new(calendar.clone()),
            Arc::new(alerts.clone()),
            config,
        )
        .expect("service should build");
        service.set_access_token(Some(TOKEN.to_string()));
        Self { service, store, calendar, alerts }
    }
}
