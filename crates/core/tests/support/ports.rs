use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use clinisync_core::{AlertSink, CalendarEventWriter, SessionStore};
use clinisync_domain::{
    CliniSyncError, RemoteEventBody, Result as DomainResult, SessionRecord, SessionUpdate,
};

/// In-memory mock for `SessionStore`.
///
/// Applies updates to the seeded records and remembers every call.
#[derive(Default, Clone)]
pub struct MockSessionStore {
    records: Arc<Mutex<HashMap<String, SessionRecord>>>,
    updates: Arc<Mutex<Vec<(String, SessionUpdate)>>>,
    fail: Arc<AtomicBool>,
}

impl MockSessionStore {
    pub fn new(records: &[SessionRecord]) -> Self {
        let store = Self::default();
        {
            let mut map = store.records.lock().unwrap();
            for record in records {
                map.insert(record.id.clone(), record.clone());
            }
        }
        store
    }

    pub fn record(&self, id: &str) -> SessionRecord {
        self.records.lock().unwrap().get(id).cloned().expect("record should be seeded")
    }

    pub fn records(&self) -> Vec<SessionRecord> {
        let mut records: Vec<_> = self.records.lock().unwrap().values().cloned().collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records
    }

    pub fn updates(&self) -> Vec<(String, SessionUpdate)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SessionStore for MockSessionStore {
    async fn update_record(&self, id: &str, update: &SessionUpdate) -> DomainResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CliniSyncError::Database("session store unavailable".into()));
        }
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(id)
            .ok_or_else(|| CliniSyncError::NotFound(format!("session {id}")))?;
        record.apply(update);
        self.updates.lock().unwrap().push((id.to_string(), update.clone()));
        Ok(())
    }
}

/// A captured calendar write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutCall {
    pub event_id: String,
    pub access_token: String,
    pub body: RemoteEventBody,
}

/// Mock for `CalendarEventWriter` that records each overwrite.
#[derive(Default, Clone)]
pub struct MockCalendarWriter {
    calls: Arc<Mutex<Vec<PutCall>>>,
    fail: Arc<AtomicBool>,
}

impl MockCalendarWriter {
    pub fn calls(&self) -> Vec<PutCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CalendarEventWriter for MockCalendarWriter {
    async fn put_event(
        &self,
        event_id: &str,
        access_token: &str,
        body: &RemoteEventBody,
    ) -> DomainResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CliniSyncError::Network("calendar API returned 503".into()));
        }
        self.calls.lock().unwrap().push(PutCall {
            event_id: event_id.to_string(),
            access_token: access_token.to_string(),
            body: body.clone(),
        });
        Ok(())
    }
}

/// A captured alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub user_id: String,
    pub title: String,
    pub body: String,
}

/// Mock for `AlertSink`; failing calls are still counted as attempts.
#[derive(Default, Clone)]
pub struct MockAlertSink {
    delivered: Arc<Mutex<Vec<Alert>>>,
    attempts: Arc<Mutex<usize>>,
    fail: Arc<AtomicBool>,
}

impl MockAlertSink {
    pub fn delivered(&self) -> Vec<Alert> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }

    pub fn fail_alerts(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl AlertSink for MockAlertSink {
    async fn create_alert(&self, user_id: &str, title: &str, body: &str) -> DomainResult<()> {
        *self.attempts.lock().unwrap() += 1;
        if self.fail.load(Ordering::SeqCst) {
            return Err(CliniSyncError::Network("notification service down".into()));
        }
        self.delivered.lock().unwrap().push(Alert {
            user_id: user_id.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
