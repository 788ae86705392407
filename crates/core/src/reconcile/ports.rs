//! Port interfaces for reconciliation
//!
//! These traits are the engine's only way to touch the outside world: the
//! local session store, the external calendar, and the alert channel.

use async_trait::async_trait;
use clinisync_domain::{RemoteEventBody, Result, SessionUpdate};

/// Trait for writing session changes back to local storage
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Apply a partial update to one session
    async fn update_record(&self, id: &str, update: &SessionUpdate) -> Result<()>;
}

/// Trait for overwriting events on the external calendar
#[async_trait]
pub trait CalendarEventWriter: Send + Sync {
    /// Replace an event with `body` (full overwrite, omitted fields cleared)
    async fn put_event(
        &self,
        event_id: &str,
        access_token: &str,
        body: &RemoteEventBody,
    ) -> Result<()>;
}

/// Trait for raising user-facing alerts
///
/// Calls are best-effort; the engine logs failures and moves on.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Create an alert for a user
    async fn create_alert(&self, user_id: &str, title: &str, body: &str) -> Result<()>;
}
