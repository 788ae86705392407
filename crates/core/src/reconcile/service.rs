//! Reconciliation service - the engine's surface to the host application
//!
//! One service instance per user session. It owns the conflict registry and
//! the notification deduplicator; storage, calendar and alerting are injected
//! as ports.
//!
//! Every mutating operation takes `&mut self`, so calls are serialized by the
//! borrow checker. Hosts that need to share a service between tasks must wrap
//! it in a `tokio::sync::Mutex`: running `detect_all` (which replaces the
//! registry wholesale) concurrently with `resolve` (which removes by id) is
//! not supported.

use std::sync::Arc;

use chrono::Duration;
use chrono_tz::Tz;
use clinisync_domain::{
    Conflict, ConflictId, ConflictStats, DetectionStats, ReconcileConfig, Result,
};
use tracing::debug;

use super::dedup::NotificationDeduplicator;
use super::ports::{AlertSink, CalendarEventWriter, SessionStore};
use super::registry::ConflictRegistry;

/// Result of one detection pass
#[derive(Debug, Clone, Default)]
pub struct DetectionReport {
    /// Every conflict found, in local record order
    pub conflicts: Vec<Conflict>,
    /// Counters for the pass that produced `conflicts`.
    pub stats: DetectionStats,
}

/// Calendar reconciliation engine
pub struct ReconciliationService {
    pub(super) sessions: Arc<dyn SessionStore>,
    pub(super) calendar: Arc<dyn CalendarEventWriter>,
    pub(super) alerts: Arc<dyn AlertSink>,
    pub(super) alert_user_id: String,
    pub(super) time_zone: Tz,
    pub(super) session_duration: Duration,
    pub(super) registry: ConflictRegistry,
    pub(super) notified: NotificationDeduplicator,
    pub(super) access_token: Option<String>,
}

impl ReconciliationService {
    /// Create a new reconciliation service
    ///
    /// Fails when the configuration names an unknown time zone.
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        calendar: Arc<dyn CalendarEventWriter>,
        alerts: Arc<dyn AlertSink>,
        config: &ReconcileConfig,
    ) -> Result<Self> {
        let time_zone = config.tz()?;
        Ok(Self {
            sessions,
            calendar,
            alerts,
            alert_user_id: config.alert_user_id.clone(),
            time_zone,
            session_duration: Duration::minutes(i64::from(config.session_duration_minutes)),
            registry: ConflictRegistry::new(),
            notified: NotificationDeduplicator::new(),
            access_token: None,
        })
    }

    /// Install the access token used for calendar writes.
    ///
    /// The service never refreshes it; the host must keep it current before
    /// resolving with `keep-local` or `merge`.
    pub fn set_access_token(&mut self, token: Option<String>) {
        self.access_token = token.filter(|t| !t.trim().is_empty());
    }

    /// Whether calendar writes are currently possible.
    pub fn has_access_token(&self) -> bool {
        self.access_token.is_some()
    }

    /// Open conflicts from the latest detection pass, minus resolved ones.
    pub fn list(&self) -> &[Conflict] {
        self.registry.list()
    }

    /// Look up an open conflict by id.
    pub fn get(&self, id: &ConflictId) -> Option<&Conflict> {
        self.registry.get(id)
    }

    /// Totals by severity over the open conflicts.
    pub fn stats(&self) -> ConflictStats {
        self.registry.stats()
    }

    /// Drop a conflict without touching either side.
    ///
    /// Its alert key is cleared, so the divergence alerts again if the next
    /// pass still finds it.
    pub fn dismiss(&mut self, id: &ConflictId) {
        if let Some(conflict) = self.registry.remove_by_id(id) {
            self.notified.remove(&conflict.notified_key());
            debug!(conflict_id = %id, "conflict dismissed");
        } else {
            debug!(conflict_id = %id, "dismiss ignored: conflict not open");
        }
    }

    /// Forget every open conflict and every alert key.
    pub fn clear_all(&mut self) {
        self.registry.clear();
        self.notified.clear();
        debug!("conflict registry and alert keys cleared");
    }

    /// Number of alert keys currently remembered.
    pub fn notified_count(&self) -> usize {
        self.notified.len()
    }

    /// True when an alert has been raised for this conflict and not cleared.
    pub fn is_notified(&self, conflict: &Conflict) -> bool {
        self.notified.has(&conflict.notified_key())
    }
}
