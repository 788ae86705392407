//! Detection orchestrator
//!
//! Pairs mirrored sessions with their linked events, classifies each pair,
//! raises alerts for conflicts not seen before, and resyncs the registry.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use clinisync_domain::{Conflict, DetectionStats, RemoteEvent, SessionRecord, Severity};
use tracing::{debug, info, instrument, warn};

use super::alerts::{conflict_alert, summary_alert, AlertMessage};
use super::classifier::classify;
use super::service::{DetectionReport, ReconciliationService};

impl ReconciliationService {
    /// Detect every conflict between the supplied sessions and events.
    ///
    /// Returns the full conflict list regardless of alert outcomes.
    pub async fn detect_all(
        &mut self,
        local_records: &[SessionRecord],
        remote_events: &[RemoteEvent],
    ) -> Vec<Conflict> {
        self.detect(local_records, remote_events).await.conflicts
    }

    /// Run a full detection pass and report what was found.
    ///
    /// Records are processed sequentially. A mirrored record whose linked
    /// event is missing from `remote_events` is skipped, not reported. A
    /// record id seen earlier in the same pass is skipped too. The
    /// registry is replaced with exactly the conflicts found in this pass.
    #[instrument(skip_all, fields(records = local_records.len(), events = remote_events.len()))]
    pub async fn detect(
        &mut self,
        local_records: &[SessionRecord],
        remote_events: &[RemoteEvent],
    ) -> DetectionReport {
        let detected_at = Utc::now();
        let mut events_by_id: HashMap<&str, &RemoteEvent> = HashMap::new();
        for event in remote_events {
            events_by_id.entry(event.id.as_str()).or_insert(event);
        }

        let mut stats = DetectionStats::default();
        let mut conflicts = Vec::new();
        let mut seen_records: HashSet<&str> = HashSet::new();
        for record in local_records {
            let Some(event_id) = record.mirrored_event_id() else {
                continue;
            };
            // Conflict ids are per record and pass; the first copy wins.
            if !seen_records.insert(record.id.as_str()) {
                debug!(record_id = %record.id, "repeated record id; skipping");
                continue;
            }
            let Some(event) = events_by_id.get(event_id) else {
                stats.dangling += 1;
                debug!(record_id = %record.id, event_id, "linked event not supplied; skipping");
                continue;
            };
            stats.evaluated += 1;
            if let Some(conflict) = classify(record, event, detected_at) {
                conflicts.push(conflict);
            }
        }

        let (known, fresh): (Vec<&Conflict>, Vec<&Conflict>) =
            conflicts.iter().partition(|c| self.notified.has(&c.notified_key()));
        stats.already_known = known.len();
        stats.newly_alerted = fresh.len();

        self.raise_alerts(&fresh).await;

        info!(
            found = conflicts.len(),
            newly_alerted = stats.newly_alerted,
            already_known = stats.already_known,
            dangling = stats.dangling,
            "conflict detection completed"
        );

        self.registry.replace_all(conflicts.clone());
        DetectionReport { conflicts, stats }
    }

    /// Alert each new high-severity conflict on its own, then everything else
    /// either individually (one conflict) or as a single summary (several).
    async fn raise_alerts(&mut self, fresh: &[&Conflict]) {
        let (urgent, rest): (Vec<&Conflict>, Vec<&Conflict>) =
            fresh.iter().copied().partition(|c| c.severity() == Severity::High);

        for conflict in &urgent {
            self.send_alert(&conflict_alert(conflict)).await;
            self.notified.add(conflict.notified_key());
        }

        let message = match rest.as_slice() {
            [] => None,
            [single] => Some(conflict_alert(single)),
            many => Some(summary_alert(many)),
        };
        if let Some(message) = message {
            self.send_alert(&message).await;
            for conflict in &rest {
                self.notified.add(conflict.notified_key());
            }
        }
    }

    /// Best-effort alert: failures are logged and never propagated.
    async fn send_alert(&self, message: &AlertMessage) {
        match self.alerts.create_alert(&self.alert_user_id, &message.title, &message.body).await {
            Ok(()) => debug!(title = %message.title, "conflict alert raised"),
            Err(err) => warn!(
                title = %message.title,
                error = %err,
                "failed to raise conflict alert; continuing"
            ),
        }
    }
}
