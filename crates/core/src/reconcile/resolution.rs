//! Resolution executor
//!
//! Applies a chosen strategy to one open conflict. Writes are sequential and
//! not transactional: a merge whose local write lands but whose calendar
//! write fails leaves the local change in place and reports failure. The next
//! detection pass surfaces the remaining divergence.

use chrono::{NaiveDate, NaiveTime, Utc};
use clinisync_domain::constants::{SESSION_SUMMARY_FALLBACK, SESSION_SUMMARY_PREFIX};
use clinisync_domain::{
    truncate_to_seconds, CliniSyncError, Conflict, ConflictId, MergedFields, RemoteEventBody,
    ResolutionStrategy, Result, SessionRecord, SessionUpdate, StrategyKind,
};
use tracing::{debug, error, info, instrument, warn};

use super::service::ReconciliationService;

/// The session values a resolution settles on
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedView {
    date: NaiveDate,
    time: NaiveTime,
    notes: String,
    location: String,
}

impl ResolvedView {
    fn from_local(local: &SessionRecord) -> Self {
        Self {
            date: local.date,
            time: local.normalized_time(),
            notes: local.notes.trim().to_string(),
            location: local.location_text().trim().to_string(),
        }
    }

    fn from_conflict_remote(conflict: &Conflict) -> Self {
        let remote = conflict.remote();
        Self {
            date: remote.start.date(),
            time: remote.start.time(),
            notes: remote.description_text().trim().to_string(),
            location: remote.location_text().trim().to_string(),
        }
    }

    /// Local values overridden by whatever the caller supplied.
    ///
    /// This is the view pushed to the calendar; the local record only
    /// receives the supplied fields (see [`merge_update`]).
    fn merged(local: &SessionRecord, fields: &MergedFields) -> Self {
        let base = Self::from_local(local);
        Self {
            date: fields.date.unwrap_or(base.date),
            time: fields.time.unwrap_or(base.time),
            notes: fields.description.as_deref().map_or(base.notes, |d| d.trim().to_string()),
            location: fields.location.as_deref().map_or(base.location, |l| l.trim().to_string()),
        }
    }

    fn to_update(&self) -> SessionUpdate {
        SessionUpdate {
            date: Some(self.date),
            time: Some(self.time),
            notes: Some(self.notes.clone()),
            location: Some(self.location.clone()),
            last_synced_at: None,
        }
    }
}

/// Local write for a merge: only the fields the caller supplied, trimmed.
///
/// Unsupplied fields already hold the local value, so they are left alone and
/// an empty merge writes nothing locally.
fn merge_update(fields: &MergedFields) -> SessionUpdate {
    SessionUpdate {
        date: fields.date,
        time: fields.time.map(truncate_to_seconds),
        notes: fields.description.as_deref().map(|d| d.trim().to_string()),
        location: fields.location.as_deref().map(|l| l.trim().to_string()),
        last_synced_at: None,
    }
}

impl ReconciliationService {
    /// Resolve one open conflict.
    ///
    /// Returns `true` when the strategy was fully applied; the conflict is
    /// then removed from the registry and its alert key cleared. On `false`
    /// the conflict stays open for a later attempt.
    #[instrument(skip(self, strategy), fields(strategy = %strategy.kind()))]
    pub async fn resolve(&mut self, conflict_id: &ConflictId, strategy: ResolutionStrategy) -> bool {
        let Some(conflict) = self.registry.get(conflict_id).cloned() else {
            warn!(%conflict_id, "cannot resolve: conflict not open");
            return false;
        };

        match self.apply(&conflict, &strategy).await {
            Ok(()) => {
                self.registry.remove_by_id(conflict_id);
                self.notified.remove(&conflict.notified_key());
                info!(%conflict_id, record_id = %conflict.local().id, "conflict resolved");
                true
            }
            Err(err) => {
                warn!(
                    %conflict_id,
                    record_id = %conflict.local().id,
                    error = %err,
                    kind = err.label(),
                    "conflict resolution failed"
                );
                false
            }
        }
    }

    /// Apply one strategy to every open conflict, one at a time.
    ///
    /// Returns the number of conflicts resolved.
    pub async fn resolve_all(&mut self, strategy: ResolutionStrategy) -> usize {
        let ids = self.registry.ids();
        let total = ids.len();
        let mut resolved = 0;
        for id in ids {
            if self.resolve(&id, strategy.clone()).await {
                resolved += 1;
            }
        }
        info!(strategy = %strategy.kind(), resolved, total, "bulk resolution finished");
        resolved
    }

    async fn apply(&self, conflict: &Conflict, strategy: &ResolutionStrategy) -> Result<()> {
        let record_id = &conflict.local().id;
        match strategy {
            ResolutionStrategy::Dismiss => Ok(()),
            ResolutionStrategy::KeepRemote => {
                let view = ResolvedView::from_conflict_remote(conflict);
                self.sessions.update_record(record_id, &view.to_update()).await
            }
            ResolutionStrategy::KeepLocal => {
                let token = self.require_token(strategy)?;
                let view = ResolvedView::from_local(conflict.local());
                self.push_remote(conflict, &view, token).await?;
                self.mark_synced(conflict).await;
                Ok(())
            }
            ResolutionStrategy::Merge(fields) => {
                let token = self.require_token(strategy)?;
                let view = ResolvedView::merged(conflict.local(), fields);
                let update = merge_update(fields);
                if !update.is_empty() {
                    self.sessions.update_record(record_id, &update).await?;
                }
                if let Err(err) = self.push_remote(conflict, &view, token).await {
                    error!(
                        %record_id,
                        event_id = %conflict.remote().id,
                        error = %err,
                        "merge wrote local session but calendar write failed; local change kept"
                    );
                    return Err(err);
                }
                self.mark_synced(conflict).await;
                Ok(())
            }
        }
    }

    /// Token for calendar writes, checked before any I/O happens.
    fn require_token(&self, strategy: &ResolutionStrategy) -> Result<&str> {
        self.access_token.as_deref().ok_or_else(|| {
            CliniSyncError::Auth(format!("{} requires a calendar access token", strategy.kind()))
        })
    }

    async fn push_remote(&self, conflict: &Conflict, view: &ResolvedView, token: &str) -> Result<()> {
        let body = self.event_body(conflict.local(), view);
        debug!(event_id = %conflict.remote().id, "overwriting calendar event");
        self.calendar.put_event(&conflict.remote().id, token, &body).await
    }

    /// Stamp the last-synced marker; the resolution already succeeded, so a
    /// failure here is only logged.
    async fn mark_synced(&self, conflict: &Conflict) {
        let update = SessionUpdate::synced_at(Utc::now());
        if let Err(err) = self.sessions.update_record(&conflict.local().id, &update).await {
            warn!(record_id = %conflict.local().id, error = %err, "failed to stamp last sync");
        }
    }

    fn event_body(&self, local: &SessionRecord, view: &ResolvedView) -> RemoteEventBody {
        let start = view.date.and_time(view.time);
        let client = local.client_name.trim();
        let summary = if client.is_empty() {
            SESSION_SUMMARY_FALLBACK.to_string()
        } else {
            format!("{SESSION_SUMMARY_PREFIX} {client}")
        };
        RemoteEventBody {
            summary,
            description: view.notes.clone(),
            location: view.location.clone(),
            start,
            end: start + self.session_duration,
            time_zone: self.time_zone.name().to_string(),
        }
    }
}

/// Strategy names accepted from host payloads.
pub fn parse_strategy(kind: &str, fields: Option<MergedFields>) -> Result<ResolutionStrategy> {
    let kind: StrategyKind = kind.parse().map_err(CliniSyncError::InvalidInput)?;
    Ok(match kind {
        StrategyKind::KeepLocal => ResolutionStrategy::KeepLocal,
        StrategyKind::KeepRemote => ResolutionStrategy::KeepRemote,
        StrategyKind::Merge => ResolutionStrategy::Merge(fields.unwrap_or_default()),
        StrategyKind::Dismiss => ResolutionStrategy::Dismiss,
    })
}
