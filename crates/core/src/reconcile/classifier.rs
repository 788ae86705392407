//! Conflict classifier
//!
//! Runs every field comparator over a session/event pair and folds the
//! differences into a single conflict with a severity tier.

use chrono::{DateTime, Utc};
use clinisync_domain::{Conflict, Difference, RemoteEvent, SessionRecord, Severity};

use super::compare::COMPARATORS;

/// Classify one pair, returning `None` when the two sides agree.
///
/// Records that are not mirrored never produce a conflict.
pub fn classify(
    local: &SessionRecord,
    remote: &RemoteEvent,
    detected_at: DateTime<Utc>,
) -> Option<Conflict> {
    local.mirrored_event_id()?;

    let differences: Vec<Difference> =
        COMPARATORS.iter().flat_map(|compare| compare(local, remote)).collect();
    let severity = severity_for(&differences)?;

    Conflict::new(local.clone(), remote.clone(), differences, severity, detected_at)
}

/// Severity of a difference set, `None` for an empty set.
///
/// Any date or time difference is high regardless of what accompanies it.
/// Otherwise several differences are medium and a single one is low.
pub fn severity_for(differences: &[Difference]) -> Option<Severity> {
    if differences.is_empty() {
        return None;
    }
    if differences.iter().any(|d| d.field.is_temporal()) {
        return Some(Severity::High);
    }
    Some(if differences.len() > 1 { Severity::Medium } else { Severity::Low })
}
