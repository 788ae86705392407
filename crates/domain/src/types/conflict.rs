//! Conflict types
//!
//! A conflict is a detected divergence between a mirrored session and its
//! linked calendar event, together with the field-level differences that make
//! it up.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

use super::remote::RemoteEvent;
use super::session::SessionRecord;
use crate::impl_domain_status_conversions;

/// Attribute class a difference was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub enum ConflictField {
    Date,
    Time,
    Description,
    Location,
    Attendees,
}

impl_domain_status_conversions!(ConflictField {
    Date => "date",
    Time => "time",
    Description => "description",
    Location => "location",
    Attendees => "attendees",
});

impl ConflictField {
    /// Date and time differences change when the session happens.
    pub fn is_temporal(self) -> bool {
        matches!(self, Self::Date | Self::Time)
    }
}

/// One field-level disagreement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export, rename_all = "camelCase"))]
pub struct Difference {
    pub field: ConflictField,
    pub local_value: String,
    pub remote_value: String,
}

impl Difference {
    pub fn new(
        field: ConflictField,
        local_value: impl Into<String>,
        remote_value: impl Into<String>,
    ) -> Self {
        Self { field, local_value: local_value.into(), remote_value: remote_value.into() }
    }
}

/// Urgency tier of a conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl_domain_status_conversions!(Severity {
    Low => "low",
    Medium => "medium",
    High => "high",
});

/// Conflict identifier: local record id plus discovery time in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct ConflictId(String);

impl ConflictId {
    pub fn new(record_id: &str, detected_at: DateTime<Utc>) -> Self {
        Self(format!("{record_id}-{}", detected_at.timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConflictId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConflictId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ConflictId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A detected, user-actionable divergence
///
/// Both records are snapshots taken by value at detection time. A conflict
/// always carries at least one difference; [`Conflict::new`] refuses to build
/// one otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export, rename_all = "camelCase"))]
pub struct Conflict {
    id: ConflictId,
    local: SessionRecord,
    remote: RemoteEvent,
    differences: Vec<Difference>,
    severity: Severity,
    #[cfg_attr(feature = "ts-gen", ts(type = "string"))]
    detected_at: DateTime<Utc>,
}

impl Conflict {
    /// Build a conflict, or `None` when there is nothing to report.
    pub fn new(
        local: SessionRecord,
        remote: RemoteEvent,
        differences: Vec<Difference>,
        severity: Severity,
        detected_at: DateTime<Utc>,
    ) -> Option<Self> {
        if differences.is_empty() {
            return None;
        }
        let id = ConflictId::new(&local.id, detected_at);
        Some(Self { id, local, remote, differences, severity, detected_at })
    }

    pub fn id(&self) -> &ConflictId {
        &self.id
    }

    pub fn local(&self) -> &SessionRecord {
        &self.local
    }

    pub fn remote(&self) -> &RemoteEvent {
        &self.remote
    }

    pub fn differences(&self) -> &[Difference] {
        &self.differences
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn detected_at(&self) -> DateTime<Utc> {
        self.detected_at
    }

    /// Key used to avoid re-alerting this conflict.
    pub fn notified_key(&self) -> NotifiedKey {
        NotifiedKey { record_id: self.local.id.clone(), severity: self.severity }
    }
}

/// Dedup key recorded once an alert has been raised
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifiedKey {
    pub record_id: String,
    pub severity: Severity,
}

/// Explicit values for a merge; unset fields fall back to the local record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export, rename_all = "camelCase"))]
pub struct MergedFields {
    #[cfg_attr(feature = "ts-gen", ts(type = "string", optional))]
    pub date: Option<NaiveDate>,
    #[cfg_attr(feature = "ts-gen", ts(type = "string", optional))]
    pub time: Option<NaiveTime>,
    pub description: Option<String>,
    pub location: Option<String>,
}

/// How to close a conflict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "strategy", content = "mergedFields")]
pub enum ResolutionStrategy {
    KeepLocal,
    KeepRemote,
    Merge(MergedFields),
    Dismiss,
}

impl ResolutionStrategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::KeepLocal => StrategyKind::KeepLocal,
            Self::KeepRemote => StrategyKind::KeepRemote,
            Self::Merge(_) => StrategyKind::Merge,
            Self::Dismiss => StrategyKind::Dismiss,
        }
    }
}

/// Strategy name without payload, for logs and host payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    KeepLocal,
    KeepRemote,
    Merge,
    Dismiss,
}

impl_domain_status_conversions!(StrategyKind {
    KeepLocal => "keep-local",
    KeepRemote => "keep-remote",
    Merge => "merge",
    Dismiss => "dismiss",
});
