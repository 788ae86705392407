//! Statistics types
//!
//! Aggregate counts reported by the conflict registry and detection passes.

use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

use super::conflict::{Conflict, Severity};

/* -------------------------------------------------------------------------- */
/* Conflict Statistics */
/* -------------------------------------------------------------------------- */

/// Open conflict counts by severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct ConflictStats {
    /// Number of open conflicts
    #[cfg_attr(feature = "ts-gen", ts(type = "number"))]
    pub total: usize,

    /// Conflicts touching date or time
    #[cfg_attr(feature = "ts-gen", ts(type = "number"))]
    pub high: usize,

    /// Conflicts with several non-temporal differences
    #[cfg_attr(feature = "ts-gen", ts(type = "number"))]
    pub medium: usize,

    /// Conflicts with a single non-temporal difference
    #[cfg_attr(feature = "ts-gen", ts(type = "number"))]
    pub low: usize,
}

impl ConflictStats {
    /// Tally a set of conflicts.
    pub fn from_conflicts<'a>(conflicts: impl IntoIterator<Item = &'a Conflict>) -> Self {
        conflicts.into_iter().fold(Self::default(), |mut stats, conflict| {
            stats.total += 1;
            match conflict.severity() {
                Severity::High => stats.high += 1,
                Severity::Medium => stats.medium += 1,
                Severity::Low => stats.low += 1,
            }
            stats
        })
    }
}

/* -------------------------------------------------------------------------- */
/* Detection Statistics */
/* -------------------------------------------------------------------------- */

/// Outcome counts of one detection pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct DetectionStats {
    /// Mirrored records evaluated against a linked event
    #[cfg_attr(feature = "ts-gen", ts(type = "number"))]
    pub evaluated: usize,

    /// Mirrored records whose linked event was not supplied
    #[cfg_attr(feature = "ts-gen", ts(type = "number"))]
    pub dangling: usize,

    /// Conflicts alerted for the first time in this pass
    #[cfg_attr(feature = "ts-gen", ts(type = "number"))]
    pub newly_alerted: usize,

    /// Conflicts already alerted in an earlier pass
    #[cfg_attr(feature = "ts-gen", ts(type = "number"))]
    pub already_known: usize,
}
