//! Domain types and models

pub mod conflict;
pub mod remote;
pub mod session;
pub mod stats;

pub use conflict::{
    Conflict, ConflictField, ConflictId, Difference, MergedFields, NotifiedKey,
    ResolutionStrategy, Severity, StrategyKind,
};
pub use remote::{EventStart, RemoteEvent, RemoteEventBody};
pub use session::{truncate_to_seconds, MirrorMode, SessionRecord, SessionUpdate};
pub use stats::{ConflictStats, DetectionStats};
