//! # CliniSync Core
//!
//! Pure reconciliation logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Field comparators and the conflict classifier
//! - Alert deduplication and the open-conflict registry
//! - Port interfaces (traits) for storage, calendar and alerting
//! - The reconciliation service exposed to the host application
//!
//! ## Architecture Principles
//! - Only depends on `clinisync-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits

pub mod reconcile;

// Re-export specific items to avoid ambiguity
pub use reconcile::ports::{AlertSink, CalendarEventWriter, SessionStore};
pub use reconcile::{
    classify, parse_strategy, ConflictRegistry, DetectionReport, NotificationDeduplicator,
    ReconciliationService,
};
