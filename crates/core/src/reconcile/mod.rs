//! Calendar reconciliation engine
//!
//! Leaf-first: comparators feed the classifier, the detection orchestrator
//! drives classification and alerting, and the resolution executor closes
//! conflicts held in the registry.

pub mod alerts;
pub mod classifier;
pub mod compare;
pub mod dedup;
mod detection;
pub mod ports;
pub mod registry;
mod resolution;
pub mod service;

pub use classifier::{classify, severity_for};
pub use dedup::NotificationDeduplicator;
pub use registry::ConflictRegistry;
pub use resolution::parse_strategy;
pub use service::{DetectionReport, ReconciliationService};
