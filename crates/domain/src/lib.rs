//! # CliniSync Domain
//!
//! Domain types and models for calendar reconciliation.
//!
//! This crate contains:
//! - Session records and remote calendar events
//! - Conflicts, differences, severities and resolution strategies
//! - Domain error types and Result definitions
//! - Configuration structures and constants
//!
//! ## Architecture
//! - No dependencies on other CliniSync crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
