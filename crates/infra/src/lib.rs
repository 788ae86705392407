//! # CliniSync Infrastructure
//!
//! Infrastructure implementations of core reconciliation ports.
//!
//! This crate contains:
//! - SQLite session and alert stores (rusqlite + r2d2)
//! - The Google Calendar event writer and event payload parsing
//! - HTTP client, configuration loader and tracing setup
//!
//! ## Architecture
//! - Implements traits defined in `clinisync-core`
//! - Contains all "impure" code (I/O, network, filesystem)

pub mod calendar;
pub mod config;
pub mod context;
pub mod database;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use calendar::{parse_event, parse_events_response, GoogleCalendarWriter};
pub use context::AppContext;
pub use database::{DbManager, SqliteAlertStore, SqliteSessionStore, StoredAlert};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::init_tracing;
