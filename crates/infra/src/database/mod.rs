//! SQLite persistence for sessions and alerts

pub mod alert_store;
pub mod manager;
pub mod session_store;

pub use alert_store::{SqliteAlertStore, StoredAlert};
pub use manager::DbManager;
pub use session_store::SqliteSessionStore;
