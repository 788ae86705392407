//! Application context - wires the reconciliation service to its adapters

use std::sync::Arc;

use clinisync_core::{DetectionReport, ReconciliationService};
use clinisync_domain::{Config, RemoteEvent, Result};
use tokio::sync::Mutex;
use tracing::info;

use crate::calendar::GoogleCalendarWriter;
use crate::database::{DbManager, SqliteAlertStore, SqliteSessionStore};

/// Holds the database, the SQLite adapters and the shared service
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub sessions: Arc<SqliteSessionStore>,
    pub alerts: Arc<SqliteAlertStore>,
    /// Calls are serialized through the mutex.
    pub reconciler: Mutex<ReconciliationService>,
}

impl AppContext {
    /// Open the database, run migrations and build the service.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let db = Arc::new(DbManager::from_config(&config.database)?);
        let sessions = Arc::new(SqliteSessionStore::new(Arc::clone(&db)));
        let alerts = Arc::new(SqliteAlertStore::new(Arc::clone(&db)));
        let calendar = Arc::new(GoogleCalendarWriter::new(&config.calendar)?);

        let service = ReconciliationService::new(
            sessions.clone(),
            calendar,
            alerts.clone(),
            &config.reconcile,
        )?;

        info!(db_path = %db.path().display(), calendar_id = %config.calendar.calendar_id, "app context ready");

        Ok(Self { config, db, sessions, alerts, reconciler: Mutex::new(service) })
    }

    /// Run a detection pass over every mirrored session in the store.
    pub async fn detect_mirrored(&self, remote_events: &[RemoteEvent]) -> Result<DetectionReport> {
        let records = self.sessions.load_mirrored().await?;
        let mut service = self.reconciler.lock().await;
        Ok(service.detect(&records, remote_events).await)
    }

    /// Install or clear the calendar access token.
    pub async fn set_access_token(&self, token: Option<String>) {
        self.reconciler.lock().await.set_access_token(token);
    }
}
