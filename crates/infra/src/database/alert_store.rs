//! Alert store persisting in-app alerts to SQLite

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clinisync_core::AlertSink;
use clinisync_domain::Result as DomainResult;
use rusqlite::params;
use serde::Serialize;
use tokio::task;
use tracing::debug;
use uuid::Uuid;

use super::manager::{map_join_error, map_sql_error, DbManager};

/// Alert row as stored for a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAlert {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// SQLite-backed implementation of [`AlertSink`]
pub struct SqliteAlertStore {
    db: Arc<DbManager>,
}

impl SqliteAlertStore {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Alerts for a user, oldest first.
    pub async fn list_for_user(&self, user_id: &str) -> DomainResult<Vec<StoredAlert>> {
        let db = Arc::clone(&self.db);
        let user_id = user_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Vec<StoredAlert>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(
                    "SELECT id, user_id, title, body, created_at FROM alerts
                     WHERE user_id = ?1 ORDER BY created_at, rowid",
                )
                .map_err(map_sql_error)?;
            let rows = stmt
                .query_map(params![user_id], |row| {
                    let created_at: i64 = row.get(4)?;
                    Ok(StoredAlert {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        title: row.get(2)?,
                        body: row.get(3)?,
                        created_at: DateTime::<Utc>::from_timestamp(created_at, 0)
                            .unwrap_or_default(),
                    })
                })
                .map_err(map_sql_error)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl AlertSink for SqliteAlertStore {
    async fn create_alert(&self, user_id: &str, title: &str, body: &str) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let id = Uuid::new_v4().to_string();
        let user_id = user_id.to_string();
        let title = title.to_string();
        let body = body.to_string();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT INTO alerts (id, user_id, title, body, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, user_id, title, body, Utc::now().timestamp()],
            )
            .map_err(map_sql_error)?;
            debug!(alert_id = %id, user_id = %user_id, "alert stored");
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}
