//! Session store backed by the local SQLite database
//!
//! Implements the [`SessionStore`] port used by resolution, plus the
//! loading helpers hosts use to feed a detection pass.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clinisync_core::SessionStore;
use clinisync_domain::constants::{DATE_FORMAT, TIME_FORMAT};
use clinisync_domain::{
    truncate_to_seconds, CliniSyncError, MirrorMode, Result as DomainResult, SessionRecord,
    SessionUpdate,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::task;
use tracing::debug;

use super::manager::{map_join_error, map_sql_error, DbManager};

const SESSION_COLUMNS: &str = "id, client_name, date, time, notes, location, mirror_event_id, \
                               mirror_mode, last_synced_at";

/// SQLite-backed implementation of [`SessionStore`]
pub struct SqliteSessionStore {
    db: Arc<DbManager>,
}

impl SqliteSessionStore {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Insert or replace a session row.
    pub async fn insert(&self, record: SessionRecord) -> DomainResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            write_record(&conn, &record)
        })
        .await
        .map_err(map_join_error)?
    }

    /// Fetch a single session by id.
    pub async fn get(&self, id: &str) -> DomainResult<Option<SessionRecord>> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<SessionRecord>> {
            let conn = db.get_connection()?;
            read_record(&conn, &id)
        })
        .await
        .map_err(map_join_error)?
    }

    /// Load every session mirrored to the external calendar.
    pub async fn load_mirrored(&self) -> DomainResult<Vec<SessionRecord>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<SessionRecord>> {
            let conn = db.get_connection()?;
            let sql = format!(
                "SELECT {SESSION_COLUMNS} FROM sessions
                 WHERE mirror_mode = ?1 AND mirror_event_id IS NOT NULL
                   AND TRIM(mirror_event_id) <> ''
                 ORDER BY date, time, id"
            );
            let mut stmt = conn.prepare(&sql).map_err(map_sql_error)?;
            let rows = stmt
                .query_map(params![MirrorMode::Mirrored.to_string()], map_session_row)
                .map_err(map_sql_error)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn update_record(&self, id: &str, update: &SessionUpdate) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();
        let update = update.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;

            let mut record = read_record(&tx, &id)?
                .ok_or_else(|| CliniSyncError::NotFound(format!("session {id} not found")))?;
            record.apply(&update);
            write_record(&tx, &record)?;

            tx.commit().map_err(map_sql_error)?;
            debug!(session_id = %id, "session record updated");
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

fn read_record(conn: &Connection, id: &str) -> DomainResult<Option<SessionRecord>> {
    let sql = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1");
    conn.query_row(&sql, params![id], map_session_row).optional().map_err(map_sql_error)
}

fn write_record(conn: &Connection, record: &SessionRecord) -> DomainResult<()> {
    conn.execute(
        "INSERT INTO sessions (id, client_name, date, time, notes, location, mirror_event_id,
                               mirror_mode, last_synced_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(id) DO UPDATE SET
             client_name = excluded.client_name,
             date = excluded.date,
             time = excluded.time,
             notes = excluded.notes,
             location = excluded.location,
             mirror_event_id = excluded.mirror_event_id,
             mirror_mode = excluded.mirror_mode,
             last_synced_at = excluded.last_synced_at",
        params![
            record.id,
            record.client_name,
            record.date.format(DATE_FORMAT).to_string(),
            truncate_to_seconds(record.time).format(TIME_FORMAT).to_string(),
            record.notes,
            record.location,
            record.mirror_event_id,
            record.mirror_mode.to_string(),
            record.last_synced_at.map(|at| at.timestamp()),
        ],
    )
    .map_err(map_sql_error)?;
    Ok(())
}

fn map_session_row(row: &Row<'_>) -> rusqlite::Result<SessionRecord> {
    let date: String = row.get(2)?;
    let time: String = row.get(3)?;
    let mode: String = row.get(7)?;
    let last_synced: Option<i64> = row.get(8)?;

    Ok(SessionRecord {
        id: row.get(0)?,
        client_name: row.get(1)?,
        date: NaiveDate::parse_from_str(&date, DATE_FORMAT).map_err(|err| conversion(2, err))?,
        time: NaiveTime::parse_from_str(&time, TIME_FORMAT).map_err(|err| conversion(3, err))?,
        notes: row.get(4)?,
        location: row.get(5)?,
        mirror_event_id: row.get(6)?,
        mirror_mode: mode
            .parse::<MirrorMode>()
            .map_err(|err| conversion(7, CliniSyncError::InvalidInput(err)))?,
        last_synced_at: last_synced.and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
    })
}

fn conversion<E>(column: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(err))
}
