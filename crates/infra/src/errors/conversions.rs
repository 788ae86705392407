//! Conversions from external infrastructure errors into domain errors.

use clinisync_domain::CliniSyncError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub CliniSyncError);

impl From<InfraError> for CliniSyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<CliniSyncError> for InfraError {
    fn from(value: CliniSyncError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoCliniSyncError {
    fn into_clinisync(self) -> CliniSyncError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → CliniSyncError */
/* -------------------------------------------------------------------------- */

impl IntoCliniSyncError for SqlError {
    fn into_clinisync(self) -> CliniSyncError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match err.code {
                    ErrorCode::DatabaseBusy => CliniSyncError::Database("database is busy".into()),
                    ErrorCode::DatabaseLocked => {
                        CliniSyncError::Database("database is locked".into())
                    }
                    ErrorCode::ConstraintViolation => {
                        CliniSyncError::Database(format!("constraint violation: {message}"))
                    }
                    _ => CliniSyncError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => CliniSyncError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                CliniSyncError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                CliniSyncError::Database(format!("invalid column type: {ty}"))
            }
            RE::InvalidPath(path) => CliniSyncError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => CliniSyncError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_clinisync())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → CliniSyncError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(CliniSyncError::Database(format!("connection pool error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → CliniSyncError */
/* -------------------------------------------------------------------------- */

impl IntoCliniSyncError for HttpError {
    fn into_clinisync(self) -> CliniSyncError {
        if self.is_timeout() {
            return CliniSyncError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return CliniSyncError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            return status_error(status, None);
        }

        CliniSyncError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_clinisync())
    }
}

/// Map a non-success HTTP status (and optional response text) to a domain
/// error.
pub fn status_error(status: reqwest::StatusCode, detail: Option<&str>) -> CliniSyncError {
    let code = status.as_u16();
    let mut message =
        format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));
    if let Some(detail) = detail.map(str::trim).filter(|d| !d.is_empty()) {
        message.push_str(": ");
        message.push_str(detail);
    }

    match code {
        401 | 403 => CliniSyncError::Auth(message),
        404 | 410 => CliniSyncError::NotFound(message),
        429 => CliniSyncError::Network(message),
        400..=499 => CliniSyncError::InvalidInput(message),
        _ => CliniSyncError::Network(message),
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
