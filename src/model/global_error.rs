use std::path::PathBuf;

use sea_orm::{DbErr, RuntimeErr, SqlErr};
use thiserror::Error;

/// Short, stable label for an error, used to bucket failures in the run report.
pub trait ErrorKind {
    fn kind(&self) -> &'static str;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("remote tracker unavailable: {0}")]
    Unavailable(String),
    #[error("issue {0} not found on remote tracker")]
    NotFound(String),
    #[error("malformed remote payload: {0}")]
    Malformed(String),
}

impl ErrorKind for RemoteError {
    fn kind(&self) -> &'static str {
        match self {
            RemoteError::Unavailable(_) => "remote_unavailable",
            RemoteError::NotFound(_) => "remote_not_found",
            RemoteError::Malformed(_) => "remote_malformed",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// Unique, foreign key, check or not-null constraint rejected the write.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("database unavailable: {0}")]
    Unavailable(String),
    #[error("database error: {0}")]
    Database(String),
}

impl ErrorKind for PersistenceError {
    fn kind(&self) -> &'static str {
        match self {
            PersistenceError::ConstraintViolation(_) => "constraint_violation",
            PersistenceError::Unavailable(_) => "database_unavailable",
            PersistenceError::Database(_) => "database_error",
        }
    }
}

// SQLSTATE check_violation / not_null_violation, and the SQLite extended codes for the same.
const CHECK_OR_NOT_NULL_CODES: [&str; 4] = ["23514", "23502", "275", "1299"];

fn is_check_or_not_null_violation(err: &DbErr) -> bool {
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(sea_orm::sqlx::Error::Database(db_err)))
        | DbErr::Query(RuntimeErr::SqlxError(sea_orm::sqlx::Error::Database(db_err))) => db_err
            .code()
            .is_some_and(|code| CHECK_OR_NOT_NULL_CODES.contains(&&*code)),
        _ => false,
    }
}

impl From<DbErr> for PersistenceError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail))
            | Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                return PersistenceError::ConstraintViolation(detail);
            }
            _ => {}
        }

        if is_check_or_not_null_violation(&err) {
            return PersistenceError::ConstraintViolation(err.to_string());
        }

        match err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => {
                PersistenceError::Unavailable(err.to_string())
            }
            other => PersistenceError::Database(other.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum InputError {
    #[error("failed to read issue list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("issue list is not a JSON array of {{\"Key\": ...}} objects: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("issue list entry #{0} has a blank Key")]
    BlankKey(usize),
}

/// Conditions that stop the whole run instead of just the current issue.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("database became unavailable while syncing {issue_key}: {source}")]
    StoreUnavailable {
        issue_key: String,
        #[source]
        source: PersistenceError,
    },
    #[error("aborting on database error while syncing {issue_key}: {source}")]
    Aborted {
        issue_key: String,
        #[source]
        source: PersistenceError,
    },
}
