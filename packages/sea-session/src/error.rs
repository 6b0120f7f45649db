use sea_orm::DbErr;
use thiserror::Error;

/// Error taxonomy for the session lifecycle kit.
///
/// Every failure surfaces as a distinct kind so callers can pick a
/// recovery strategy: bad setup (`Config`), misuse after disposal
/// (`Lifecycle`), connectivity (`Connection`), failed commit
/// (`Transaction`), failed cleanup (`Rollback`), and everything the
/// caller's own statements raised (`Db`, re-returned unchanged).
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Configuration error: {detail}")]
    Config { detail: String },

    #[error("Lifecycle error: {detail}")]
    Lifecycle { detail: String },

    #[error("Connection error: {detail}")]
    Connection { detail: String },

    #[error("Transaction commit failed: {source}")]
    Transaction {
        #[source]
        source: DbErr,
    },

    /// Rollback itself failed after a prior error. The original error is
    /// attached as context rather than discarded.
    #[error("Rollback failed: {source} (original error: {original})")]
    Rollback {
        #[source]
        source: DbErr,
        original: Box<SessionError>,
    },

    #[error("Database error: {source}")]
    Db {
        #[source]
        source: DbErr,
    },
}

impl SessionError {
    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn lifecycle(detail: impl Into<String>) -> Self {
        Self::Lifecycle {
            detail: detail.into(),
        }
    }

    pub fn connection(detail: impl Into<String>) -> Self {
        Self::Connection {
            detail: detail.into(),
        }
    }
}

impl From<DbErr> for SessionError {
    fn from(e: DbErr) -> Self {
        match &e {
            // Pool checkout timeouts and broken links are connectivity,
            // not statement failures.
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => SessionError::Connection {
                detail: e.to_string(),
            },
            _ => SessionError::Db { source: e },
        }
    }
}
