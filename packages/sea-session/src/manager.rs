use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use parking_lot::RwLock;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection,
    DatabaseTransaction, Statement, TransactionTrait,
};
use tracing::{debug, info, warn};

use crate::config::{DbConfig, IsolationLevel};
use crate::error::SessionError;
use crate::session::{Session, SessionProvider};

/// Mediates all access to the pooled database resources.
///
/// Owns the driver's engine handle (one pool per manager) and enforces
/// the commit-on-success / rollback-on-error / always-release discipline
/// on every scoped acquisition. Pooling itself is delegated to the
/// driver; the manager never implements its own locking around
/// individual connections.
///
/// State machine: `Ready -> Disposed`. Construction is fallible, so an
/// un-constructed manager is unrepresentable; disposal is terminal and
/// idempotent. Clones share state, so disposing one clone disposes all.
#[derive(Clone)]
pub struct SessionManager {
    state: Arc<RwLock<Option<Arc<DatabaseConnection>>>>,
    isolation: Option<IsolationLevel>,
    sanitized_url: String,
    database: Option<String>,
}

impl SessionManager {
    /// Connect eagerly with the pool parameters from `config`.
    ///
    /// The driver's pool is sized to `pool_size + max_overflow`; checkout
    /// waits are bounded by `acquire_timeout` and surface as connection
    /// errors when they expire.
    pub async fn connect(config: DbConfig) -> Result<Self, SessionError> {
        let sanitized_url = config.sanitized_url();
        let url = config.connection_url();

        let mut opt = ConnectOptions::new(&url);
        opt.min_connections(1)
            .max_connections(config.pool_size + config.max_overflow)
            .acquire_timeout(config.acquire_timeout)
            .sqlx_logging(true);

        let conn = Database::connect(opt).await.map_err(|e| {
            SessionError::connection(format!("failed to connect to {sanitized_url}: {e}"))
        })?;

        info!(
            url = %sanitized_url,
            pool_size = config.pool_size,
            max_overflow = config.max_overflow,
            "database pool ready"
        );

        Ok(Self {
            state: Arc::new(RwLock::new(Some(Arc::new(conn)))),
            isolation: Some(config.isolation),
            sanitized_url,
            database: (!config.database.is_empty()).then(|| config.database.clone()),
        })
    }

    /// Settings-module path: build the config entirely from the
    /// environment. Produces a manager equivalent to
    /// [`connect`](Self::connect) with an explicit config.
    pub async fn from_env() -> Result<Self, SessionError> {
        Self::connect(DbConfig::from_env()?).await
    }

    /// Adopt an existing handle. Used by tests and by containers that
    /// already own a pool; sessions are begun with the driver's default
    /// isolation.
    pub fn from_connection(conn: DatabaseConnection) -> Self {
        Self {
            state: Arc::new(RwLock::new(Some(Arc::new(conn)))),
            isolation: None,
            sanitized_url: "<adopted connection>".to_string(),
            database: None,
        }
    }

    /// Check the shared engine handle out of the state cell, or fail
    /// when the manager has been disposed. The lock is never held across
    /// an await.
    fn require_ready(&self) -> Result<Arc<DatabaseConnection>, SessionError> {
        self.state
            .read()
            .clone()
            .ok_or_else(|| SessionError::lifecycle("session manager is disposed"))
    }

    async fn begin(&self, conn: &DatabaseConnection) -> Result<DatabaseTransaction, SessionError> {
        // SQLite has no server-side isolation levels; forcing one through
        // the driver would fail the begin.
        let isolation = match conn.get_database_backend() {
            DatabaseBackend::Sqlite => None,
            _ => self.isolation.map(IsolationLevel::to_sea),
        };
        Ok(conn.begin_with_config(isolation, None).await?)
    }

    /// Execute `f` within a session (one transaction on one borrowed
    /// connection).
    ///
    /// On `Ok` the transaction is committed; a failed commit surfaces as
    /// [`SessionError::Transaction`] and the driver rolls the dropped
    /// transaction back before the connection is reused. On `Err` the
    /// transaction is rolled back exactly once and the original error is
    /// returned unchanged; if the rollback itself fails the result is
    /// [`SessionError::Rollback`] with the original error attached.
    pub async fn with_session<R, F>(&self, f: F) -> Result<R, SessionError>
    where
        F: for<'c> FnOnce(
            &'c DatabaseTransaction,
        )
            -> Pin<Box<dyn Future<Output = Result<R, SessionError>> + Send + 'c>>,
    {
        let conn = self.require_ready()?;
        let txn = self.begin(&conn).await?;

        match f(&txn).await {
            Ok(val) => match txn.commit().await {
                Ok(()) => Ok(val),
                Err(e) => Err(SessionError::Transaction { source: e }),
            },
            Err(err) => {
                debug!(error = %err, "session body failed, rolling back");
                match txn.rollback().await {
                    Ok(()) => Err(err),
                    Err(rollback_err) => Err(SessionError::Rollback {
                        source: rollback_err,
                        original: Box::new(err),
                    }),
                }
            }
        }
    }

    /// Execute `f` with raw access to the pooled handle, without implicit
    /// transaction semantics. Callers manage their own transactions if
    /// they need any; individual checkouts are acquired and released by
    /// the driver per statement.
    pub async fn with_connection<R, F>(&self, f: F) -> Result<R, SessionError>
    where
        F: for<'c> FnOnce(
            &'c DatabaseConnection,
        )
            -> Pin<Box<dyn Future<Output = Result<R, SessionError>> + Send + 'c>>,
    {
        let conn = self.require_ready()?;
        f(conn.as_ref()).await
    }

    /// Begin a session as an owned RAII guard. Dropping the guard without
    /// committing rolls back through the driver, which also covers task
    /// cancellation.
    pub async fn begin_session(&self) -> Result<Session, SessionError> {
        let conn = self.require_ready()?;
        let txn = self.begin(&conn).await?;
        Ok(Session::new(txn))
    }

    /// Single-shot session source for dependency-injection frameworks.
    pub fn session_provider(&self) -> SessionProvider {
        SessionProvider::new(self.clone())
    }

    /// Liveness check: one `SELECT 1` round trip, no retries.
    ///
    /// Ordinary connectivity failures are reported as `Ok(false)` and
    /// logged, never raised; only lifecycle misuse returns an error.
    pub async fn ping(&self) -> Result<bool, SessionError> {
        let conn = self.require_ready()?;
        let stmt = Statement::from_string(conn.get_database_backend(), "SELECT 1");
        match conn.execute(stmt).await {
            Ok(_) => Ok(true),
            Err(e) => {
                warn!(url = %self.sanitized_url, error = %e, "liveness check failed");
                Ok(false)
            }
        }
    }

    /// Release the engine handle and its pooled connections.
    ///
    /// Idempotent: later calls are no-ops. Every operation attempted
    /// after disposal fails with a lifecycle error, never a driver error.
    pub async fn dispose(&self) -> Result<(), SessionError> {
        let conn = { self.state.write().take() };
        let Some(conn) = conn else {
            debug!(url = %self.sanitized_url, "dispose on already-disposed manager");
            return Ok(());
        };

        // Sessions still out keep the handle alive through their own
        // reference; closing by ref shuts the pool down underneath them.
        conn.close_by_ref()
            .await
            .map_err(|e| SessionError::connection(format!("failed to close pool: {e}")))?;
        info!(url = %self.sanitized_url, "database pool disposed");
        Ok(())
    }

    pub fn is_disposed(&self) -> bool {
        self.state.read().is_none()
    }

    /// Database name from the configuration, when known.
    pub fn database_name(&self) -> Option<&str> {
        self.database.as_deref()
    }
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("url", &self.sanitized_url)
            .field(
                "state",
                &if self.is_disposed() { "Disposed" } else { "Ready" },
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use super::*;

    fn mock_manager(exec_results: usize) -> SessionManager {
        let results = (0..exec_results)
            .map(|_| MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            })
            .collect::<Vec<_>>();
        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(results)
            .into_connection();
        SessionManager::from_connection(conn)
    }

    #[tokio::test]
    async fn handle_checks_out_repeatedly_from_the_state_cell() {
        // The manager owns the handle; every operation checks a shared
        // reference out of the cell, so repeated use must not consume it.
        let manager = mock_manager(2);
        assert!(manager.ping().await.unwrap());
        assert!(manager.ping().await.unwrap());
        assert!(!manager.is_disposed());
    }

    #[tokio::test]
    async fn clones_share_one_handle() {
        let manager = mock_manager(1);
        let clone = manager.clone();
        assert!(clone.ping().await.unwrap());
        assert!(!manager.is_disposed());
    }

    #[tokio::test]
    async fn with_connection_borrows_the_handle() {
        let manager = mock_manager(0);
        let backend = manager
            .with_connection(|conn| {
                let backend = conn.get_database_backend();
                Box::pin(async move { Ok(backend) })
            })
            .await
            .unwrap();
        assert_eq!(backend, DatabaseBackend::Postgres);
    }
}
