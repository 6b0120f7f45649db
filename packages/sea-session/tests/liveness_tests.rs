//! Liveness-check behavior against healthy, failing, and unreachable
//! backends. The unhealthy paths use SeaORM mock connections so no
//! external database is needed.
//!
//! Run: cargo test --test liveness_tests

use std::time::Duration;

use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, RuntimeErr};
use sea_session::{DbConfig, SessionError, SessionManager};

#[ctor::ctor]
fn init_test_logging() {
    session_test_support::logging::init();
}

#[tokio::test]
async fn ping_reports_healthy_backend() {
    let config = DbConfig::builder()
        .url("sqlite::memory:")
        .pool_size(1)
        .max_overflow(0)
        .build()
        .expect("config");
    let manager = SessionManager::connect(config).await.expect("connect");

    assert!(manager.ping().await.expect("ping should not raise"));
}

#[tokio::test]
async fn ping_true_on_mock_round_trip() {
    let conn = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();
    let manager = SessionManager::from_connection(conn);

    assert!(manager.ping().await.expect("ping should not raise"));
}

#[tokio::test]
async fn ping_false_on_connectivity_failure() {
    let conn = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_errors(vec![DbErr::Conn(RuntimeErr::Internal(
            "connection refused".into(),
        ))])
        .into_connection();
    let manager = SessionManager::from_connection(conn);

    // Ordinary connectivity failure is a negative result, not an error.
    assert!(!manager.ping().await.expect("ping should not raise"));
}

#[tokio::test]
async fn connect_to_unreachable_host_is_connection_error() {
    // Port 9 (discard) is not a postgres listener; the connect attempt
    // fails fast without any DNS lookup.
    let config = DbConfig::builder()
        .user("nobody")
        .password("nothing")
        .host("127.0.0.1")
        .port(9)
        .database("missing")
        .acquire_timeout(Duration::from_secs(2))
        .build()
        .expect("config");

    let err = SessionManager::connect(config)
        .await
        .expect_err("connect must fail");
    assert!(matches!(err, SessionError::Connection { .. }), "got {err:?}");
}
