//! Session and connection lifecycle management over SeaORM's async engine.
//!
//! This crate is a thin composition layer: an environment-driven
//! configuration holder, a logging bootstrap, and a [`SessionManager`]
//! that owns one connection pool and guarantees
//! acquire / commit-or-rollback / release on every exit path. It is not
//! a query engine, not a migration tool, and not an ORM of its own.
//!
//! ```no_run
//! use sea_session::{DbConfig, SessionManager, SessionError};
//!
//! # async fn demo() -> Result<(), SessionError> {
//! let config = DbConfig::builder()
//!     .user("app")
//!     .host("localhost")
//!     .database("app_db")
//!     .build()?;
//! let manager = SessionManager::connect(config).await?;
//!
//! manager
//!     .with_session(|txn| {
//!         Box::pin(async move {
//!             // run queries on `txn`; commit happens on Ok
//!             let _ = txn;
//!             Ok(())
//!         })
//!     })
//!     .await?;
//!
//! manager.dispose().await?;
//! # Ok(())
//! # }
//! ```

#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod config;
pub mod error;
pub mod logging;
pub mod manager;
pub mod session;

pub use config::{DbConfig, DbConfigBuilder, IsolationLevel, LogSettings};
pub use error::SessionError;
pub use manager::SessionManager;
pub use session::{Session, SessionProvider};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    session_test_support::logging::init();
}
