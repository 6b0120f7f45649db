use std::ops::Deref;

use sea_orm::DatabaseTransaction;

use crate::error::SessionError;
use crate::manager::SessionManager;

/// A unit-of-work guard bound to one borrowed connection.
///
/// [`commit`](Session::commit) and [`rollback`](Session::rollback)
/// consume the guard. Dropping an unfinished guard (including on task
/// cancellation) releases the connection through the driver, which rolls
/// the open transaction back before the connection is reused.
#[derive(Debug)]
pub struct Session {
    txn: DatabaseTransaction,
}

impl Session {
    pub(crate) fn new(txn: DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }

    pub async fn commit(self) -> Result<(), SessionError> {
        self.txn
            .commit()
            .await
            .map_err(|e| SessionError::Transaction { source: e })
    }

    pub async fn rollback(self) -> Result<(), SessionError> {
        self.txn.rollback().await.map_err(SessionError::from)
    }
}

impl Deref for Session {
    type Target = DatabaseTransaction;

    fn deref(&self) -> &Self::Target {
        &self.txn
    }
}

/// Lazy, single-use session source for request-scoped injection.
///
/// The first [`acquire`](SessionProvider::acquire) begins and yields
/// exactly one [`Session`]; every later call yields `None`. Cleanup is
/// tied to the consumer's guard, not to the provider: dropping the
/// provider with the session still out has no effect on it.
pub struct SessionProvider {
    manager: SessionManager,
    consumed: bool,
}

impl SessionProvider {
    pub(crate) fn new(manager: SessionManager) -> Self {
        Self {
            manager,
            consumed: false,
        }
    }

    pub async fn acquire(&mut self) -> Result<Option<Session>, SessionError> {
        if self.consumed {
            return Ok(None);
        }
        self.consumed = true;
        self.manager.begin_session().await.map(Some)
    }
}
