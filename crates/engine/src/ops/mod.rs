//! Relational implementation of the store capabilities.

use sea_orm::{AccessMode, ConnectionTrait, DatabaseConnection, DbBackend, IsolationLevel};

mod accounts;
mod catalog;
mod ledger;
mod snapshot;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// The body is an expression evaluating to `ResultEngine<T>`; `?` inside it
/// aborts the transaction.
macro_rules! with_tx {
    ($self:expr, $access:expr, |$tx:ident| $body:expr) => {{
        let (isolation, access) = $self.tx_config($access);
        let $tx = $self.database.begin_with_config(isolation, access).await?;
        let result: $crate::ResultEngine<_> = async { $body }.await;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = $tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }};
}

pub(crate) use with_tx;

/// Store backed by a sea-orm connection pool.
///
/// Transfers and purchases run at repeatable read; snapshots run read-only
/// at the same level.
#[derive(Clone, Debug)]
pub struct SqlStore {
    database: DatabaseConnection,
}

impl SqlStore {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    // SQLite only warns on either setting; its transactions are serializable.
    fn tx_config(&self, access: AccessMode) -> (Option<IsolationLevel>, Option<AccessMode>) {
        match self.database.get_database_backend() {
            DbBackend::Sqlite => (None, None),
            _ => (Some(IsolationLevel::RepeatableRead), Some(access)),
        }
    }
}
