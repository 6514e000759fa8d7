//! Store capabilities the engine is written against.
//!
//! [`SqlStore`](crate::SqlStore) implements all of them over a relational
//! database; [`MemoryStore`](crate::MemoryStore) is the in-process fake used
//! by tests. Decorators such as [`CachedAccounts`](crate::CachedAccounts) and
//! [`MemoCatalog`](crate::MemoCatalog) wrap any implementation.

use async_trait::async_trait;

use crate::{Account, AccountId, CatalogItem, LedgerEntry, ResultEngine, Snapshot};

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account with [`INITIAL_BALANCE`](crate::INITIAL_BALANCE).
    ///
    /// Fails with `ExistingKey` when the name is taken.
    async fn put(&self, name: &str, credential_hash: &[u8]) -> ResultEngine<AccountId>;

    async fn get_by_id(&self, id: AccountId) -> ResultEngine<Account>;

    async fn get_by_name(&self, name: &str) -> ResultEngine<Account>;

    /// Coins, inventory and history observed at one point in time.
    async fn snapshot(&self, id: AccountId) -> ResultEngine<Snapshot>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get_by_name(&self, name: &str) -> ResultEngine<CatalogItem>;
}

/// Atomic balance mutations. Each call either commits every effect or none.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Debit `sender`, credit `recipient` and append the ledger row.
    ///
    /// The debit itself enforces the non-negative balance; a violation is
    /// reported as `InsufficientFunds`.
    async fn transfer(
        &self,
        sender: AccountId,
        recipient: AccountId,
        amount: i64,
    ) -> ResultEngine<LedgerEntry>;

    /// Debit `buyer` by the item price, add one unit to its inventory and
    /// append a ledger row towards the shop account.
    async fn purchase(&self, buyer: AccountId, item: &CatalogItem) -> ResultEngine<LedgerEntry>;
}
