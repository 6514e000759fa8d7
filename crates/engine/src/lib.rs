//! Coin ledger engine.
//!
//! [`Engine`] moves coins between accounts and sells catalog items while
//! keeping every balance non-negative. It is written against the store
//! capabilities in [`AccountStore`], [`CatalogStore`] and [`LedgerStore`];
//! [`SqlStore`] provides them over a relational database and [`MemoryStore`]
//! in process.
//!
//! ```no_run
//! # async fn run(db: sea_orm::DatabaseConnection) -> Result<(), engine::EngineError> {
//! use engine::{Engine, MemoryCache, PurchaseCmd};
//! use std::sync::Arc;
//!
//! let engine = Engine::builder()
//!     .database(db)
//!     .cache(Arc::new(MemoryCache::new()))
//!     .build()
//!     .await?;
//! let alice = engine.register("alice", b"hash", None).await?;
//! engine.purchase(PurchaseCmd::new(alice, "cup")).await?;
//! # Ok(())
//! # }
//! ```

use std::{future::Future, sync::Arc, time::Duration};

use sea_orm::DatabaseConnection;
use tokio::time::{Instant, timeout_at};

pub use accounts::{Account, AccountId, INITIAL_BALANCE, SHOP_ACCOUNT_ID, SHOP_ACCOUNT_NAME};
pub use cache::{CacheError, CachePolicy, CachedAccounts, MemoryCache, UserCache};
pub use catalog::{CatalogItem, ItemId};
pub use commands::{PurchaseCmd, TransferCmd};
pub use error::EngineError;
pub use ledger::{LedgerEntry, LedgerEntryId};
pub use memo::MemoCatalog;
pub use memory::MemoryStore;
pub use ops::SqlStore;
pub use redis_cache::RedisCache;
pub use snapshot::{DELETED_ACCOUNT_NAME, Direction, HistoryEntry, InventoryItem, Snapshot};
pub use store::{AccountStore, CatalogStore, LedgerStore};

mod accounts;
mod cache;
mod catalog;
mod commands;
mod error;
mod inventory;
mod ledger;
mod memo;
mod memory;
mod ops;
mod redis_cache;
mod snapshot;
mod store;
mod util;

use util::{ensure_positive_amount, normalize_required_name};

pub type ResultEngine<T> = Result<T, EngineError>;

/// Store timeout applied when a command carries no deadline.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Entry point for every balance-affecting operation and account query.
///
/// Ordering between concurrent calls is left to the stores; the engine holds
/// no locks of its own.
pub struct Engine {
    accounts: Arc<dyn AccountStore>,
    catalog: Arc<dyn CatalogStore>,
    ledger: Arc<dyn LedgerStore>,
    store_timeout: Duration,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    fn deadline(&self, requested: Option<Instant>) -> Instant {
        requested.unwrap_or_else(|| Instant::now() + self.store_timeout)
    }

    /// Run `fut` until `deadline`. On expiry the future is dropped, which
    /// rolls back any transaction it had open.
    async fn bounded<T>(
        &self,
        deadline: Instant,
        operation: &str,
        fut: impl Future<Output = ResultEngine<T>>,
    ) -> ResultEngine<T> {
        match timeout_at(deadline, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(operation, "deadline exceeded");
                Err(EngineError::DeadlineExceeded(operation.to_string()))
            }
        }
    }

    /// Create an account holding [`INITIAL_BALANCE`] coins.
    ///
    /// Like every read below, `deadline` defaults to the store timeout.
    pub async fn register(
        &self,
        name: &str,
        credential_hash: &[u8],
        deadline: Option<Instant>,
    ) -> ResultEngine<AccountId> {
        let name = normalize_required_name(name, "user")?;
        let deadline = self.deadline(deadline);
        let id = self
            .bounded(deadline, "register", self.accounts.put(&name, credential_hash))
            .await?;
        tracing::info!(account_id = id, user = %name, "account registered");
        Ok(id)
    }

    /// Look an account up by name, through the cache when one is configured.
    ///
    /// The returned balance may be stale; use [`Engine::snapshot`] for an
    /// authoritative read.
    pub async fn account_by_name(
        &self,
        name: &str,
        deadline: Option<Instant>,
    ) -> ResultEngine<Account> {
        let name = normalize_required_name(name, "user")?;
        let deadline = self.deadline(deadline);
        self.bounded(deadline, "account_by_name", self.accounts.get_by_name(&name))
            .await
    }

    pub async fn account_by_id(
        &self,
        id: AccountId,
        deadline: Option<Instant>,
    ) -> ResultEngine<Account> {
        let deadline = self.deadline(deadline);
        self.bounded(deadline, "account_by_id", self.accounts.get_by_id(id))
            .await
    }

    pub async fn item_by_name(
        &self,
        name: &str,
        deadline: Option<Instant>,
    ) -> ResultEngine<CatalogItem> {
        let name = normalize_required_name(name, "item")?;
        let deadline = self.deadline(deadline);
        self.bounded(deadline, "item_by_name", self.catalog.get_by_name(&name))
            .await
    }

    /// Move coins from `cmd.sender_id` to the account named `cmd.recipient`.
    ///
    /// Rejects non-positive amounts and self-transfers with
    /// `InvalidOperation`, an unknown recipient with `UserNotFound` and an
    /// uncovered debit with `InsufficientFunds`. Nothing is written unless the
    /// whole transfer commits.
    pub async fn transfer(&self, cmd: TransferCmd) -> ResultEngine<LedgerEntry> {
        let deadline = self.deadline(cmd.deadline);
        ensure_positive_amount(cmd.amount)?;
        let recipient_name = normalize_required_name(&cmd.recipient, "recipient")?;

        let entry = self
            .bounded(deadline, "transfer", async {
                let recipient = self.accounts.get_by_name(&recipient_name).await?;
                if recipient.id == cmd.sender_id {
                    return Err(EngineError::InvalidOperation(
                        "cannot transfer coins to yourself".to_string(),
                    ));
                }
                self.ledger
                    .transfer(cmd.sender_id, recipient.id, cmd.amount)
                    .await
            })
            .await?;

        tracing::info!(
            entry_id = entry.id,
            sender = entry.sender,
            recipient = entry.recipient,
            amount = entry.amount,
            "transfer committed"
        );
        Ok(entry)
    }

    /// Buy one unit of `cmd.item` for `cmd.buyer_id`.
    pub async fn purchase(&self, cmd: PurchaseCmd) -> ResultEngine<LedgerEntry> {
        let deadline = self.deadline(cmd.deadline);
        let item_name = normalize_required_name(&cmd.item, "item")?;

        let entry = self
            .bounded(deadline, "purchase", async {
                let item = self.catalog.get_by_name(&item_name).await?;
                self.ledger.purchase(cmd.buyer_id, &item).await
            })
            .await?;

        tracing::info!(
            entry_id = entry.id,
            buyer = entry.sender,
            item = %item_name,
            price = entry.amount,
            "purchase committed"
        );
        Ok(entry)
    }

    /// Coins, inventory and history of `account_id`, read consistently.
    pub async fn snapshot(
        &self,
        account_id: AccountId,
        deadline: Option<Instant>,
    ) -> ResultEngine<Snapshot> {
        let deadline = self.deadline(deadline);
        self.bounded(deadline, "snapshot", self.accounts.snapshot(account_id))
            .await
    }
}

/// The builder for `Engine`
///
/// Either pass a database, which backs every store with [`SqlStore`], or set
/// the three stores explicitly. Explicit stores win over the database.
#[derive(Default)]
pub struct EngineBuilder {
    database: Option<DatabaseConnection>,
    accounts: Option<Arc<dyn AccountStore>>,
    catalog: Option<Arc<dyn CatalogStore>>,
    ledger: Option<Arc<dyn LedgerStore>>,
    cache: Option<Arc<dyn UserCache>>,
    cache_policy: CachePolicy,
    store_timeout: Option<Duration>,
}

impl EngineBuilder {
    /// Pass the database backing every store not set explicitly.
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = Some(db);
        self
    }

    /// Use one value for the three store capabilities.
    pub fn store<S>(self, store: Arc<S>) -> EngineBuilder
    where
        S: AccountStore + CatalogStore + LedgerStore + 'static,
    {
        self.accounts(store.clone())
            .catalog(store.clone())
            .ledger(store)
    }

    pub fn accounts(mut self, accounts: Arc<dyn AccountStore>) -> EngineBuilder {
        self.accounts = Some(accounts);
        self
    }

    pub fn catalog(mut self, catalog: Arc<dyn CatalogStore>) -> EngineBuilder {
        self.catalog = Some(catalog);
        self
    }

    pub fn ledger(mut self, ledger: Arc<dyn LedgerStore>) -> EngineBuilder {
        self.ledger = Some(ledger);
        self
    }

    /// Serve name lookups through `cache`.
    pub fn cache(mut self, cache: Arc<dyn UserCache>) -> EngineBuilder {
        self.cache = Some(cache);
        self
    }

    pub fn cache_policy(mut self, policy: CachePolicy) -> EngineBuilder {
        self.cache_policy = policy;
        self
    }

    /// Deadline applied to commands that do not carry their own.
    pub fn store_timeout(mut self, timeout: Duration) -> EngineBuilder {
        self.store_timeout = Some(timeout);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let sql = self.database.map(|db| Arc::new(SqlStore::new(db)));

        let accounts: Arc<dyn AccountStore> = match (self.accounts, &sql) {
            (Some(accounts), _) => accounts,
            (None, Some(sql)) => sql.clone(),
            (None, None) => return Err(missing_store("account")),
        };
        let catalog: Arc<dyn CatalogStore> = match (self.catalog, &sql) {
            (Some(catalog), _) => catalog,
            (None, Some(sql)) => sql.clone(),
            (None, None) => return Err(missing_store("catalog")),
        };
        let ledger: Arc<dyn LedgerStore> = match (self.ledger, &sql) {
            (Some(ledger), _) => ledger,
            (None, Some(sql)) => sql.clone(),
            (None, None) => return Err(missing_store("ledger")),
        };

        let accounts: Arc<dyn AccountStore> = match self.cache {
            Some(cache) => Arc::new(CachedAccounts::new(accounts, cache, self.cache_policy)),
            None => accounts,
        };

        Ok(Engine {
            accounts,
            catalog: Arc::new(MemoCatalog::new(catalog)),
            ledger,
            store_timeout: self.store_timeout.unwrap_or(DEFAULT_STORE_TIMEOUT),
        })
    }
}

fn missing_store(kind: &str) -> EngineError {
    EngineError::InvalidOperation(format!("no {kind} store: set a database or the store"))
}
