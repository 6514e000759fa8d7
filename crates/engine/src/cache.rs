//! Read-through cache for account lookups by name.
//!
//! The cache only translates a name into an identity. Balance decisions never
//! consult it: transfers and purchases re-read the store inside their
//! transaction, so a cached record may lag the store by up to the TTL.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;
use tokio::time::{Instant, timeout};

use crate::{Account, AccountId, AccountStore, ResultEngine, Snapshot};

#[derive(Debug, Error)]
pub enum CacheError {
    /// Backend unavailable or refusing the command.
    #[error("cache backend failure: {0}")]
    Backend(String),
    #[error("cache serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Side cache keyed by account name. Both calls may fail; callers treat a
/// failure as a miss.
#[async_trait]
pub trait UserCache: Send + Sync {
    async fn get(&self, name: &str) -> Result<Option<Account>, CacheError>;

    async fn set(&self, name: &str, account: &Account, ttl: Duration) -> Result<(), CacheError>;
}

/// Timing knobs of the read-through policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CachePolicy {
    /// How long a populated entry stays valid.
    pub ttl: Duration,
    /// Upper bound on a cache read before falling back to the store.
    pub read_timeout: Duration,
    /// Upper bound on the detached cache write after a store hit.
    pub write_timeout: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30 * 60),
            read_timeout: Duration::from_secs(2),
            write_timeout: Duration::from_secs(3),
        }
    }
}

/// In-process [`UserCache`] with per-entry expiry.
///
/// Expiry uses the tokio clock, so tests can pause and advance time.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, (Account, Instant)>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl UserCache for MemoryCache {
    async fn get(&self, name: &str) -> Result<Option<Account>, CacheError> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(name) {
            let (account, expires_at) = entry.value();
            if *expires_at > now {
                return Ok(Some(account.clone()));
            }
        }
        self.entries
            .remove_if(name, |_, (_, expires_at)| *expires_at <= now);
        Ok(None)
    }

    /// Expired entries of any name are purged on every write.
    async fn set(&self, name: &str, account: &Account, ttl: Duration) -> Result<(), CacheError> {
        let now = Instant::now();
        self.entries.retain(|_, (_, expires_at)| *expires_at > now);
        self.entries
            .insert(name.to_string(), (account.clone(), now + ttl));
        Ok(())
    }
}

/// [`AccountStore`] decorator serving `get_by_name` through a [`UserCache`].
///
/// On a miss the store is queried and the cache is populated by a detached
/// task bounded by [`CachePolicy::write_timeout`]; the caller never waits for
/// it and its failure is only logged. `put`, `get_by_id` and `snapshot` go
/// straight to the store.
pub struct CachedAccounts {
    inner: Arc<dyn AccountStore>,
    cache: Arc<dyn UserCache>,
    policy: CachePolicy,
}

impl CachedAccounts {
    pub fn new(inner: Arc<dyn AccountStore>, cache: Arc<dyn UserCache>, policy: CachePolicy) -> Self {
        Self {
            inner,
            cache,
            policy,
        }
    }

    async fn cached(&self, name: &str) -> Option<Account> {
        match timeout(self.policy.read_timeout, self.cache.get(name)).await {
            Ok(Ok(found)) => found,
            Ok(Err(err)) => {
                tracing::warn!(user = name, error = %err, "cache read failed");
                None
            }
            Err(_) => {
                tracing::warn!(user = name, "cache read timed out");
                None
            }
        }
    }

    fn populate(&self, name: &str, account: &Account) {
        let cache = Arc::clone(&self.cache);
        let policy = self.policy;
        let name = name.to_string();
        let account = account.clone();
        tokio::spawn(async move {
            match timeout(policy.write_timeout, cache.set(&name, &account, policy.ttl)).await {
                Ok(Ok(())) => tracing::trace!(user = %name, "cache populated"),
                Ok(Err(err)) => tracing::warn!(user = %name, error = %err, "cache write failed"),
                Err(_) => tracing::warn!(user = %name, "cache write timed out"),
            }
        });
    }
}

#[async_trait]
impl AccountStore for CachedAccounts {
    async fn put(&self, name: &str, credential_hash: &[u8]) -> ResultEngine<AccountId> {
        self.inner.put(name, credential_hash).await
    }

    async fn get_by_id(&self, id: AccountId) -> ResultEngine<Account> {
        self.inner.get_by_id(id).await
    }

    async fn get_by_name(&self, name: &str) -> ResultEngine<Account> {
        if let Some(account) = self.cached(name).await {
            tracing::trace!(user = name, "cache hit");
            return Ok(account);
        }
        let account = self.inner.get_by_name(name).await?;
        self.populate(name, &account);
        Ok(account)
    }

    async fn snapshot(&self, id: AccountId) -> ResultEngine<Snapshot> {
        self.inner.snapshot(id).await
    }
}
