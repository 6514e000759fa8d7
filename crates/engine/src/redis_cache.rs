//! Redis-backed [`UserCache`].

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::{
    RedisConnectionManager, bb8,
    redis::{AsyncCommands, RedisError},
};

use crate::{Account, CacheError, UserCache};

const KEY_PREFIX: &str = "user:";

impl From<RedisError> for CacheError {
    fn from(err: RedisError) -> Self {
        Self::Backend(err.to_string())
    }
}

impl From<bb8::RunError<RedisError>> for CacheError {
    fn from(err: bb8::RunError<RedisError>) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Accounts stored as JSON under `user:<name>` with `SET .. EX`.
#[derive(Clone, Debug)]
pub struct RedisCache {
    pool: bb8::Pool<RedisConnectionManager>,
}

impl RedisCache {
    pub fn new(pool: bb8::Pool<RedisConnectionManager>) -> Self {
        Self { pool }
    }

    /// Build a pool for `url` (for example `redis://127.0.0.1:6379`).
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let manager = RedisConnectionManager::new(url)?;
        let pool = bb8::Pool::builder().build(manager).await?;
        Ok(Self::new(pool))
    }

    fn key(name: &str) -> String {
        format!("{KEY_PREFIX}{name}")
    }
}

#[async_trait]
impl UserCache for RedisCache {
    async fn get(&self, name: &str) -> Result<Option<Account>, CacheError> {
        let mut conn = self.pool.get().await?;
        let raw: Option<String> = conn.get(Self::key(name)).await?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, name: &str, account: &Account, ttl: Duration) -> Result<(), CacheError> {
        let raw = serde_json::to_string(account)?;
        let mut conn = self.pool.get().await?;
        let () = conn.set_ex(Self::key(name), raw, ttl.as_secs().max(1)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced() {
        assert_eq!(RedisCache::key("alice"), "user:alice");
    }

    #[test]
    fn redis_errors_become_backend_errors() {
        let err = RedisError::from((bb8_redis::redis::ErrorKind::Io, "refused"));
        assert!(matches!(CacheError::from(err), CacheError::Backend(_)));
    }
}
