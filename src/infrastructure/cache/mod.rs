//! Fingerprint cache
//!
//! A disposable key/value mirror of store rows. The store stays the source of
//! truth: a missing entry is never an error, and a failing backend only costs
//! a log line.

mod memory_cache;
mod redis_cache;

pub use memory_cache::MemoryCache;
pub use redis_cache::RedisCache;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::EntityKind;

#[derive(Debug)]
pub enum CacheError {
    /// Backend rejected or failed the command
    Backend(String),
    /// Backend did not answer within the configured budget
    Timeout,
    /// Snapshot could not be encoded or decoded
    Codec(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Backend(msg) => write!(f, "Cache backend error: {}", msg),
            CacheError::Timeout => write!(f, "Cache operation timed out"),
            CacheError::Codec(msg) => write!(f, "Cache codec error: {}", msg),
        }
    }
}

impl std::error::Error for CacheError {}

impl From<redis::RedisError> for CacheError {
    fn from(e: redis::RedisError) -> Self {
        CacheError::Backend(e.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        CacheError::Codec(e.to_string())
    }
}

/// Byte-level cache backend
#[async_trait]
pub trait FingerprintCache: Send + Sync {
    /// `Ok(None)` on a miss
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// Expiry and timeout settings for cache writes
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    /// TTL for entries backfilled by a read-through miss
    pub read_ttl: Duration,
    /// TTL for entries refreshed after an update
    pub write_ttl: Duration,
    /// Upper bound on any single cache call
    pub op_timeout: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            read_ttl: Duration::from_secs(10),
            write_ttl: Duration::from_secs(600),
            op_timeout: Duration::from_millis(250),
        }
    }
}

/// Best-effort, typed view over a `FingerprintCache`.
///
/// Every method swallows `CacheError` after logging it, so callers on the
/// request path never see a cache fault.
#[derive(Clone)]
pub struct Fingerprints {
    backend: Arc<dyn FingerprintCache>,
    policy: CachePolicy,
}

impl Fingerprints {
    pub fn new(backend: Arc<dyn FingerprintCache>, policy: CachePolicy) -> Self {
        Self { backend, policy }
    }

    async fn bounded<T>(
        &self,
        op: impl Future<Output = Result<T, CacheError>>,
    ) -> Result<T, CacheError> {
        tokio::time::timeout(self.policy.op_timeout, op)
            .await
            .map_err(|_| CacheError::Timeout)?
    }

    /// Cached snapshot of `kind:id`, if any. Undecodable entries count as misses.
    pub async fn lookup<T: DeserializeOwned>(&self, kind: EntityKind, id: i32) -> Option<T> {
        let key = kind.cache_key(id);
        let bytes = match self.bounded(self.backend.get(&key)).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                tracing::debug!(%key, "cache miss");
                return None;
            }
            Err(e) => {
                tracing::warn!(%key, error = %e, "cache read failed, falling back to store");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                tracing::debug!(%key, "cache hit");
                Some(value)
            }
            Err(e) => {
                tracing::warn!(%key, error = %e, "discarding undecodable cache entry");
                None
            }
        }
    }

    /// Populate after a read-through miss (short TTL).
    pub async fn backfill<T: Serialize>(&self, kind: EntityKind, id: i32, value: &T) {
        self.store(kind, id, value, self.policy.read_ttl).await;
    }

    /// Refresh after an update (write TTL).
    pub async fn refresh<T: Serialize>(&self, kind: EntityKind, id: i32, value: &T) {
        self.store(kind, id, value, self.policy.write_ttl).await;
    }

    async fn store<T: Serialize>(&self, kind: EntityKind, id: i32, value: &T, ttl: Duration) {
        let key = kind.cache_key(id);
        let result = match serde_json::to_vec(value) {
            Ok(bytes) => self.bounded(self.backend.set(&key, &bytes, ttl)).await,
            Err(e) => Err(CacheError::from(e)),
        };
        if let Err(e) = result {
            tracing::warn!(%key, error = %e, "cache write failed");
        }
    }

    /// Drop `kind:id` so the next read goes to the store.
    pub async fn evict(&self, kind: EntityKind, id: i32) {
        let key = kind.cache_key(id);
        if let Err(e) = self.bounded(self.backend.delete(&key)).await {
            tracing::warn!(%key, error = %e, "cache invalidation failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LibraryItem;

    /// Backend that fails every call
    struct BrokenCache;

    #[async_trait]
    impl FingerprintCache for BrokenCache {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
            Err(CacheError::Backend("connection refused".into()))
        }
        async fn set(&self, _key: &str, _value: &[u8], _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Backend("connection refused".into()))
        }
        async fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::Backend("connection refused".into()))
        }
    }

    /// Backend that never answers
    struct StalledCache;

    #[async_trait]
    impl FingerprintCache for StalledCache {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
            std::future::pending().await
        }
        async fn set(&self, _key: &str, _value: &[u8], _ttl: Duration) -> Result<(), CacheError> {
            std::future::pending().await
        }
        async fn delete(&self, _key: &str) -> Result<(), CacheError> {
            std::future::pending().await
        }
    }

    fn book() -> LibraryItem {
        LibraryItem {
            book_id: 5,
            book_name: "Dune".to_string(),
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            available_copies: 2,
        }
    }

    #[tokio::test]
    async fn kinds_do_not_share_keys() {
        let backend = Arc::new(MemoryCache::new());
        let cache = Fingerprints::new(backend.clone(), CachePolicy::default());

        cache.backfill(EntityKind::Library, 5, &book()).await;

        assert!(backend.get("library:5").await.unwrap().is_some());
        assert!(backend.get("student:5").await.unwrap().is_none());
        assert!(backend.get("5").await.unwrap().is_none());
        let hit: Option<LibraryItem> = cache.lookup(EntityKind::Library, 5).await;
        assert_eq!(hit, Some(book()));
    }

    #[tokio::test]
    async fn evict_removes_entry() {
        let backend = Arc::new(MemoryCache::new());
        let cache = Fingerprints::new(backend.clone(), CachePolicy::default());

        cache.refresh(EntityKind::Library, 5, &book()).await;
        cache.evict(EntityKind::Library, 5).await;

        let miss: Option<LibraryItem> = cache.lookup(EntityKind::Library, 5).await;
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn backend_faults_are_swallowed() {
        let cache = Fingerprints::new(Arc::new(BrokenCache), CachePolicy::default());

        cache.backfill(EntityKind::Library, 5, &book()).await;
        cache.evict(EntityKind::Library, 5).await;
        let miss: Option<LibraryItem> = cache.lookup(EntityKind::Library, 5).await;
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn stalled_backend_is_cut_off() {
        let policy = CachePolicy {
            op_timeout: Duration::from_millis(20),
            ..CachePolicy::default()
        };
        let cache = Fingerprints::new(Arc::new(StalledCache), policy);

        let miss: Option<LibraryItem> = cache.lookup(EntityKind::Library, 5).await;
        assert!(miss.is_none());
        cache.refresh(EntityKind::Library, 5, &book()).await;
    }

    #[tokio::test]
    async fn garbage_entry_is_a_miss() {
        let backend = Arc::new(MemoryCache::new());
        backend
            .set("library:5", b"not json", Duration::from_secs(10))
            .await
            .unwrap();
        let cache = Fingerprints::new(backend, CachePolicy::default());

        let miss: Option<LibraryItem> = cache.lookup(EntityKind::Library, 5).await;
        assert!(miss.is_none());
    }
}
