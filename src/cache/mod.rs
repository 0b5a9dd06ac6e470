// src/cache/mod.rs
// Optional LLM response cache, injected into the AI service as a handle

mod memory;
mod sqlite;

pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{CacheBackend, CacheConfig};
use crate::db::Database;
use crate::llm::GenerationResult;

/// A key/value store for generation results.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    fn name(&self) -> &'static str;

    async fn get(&self, key: &str) -> anyhow::Result<Option<GenerationResult>>;

    async fn put(&self, key: &str, value: &GenerationResult) -> anyhow::Result<()>;
}

/// Stable cache key for one (provider, model, prompt) triple.
pub fn cache_key(provider: &str, model: &str, prompt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(provider.as_bytes());
    hasher.update([0u8]);
    hasher.update(model.as_bytes());
    hasher.update([0u8]);
    hasher.update(prompt.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Shared handle over an optional backend.
///
/// The first backend error disables the cache for the rest of the process;
/// callers only ever see hits or misses.
#[derive(Clone)]
pub struct CacheHandle {
    backend: Option<Arc<dyn ResponseCache>>,
    enabled: Arc<AtomicBool>,
}

impl CacheHandle {
    pub fn disabled() -> Self {
        Self {
            backend: None,
            enabled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn new(backend: Arc<dyn ResponseCache>) -> Self {
        Self {
            backend: Some(backend),
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn from_config(config: &CacheConfig, db: &Database) -> Self {
        let ttl = Duration::from_secs(config.ttl_secs);
        let handle = match config.backend {
            CacheBackend::None => Self::disabled(),
            CacheBackend::Memory => Self::new(Arc::new(MemoryCache::new(config.capacity, ttl))),
            CacheBackend::Sqlite => Self::new(Arc::new(SqliteCache::new(db.clone(), ttl))),
        };
        match &handle.backend {
            Some(backend) => info!(backend = backend.name(), ttl_secs = config.ttl_secs, "LLM response cache enabled"),
            None => info!("LLM response cache disabled"),
        }
        handle
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some() && self.enabled.load(Ordering::Relaxed)
    }

    fn active(&self) -> Option<&Arc<dyn ResponseCache>> {
        if self.enabled.load(Ordering::Relaxed) {
            self.backend.as_ref()
        } else {
            None
        }
    }

    fn disable(&self, backend: &str, op: &str, err: &anyhow::Error) {
        if self.enabled.swap(false, Ordering::Relaxed) {
            warn!(backend, op, error = %err, "LLM cache failed, disabling it for this process");
        }
    }

    pub async fn get(&self, key: &str) -> Option<GenerationResult> {
        let backend = self.active()?;
        match backend.get(key).await {
            Ok(Some(hit)) => {
                debug!(key = &key[..8.min(key.len())], "LLM cache hit");
                Some(hit)
            }
            Ok(None) => {
                debug!(key = &key[..8.min(key.len())], "LLM cache miss");
                None
            }
            Err(e) => {
                self.disable(backend.name(), "get", &e);
                None
            }
        }
    }

    pub async fn put(&self, key: &str, value: &GenerationResult) {
        let Some(backend) = self.active() else {
            return;
        };
        if let Err(e) = backend.put(key, value).await {
            self.disable(backend.name(), "put", &e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct FailingCache {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ResponseCache for FailingCache {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn get(&self, _key: &str) -> anyhow::Result<Option<GenerationResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("connection refused")
        }

        async fn put(&self, _key: &str, _value: &GenerationResult) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("connection refused")
        }
    }

    fn result() -> GenerationResult {
        GenerationResult {
            content: "cached".into(),
            tokens_used: 7,
            model: "gpt-4".into(),
        }
    }

    #[test]
    fn test_cache_key_is_stable_and_field_separated() {
        let a = cache_key("openai", "gpt-4", "prompt");
        assert_eq!(a, cache_key("openai", "gpt-4", "prompt"));
        assert_eq!(a.len(), 64);
        assert_ne!(a, cache_key("openai", "gpt-4", "prompt2"));
        // shifting bytes between fields must change the key
        assert_ne!(cache_key("ab", "c", "p"), cache_key("a", "bc", "p"));
    }

    #[tokio::test]
    async fn test_failure_disables_cache() {
        let backend = Arc::new(FailingCache {
            calls: AtomicUsize::new(0),
        });
        let handle = CacheHandle::new(backend.clone());
        assert!(handle.is_enabled());

        assert!(handle.get("k").await.is_none());
        assert!(!handle.is_enabled());

        // disabled: backend is no longer touched
        handle.put("k", &result()).await;
        assert!(handle.get("k").await.is_none());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disabled_handle_is_inert() {
        let handle = CacheHandle::disabled();
        handle.put("k", &result()).await;
        assert!(handle.get("k").await.is_none());
        assert!(!handle.is_enabled());
    }

    #[tokio::test]
    async fn test_memory_round_trip_through_handle() {
        let handle = CacheHandle::new(Arc::new(MemoryCache::new(10, Duration::from_secs(60))));
        let key = cache_key("openai", "gpt-4", "hello");
        handle.put(&key, &result()).await;
        assert_eq!(handle.get(&key).await, Some(result()));
    }
}
