// src/cache/memory.rs
// In-process cache backed by moka

use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;

use super::ResponseCache;
use crate::llm::GenerationResult;

/// moka rejects lifetimes above 1000 years
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

pub struct MemoryCache {
    entries: Cache<String, GenerationResult>,
}

impl MemoryCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl.min(MAX_TTL))
                .build(),
        }
    }
}

#[async_trait]
impl ResponseCache for MemoryCache {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> anyhow::Result<Option<GenerationResult>> {
        Ok(self.entries.get(key).await)
    }

    async fn put(&self, key: &str, value: &GenerationResult) -> anyhow::Result<()> {
        self.entries.insert(key.to_string(), value.clone()).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_huge_ttl_is_clamped() {
        let cache = MemoryCache::new(10, Duration::from_secs(u64::MAX));
        let value = GenerationResult {
            content: "kept".into(),
            tokens_used: 1,
            model: "gpt-4".into(),
        };
        cache.put("k", &value).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(value));
    }
}
