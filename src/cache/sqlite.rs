// src/cache/sqlite.rs
// Cache table in the application database, shared across restarts

use anyhow::Context;
use async_trait::async_trait;
use std::time::Duration;

use super::ResponseCache;
use crate::db::Database;
use crate::llm::GenerationResult;

pub struct SqliteCache {
    db: Database,
    ttl: Duration,
}

impl SqliteCache {
    pub fn new(db: Database, ttl: Duration) -> Self {
        Self { db, ttl }
    }

    /// Drop expired rows. Returns how many were removed.
    pub async fn purge_expired(&self) -> anyhow::Result<u64> {
        let now = chrono::Utc::now().timestamp();
        let result = sqlx::query("DELETE FROM llm_cache WHERE expires_at <= ?")
            .bind(now)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ResponseCache for SqliteCache {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn get(&self, key: &str) -> anyhow::Result<Option<GenerationResult>> {
        let now = chrono::Utc::now().timestamp();
        let row: Option<(String,)> =
            sqlx::query_as("SELECT response FROM llm_cache WHERE key_hash = ? AND expires_at > ?")
                .bind(key)
                .bind(now)
                .fetch_optional(self.db.pool())
                .await?;

        match row {
            Some((json,)) => {
                let value = serde_json::from_str(&json).context("corrupt cache entry")?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: &GenerationResult) -> anyhow::Result<()> {
        let now = chrono::Utc::now().timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let expires_at = now.saturating_add(ttl);
        let json = serde_json::to_string(value)?;

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO llm_cache (key_hash, model, response, created_at, expires_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(key)
        .bind(&value.model)
        .bind(json)
        .bind(now)
        .bind(expires_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;

    fn result() -> GenerationResult {
        GenerationResult {
            content: "stored".into(),
            tokens_used: 3,
            model: "claude".into(),
        }
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = SqliteCache::new(test_db().await, Duration::from_secs(60));
        cache.put("abc", &result()).await.unwrap();
        assert_eq!(cache.get("abc").await.unwrap(), Some(result()));
        assert_eq!(cache.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_huge_ttl_never_expires() {
        let cache = SqliteCache::new(test_db().await, Duration::from_secs(u64::MAX));
        cache.put("abc", &result()).await.unwrap();
        assert_eq!(cache.get("abc").await.unwrap(), Some(result()));
        assert_eq!(cache.purge_expired().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_expired_entries_are_misses() {
        let cache = SqliteCache::new(test_db().await, Duration::from_secs(0));
        cache.put("abc", &result()).await.unwrap();
        assert_eq!(cache.get("abc").await.unwrap(), None);
        assert_eq!(cache.purge_expired().await.unwrap(), 1);
    }
}
