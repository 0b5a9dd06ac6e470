// src/db/prompts.rs

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::{Database, now};
use crate::schemas::prompt::PromptCreate;

#[derive(Debug, Clone, FromRow)]
pub struct PromptRow {
    pub id: i64,
    pub name: String,
    pub title: Option<String>,
    pub content: String,
    pub tags: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Database {
    pub async fn list_prompts(&self, skip: i64, limit: i64) -> Result<Vec<PromptRow>, sqlx::Error> {
        sqlx::query_as::<_, PromptRow>("SELECT * FROM prompts ORDER BY name LIMIT ? OFFSET ?")
            .bind(limit)
            .bind(skip)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn get_prompt(&self, id: i64) -> Result<Option<PromptRow>, sqlx::Error> {
        sqlx::query_as::<_, PromptRow>("SELECT * FROM prompts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn get_prompt_by_name(&self, name: &str) -> Result<Option<PromptRow>, sqlx::Error> {
        sqlx::query_as::<_, PromptRow>("SELECT * FROM prompts WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
    }

    /// True when a prompt other than `except_id` already has `name`.
    pub async fn prompt_name_taken(&self, name: &str, except_id: Option<i64>) -> Result<bool, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM prompts WHERE name = ? AND (? IS NULL OR id != ?)",
        )
        .bind(name)
        .bind(except_id)
        .bind(except_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    pub async fn insert_prompt(&self, new: &PromptCreate) -> Result<PromptRow, sqlx::Error> {
        let ts = now();
        sqlx::query_as::<_, PromptRow>(
            r#"
            INSERT INTO prompts (name, title, content, tags, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&new.name)
        .bind(&new.title)
        .bind(&new.content)
        .bind(&new.tags)
        .bind(ts)
        .bind(ts)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update_prompt(&self, row: &PromptRow) -> Result<PromptRow, sqlx::Error> {
        sqlx::query_as::<_, PromptRow>(
            r#"
            UPDATE prompts
            SET name = ?, title = ?, content = ?, tags = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&row.name)
        .bind(&row.title)
        .bind(&row.content)
        .bind(&row.tags)
        .bind(now())
        .bind(row.id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn delete_prompt(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM prompts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
