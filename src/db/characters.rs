// src/db/characters.rs

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::{Database, now};
use crate::schemas::character::CharacterCreate;

#[derive(Debug, Clone, FromRow)]
pub struct CharacterRow {
    pub id: i64,
    pub novel_id: String,
    pub name: String,
    pub role: Option<String>,
    pub description: Option<String>,
    pub personality: Option<String>,
    pub background: Option<String>,
    pub appearance: Option<String>,
    pub relationships: Option<String>,
    pub goals: Option<String>,
    pub abilities: Option<String>,
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Database {
    /// Characters in display order, optionally restricted to one novel.
    pub async fn list_characters(
        &self,
        novel_id: Option<&str>,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<CharacterRow>, sqlx::Error> {
        sqlx::query_as::<_, CharacterRow>(
            r#"
            SELECT * FROM characters
            WHERE (?1 IS NULL OR novel_id = ?1)
            ORDER BY position, id
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(novel_id)
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_character(&self, id: i64) -> Result<Option<CharacterRow>, sqlx::Error> {
        sqlx::query_as::<_, CharacterRow>("SELECT * FROM characters WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn insert_character(&self, new: &CharacterCreate) -> Result<CharacterRow, sqlx::Error> {
        let ts = now();
        sqlx::query_as::<_, CharacterRow>(
            r#"
            INSERT INTO characters (
                novel_id, name, role, description, personality, background,
                appearance, relationships, goals, abilities, position, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&new.novel_id)
        .bind(&new.name)
        .bind(&new.role)
        .bind(&new.description)
        .bind(&new.personality)
        .bind(&new.background)
        .bind(&new.appearance)
        .bind(&new.relationships)
        .bind(&new.goals)
        .bind(&new.abilities)
        .bind(new.position)
        .bind(ts)
        .bind(ts)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update_character(&self, row: &CharacterRow) -> Result<CharacterRow, sqlx::Error> {
        sqlx::query_as::<_, CharacterRow>(
            r#"
            UPDATE characters
            SET name = ?, role = ?, description = ?, personality = ?, background = ?,
                appearance = ?, relationships = ?, goals = ?, abilities = ?, position = ?,
                updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&row.name)
        .bind(&row.role)
        .bind(&row.description)
        .bind(&row.personality)
        .bind(&row.background)
        .bind(&row.appearance)
        .bind(&row.relationships)
        .bind(&row.goals)
        .bind(&row.abilities)
        .bind(row.position)
        .bind(now())
        .bind(row.id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn delete_character(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM characters WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
