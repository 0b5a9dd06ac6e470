// src/db/worlds.rs

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::{Database, now};
use crate::schemas::world::{WorldSettingCreate, encode_map};

#[derive(Debug, Clone, FromRow)]
pub struct WorldSettingRow {
    pub id: i64,
    pub novel_id: String,
    pub era: Option<String>,
    /// JSON object text
    pub locations: Option<String>,
    pub rules: Option<String>,
    pub culture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Database {
    pub async fn list_world_settings(
        &self,
        novel_id: Option<&str>,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<WorldSettingRow>, sqlx::Error> {
        sqlx::query_as::<_, WorldSettingRow>(
            r#"
            SELECT * FROM world_settings
            WHERE (?1 IS NULL OR novel_id = ?1)
            ORDER BY id
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(novel_id)
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_world_setting(&self, id: i64) -> Result<Option<WorldSettingRow>, sqlx::Error> {
        sqlx::query_as::<_, WorldSettingRow>("SELECT * FROM world_settings WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn get_world_setting_for_novel(
        &self,
        novel_id: &str,
    ) -> Result<Option<WorldSettingRow>, sqlx::Error> {
        sqlx::query_as::<_, WorldSettingRow>("SELECT * FROM world_settings WHERE novel_id = ?")
            .bind(novel_id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn insert_world_setting(
        &self,
        new: WorldSettingCreate,
    ) -> Result<WorldSettingRow, sqlx::Error> {
        let ts = now();
        sqlx::query_as::<_, WorldSettingRow>(
            r#"
            INSERT INTO world_settings (novel_id, era, locations, rules, culture, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(new.novel_id)
        .bind(new.era)
        .bind(encode_map(new.locations))
        .bind(encode_map(new.rules))
        .bind(encode_map(new.culture))
        .bind(ts)
        .bind(ts)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update_world_setting(
        &self,
        row: &WorldSettingRow,
    ) -> Result<WorldSettingRow, sqlx::Error> {
        sqlx::query_as::<_, WorldSettingRow>(
            r#"
            UPDATE world_settings
            SET era = ?, locations = ?, rules = ?, culture = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&row.era)
        .bind(&row.locations)
        .bind(&row.rules)
        .bind(&row.culture)
        .bind(now())
        .bind(row.id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn delete_world_setting(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM world_settings WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
