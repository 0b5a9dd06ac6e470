// src/db/plots.rs

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::{Database, now};
use crate::schemas::plot::PlotCreate;

#[derive(Debug, Clone, FromRow)]
pub struct PlotRow {
    pub id: i64,
    pub novel_id: String,
    pub title: String,
    pub description: Option<String>,
    pub plot_type: Option<String>,
    pub key_events: Option<String>,
    pub characters: Option<String>,
    pub conflicts: Option<String>,
    pub order_index: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Database {
    /// Plots ordered by `order_index`; equal keys keep insertion order.
    pub async fn list_plots(
        &self,
        novel_id: Option<&str>,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<PlotRow>, sqlx::Error> {
        sqlx::query_as::<_, PlotRow>(
            r#"
            SELECT * FROM plots
            WHERE (?1 IS NULL OR novel_id = ?1)
            ORDER BY order_index, id
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(novel_id)
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_plot(&self, id: i64) -> Result<Option<PlotRow>, sqlx::Error> {
        sqlx::query_as::<_, PlotRow>("SELECT * FROM plots WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn insert_plot(&self, new: &PlotCreate) -> Result<PlotRow, sqlx::Error> {
        let ts = now();
        sqlx::query_as::<_, PlotRow>(
            r#"
            INSERT INTO plots (
                novel_id, title, description, plot_type, key_events, characters,
                conflicts, order_index, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&new.novel_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.plot_type)
        .bind(&new.key_events)
        .bind(&new.characters)
        .bind(&new.conflicts)
        .bind(new.order_index)
        .bind(ts)
        .bind(ts)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update_plot(&self, row: &PlotRow) -> Result<PlotRow, sqlx::Error> {
        sqlx::query_as::<_, PlotRow>(
            r#"
            UPDATE plots
            SET title = ?, description = ?, plot_type = ?, key_events = ?, characters = ?,
                conflicts = ?, order_index = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&row.title)
        .bind(&row.description)
        .bind(&row.plot_type)
        .bind(&row.key_events)
        .bind(&row.characters)
        .bind(&row.conflicts)
        .bind(row.order_index)
        .bind(now())
        .bind(row.id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn delete_plot(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM plots WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
