// src/db/novels.rs

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::{Database, now};

#[derive(Debug, Clone, FromRow)]
pub struct NovelRow {
    pub id: String,
    pub title: String,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct NovelStatusCount {
    pub status: String,
    pub count: i64,
}

impl Database {
    pub async fn list_novels(&self, skip: i64, limit: i64) -> Result<Vec<NovelRow>, sqlx::Error> {
        sqlx::query_as::<_, NovelRow>(
            "SELECT * FROM novels ORDER BY created_at DESC, id LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_novel(&self, id: &str) -> Result<Option<NovelRow>, sqlx::Error> {
        sqlx::query_as::<_, NovelRow>("SELECT * FROM novels WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn novel_exists(&self, id: &str) -> Result<bool, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM novels WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    pub async fn insert_novel(&self, row: &NovelRow) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO novels (id, title, author, genre, description, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(&row.title)
        .bind(&row.author)
        .bind(&row.genre)
        .bind(&row.description)
        .bind(&row.status)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Persist every mutable column of `row` and return the stored version.
    pub async fn update_novel(&self, row: &NovelRow) -> Result<NovelRow, sqlx::Error> {
        sqlx::query_as::<_, NovelRow>(
            r#"
            UPDATE novels
            SET title = ?, author = ?, genre = ?, description = ?, status = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&row.title)
        .bind(&row.author)
        .bind(&row.genre)
        .bind(&row.description)
        .bind(&row.status)
        .bind(now())
        .bind(&row.id)
        .fetch_one(&self.pool)
        .await
    }

    /// Delete a novel; children go with it through `ON DELETE CASCADE`.
    pub async fn delete_novel(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM novels WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_novels_by_status(&self) -> Result<Vec<NovelStatusCount>, sqlx::Error> {
        sqlx::query_as::<_, NovelStatusCount>(
            "SELECT status, COUNT(*) AS count FROM novels GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::db::test_db;
    use crate::schemas::novel::{NovelCreate, NovelStatus};

    fn sample(title: &str) -> NovelCreate {
        NovelCreate {
            title: title.into(),
            author: Some("Test Author".into()),
            genre: None,
            description: None,
            status: NovelStatus::Draft,
        }
    }

    #[tokio::test]
    async fn test_insert_get_delete() {
        let db = test_db().await;
        let row = sample("Test Novel").into_row();
        db.insert_novel(&row).await.unwrap();

        let fetched = db.get_novel(&row.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "Test Novel");
        assert_eq!(fetched.author.as_deref(), Some("Test Author"));
        assert!(db.novel_exists(&row.id).await.unwrap());

        assert!(db.delete_novel(&row.id).await.unwrap());
        assert!(db.get_novel(&row.id).await.unwrap().is_none());
        assert!(!db.delete_novel(&row.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_status_counts() {
        let db = test_db().await;
        db.insert_novel(&sample("a").into_row()).await.unwrap();
        let mut published = sample("b").into_row();
        published.status = "PUBLISHED".into();
        db.insert_novel(&published).await.unwrap();
        db.insert_novel(&sample("c").into_row()).await.unwrap();

        let counts = db.count_novels_by_status().await.unwrap();
        let draft = counts.iter().find(|c| c.status == "DRAFT").unwrap();
        assert_eq!(draft.count, 2);
        let published = counts.iter().find(|c| c.status == "PUBLISHED").unwrap();
        assert_eq!(published.count, 1);
    }

    #[tokio::test]
    async fn test_paging() {
        let db = test_db().await;
        for i in 0..5 {
            db.insert_novel(&sample(&format!("n{}", i)).into_row()).await.unwrap();
        }
        assert_eq!(db.list_novels(0, 3).await.unwrap().len(), 3);
        assert_eq!(db.list_novels(3, 3).await.unwrap().len(), 2);
    }
}
