// src/db/chapters.rs
// Chapters, chapter versions and chapter evaluations

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::{Database, now};
use crate::schemas::chapter::{ChapterCreate, ChapterEvaluationCreate, ChapterVersionCreate};

#[derive(Debug, Clone, FromRow)]
pub struct ChapterRow {
    pub id: i64,
    pub novel_id: String,
    pub chapter_number: i64,
    pub title: Option<String>,
    pub content: Option<String>,
    pub summary: Option<String>,
    pub word_count: i64,
    pub status: String,
    pub selected_version_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ChapterVersionRow {
    pub id: i64,
    pub chapter_id: i64,
    pub version_label: Option<String>,
    pub provider: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ChapterEvaluationRow {
    pub id: i64,
    pub chapter_id: i64,
    pub version_id: Option<i64>,
    pub decision: Option<String>,
    pub feedback: Option<String>,
    pub score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Database {
    /// Chapters by number; duplicate numbers fall back to insertion order.
    pub async fn list_chapters(
        &self,
        novel_id: Option<&str>,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<ChapterRow>, sqlx::Error> {
        sqlx::query_as::<_, ChapterRow>(
            r#"
            SELECT * FROM chapters
            WHERE (?1 IS NULL OR novel_id = ?1)
            ORDER BY chapter_number, id
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(novel_id)
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await
    }

    /// Chapters of one novel numbered below `chapter_number`, oldest first.
    pub async fn chapters_before(
        &self,
        novel_id: &str,
        chapter_number: i64,
    ) -> Result<Vec<ChapterRow>, sqlx::Error> {
        sqlx::query_as::<_, ChapterRow>(
            r#"
            SELECT * FROM chapters
            WHERE novel_id = ? AND chapter_number < ?
            ORDER BY chapter_number, id
            "#,
        )
        .bind(novel_id)
        .bind(chapter_number)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_chapter(&self, id: i64) -> Result<Option<ChapterRow>, sqlx::Error> {
        sqlx::query_as::<_, ChapterRow>("SELECT * FROM chapters WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn insert_chapter(&self, new: &ChapterCreate) -> Result<ChapterRow, sqlx::Error> {
        let ts = now();
        sqlx::query_as::<_, ChapterRow>(
            r#"
            INSERT INTO chapters (
                novel_id, chapter_number, title, content, summary, word_count, status,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&new.novel_id)
        .bind(new.chapter_number)
        .bind(&new.title)
        .bind(&new.content)
        .bind(&new.summary)
        .bind(new.word_count)
        .bind(new.stored_status())
        .bind(ts)
        .bind(ts)
        .fetch_one(&self.pool)
        .await
    }

    /// Writes the editable columns. `selected_version_id` is only changed by
    /// [`Database::select_chapter_version`].
    pub async fn update_chapter(&self, row: &ChapterRow) -> Result<ChapterRow, sqlx::Error> {
        sqlx::query_as::<_, ChapterRow>(
            r#"
            UPDATE chapters
            SET chapter_number = ?, title = ?, content = ?, summary = ?, word_count = ?,
                status = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(row.chapter_number)
        .bind(&row.title)
        .bind(&row.content)
        .bind(&row.summary)
        .bind(row.word_count)
        .bind(&row.status)
        .bind(now())
        .bind(row.id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn delete_chapter(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM chapters WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ========================================================================
    // Versions
    // ========================================================================

    pub async fn insert_chapter_version(
        &self,
        new: &ChapterVersionCreate,
    ) -> Result<ChapterVersionRow, sqlx::Error> {
        sqlx::query_as::<_, ChapterVersionRow>(
            r#"
            INSERT INTO chapter_versions (chapter_id, version_label, provider, content, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(new.chapter_id)
        .bind(&new.version_label)
        .bind(&new.provider)
        .bind(&new.content)
        .bind(now())
        .fetch_one(&self.pool)
        .await
    }

    /// Versions of a chapter, newest first.
    pub async fn list_chapter_versions(
        &self,
        chapter_id: i64,
    ) -> Result<Vec<ChapterVersionRow>, sqlx::Error> {
        sqlx::query_as::<_, ChapterVersionRow>(
            "SELECT * FROM chapter_versions WHERE chapter_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(chapter_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_chapter_version(
        &self,
        id: i64,
    ) -> Result<Option<ChapterVersionRow>, sqlx::Error> {
        sqlx::query_as::<_, ChapterVersionRow>("SELECT * FROM chapter_versions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Mark `version_id` as the chapter's canonical text and copy its content
    /// into the chapter. Returns `None` when the version does not belong to
    /// the chapter (or either is missing).
    pub async fn select_chapter_version(
        &self,
        chapter_id: i64,
        version_id: i64,
    ) -> Result<Option<ChapterRow>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let version = sqlx::query_as::<_, ChapterVersionRow>(
            "SELECT * FROM chapter_versions WHERE id = ? AND chapter_id = ?",
        )
        .bind(version_id)
        .bind(chapter_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(version) = version else {
            return Ok(None);
        };

        let chapter = sqlx::query_as::<_, ChapterRow>(
            r#"
            UPDATE chapters
            SET selected_version_id = ?, content = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(version.id)
        .bind(&version.content)
        .bind(now())
        .bind(chapter_id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(chapter)
    }

    /// Delete a version, clearing any chapter selection that points at it.
    pub async fn delete_chapter_version(&self, id: i64) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE chapters SET selected_version_id = NULL, updated_at = ? WHERE selected_version_id = ?",
        )
        .bind(now())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM chapter_versions WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    // ========================================================================
    // Evaluations
    // ========================================================================

    pub async fn insert_chapter_evaluation(
        &self,
        new: &ChapterEvaluationCreate,
    ) -> Result<ChapterEvaluationRow, sqlx::Error> {
        sqlx::query_as::<_, ChapterEvaluationRow>(
            r#"
            INSERT INTO chapter_evaluations (chapter_id, version_id, decision, feedback, score, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(new.chapter_id)
        .bind(new.version_id)
        .bind(&new.decision)
        .bind(&new.feedback)
        .bind(new.score)
        .bind(now())
        .fetch_one(&self.pool)
        .await
    }

    pub async fn list_chapter_evaluations(
        &self,
        chapter_id: i64,
    ) -> Result<Vec<ChapterEvaluationRow>, sqlx::Error> {
        sqlx::query_as::<_, ChapterEvaluationRow>(
            "SELECT * FROM chapter_evaluations WHERE chapter_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(chapter_id)
        .fetch_all(&self.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;
    use crate::schemas::novel::{NovelCreate, NovelStatus};

    async fn seed_chapter(db: &Database) -> ChapterRow {
        let novel = NovelCreate {
            title: "Versions".into(),
            author: None,
            genre: None,
            description: None,
            status: NovelStatus::Draft,
        }
        .into_row();
        db.insert_novel(&novel).await.unwrap();
        db.insert_chapter(&ChapterCreate {
            novel_id: novel.id,
            chapter_number: 1,
            title: Some("Opening".into()),
            content: Some("outline".into()),
            summary: None,
            word_count: 0,
            status: None,
        })
        .await
        .unwrap()
    }

    fn version(chapter_id: i64, content: &str) -> ChapterVersionCreate {
        ChapterVersionCreate {
            chapter_id,
            version_label: Some("v".into()),
            provider: Some("openai".into()),
            content: content.into(),
        }
    }

    #[tokio::test]
    async fn test_select_copies_content() {
        let db = test_db().await;
        let chapter = seed_chapter(&db).await;
        let v = db.insert_chapter_version(&version(chapter.id, "draft text")).await.unwrap();

        let updated = db.select_chapter_version(chapter.id, v.id).await.unwrap().unwrap();
        assert_eq!(updated.selected_version_id, Some(v.id));
        assert_eq!(updated.content.as_deref(), Some("draft text"));
    }

    #[tokio::test]
    async fn test_select_rejects_foreign_version() {
        let db = test_db().await;
        let a = seed_chapter(&db).await;
        let b = seed_chapter(&db).await;
        let foreign = db.insert_chapter_version(&version(b.id, "other")).await.unwrap();

        assert!(db.select_chapter_version(a.id, foreign.id).await.unwrap().is_none());
        let untouched = db.get_chapter(a.id).await.unwrap().unwrap();
        assert_eq!(untouched.selected_version_id, None);
    }

    #[tokio::test]
    async fn test_deleting_selected_version_keeps_chapter() {
        let db = test_db().await;
        let chapter = seed_chapter(&db).await;
        let v = db.insert_chapter_version(&version(chapter.id, "text")).await.unwrap();
        db.select_chapter_version(chapter.id, v.id).await.unwrap();

        assert!(db.delete_chapter_version(v.id).await.unwrap());
        let after = db.get_chapter(chapter.id).await.unwrap().unwrap();
        assert_eq!(after.selected_version_id, None);
        assert!(db.list_chapter_versions(chapter.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deleting_chapter_cascades_versions_and_evaluations() {
        let db = test_db().await;
        let chapter = seed_chapter(&db).await;
        let v = db.insert_chapter_version(&version(chapter.id, "text")).await.unwrap();
        db.insert_chapter_evaluation(&ChapterEvaluationCreate {
            chapter_id: chapter.id,
            version_id: Some(v.id),
            decision: Some("accept".into()),
            feedback: None,
            score: Some(8.0),
        })
        .await
        .unwrap();

        assert!(db.delete_chapter(chapter.id).await.unwrap());
        assert!(db.get_chapter_version(v.id).await.unwrap().is_none());
        assert!(db.list_chapter_evaluations(chapter.id).await.unwrap().is_empty());
    }
}
