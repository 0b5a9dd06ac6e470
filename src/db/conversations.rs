// src/db/conversations.rs
// Append-only assistant conversation history per novel

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::{Database, now};

#[derive(Debug, Clone, FromRow)]
pub struct ConversationRow {
    pub id: i64,
    pub novel_id: String,
    pub speaker: String,
    pub assistant_role: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Database {
    /// Record one user prompt and the assistant replies it produced, atomically.
    pub async fn append_exchange(
        &self,
        novel_id: &str,
        assistant_role: &str,
        user_input: &str,
        replies: &[String],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let ts = now();

        sqlx::query(
            r#"
            INSERT INTO novel_conversations (novel_id, speaker, assistant_role, content, created_at)
            VALUES (?, 'user', ?, ?, ?)
            "#,
        )
        .bind(novel_id)
        .bind(assistant_role)
        .bind(user_input)
        .bind(ts)
        .execute(&mut *tx)
        .await?;

        for reply in replies {
            sqlx::query(
                r#"
                INSERT INTO novel_conversations (novel_id, speaker, assistant_role, content, created_at)
                VALUES (?, 'assistant', ?, ?, ?)
                "#,
            )
            .bind(novel_id)
            .bind(assistant_role)
            .bind(reply)
            .bind(ts)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }

    /// History oldest first.
    pub async fn list_conversation(
        &self,
        novel_id: &str,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<ConversationRow>, sqlx::Error> {
        sqlx::query_as::<_, ConversationRow>(
            "SELECT * FROM novel_conversations WHERE novel_id = ? ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(novel_id)
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::db::test_db;
    use crate::schemas::novel::{NovelCreate, NovelStatus};

    #[tokio::test]
    async fn test_exchange_is_appended_in_order() {
        let db = test_db().await;
        let novel = NovelCreate {
            title: "Talky".into(),
            author: None,
            genre: None,
            description: None,
            status: NovelStatus::Draft,
        }
        .into_row();
        db.insert_novel(&novel).await.unwrap();

        db.append_exchange(&novel.id, "novelist", "write it", &["one".into(), "two".into()])
            .await
            .unwrap();

        let history = db.list_conversation(&novel.id, 0, 100).await.unwrap();
        let speakers: Vec<&str> = history.iter().map(|h| h.speaker.as_str()).collect();
        assert_eq!(speakers, vec!["user", "assistant", "assistant"]);
        assert_eq!(history[2].content, "two");

        db.delete_novel(&novel.id).await.unwrap();
        assert!(db.list_conversation(&novel.id, 0, 100).await.unwrap().is_empty());
    }
}
