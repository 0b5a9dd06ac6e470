// src/db/accounts.rs
// Users (writers) and admins (platform operators) are separate tables

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::{Database, now};

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub hashed_password: String,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct AdminRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Database {
    // ========================================================================
    // Users
    // ========================================================================

    pub async fn list_users(&self, skip: i64, limit: i64) -> Result<Vec<UserRow>, sqlx::Error> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY id LIMIT ? OFFSET ?")
            .bind(limit)
            .bind(skip)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn get_user(&self, id: i64) -> Result<Option<UserRow>, sqlx::Error> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>, sqlx::Error> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn user_username_exists(&self, username: &str) -> Result<bool, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    /// True when another user (not `except_id`) already uses `email`.
    pub async fn user_email_taken(&self, email: &str, except_id: Option<i64>) -> Result<bool, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM users WHERE email = ? AND (? IS NULL OR id != ?)",
        )
        .bind(email)
        .bind(except_id)
        .bind(except_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    pub async fn insert_user(
        &self,
        username: &str,
        email: Option<&str>,
        hashed_password: &str,
        is_admin: bool,
    ) -> Result<UserRow, sqlx::Error> {
        let ts = now();
        sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, email, hashed_password, is_admin, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, TRUE, ?, ?)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(hashed_password)
        .bind(is_admin)
        .bind(ts)
        .bind(ts)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update_user(&self, row: &UserRow) -> Result<UserRow, sqlx::Error> {
        sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET email = ?, hashed_password = ?, is_admin = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&row.email)
        .bind(&row.hashed_password)
        .bind(row.is_admin)
        .bind(row.is_active)
        .bind(now())
        .bind(row.id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn delete_user(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_users(&self) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // ========================================================================
    // Admins
    // ========================================================================

    pub async fn list_admins(&self, skip: i64, limit: i64) -> Result<Vec<AdminRow>, sqlx::Error> {
        sqlx::query_as::<_, AdminRow>("SELECT * FROM admins ORDER BY created_at, id LIMIT ? OFFSET ?")
            .bind(limit)
            .bind(skip)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn get_admin(&self, id: &str) -> Result<Option<AdminRow>, sqlx::Error> {
        sqlx::query_as::<_, AdminRow>("SELECT * FROM admins WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn get_admin_by_username(&self, username: &str) -> Result<Option<AdminRow>, sqlx::Error> {
        sqlx::query_as::<_, AdminRow>("SELECT * FROM admins WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn admin_identity_taken(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM admins WHERE username = ? OR email = ?")
                .bind(username)
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    pub async fn admin_email_taken(&self, email: &str, except_id: &str) -> Result<bool, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM admins WHERE email = ? AND id != ?")
                .bind(email)
                .bind(except_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    pub async fn count_admins(&self) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn insert_admin(
        &self,
        username: &str,
        email: &str,
        hashed_password: &str,
        full_name: Option<&str>,
        is_superuser: bool,
    ) -> Result<AdminRow, sqlx::Error> {
        let ts = now();
        sqlx::query_as::<_, AdminRow>(
            r#"
            INSERT INTO admins (
                id, username, email, hashed_password, full_name, is_active, is_superuser,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, TRUE, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(username)
        .bind(email)
        .bind(hashed_password)
        .bind(full_name)
        .bind(is_superuser)
        .bind(ts)
        .bind(ts)
        .fetch_one(&self.pool)
        .await
    }

    /// Insert a superuser only while the admins table is empty.
    ///
    /// `None` when another admin already exists; the check and the insert are
    /// one statement, so concurrent first registrations cannot both succeed.
    pub async fn insert_first_admin(
        &self,
        username: &str,
        email: &str,
        hashed_password: &str,
        full_name: Option<&str>,
    ) -> Result<Option<AdminRow>, sqlx::Error> {
        let ts = now();
        sqlx::query_as::<_, AdminRow>(
            r#"
            INSERT INTO admins (
                id, username, email, hashed_password, full_name, is_active, is_superuser,
                created_at, updated_at
            )
            SELECT ?, ?, ?, ?, ?, TRUE, TRUE, ?, ?
            WHERE NOT EXISTS (SELECT 1 FROM admins)
            RETURNING *
            "#,
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(username)
        .bind(email)
        .bind(hashed_password)
        .bind(full_name)
        .bind(ts)
        .bind(ts)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn update_admin(&self, row: &AdminRow) -> Result<AdminRow, sqlx::Error> {
        sqlx::query_as::<_, AdminRow>(
            r#"
            UPDATE admins
            SET email = ?, hashed_password = ?, full_name = ?, is_active = ?, is_superuser = ?,
                updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&row.email)
        .bind(&row.hashed_password)
        .bind(&row.full_name)
        .bind(row.is_active)
        .bind(row.is_superuser)
        .bind(now())
        .bind(&row.id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn touch_admin_login(&self, id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE admins SET last_login = ? WHERE id = ?")
            .bind(now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete_admin(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM admins WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::db::{is_unique_violation, test_db};
    use crate::error::AppError;

    #[tokio::test]
    async fn test_user_uniqueness_helpers() {
        let db = test_db().await;
        let user = db
            .insert_user("writer", Some("w@example.com"), "hash", false)
            .await
            .unwrap();
        assert!(user.is_active);
        assert!(!user.is_admin);

        assert!(db.user_username_exists("writer").await.unwrap());
        assert!(db.user_email_taken("w@example.com", None).await.unwrap());
        assert!(!db.user_email_taken("w@example.com", Some(user.id)).await.unwrap());
        assert_eq!(db.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_admin_login_timestamp() {
        let db = test_db().await;
        let admin = db
            .insert_admin("root", "root@example.com", "hash", None, true)
            .await
            .unwrap();
        assert!(admin.last_login.is_none());

        db.touch_admin_login(&admin.id).await.unwrap();
        let reloaded = db.get_admin(&admin.id).await.unwrap().unwrap();
        assert!(reloaded.last_login.is_some());
        assert!(db.admin_identity_taken("root", "other@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_first_admin_insert_only_while_empty() {
        let db = test_db().await;
        let first = db
            .insert_first_admin("root", "root@example.com", "hash", None)
            .await
            .unwrap()
            .unwrap();
        assert!(first.is_superuser);

        let second = db
            .insert_first_admin("intruder", "intruder@example.com", "hash", None)
            .await
            .unwrap();
        assert!(second.is_none());
        assert_eq!(db.count_admins().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_username_maps_to_validation() {
        let db = test_db().await;
        db.insert_user("writer", None, "hash", false).await.unwrap();
        let err = db.insert_user("writer", None, "hash", false).await.unwrap_err();
        assert!(is_unique_violation(&err));

        let err = AppError::duplicate_or_storage(err, "Username already registered");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Username already registered");
    }
}
