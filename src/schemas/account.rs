// src/schemas/account.rs
// Users, admins and the token payloads they log in with

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Validate, max_len, opt_max_len};
use crate::db::{AdminRow, UserRow};
use crate::error::{AppError, AppResult};

fn check_username(username: &str) -> AppResult<()> {
    let len = username.chars().count();
    if !(3..=50).contains(&len) {
        return Err(AppError::validation("username must be 3 to 50 characters"));
    }
    Ok(())
}

fn check_password(password: &str) -> AppResult<()> {
    if password.chars().count() < 6 {
        return Err(AppError::validation("password must be at least 6 characters"));
    }
    Ok(())
}

/// Loose shape check: one `@` with text on both sides and a dot in the domain.
fn check_email(email: &str) -> AppResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(AppError::validation("email is not a valid address"));
    }
    max_len("email", email, 255)
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer",
        }
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl Validate for UserCreate {
    fn validate(&self) -> AppResult<()> {
        check_username(&self.username)?;
        check_password(&self.password)?;
        match &self.email {
            Some(email) => check_email(email),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub password: Option<String>,
    pub is_active: Option<bool>,
    pub is_admin: Option<bool>,
}

impl Validate for UserUpdate {
    fn validate(&self) -> AppResult<()> {
        if let Some(email) = &self.email {
            check_email(email)?;
        }
        if let Some(password) = &self.password {
            check_password(password)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            is_admin: row.is_admin,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Admins
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AdminCreate {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    #[serde(default)]
    pub is_superuser: bool,
}

impl Validate for AdminCreate {
    fn validate(&self) -> AppResult<()> {
        check_username(&self.username)?;
        check_email(&self.email)?;
        check_password(&self.password)?;
        opt_max_len("full_name", self.full_name.as_deref(), 100)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminUpdate {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub password: Option<String>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
}

impl Validate for AdminUpdate {
    fn validate(&self) -> AppResult<()> {
        if let Some(email) = &self.email {
            check_email(email)?;
        }
        if let Some(password) = &self.password {
            check_password(password)?;
        }
        opt_max_len("full_name", self.full_name.as_deref(), 100)
    }
}

impl AdminUpdate {
    pub fn touches_privileges(&self) -> bool {
        self.is_superuser.is_some() || self.is_active.is_some()
    }
}

#[derive(Debug, Serialize)]
pub struct AdminResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<AdminRow> for AdminResponse {
    fn from(row: AdminRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            full_name: row.full_name,
            is_active: row.is_active,
            is_superuser: row.is_superuser,
            last_login: row.last_login,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusCountResponse {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct AdminStats {
    pub total_novels: i64,
    pub novels_by_status: Vec<StatusCountResponse>,
    pub total_admins: i64,
    pub total_users: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shapes() {
        assert!(check_email("writer@example.com").is_ok());
        assert!(check_email("writer@localhost").is_err());
        assert!(check_email("@example.com").is_err());
        assert!(check_email("a@b@c.com").is_err());
        assert!(check_email("plain").is_err());
    }

    #[test]
    fn test_admin_create_constraints() {
        let admin = |username: &str, password: &str| AdminCreate {
            username: username.into(),
            email: "root@example.com".into(),
            password: password.into(),
            full_name: None,
            is_superuser: false,
        };
        assert!(admin("root", "secret1").validate().is_ok());
        assert!(admin("ro", "secret1").validate().is_err());
        assert!(admin("root", "short").validate().is_err());
    }

    #[test]
    fn test_privilege_fields_detected() {
        assert!(!AdminUpdate::default().touches_privileges());
        let promote = AdminUpdate {
            is_superuser: Some(true),
            ..Default::default()
        };
        assert!(promote.touches_privileges());
    }
}
