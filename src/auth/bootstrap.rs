// src/auth/bootstrap.rs
// Startup and CLI account creation

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use super::password::hash_password;
use crate::config::AuthConfig;
use crate::db::{AdminRow, Database, UserRow};
use crate::schemas::Validate;
use crate::schemas::account::{AdminCreate, UserCreate};

/// Create the configured default admin when the admins table is empty.
///
/// Without `DEFAULT_ADMIN_PASSWORD` nothing is created and the first
/// `/api/admin/register` call becomes the superuser instead.
pub async fn ensure_default_admin(db: &Database, config: &AuthConfig) -> Result<Option<AdminRow>> {
    if db.count_admins().await? > 0 {
        return Ok(None);
    }

    let Some(password) = config.default_admin_password.as_deref() else {
        warn!("no admins exist and DEFAULT_ADMIN_PASSWORD is unset; first admin registration becomes superuser");
        return Ok(None);
    };

    let new = AdminCreate {
        username: config.default_admin_username.clone(),
        email: config.default_admin_email.clone(),
        password: password.to_string(),
        full_name: None,
        is_superuser: true,
    };
    new.validate()
        .map_err(|e| anyhow::anyhow!("invalid default admin settings: {}", e))?;

    let hashed = hash_password(&new.password).await?;
    let admin = db
        .insert_admin(&new.username, &new.email, &hashed, None, true)
        .await
        .context("Failed to create default admin")?;
    info!(username = %admin.username, "created default superuser admin");
    Ok(Some(admin))
}

/// Create a writer account from the command line.
pub async fn create_user(
    db: &Database,
    username: &str,
    password: &str,
    email: Option<&str>,
    is_admin: bool,
) -> Result<UserRow> {
    let new = UserCreate {
        username: username.to_string(),
        email: email.map(str::to_string),
        password: password.to_string(),
        is_admin,
    };
    new.validate().map_err(|e| anyhow::anyhow!("{}", e))?;

    if db.user_username_exists(username).await? {
        bail!("Username already registered: {}", username);
    }
    if let Some(email) = email
        && db.user_email_taken(email, None).await?
    {
        bail!("Email already registered: {}", email);
    }

    let hashed = hash_password(password).await?;
    let user = db
        .insert_user(username, email, &hashed, is_admin)
        .await
        .context("Failed to create user")?;
    info!(username = %user.username, is_admin, "created user");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;

    #[tokio::test]
    async fn test_default_admin_needs_password() {
        let db = test_db().await;
        assert!(ensure_default_admin(&db, &AuthConfig::default()).await.unwrap().is_none());
        assert_eq!(db.count_admins().await.unwrap(), 0);

        let config = AuthConfig {
            default_admin_password: Some("change-me-now".into()),
            ..AuthConfig::default()
        };
        let admin = ensure_default_admin(&db, &config).await.unwrap().unwrap();
        assert!(admin.is_superuser);

        // idempotent once an admin exists
        assert!(ensure_default_admin(&db, &config).await.unwrap().is_none());
        assert_eq!(db.count_admins().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicates() {
        let db = test_db().await;
        create_user(&db, "writer", "secret1", Some("w@example.com"), false)
            .await
            .unwrap();
        assert!(create_user(&db, "writer", "secret1", None, false).await.is_err());
        assert!(
            create_user(&db, "writer2", "secret1", Some("w@example.com"), false)
                .await
                .is_err()
        );
    }
}
