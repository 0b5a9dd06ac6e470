// src/config/auth.rs
// Token signing, registration policy and bootstrap admin

use super::helpers::{env_bool, env_opt, env_or, env_parse};

pub const DEV_SECRET_KEY: &str = "storyloom-dev-secret-change-me";

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret_key: String,
    pub access_token_expire_minutes: i64,
    pub allow_user_registration: bool,
    /// Resolve unauthenticated requests to a demo user on routes that allow it.
    pub demo_user_enabled: bool,
    pub default_admin_username: String,
    pub default_admin_email: String,
    pub default_admin_password: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: DEV_SECRET_KEY.to_string(),
            access_token_expire_minutes: 60 * 24,
            allow_user_registration: true,
            demo_user_enabled: false,
            default_admin_username: "admin".to_string(),
            default_admin_email: "admin@example.com".to_string(),
            default_admin_password: None,
        }
    }
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            secret_key: env_or("SECRET_KEY", &d.secret_key),
            access_token_expire_minutes: env_parse(
                "ACCESS_TOKEN_EXPIRE_MINUTES",
                d.access_token_expire_minutes,
            ),
            allow_user_registration: env_bool("ALLOW_USER_REGISTRATION", d.allow_user_registration),
            demo_user_enabled: env_bool("DEMO_USER_ENABLED", d.demo_user_enabled),
            default_admin_username: env_or("DEFAULT_ADMIN_USERNAME", &d.default_admin_username),
            default_admin_email: env_or("DEFAULT_ADMIN_EMAIL", &d.default_admin_email),
            default_admin_password: env_opt("DEFAULT_ADMIN_PASSWORD"),
        }
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.secret_key == DEV_SECRET_KEY
    }
}
