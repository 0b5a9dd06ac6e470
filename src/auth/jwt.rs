// src/auth/jwt.rs
// HS256 access tokens for users and admins

use anyhow::{Result, anyhow};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;

pub const KIND_USER: &str = "user";
pub const KIND_ADMIN: &str = "admin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id or admin uuid
    pub kind: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn is_admin_token(&self) -> bool {
        self.kind == KIND_ADMIN
    }
}

pub fn create_token(config: &AuthConfig, subject: &str, kind: &str) -> Result<String> {
    let now = chrono::Utc::now();
    let expiration = now
        .checked_add_signed(chrono::Duration::minutes(config.access_token_expire_minutes))
        .ok_or_else(|| anyhow!("Failed to calculate expiration"))?;

    let claims = Claims {
        sub: subject.to_string(),
        kind: kind.to_string(),
        exp: expiration.timestamp(),
        iat: now.timestamp(),
    };

    let key = EncodingKey::from_secret(config.secret_key.as_bytes());
    encode(&Header::default(), &claims, &key).map_err(|e| anyhow!("Failed to create token: {}", e))
}

pub fn verify_token(config: &AuthConfig, token: &str) -> Result<Claims> {
    let key = DecodingKey::from_secret(config.secret_key.as_bytes());
    decode::<Claims>(token, &key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| anyhow!("Invalid token: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_keeps_subject_and_kind() {
        let config = AuthConfig::default();
        let token = create_token(&config, "42", KIND_USER).unwrap();
        let claims = verify_token(&config, &token).unwrap();
        assert_eq!(claims.sub, "42");
        assert!(!claims.is_admin_token());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let config = AuthConfig::default();
        let token = create_token(&config, "42", KIND_ADMIN).unwrap();
        let other = AuthConfig {
            secret_key: "another-secret".into(),
            ..AuthConfig::default()
        };
        assert!(verify_token(&other, &token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let config = AuthConfig {
            access_token_expire_minutes: -10,
            ..AuthConfig::default()
        };
        let token = create_token(&config, "42", KIND_USER).unwrap();
        assert!(verify_token(&config, &token).is_err());
    }
}
