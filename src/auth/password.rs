// src/auth/password.rs
// bcrypt runs on the blocking pool so logins don't stall the runtime

use anyhow::{Result, anyhow};
use bcrypt::{BcryptError, DEFAULT_COST, hash, verify};

pub async fn hash_password(password: &str) -> Result<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash(password, DEFAULT_COST))
        .await?
        .map_err(|e: BcryptError| anyhow!("Failed to hash password: {}", e))
}

/// A malformed stored hash counts as a mismatch.
pub async fn verify_password(password: &str, hashed: &str) -> bool {
    let password = password.to_string();
    let hashed = hashed.to_string();
    tokio::task::spawn_blocking(move || verify(password, &hashed).unwrap_or(false))
        .await
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hashed = hash_password("s3cret!").await.unwrap();
        assert_ne!(hashed, "s3cret!");
        assert!(verify_password("s3cret!", &hashed).await);
        assert!(!verify_password("wrong", &hashed).await);
        assert!(!verify_password("s3cret!", "not-a-bcrypt-hash").await);
    }
}
