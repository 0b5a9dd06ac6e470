// src/auth/mod.rs
// Password hashing, access tokens, request extractors and account bootstrap

pub mod bootstrap;
pub mod extract;
pub mod jwt;
pub mod password;

pub use extract::{AdminUser, CurrentAdmin, CurrentUser, SuperAdmin, UserOrDemo, optional_admin};
pub use jwt::{Claims, KIND_ADMIN, KIND_USER, create_token, verify_token};
pub use password::{hash_password, verify_password};
