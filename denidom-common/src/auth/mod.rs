//! Authentication primitives
//!
//! Contains ONLY pure functions (no HTTP framework dependencies). The API
//! crate wraps them in Axum middleware and handlers.
//!
//! - [`password`]: salted, iterated SHA-256 password hashing
//! - [`token`]: HS256 bearer tokens (JWT compact serialization)

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password, PasswordHash};
pub use token::{issue_token, verify_token, Claims, TokenError};
