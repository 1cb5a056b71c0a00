//! User accounts

use denidom_common::auth::PasswordHash;
use denidom_common::db::UserRecord;
use denidom_common::uuid_utils;
use sqlx::SqlitePool;

use crate::error::{ApiError, ApiResult};

/// Lowercased, trimmed form used for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn create_user(
    pool: &SqlitePool,
    email: &str,
    name: &str,
    password: &PasswordHash,
) -> ApiResult<UserRecord> {
    let id = uuid_utils::generate();

    let result = sqlx::query(
        "INSERT INTO users (id, email, name, role, password_hash, password_salt) VALUES (?, ?, ?, 'user', ?, ?)",
    )
    .bind(&id)
    .bind(normalize_email(email))
    .bind(name.trim())
    .bind(&password.hash)
    .bind(&password.salt)
    .execute(pool)
    .await;

    match result {
        Ok(_) => {}
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(ApiError::Conflict("Email is already registered".to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    find_by_id(pool, &id)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("user {} vanished after insert", id)))
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> ApiResult<Option<UserRecord>> {
    let user = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE email = ?")
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> ApiResult<Option<UserRecord>> {
    let user = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}
