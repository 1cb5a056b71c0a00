//! Client rows, scoped to their owner

use denidom_common::db::Client;
use denidom_common::uuid_utils;
use serde::Deserialize;
use sqlx::SqlitePool;
use validator::{Validate, ValidationError};

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewClient {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[validate(length(max = 200))]
    pub company: Option<String>,
    /// 10 digits for organizations, 12 for individuals
    #[validate(custom = "validate_inn")]
    pub inn: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ClientUpdate {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[validate(length(max = 200))]
    pub company: Option<String>,
    #[validate(custom = "validate_inn")]
    pub inn: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

fn validate_inn(inn: &str) -> Result<(), ValidationError> {
    let digits = inn.chars().all(|c| c.is_ascii_digit());
    if digits && (inn.len() == 10 || inn.len() == 12) {
        return Ok(());
    }
    let mut error = ValidationError::new("inn");
    error.message = Some("must be 10 or 12 digits".into());
    Err(error)
}

pub async fn list(pool: &SqlitePool, owner_id: &str) -> ApiResult<Vec<Client>> {
    let clients = sqlx::query_as::<_, Client>(
        "SELECT * FROM clients WHERE owner_id = ? ORDER BY name COLLATE NOCASE, created_at",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;
    Ok(clients)
}

pub async fn get(pool: &SqlitePool, owner_id: &str, id: &str) -> ApiResult<Client> {
    sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = ? AND owner_id = ?")
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("client {}", id)))
}

pub async fn create(pool: &SqlitePool, owner_id: &str, input: &NewClient) -> ApiResult<Client> {
    let id = uuid_utils::generate();

    sqlx::query(
        r#"
        INSERT INTO clients (id, owner_id, name, email, phone, company, inn, address, notes)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(owner_id)
    .bind(input.name.trim())
    .bind(&input.email)
    .bind(&input.phone)
    .bind(&input.company)
    .bind(&input.inn)
    .bind(&input.address)
    .bind(&input.notes)
    .execute(pool)
    .await?;

    get(pool, owner_id, &id).await
}

pub async fn update(
    pool: &SqlitePool,
    owner_id: &str,
    id: &str,
    changes: &ClientUpdate,
) -> ApiResult<Client> {
    let current = get(pool, owner_id, id).await?;

    sqlx::query(
        r#"
        UPDATE clients
        SET name = ?, email = ?, phone = ?, company = ?, inn = ?, address = ?, notes = ?,
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ? AND owner_id = ?
        "#,
    )
    .bind(changes.name.as_deref().map(str::trim).unwrap_or(&current.name))
    .bind(changes.email.as_ref().or(current.email.as_ref()))
    .bind(changes.phone.as_ref().or(current.phone.as_ref()))
    .bind(changes.company.as_ref().or(current.company.as_ref()))
    .bind(changes.inn.as_ref().or(current.inn.as_ref()))
    .bind(changes.address.as_ref().or(current.address.as_ref()))
    .bind(changes.notes.as_ref().or(current.notes.as_ref()))
    .bind(id)
    .bind(owner_id)
    .execute(pool)
    .await?;

    get(pool, owner_id, id).await
}

pub async fn delete(pool: &SqlitePool, owner_id: &str, id: &str) -> ApiResult<()> {
    let result = sqlx::query("DELETE FROM clients WHERE id = ? AND owner_id = ?")
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("client {}", id)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with_inn(inn: &str) -> NewClient {
        NewClient {
            name: "ООО Ремонт".to_string(),
            email: None,
            phone: None,
            company: None,
            inn: Some(inn.to_string()),
            address: None,
            notes: None,
        }
    }

    #[test]
    fn test_inn_accepts_10_or_12_digits() {
        assert!(client_with_inn("7701234567").validate().is_ok());
        assert!(client_with_inn("770123456789").validate().is_ok());
    }

    #[test]
    fn test_inn_rejects_other_lengths_and_letters() {
        for inn in ["77012345678", "770123456", "77012345AB", "7701 234567"] {
            let errors = client_with_inn(inn).validate().unwrap_err();
            let field = errors.field_errors()["inn"];
            assert_eq!(field[0].message.as_deref(), Some("must be 10 or 12 digits"), "{}", inn);
        }
    }

    #[test]
    fn test_update_without_inn_is_valid() {
        assert!(ClientUpdate::default().validate().is_ok());
    }
}
