//! Project rows, scoped to their owner

use denidom_common::db::Project;
use denidom_common::uuid_utils;
use denidom_core::estimate::ProjectStatus;
use serde::Deserialize;
use sqlx::SqlitePool;
use validator::Validate;

use super::clients;
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewProject {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,
    pub client_id: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub status: ProjectStatus,
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProjectUpdate {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: Option<String>,
    pub client_id: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectFilter {
    pub client_id: Option<String>,
    pub status: Option<ProjectStatus>,
}

pub async fn list(pool: &SqlitePool, owner_id: &str, filter: &ProjectFilter) -> ApiResult<Vec<Project>> {
    let projects = sqlx::query_as::<_, Project>(
        r#"
        SELECT * FROM projects
        WHERE owner_id = ?
          AND (? IS NULL OR client_id = ?)
          AND (? IS NULL OR status = ?)
        ORDER BY created_at DESC, name
        "#,
    )
    .bind(owner_id)
    .bind(&filter.client_id)
    .bind(&filter.client_id)
    .bind(filter.status.map(|s| s.as_str()))
    .bind(filter.status.map(|s| s.as_str()))
    .fetch_all(pool)
    .await?;
    Ok(projects)
}

pub async fn get(pool: &SqlitePool, owner_id: &str, id: &str) -> ApiResult<Project> {
    sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = ? AND owner_id = ?")
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("project {}", id)))
}

/// A project may only reference the owner's own clients
async fn check_client(pool: &SqlitePool, owner_id: &str, client_id: Option<&str>) -> ApiResult<()> {
    if let Some(client_id) = client_id {
        if !uuid_utils::is_valid(client_id) {
            return Err(ApiError::validation("client_id", "must be a UUID"));
        }
        match clients::get(pool, owner_id, client_id).await {
            Ok(_) => {}
            Err(ApiError::NotFound(_)) => {
                return Err(ApiError::validation("client_id", "unknown client"));
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

pub async fn create(pool: &SqlitePool, owner_id: &str, input: &NewProject) -> ApiResult<Project> {
    check_client(pool, owner_id, input.client_id.as_deref()).await?;
    let id = uuid_utils::generate();

    sqlx::query(
        r#"
        INSERT INTO projects (id, owner_id, client_id, name, address, description, status)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(owner_id)
    .bind(&input.client_id)
    .bind(input.name.trim())
    .bind(&input.address)
    .bind(&input.description)
    .bind(input.status.as_str())
    .execute(pool)
    .await?;

    get(pool, owner_id, &id).await
}

pub async fn update(
    pool: &SqlitePool,
    owner_id: &str,
    id: &str,
    changes: &ProjectUpdate,
) -> ApiResult<Project> {
    let current = get(pool, owner_id, id).await?;
    check_client(pool, owner_id, changes.client_id.as_deref()).await?;

    let status = changes.status.map(|s| s.as_str()).unwrap_or(&current.status);

    sqlx::query(
        r#"
        UPDATE projects
        SET client_id = ?, name = ?, address = ?, description = ?, status = ?,
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ? AND owner_id = ?
        "#,
    )
    .bind(changes.client_id.as_ref().or(current.client_id.as_ref()))
    .bind(changes.name.as_deref().map(str::trim).unwrap_or(&current.name))
    .bind(changes.address.as_ref().or(current.address.as_ref()))
    .bind(changes.description.as_ref().or(current.description.as_ref()))
    .bind(status)
    .bind(id)
    .bind(owner_id)
    .execute(pool)
    .await?;

    get(pool, owner_id, id).await
}

/// Deleting a project removes its estimates (ON DELETE CASCADE)
pub async fn delete(pool: &SqlitePool, owner_id: &str, id: &str) -> ApiResult<()> {
    let result = sqlx::query("DELETE FROM projects WHERE id = ? AND owner_id = ?")
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("project {}", id)));
    }
    Ok(())
}
