//! Normative and material lookups (seeded reference rows, read-only)

use denidom_common::db::{Material, Normative};
use denidom_core::normatives::NormativeBase;
use sqlx::SqlitePool;

use crate::error::ApiResult;

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 200;

/// Case-insensitive substring search over code and name
///
/// SQLite's `LIKE` folds ASCII only, so Cyrillic matching relies on
/// lowercasing both sides in Rust.
pub async fn search_normatives(
    pool: &SqlitePool,
    query: Option<&str>,
    base: Option<NormativeBase>,
    limit: i64,
) -> ApiResult<Vec<Normative>> {
    let rows = sqlx::query_as::<_, Normative>(
        "SELECT * FROM normatives WHERE (? IS NULL OR base_type = ?) ORDER BY code",
    )
    .bind(base.map(|b| b.as_str()))
    .bind(base.map(|b| b.as_str()))
    .fetch_all(pool)
    .await?;

    let needle = query.map(|q| q.trim().to_lowercase()).filter(|q| !q.is_empty());
    let limit = limit.clamp(1, MAX_LIMIT) as usize;

    Ok(rows
        .into_iter()
        .filter(|n| match &needle {
            Some(needle) => {
                n.code.to_lowercase().contains(needle.as_str())
                    || n.name.to_lowercase().contains(needle.as_str())
            }
            None => true,
        })
        .take(limit)
        .collect())
}

pub async fn list_materials(pool: &SqlitePool, category: Option<&str>) -> ApiResult<Vec<Material>> {
    let materials = sqlx::query_as::<_, Material>(
        "SELECT * FROM materials WHERE (? IS NULL OR category = ?) ORDER BY category, name",
    )
    .bind(category)
    .bind(category)
    .fetch_all(pool)
    .await?;
    Ok(materials)
}
