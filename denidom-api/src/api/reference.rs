//! Normative and material lookups (public, read-only)

use axum::{
    extract::{Query, State},
    Json,
};
use denidom_common::db::{Material, Normative};
use denidom_core::normatives::NormativeBase;
use serde::{Deserialize, Serialize};

use crate::db::reference::{self, DEFAULT_LIMIT};
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct NormativeQuery {
    pub q: Option<String>,
    pub base: Option<String>,
    pub limit: Option<i64>,
}

/// GET /api/normatives?q=&base=&limit=
///
/// An unknown `base` is a 400, not an empty list.
pub async fn search_normatives(
    State(state): State<AppState>,
    Query(query): Query<NormativeQuery>,
) -> ApiResult<Json<Vec<Normative>>> {
    let base = query
        .base
        .as_deref()
        .filter(|b| !b.trim().is_empty())
        .map(str::parse::<NormativeBase>)
        .transpose()?;

    let normatives = reference::search_normatives(
        &state.db,
        query.q.as_deref(),
        base,
        query.limit.unwrap_or(DEFAULT_LIMIT),
    )
    .await?;
    Ok(Json(normatives))
}

#[derive(Debug, Serialize)]
pub struct BaseInfo {
    pub code: &'static str,
    pub name: &'static str,
    pub full_name: &'static str,
}

/// GET /api/normatives/bases
pub async fn list_bases() -> Json<Vec<BaseInfo>> {
    Json(
        NormativeBase::ALL
            .iter()
            .map(|b| BaseInfo {
                code: b.as_str(),
                name: b.display_name(),
                full_name: b.full_name(),
            })
            .collect(),
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct MaterialQuery {
    pub category: Option<String>,
}

/// GET /api/materials?category=
pub async fn list_materials(
    State(state): State<AppState>,
    Query(query): Query<MaterialQuery>,
) -> ApiResult<Json<Vec<Material>>> {
    let category = query.category.as_deref().filter(|c| !c.is_empty());
    Ok(Json(reference::list_materials(&state.db, category).await?))
}
