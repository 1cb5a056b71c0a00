//! CSV document downloads
//!
//! GET /api/export/estimates/:id/:kind with `kind` one of `ks2`, `ks3`,
//! `m29`, `csv`. Header requisites default to the project and its client;
//! query parameters override them.
//!
//! POST to the `m29` URL with `{"actual": {"<material>": amount}}` supplies
//! actual consumption; materials left out default to their normative amount.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::IntoResponse,
    Extension,
};
use chrono::{Datelike, NaiveDate};
use denidom_common::time::now;
use denidom_core::calculator::{round_to_cents, CalculationResult};
use denidom_core::documents::{
    export_estimate_csv, render_ks2, render_ks3, render_m29, DocumentHeader, DocumentKind,
    PreviousAmounts,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::debug;
use validator::{Validate, ValidationError};

use crate::db::estimates::{self, Estimate};
use crate::db::{clients, projects};
use crate::error::{ApiError, ApiResult};
use crate::extract::{AuthUser, ValidatedJson};
use crate::AppState;

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub number: Option<String>,
    pub date: Option<NaiveDate>,
    pub contractor: Option<String>,
    pub period_from: Option<NaiveDate>,
    pub period_to: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ActualConsumption {
    #[serde(default)]
    #[validate(custom = "validate_amounts")]
    pub actual: HashMap<String, f64>,
}

fn validate_amounts(actual: &HashMap<String, f64>) -> Result<(), ValidationError> {
    if actual.values().all(|amount| amount.is_finite() && *amount >= 0.0) {
        return Ok(());
    }
    let mut error = ValidationError::new("amount");
    error.message = Some("amounts must be non-negative numbers".into());
    Err(error)
}

pub async fn export_estimate(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((id, kind)): Path<(String, String)>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<impl IntoResponse> {
    let kind: DocumentKind = kind.parse()?;
    render(&state, &user, &id, kind, &query, &HashMap::new()).await
}

/// М-29 with caller-supplied actual consumption
pub async fn export_with_actuals(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((id, kind)): Path<(String, String)>,
    Query(query): Query<ExportQuery>,
    ValidatedJson(body): ValidatedJson<ActualConsumption>,
) -> ApiResult<impl IntoResponse> {
    let kind: DocumentKind = kind.parse()?;
    if kind != DocumentKind::M29 {
        return Err(ApiError::BadRequest(format!(
            "actual consumption applies to m29 only, not {}",
            kind.as_str()
        )));
    }
    render(&state, &user, &id, kind, &query, &body.actual).await
}

async fn render(
    state: &AppState,
    user: &AuthUser,
    id: &str,
    kind: DocumentKind,
    query: &ExportQuery,
    actual: &HashMap<String, f64>,
) -> ApiResult<impl IntoResponse> {
    let estimate = estimates::get(&state.db, &user.id, id).await?;
    let header = document_header(&state.db, &user.id, &estimate, query).await?;

    let body = match kind {
        DocumentKind::Ks2 => render_ks2(&header, &estimate.items, &estimate.options()),
        DocumentKind::Ks3 => {
            let previous = previous_amounts(&state.db, &estimate, header.date.year()).await?;
            render_ks3(&header, &estimate.totals, &previous)
        }
        DocumentKind::M29 => render_m29(&header, &estimate.items, actual),
        DocumentKind::Csv => {
            let title = format!("Смета № {} «{}»", estimate.number, estimate.name);
            export_estimate_csv(&title, &estimate.items, &estimate.options())
        }
    };

    let file_name = kind.file_name(&header.number);
    debug!("Exporting estimate {} as {}", estimate.id, file_name);

    Ok((
        [
            (CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
            (CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", file_name)),
        ],
        body,
    ))
}

async fn document_header(
    pool: &SqlitePool,
    owner_id: &str,
    estimate: &Estimate,
    query: &ExportQuery,
) -> ApiResult<DocumentHeader> {
    let project = projects::get(pool, owner_id, &estimate.project_id).await?;
    let object = match &project.address {
        Some(address) if !address.trim().is_empty() => format!("{}, {}", project.name, address),
        _ => project.name.clone(),
    };

    let customer = match &project.client_id {
        Some(client_id) => match clients::get(pool, owner_id, client_id).await {
            Ok(client) => client.company.unwrap_or(client.name),
            Err(ApiError::NotFound(_)) => String::new(),
            Err(e) => return Err(e),
        },
        None => String::new(),
    };

    let number = query.number.clone().unwrap_or_else(|| estimate.number.clone());
    let date = query.date.unwrap_or_else(|| now().date_naive());
    let contractor = query.contractor.clone().unwrap_or_default();

    let mut header = DocumentHeader::new(number, date).with_parties(&object, &customer, &contractor);
    header.period_from = query.period_from;
    header.period_to = query.period_to;
    Ok(header)
}

/// Amounts of approved estimates created before this one
///
/// `since_year_start` keeps those created in the document's year.
async fn previous_amounts(pool: &SqlitePool, estimate: &Estimate, year: i32) -> ApiResult<PreviousAmounts> {
    let earlier = estimates::approved_before(pool, estimate).await?;

    let this_year: Vec<&Estimate> = earlier
        .iter()
        .filter(|e| created_year(&e.created_at) == Some(year))
        .collect();

    Ok(PreviousAmounts {
        since_start: sum_totals(earlier.iter()),
        since_year_start: sum_totals(this_year.into_iter()),
    })
}

fn created_year(timestamp: &str) -> Option<i32> {
    timestamp.get(..4)?.parse().ok()
}

fn sum_totals<'a>(estimates: impl Iterator<Item = &'a Estimate>) -> Option<CalculationResult> {
    estimates
        .map(|e| e.totals)
        .reduce(|acc, t| CalculationResult {
            subtotal: round_to_cents(acc.subtotal + t.subtotal),
            overhead: round_to_cents(acc.overhead + t.overhead),
            profit: round_to_cents(acc.profit + t.profit),
            vat: round_to_cents(acc.vat + t.vat),
            total: round_to_cents(acc.total + t.total),
            items_count: acc.items_count + t.items_count,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actual_amounts_must_be_non_negative() {
        let mut body = ActualConsumption::default();
        body.actual.insert("Маяк штукатурный".to_string(), 12.5);
        assert!(body.validate().is_ok());

        body.actual.insert("Штукатурная смесь гипсовая".to_string(), -1.0);
        let errors = body.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("actual"));
    }

    #[test]
    fn test_created_year() {
        assert_eq!(created_year("2025-03-14 09:26:53"), Some(2025));
        assert_eq!(created_year("20"), None);
        assert_eq!(created_year("abcd-01-01"), None);
    }
}
