//! Estimate rows
//!
//! Estimates are owned through their project. Totals are recomputed from the
//! items and rates on every write and stored alongside them.

use denidom_common::db::{CalculatorDefaults, EstimateRecord};
use denidom_common::uuid_utils;
use denidom_core::calculator::{calculate, calculate_checked, CalculationResult, CalculatorOptions};
use denidom_core::{EstimateItem, EstimateStatus};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;
use validator::Validate;

use super::projects;
use crate::error::{ApiError, ApiResult};

/// Estimate with decoded items and the full calculation
#[derive(Debug, Clone, Serialize)]
pub struct Estimate {
    pub id: String,
    pub project_id: String,
    pub number: String,
    pub name: String,
    pub status: EstimateStatus,
    pub items: Vec<EstimateItem>,
    pub overhead_rate: f64,
    pub profit_rate: f64,
    pub vat_rate: f64,
    pub subtotal: f64,
    pub total: f64,
    pub totals: CalculationResult,
    pub created_at: String,
    pub updated_at: String,
}

impl Estimate {
    /// Rates stored on the row; a zero VAT rate means VAT is not charged
    pub fn options(&self) -> CalculatorOptions {
        options(self.overhead_rate, self.profit_rate, self.vat_rate)
    }
}

fn options(overhead_rate: f64, profit_rate: f64, vat_rate: f64) -> CalculatorOptions {
    CalculatorOptions {
        overhead_rate,
        profit_rate,
        vat_rate,
        include_vat: true,
    }
}

impl TryFrom<EstimateRecord> for Estimate {
    type Error = ApiError;

    fn try_from(record: EstimateRecord) -> Result<Self, Self::Error> {
        let items: Vec<EstimateItem> =
            serde_json::from_str(&record.items).map_err(denidom_common::Error::from)?;
        let status = record
            .status
            .parse::<EstimateStatus>()
            .map_err(|e| ApiError::Internal(format!("estimate {}: {}", record.id, e)))?;
        let totals = calculate(
            &items,
            &options(record.overhead_rate, record.profit_rate, record.vat_rate),
        );

        Ok(Self {
            id: record.id,
            project_id: record.project_id,
            number: record.number,
            name: record.name,
            status,
            items,
            overhead_rate: record.overhead_rate,
            profit_rate: record.profit_rate,
            vat_rate: record.vat_rate,
            subtotal: record.subtotal,
            total: record.total,
            totals,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewEstimate {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,
    /// Generated as the next ordinal within the project when absent
    #[validate(length(min = 1, max = 50))]
    pub number: Option<String>,
    #[serde(default)]
    pub status: EstimateStatus,
    #[serde(default)]
    pub items: Vec<EstimateItem>,
    #[validate(range(min = 0.0, max = 1.0, message = "must be between 0 and 1"))]
    pub overhead_rate: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0, message = "must be between 0 and 1"))]
    pub profit_rate: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0, message = "must be between 0 and 1"))]
    pub vat_rate: Option<f64>,
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct EstimateUpdate {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub number: Option<String>,
    pub status: Option<EstimateStatus>,
    pub items: Option<Vec<EstimateItem>>,
    #[validate(range(min = 0.0, max = 1.0, message = "must be between 0 and 1"))]
    pub overhead_rate: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0, message = "must be between 0 and 1"))]
    pub profit_rate: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0, message = "must be between 0 and 1"))]
    pub vat_rate: Option<f64>,
}

const SELECT_OWNED: &str = r#"
    SELECT e.* FROM estimates e
    JOIN projects p ON p.id = e.project_id
    WHERE e.id = ? AND p.owner_id = ?
"#;

pub async fn get(pool: &SqlitePool, owner_id: &str, id: &str) -> ApiResult<Estimate> {
    let record = sqlx::query_as::<_, EstimateRecord>(SELECT_OWNED)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("estimate {}", id)))?;
    record.try_into()
}

pub async fn list_for_project(
    pool: &SqlitePool,
    owner_id: &str,
    project_id: &str,
) -> ApiResult<Vec<Estimate>> {
    projects::get(pool, owner_id, project_id).await?;

    let records = sqlx::query_as::<_, EstimateRecord>(
        "SELECT * FROM estimates WHERE project_id = ? ORDER BY created_at, rowid",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?;

    records.into_iter().map(Estimate::try_from).collect()
}

pub async fn create(
    pool: &SqlitePool,
    owner_id: &str,
    project_id: &str,
    input: &NewEstimate,
    defaults: &CalculatorDefaults,
) -> ApiResult<Estimate> {
    projects::get(pool, owner_id, project_id).await?;

    let default_vat = if defaults.include_vat { defaults.vat_rate } else { 0.0 };
    let options = options(
        input.overhead_rate.unwrap_or(defaults.overhead_rate),
        input.profit_rate.unwrap_or(defaults.profit_rate),
        input.vat_rate.unwrap_or(default_vat),
    );
    let totals = calculate_checked(&input.items, &options)?;

    let number = match &input.number {
        Some(number) => number.trim().to_string(),
        None => {
            // One past the highest purely numeric number in the project
            let last: i64 = sqlx::query_scalar(
                r#"
                SELECT COALESCE(MAX(CAST(number AS INTEGER)), 0) FROM estimates
                WHERE project_id = ? AND number != '' AND number NOT GLOB '*[^0-9]*'
                "#,
            )
            .bind(project_id)
            .fetch_one(pool)
            .await?;
            (last + 1).to_string()
        }
    };

    let id = uuid_utils::generate();
    let items_json = serde_json::to_string(&input.items).map_err(denidom_common::Error::from)?;

    sqlx::query(
        r#"
        INSERT INTO estimates (id, project_id, number, name, status, items,
                               overhead_rate, profit_rate, vat_rate, subtotal, total)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(project_id)
    .bind(&number)
    .bind(input.name.trim())
    .bind(input.status.as_str())
    .bind(&items_json)
    .bind(options.overhead_rate)
    .bind(options.profit_rate)
    .bind(options.vat_rate)
    .bind(totals.subtotal)
    .bind(totals.total)
    .execute(pool)
    .await?;

    debug!("Created estimate {} ({} items, total {})", id, input.items.len(), totals.total);

    get(pool, owner_id, &id).await
}

pub async fn update(
    pool: &SqlitePool,
    owner_id: &str,
    id: &str,
    changes: &EstimateUpdate,
) -> ApiResult<Estimate> {
    let current = get(pool, owner_id, id).await?;

    let items = changes.items.as_ref().unwrap_or(&current.items);
    let options = options(
        changes.overhead_rate.unwrap_or(current.overhead_rate),
        changes.profit_rate.unwrap_or(current.profit_rate),
        changes.vat_rate.unwrap_or(current.vat_rate),
    );
    let totals = calculate_checked(items, &options)?;
    let items_json = serde_json::to_string(items).map_err(denidom_common::Error::from)?;

    sqlx::query(
        r#"
        UPDATE estimates
        SET number = ?, name = ?, status = ?, items = ?,
            overhead_rate = ?, profit_rate = ?, vat_rate = ?, subtotal = ?, total = ?,
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(changes.number.as_deref().map(str::trim).unwrap_or(&current.number))
    .bind(changes.name.as_deref().map(str::trim).unwrap_or(&current.name))
    .bind(changes.status.unwrap_or(current.status).as_str())
    .bind(&items_json)
    .bind(options.overhead_rate)
    .bind(options.profit_rate)
    .bind(options.vat_rate)
    .bind(totals.subtotal)
    .bind(totals.total)
    .bind(id)
    .execute(pool)
    .await?;

    get(pool, owner_id, id).await
}

pub async fn delete(pool: &SqlitePool, owner_id: &str, id: &str) -> ApiResult<()> {
    let result = sqlx::query(
        "DELETE FROM estimates WHERE id = ? AND project_id IN (SELECT id FROM projects WHERE owner_id = ?)",
    )
    .bind(id)
    .bind(owner_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("estimate {}", id)));
    }
    Ok(())
}

/// Approved estimates of the same project created before `estimate`
///
/// These are the amounts already reported in earlier КС-3 certificates.
/// `created_at` has one-second resolution, so ties are broken by insertion
/// order (rowid).
pub async fn approved_before(pool: &SqlitePool, estimate: &Estimate) -> ApiResult<Vec<Estimate>> {
    let records = sqlx::query_as::<_, EstimateRecord>(
        r#"
        SELECT * FROM estimates
        WHERE project_id = ? AND status = 'approved'
          AND (created_at < ?
               OR (created_at = ? AND rowid < (SELECT rowid FROM estimates WHERE id = ?)))
        ORDER BY created_at, rowid
        "#,
    )
    .bind(&estimate.project_id)
    .bind(&estimate.created_at)
    .bind(&estimate.created_at)
    .bind(&estimate.id)
    .fetch_all(pool)
    .await?;

    records.into_iter().map(Estimate::try_from).collect()
}
