//! Database models
//!
//! Row types map one-to-one to the tables created in [`super::init`].
//! Timestamps are kept as the TEXT SQLite produces for `CURRENT_TIMESTAMP`.

use serde::{Deserialize, Serialize};

/// User row including credential columns; never serialized to clients
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub password_hash: String,
    pub password_salt: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Public view of a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub created_at: String,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            email: record.email,
            name: record.name,
            role: record.role,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Client {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub inn: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: String,
    pub owner_id: String,
    pub client_id: Option<String>,
    pub name: String,
    pub address: Option<String>,
    pub description: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Estimate row; `items` holds the JSON-encoded line items
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EstimateRecord {
    pub id: String,
    pub project_id: String,
    pub number: String,
    pub name: String,
    pub status: String,
    pub items: String,
    pub overhead_rate: f64,
    pub profit_rate: f64,
    pub vat_rate: f64,
    pub subtotal: f64,
    pub total: f64,
    pub created_at: String,
    pub updated_at: String,
}

/// Pricing reference row (FER/GESN/TER/TSN)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Normative {
    pub id: String,
    pub code: String,
    pub name: String,
    pub unit: String,
    pub base_type: String,
    pub price: f64,
    pub labor_cost: f64,
    pub material_cost: f64,
    pub machine_cost: f64,
    pub section: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Material {
    pub id: String,
    pub name: String,
    pub unit: String,
    pub price: f64,
    pub category: String,
    pub supplier: Option<String>,
}
