//! Key/value settings stored in the `settings` table

use crate::Result;
use rand::RngCore;
use sqlx::SqlitePool;
use tracing::{info, warn};

pub const KEY_OVERHEAD_RATE: &str = "overhead_rate";
pub const KEY_PROFIT_RATE: &str = "profit_rate";
pub const KEY_VAT_RATE: &str = "vat_rate";
pub const KEY_INCLUDE_VAT: &str = "include_vat";
pub const KEY_JWT_SECRET: &str = "jwt_secret";

/// Calculator rates applied when a request does not carry its own
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalculatorDefaults {
    pub overhead_rate: f64,
    pub profit_rate: f64,
    pub vat_rate: f64,
    pub include_vat: bool,
}

impl Default for CalculatorDefaults {
    fn default() -> Self {
        Self {
            overhead_rate: 0.12,
            profit_rate: 0.08,
            vat_rate: 0.20,
            include_vat: true,
        }
    }
}

/// Initialize or repair default settings
///
/// Missing keys are created; keys holding NULL are reset to the default.
pub async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    let defaults = CalculatorDefaults::default();
    ensure_setting(pool, KEY_OVERHEAD_RATE, &defaults.overhead_rate.to_string()).await?;
    ensure_setting(pool, KEY_PROFIT_RATE, &defaults.profit_rate.to_string()).await?;
    ensure_setting(pool, KEY_VAT_RATE, &defaults.vat_rate.to_string()).await?;
    ensure_setting(pool, KEY_INCLUDE_VAT, &defaults.include_vat.to_string()).await?;
    Ok(())
}

/// Ensure a setting exists with the specified default value
async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    let value: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;

    match value {
        None => {
            // INSERT OR IGNORE: two services may initialize the same file
            sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
                .bind(key)
                .bind(default_value)
                .execute(pool)
                .await?;
            info!("Initialized setting '{}' with default value: {}", key, default_value);
        }
        Some(None) => {
            set_setting(pool, key, default_value).await?;
            warn!("Setting '{}' was NULL, reset to default: {}", key, default_value);
        }
        Some(Some(_)) => {}
    }

    Ok(())
}

/// Read a setting value
pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let value: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;
    Ok(value.flatten())
}

/// Insert or replace a setting value
pub async fn set_setting(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

/// Load calculator defaults, falling back to built-ins on unparsable values
pub async fn load_calculator_defaults(pool: &SqlitePool) -> Result<CalculatorDefaults> {
    let builtin = CalculatorDefaults::default();

    Ok(CalculatorDefaults {
        overhead_rate: parse_rate(pool, KEY_OVERHEAD_RATE, builtin.overhead_rate).await?,
        profit_rate: parse_rate(pool, KEY_PROFIT_RATE, builtin.profit_rate).await?,
        vat_rate: parse_rate(pool, KEY_VAT_RATE, builtin.vat_rate).await?,
        include_vat: match get_setting(pool, KEY_INCLUDE_VAT).await? {
            Some(v) => v.trim().parse::<bool>().unwrap_or(builtin.include_vat),
            None => builtin.include_vat,
        },
    })
}

async fn parse_rate(pool: &SqlitePool, key: &str, default: f64) -> Result<f64> {
    match get_setting(pool, key).await? {
        Some(raw) => match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
            _ => {
                warn!("Setting '{}' has invalid value '{}', using {}", key, raw, default);
                Ok(default)
            }
        },
        None => Ok(default),
    }
}

/// Load the token signing secret, generating and storing one if missing
pub async fn load_or_create_jwt_secret(pool: &SqlitePool) -> Result<String> {
    if let Some(secret) = get_setting(pool, KEY_JWT_SECRET).await? {
        if !secret.trim().is_empty() {
            return Ok(secret);
        }
    }

    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    let secret: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();

    set_setting(pool, KEY_JWT_SECRET, &secret).await?;
    info!("Generated new token signing secret");

    Ok(secret)
}
