//! Timestamp utilities

use chrono::{DateTime, NaiveDate, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current time as Unix seconds (JWT `iat`/`exp` unit)
pub fn unix_seconds() -> i64 {
    Utc::now().timestamp()
}

/// Format a date the way Russian report forms print it (DD.MM.YYYY)
pub fn format_ru_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}
