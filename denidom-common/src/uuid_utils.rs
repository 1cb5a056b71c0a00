//! UUID utilities
//!
//! Entity ids are stored as TEXT; these helpers keep generation and parsing
//! in one place.

use uuid::Uuid;

/// Generate a new UUIDv4 as its hyphenated string form
pub fn generate() -> String {
    Uuid::new_v4().to_string()
}

/// Parse UUID from string
pub fn parse(s: &str) -> Result<Uuid, uuid::Error> {
    Uuid::parse_str(s)
}

/// True if the string is a well-formed UUID
pub fn is_valid(s: &str) -> bool {
    parse(s).is_ok()
}
