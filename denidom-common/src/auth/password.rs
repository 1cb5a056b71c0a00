//! Password hashing
//!
//! Stored as two hex columns (`password_hash`, `password_salt`). The digest is
//! SHA-256 over salt + password, re-hashed [`ITERATIONS`] times with the salt
//! mixed into every round.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of SHA-256 rounds
pub const ITERATIONS: u32 = 10_000;

/// Hex-encoded hash and salt pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash {
    pub hash: String,
    pub salt: String,
}

/// Hash a password with a fresh random 16-byte salt
pub fn hash_password(password: &str) -> PasswordHash {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt = to_hex(&salt_bytes);
    let hash = derive(password, &salt);
    PasswordHash { hash, salt }
}

/// Check a password against a stored hash/salt pair
///
/// Empty stored hashes never verify.
pub fn verify_password(password: &str, stored_hash: &str, salt: &str) -> bool {
    if stored_hash.is_empty() {
        return false;
    }
    let calculated = derive(password, salt);
    constant_time_eq(calculated.as_bytes(), stored_hash.as_bytes())
}

fn derive(password: &str, salt: &str) -> String {
    let mut digest = Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(password.as_bytes())
        .finalize();

    for _ in 1..ITERATIONS {
        digest = Sha256::new()
            .chain_update(digest)
            .chain_update(salt.as_bytes())
            .finalize();
    }

    format!("{:x}", digest)
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
