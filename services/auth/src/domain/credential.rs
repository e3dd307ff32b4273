//! Secrets handed to the user during a magic link login.

use rand::RngExt;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Random link token. Sent to the user once and never stored.
pub fn generate_token() -> String {
    Uuid::new_v4().to_string()
}

/// Hex SHA-256 of a link token, the only form persisted.
pub fn hash_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

/// Numeric one-time code of `len` digits, leading zeros allowed.
pub fn generate_otp(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

/// Lowercase and trim an address before it is stored or compared.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Local part of an address, used as the initial display name.
pub fn display_name_from_email(email: &str) -> Option<String> {
    email
        .split_once('@')
        .map(|(local, _)| local)
        .filter(|local| !local.is_empty())
        .map(str::to_owned)
}
