//! Password hashing and strength rules for staff accounts.
//!
//! Hashes are Argon2id in PHC string format with a random per-password salt.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use std::collections::HashMap;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Similarity ratio at or above which a password is rejected as too close to
/// a personal attribute.
pub const MAX_SIMILARITY: f64 = 0.7;

/// Frequently used passwords that are always rejected (compared lowercase).
const COMMON_PASSWORDS: &[&str] = &[
    "123456", "123456789", "12345678", "password", "qwerty", "qwerty123", "1q2w3e4r",
    "111111", "1234567890", "1234567", "password1", "password123", "abc123", "iloveyou",
    "000000", "123123", "admin", "admin123", "welcome", "welcome1", "letmein", "monkey",
    "dragon", "football", "baseball", "sunshine", "princess", "master", "shadow",
    "superman", "trustno1", "passw0rd", "p@ssw0rd", "qwertyuiop", "asdfghjkl",
    "zaq12wsx", "changeme", "secret", "whatever", "starwars", "hello123", "freedom",
    "computer", "michelle", "jennifer", "mustang", "access", "internet", "museum",
    "artscope", "picasso", "monalisa",
];

/// Error raised when hashing fails.
#[derive(Debug, thiserror::Error)]
#[error("Password hashing failed: {0}")]
pub struct PasswordHashError(String);

/// Hash a password for storage.
pub fn hash_password(password: &str) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordHashError(e.to_string()))
}

/// Check a password against a stored hash. Malformed hashes never verify.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// [`hash_password`] on the blocking thread pool.
pub async fn hash_password_async(password: String) -> Result<String, PasswordHashError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| PasswordHashError(format!("Task join error: {}", e)))?
}

/// [`verify_password`] on the blocking thread pool. A failed task never
/// verifies.
pub async fn verify_password_async(password: String, stored_hash: String) -> bool {
    match tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash)).await {
        Ok(verified) => verified,
        Err(e) => {
            tracing::error!("Password verification task failed: {}", e);
            false
        }
    }
}

/// Personal attributes a password must not resemble.
#[derive(Debug, Clone, Default)]
pub struct UserAttributes<'a> {
    pub username: Option<&'a str>,
    pub email: Option<&'a str>,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
}

impl<'a> UserAttributes<'a> {
    fn labelled(&self) -> [(&'static str, Option<&'a str>); 4] {
        [
            ("username", self.username),
            ("email address", self.email),
            ("first name", self.first_name),
            ("last name", self.last_name),
        ]
    }
}

/// Run every strength rule and return the messages of those that fail.
pub fn validate_password(password: &str, user: &UserAttributes<'_>) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(message) = similarity_error(password, user) {
        errors.push(message);
    }
    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        errors.push(format!(
            "This password is too short. It must contain at least {} characters.",
            MIN_PASSWORD_LENGTH
        ));
    }
    if COMMON_PASSWORDS.contains(&password.trim().to_lowercase().as_str()) {
        errors.push("This password is too common.".to_string());
    }
    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        errors.push("This password is entirely numeric.".to_string());
    }
    errors
}

fn similarity_error(password: &str, user: &UserAttributes<'_>) -> Option<String> {
    let password = password.to_lowercase();
    for (label, value) in user.labelled() {
        let Some(value) = value.filter(|v| !v.is_empty()) else {
            continue;
        };
        if exceeds_maximum_length_ratio(&password, value) {
            continue;
        }
        let parts = value
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|p| !p.is_empty())
            .chain(std::iter::once(value));
        for part in parts {
            if quick_ratio(&password, &part.to_lowercase()) >= MAX_SIMILARITY {
                return Some(format!("The password is too similar to the {}.", label));
            }
        }
    }
    None
}

/// A password ten times longer than a short attribute cannot be "similar"
/// to it in any meaningful way, so the comparison is skipped.
fn exceeds_maximum_length_ratio(password: &str, value: &str) -> bool {
    let password_len = password.chars().count();
    let value_len = value.chars().count();
    let length_bound_similarity = MAX_SIMILARITY / 2.0 * password_len as f64;
    password_len >= 10 * value_len && (value_len as f64) < length_bound_similarity
}

/// Upper bound of the matching-blocks similarity ratio: twice the size of the
/// character multiset intersection over the total length.
fn quick_ratio(a: &str, b: &str) -> f64 {
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 1.0;
    }
    let mut available: HashMap<char, usize> = HashMap::new();
    for c in b.chars() {
        *available.entry(c).or_default() += 1;
    }
    let mut matches = 0usize;
    for c in a.chars() {
        if let Some(count) = available.get_mut(&c) {
            if *count > 0 {
                *count -= 1;
                matches += 1;
            }
        }
    }
    2.0 * matches as f64 / total as f64
}
