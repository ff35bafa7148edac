//! Credentials, roles and session tokens
//!
//! # Pure Functions
//!
//! This module contains ONLY pure functions. Storage of users and sessions
//! and the HTTP middleware that consumes them live in the service crate.
//!
//! Passwords are stored as a hex PBKDF2-HMAC-SHA256 key next to a random
//! per-user salt.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use std::str::FromStr;

/// Length of the random salt in bytes
const SALT_LEN: usize = 16;

/// PBKDF2 rounds per password derivation
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Length of the derived key in bytes
const KEY_LEN: usize = 32;

/// Length of a session token in bytes (256 bits)
const TOKEN_LEN: usize = 32;

/// Role attached to a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// Salted password digest as stored in the `users` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash {
    pub hash: String,
    pub salt: String,
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    to_hex(&bytes)
}

fn derive(salt: &str, password: &str) -> String {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), PBKDF2_ITERATIONS, &mut key);
    to_hex(&key)
}

/// Hash a password with a freshly generated salt
pub fn hash_password(password: &str) -> PasswordHash {
    let salt = random_hex(SALT_LEN);
    let hash = derive(&salt, password);
    PasswordHash { hash, salt }
}

/// Check a candidate password against a stored digest
pub fn verify_password(password: &str, stored: &PasswordHash) -> bool {
    let candidate = derive(&stored.salt, password);
    // Length is fixed (64 hex chars); compare without early exit
    candidate.len() == stored.hash.len()
        && candidate
            .bytes()
            .zip(stored.hash.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

/// Generate an opaque bearer token for a new session
pub fn generate_session_token() -> String {
    random_hex(TOKEN_LEN)
}
