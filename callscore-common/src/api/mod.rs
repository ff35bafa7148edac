//! API support shared by CallScore services
//!
//! Framework-independent pieces only; HTTP wiring lives in the service crates.

pub mod auth;

pub use auth::{generate_session_token, hash_password, verify_password, PasswordHash, Role};
