//! # CallScore Common Library
//!
//! Shared code for the CallScore services including:
//! - Database initialization and record models
//! - Configuration loading (root folder, TOML file, model settings)
//! - Password hashing and session tokens
//! - Utility functions

pub mod api;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
