//! HTTP API handlers

pub mod analytics;
pub mod auth;
pub mod chat;
pub mod health;
pub mod meetings;
pub mod transcripts;

pub use analytics::meeting_analytics;
pub use auth::{auth_middleware, login, logout, signup, Identity};
pub use chat::analytics_chat;
pub use health::health_routes;
pub use meetings::list_meetings;
pub use transcripts::{list_transcripts, submit_transcript};
