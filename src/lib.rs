//! Vortex Backend Library
//!
//! Live match watcher: detects score and status changes between observations of
//! each fixture and pushes them to Telegram and WebSocket subscribers.

pub mod config;
pub mod database;
pub mod detector;
pub mod error;
pub mod health;
pub mod models;
pub mod repositories;
pub mod services;
pub mod websocket;

// Re-export commonly used types
pub use config::AppConfig;
pub use detector::{ChangeDetector, DetectorConfig};
pub use error::{AppError, AppResult};
