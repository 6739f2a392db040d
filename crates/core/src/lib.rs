//! Core types shared across the ScopeRAG workspace.
//!
//! Provides the unified error type, application configuration, and
//! logging initialization.

pub mod config;
pub mod error;
pub mod logging;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
