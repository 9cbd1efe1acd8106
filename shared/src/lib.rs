//! Shared configuration and utilities for the Gatekeep token engine
//!
//! This crate provides common functionality used across all workspace members:
//! - Configuration types loaded from the environment
//! - Logging initialisation
//! - Validation helpers for token request fields

pub mod config;
pub mod logging;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AccessTokenConfig, AppConfig, CacheConfig, Environment, LogFormat, LoggingConfig,
};
pub use logging::init_tracing;
pub use utils::validation;
