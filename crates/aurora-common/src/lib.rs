//! Aurora Common - Shared data model and utilities
//!
//! This crate provides the error type, configuration and secrets,
//! the stored data model, default content and small helpers used
//! across all Aurora components.

pub mod config;
pub mod constants;
pub mod defaults;
pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::{AppConfig, CloudflareKvCredentials, EnvSecrets, KvCredentials, VercelKvCredentials};
pub use constants::*;
pub use error::{AuroraError, Result};
pub use types::*;
pub use utils::*;
