//! Shared domain types and configuration for the stormwatch workspace.

pub mod app_config;
pub mod config;
pub mod locations;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use locations::{Location, StatusCategory, StoreStatus};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
