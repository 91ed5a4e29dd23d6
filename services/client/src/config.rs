//! services/client/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The
//! `.env` file is used for local development.

use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the application's own REST API, e.g.
    /// `http://localhost:5001/api`.
    pub backend_base_url: String,
    /// Base URL of the identity provider's token endpoints.
    pub identity_base_url: String,
    pub identity_api_key: String,
    pub generative_api_key: Option<String>,
    pub generative_model: String,
    /// Directory holding the client-local storage files.
    pub storage_dir: PathBuf,
    pub log_level: Level,
    /// Uniform timeout applied to every backend request.
    pub request_timeout_ms: u64,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for
    /// development, but this is skipped in test environments to ensure
    /// tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let backend_base_url = std::env::var("BACKEND_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:5001/api".to_string());

        let identity_base_url = std::env::var("IDENTITY_BASE_URL")
            .unwrap_or_else(|_| "https://identitytoolkit.googleapis.com/v1".to_string());

        let identity_api_key = std::env::var("IDENTITY_API_KEY")
            .map_err(|_| ConfigError::MissingVar("IDENTITY_API_KEY".to_string()))?;

        let generative_api_key = std::env::var("GENERATIVE_API_KEY").ok();
        let generative_model =
            std::env::var("GENERATIVE_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let storage_dir = std::env::var("STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./local-storage"));

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let timeout_str =
            std::env::var("REQUEST_TIMEOUT_MS").unwrap_or_else(|_| "3000".to_string());
        let request_timeout_ms = timeout_str.parse::<u64>().map_err(|e| {
            ConfigError::InvalidValue("REQUEST_TIMEOUT_MS".to_string(), e.to_string())
        })?;

        Ok(Self {
            backend_base_url,
            identity_base_url,
            identity_api_key,
            generative_api_key,
            generative_model,
            storage_dir,
            log_level,
            request_timeout_ms,
        })
    }
}
