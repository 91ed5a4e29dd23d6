//! services/client/src/error.rs
//!
//! Defines the primary error type for the `client` service crate.

use access_hub_core::ports::{PortError, ProviderError};

use crate::config::ConfigError;

/// The primary error type for the `client` crate.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error reported by the identity provider.
    #[error("Identity Provider Error: {0}")]
    Provider(#[from] ProviderError),

    /// Represents a standard Input/Output error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
