//! Error types for ash-core
//!
//! Provides standardized error handling across both subsystems.

use thiserror::Error;

use crate::extensions::ExtensionError;

/// Errors that can occur in ash-core
#[derive(Debug, Error)]
pub enum AshError {
    /// Extension context or request errors
    #[error(transparent)]
    Extension(#[from] ExtensionError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("Config serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Result type alias for ash-core operations
pub type AshResult<T> = Result<T, AshError>;
