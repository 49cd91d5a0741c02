//! Error types for the extension system.

use thiserror::Error;

use super::registry::ContextId;

/// Why the permission gate refused a call. The messages are shown to
/// extension authors and are stable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessDenied {
    #[error("Not in an extension.")]
    NotInExtension,

    #[error(
        "You do not have permission to use '{function}'. Be sure to declare in your manifest what permissions you need."
    )]
    MissingPermission { function: String },

    #[error("{function} can only be used in an extension process.")]
    PrivilegedOnly { function: String },

    #[error("{function} cannot be used within a sandboxed frame.")]
    SandboxedFrame { function: String },
}

/// Errors that can occur in the extension system.
#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error("Extension '{0}' not found")]
    ExtensionNotFound(String),

    #[error("Invalid manifest for '{id}': {message}")]
    ManifestInvalid { id: String, message: String },

    #[error("Script context {0} is not live")]
    ContextNotFound(ContextId),

    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    #[error("IPC error: {0}")]
    Ipc(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for extension operations.
pub type ExtensionResult<T> = Result<T, ExtensionError>;
