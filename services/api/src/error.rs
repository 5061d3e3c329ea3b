//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service, and how core
//! errors are turned into HTTP responses.

use crate::config::ConfigError;
use axum::http::StatusCode;
use lumina_core::error::LibraryError;
use lumina_core::ports::PortError;
use tracing::error;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A rejected library operation.
    #[error("Library error: {0}")]
    Library(#[from] LibraryError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// The `(status, message)` pair every handler returns on failure.
pub type HandlerError = (StatusCode, String);

/// Maps a core error to its HTTP status. Storage failures are logged and
/// reported without their details.
pub fn to_http(e: LibraryError) -> HandlerError {
    match e {
        LibraryError::Validation(_) | LibraryError::ImportFormat(_) => {
            (StatusCode::BAD_REQUEST, e.to_string())
        }
        LibraryError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
        LibraryError::Port(_) => {
            error!("Storage failure: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to save library data".to_string(),
            )
        }
    }
}

pub fn book_not_found(id: uuid::Uuid) -> HandlerError {
    (StatusCode::NOT_FOUND, format!("No book with id {}", id))
}
