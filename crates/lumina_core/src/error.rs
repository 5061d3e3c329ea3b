//! crates/lumina_core/src/error.rs
//!
//! The error type returned by the core's stores and engines.

use crate::ports::PortError;

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    /// Bad input: an empty required field, an out-of-range page or chapter,
    /// or a status transition the state machine does not allow.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// An import document was rejected as a whole; nothing was written.
    #[error("Import format error: {0}")]
    ImportFormat(String),

    /// The storage port refused a write.
    #[error("Storage error: {0}")]
    Port(#[from] PortError),
}

pub type LibraryResult<T> = Result<T, LibraryError>;
