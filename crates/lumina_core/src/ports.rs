//! crates/lumina_core/src/ports.rs
//!
//! Defines the service contracts (traits) at the edge of the core.
//! These traits let the core stay independent of where documents are stored,
//! how uploaded files are parsed and which online catalogue is searched.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (file system, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Collaborator Data Shapes
//=========================================================================================

/// Metadata pulled out of an uploaded document (PDF outline, EPUB OPF/NCX).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub page_count: Option<u32>,
    /// Flattened table of contents, in reading order.
    pub chapter_titles: Vec<String>,
}

/// One candidate returned by an online book search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct SearchCandidate {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub page_count: Option<u32>,
    /// May contain HTML markup.
    pub description: Option<String>,
    /// Free-text category, e.g. `Fiction / Fantasy / Epic`.
    pub genre_hint: Option<String>,
    pub cover_url: Option<String>,
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Durable key-value storage holding one serialized document per key.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the raw document stored under `key`, if any.
    async fn get(&self, key: &str) -> PortResult<Option<String>>;

    /// Replaces the whole document stored under `key`.
    async fn set(&self, key: &str, value: &str) -> PortResult<()>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> PortResult<()>;
}

#[async_trait]
pub trait MetadataExtractor: Send + Sync {
    /// Extracts what it can from a document's bytes. `None` means the format
    /// is recognised but carries no usable metadata.
    async fn extract(&self, file_name: &str, data: &[u8]) -> PortResult<Option<DocumentMetadata>>;
}

#[async_trait]
pub trait BookSearchClient: Send + Sync {
    /// Looks up candidate books for a free-text query, best match first.
    async fn search(&self, query: &str) -> PortResult<Vec<SearchCandidate>>;
}
