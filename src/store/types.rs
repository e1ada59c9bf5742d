//! Records exchanged with the document store.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// Errors returned by a [`crate::store::DocumentStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// No file is stored under the requested path.
    #[error("File not found: {0}")]
    FileNotFound(String),
    /// No document record exists with the requested identifier.
    #[error("Document not found: {0}")]
    DocumentNotFound(Uuid),
    /// Backend-specific failure.
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Processing lifecycle of a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    /// Accepted, waiting for the background task.
    Pending,
    /// Extraction and chunking in progress.
    Processing,
    /// All chunks persisted.
    Completed,
    /// Processing aborted; see `processing_error`.
    Failed,
}

/// Fields supplied when creating a document record.
#[derive(Debug, Clone)]
pub struct NewDocument {
    /// User-facing title.
    pub title: String,
    /// Original file name.
    pub filename: String,
    /// Location of the stored file.
    pub storage_path: String,
    /// File size in bytes.
    pub file_size: usize,
    /// Declared MIME type.
    pub mime_type: String,
}

/// Stored document metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentRecord {
    /// Identifier assigned by the store.
    pub id: Uuid,
    /// User-facing title.
    pub title: String,
    /// Original file name.
    pub filename: String,
    /// Location of the stored file.
    pub storage_path: String,
    /// File size in bytes.
    pub file_size: usize,
    /// Declared MIME type.
    pub mime_type: String,
    /// Current lifecycle state.
    pub processing_status: ProcessingStatus,
    /// Number of persisted chunks once completed.
    pub chunk_count: Option<usize>,
    /// Failure description once failed.
    pub processing_error: Option<String>,
    /// Creation time, RFC 3339.
    pub created_at: String,
    /// Last status change, RFC 3339.
    pub updated_at: String,
}

/// Status transition applied through [`crate::store::DocumentStore::update_status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    /// New lifecycle state.
    pub status: ProcessingStatus,
    /// Chunk count to record, if any.
    pub chunk_count: Option<usize>,
    /// Failure description to record, if any.
    pub error: Option<String>,
}

impl StatusUpdate {
    /// Move to `processing`.
    pub fn processing() -> Self {
        Self {
            status: ProcessingStatus::Processing,
            chunk_count: None,
            error: None,
        }
    }

    /// Move to `completed` with the persisted chunk count.
    pub fn completed(chunk_count: usize) -> Self {
        Self {
            status: ProcessingStatus::Completed,
            chunk_count: Some(chunk_count),
            error: None,
        }
    }

    /// Move to `failed` with a human-readable reason.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: ProcessingStatus::Failed,
            chunk_count: None,
            error: Some(error.into()),
        }
    }
}

/// A chunk persisted against its parent document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkRecord {
    /// Parent document.
    pub document_id: Uuid,
    /// Position of the chunk within the document.
    pub chunk_index: usize,
    /// Chunk text.
    pub content: String,
    /// Application-defined payload, currently `{"chunk_size": <chars>}`.
    pub metadata: Value,
}

/// Current timestamp formatted for record storage.
pub(crate) fn current_timestamp_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
