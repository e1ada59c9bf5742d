//! Storage and persistence seam for uploaded documents and their chunks.

mod memory;
pub mod types;

pub use memory::MemoryStore;
pub use types::{
    ChunkRecord, DocumentRecord, NewDocument, ProcessingStatus, StatusUpdate, StoreError,
};

use async_trait::async_trait;
use uuid::Uuid;

/// File storage plus document/chunk persistence used by the processing pipeline.
///
/// Implementations must tolerate concurrent `insert_chunk` calls for the same document.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store raw file content under `path`.
    async fn put_file(&self, path: &str, bytes: Vec<u8>) -> Result<(), StoreError>;

    /// Read back raw file content.
    async fn fetch_file(&self, path: &str) -> Result<Vec<u8>, StoreError>;

    /// Delete stored file content.
    async fn remove_file(&self, path: &str) -> Result<(), StoreError>;

    /// Create a document record in the `pending` state.
    async fn create_document(&self, document: NewDocument) -> Result<DocumentRecord, StoreError>;

    /// Apply a status transition to a document.
    async fn update_status(&self, id: Uuid, update: StatusUpdate) -> Result<(), StoreError>;

    /// Persist a single chunk.
    async fn insert_chunk(&self, chunk: ChunkRecord) -> Result<(), StoreError>;

    /// Load a document record.
    async fn get_document(&self, id: Uuid) -> Result<DocumentRecord, StoreError>;

    /// Load all chunks of a document ordered by `chunk_index`.
    async fn list_chunks(&self, id: Uuid) -> Result<Vec<ChunkRecord>, StoreError>;
}
