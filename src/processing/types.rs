//! Core data types and error definitions for the processing pipeline.

use crate::extraction::TextSource;
use crate::store::StoreError;
use serde::Serialize;
use thiserror::Error;

/// Errors produced while validating chunking parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkingError {
    /// Ingestion configured an impossible chunk size.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
    /// Overlap would swallow the whole chunk.
    #[error("chunk overlap ({overlap}) must be smaller than the chunk size ({max_size})")]
    OverlapTooLarge {
        /// Requested overlap in characters.
        overlap: usize,
        /// Requested maximum chunk size in characters.
        max_size: usize,
    },
}

/// Reasons an upload is rejected before processing starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    /// No file content was supplied.
    #[error("No file provided")]
    MissingFile,
    /// The declared MIME type is not `application/pdf`.
    #[error("Only PDF files are supported (got {0})")]
    UnsupportedType(String),
    /// The file exceeds the configured size limit.
    #[error("File size must be less than {limit} bytes (got {size})")]
    TooLarge {
        /// Size of the rejected upload in bytes.
        size: usize,
        /// Configured limit in bytes.
        limit: usize,
    },
}

/// Errors emitted by the document processing pipeline.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// Upload failed validation.
    #[error("Invalid upload: {0}")]
    Upload(#[from] UploadError),
    /// Storage collaborator rejected a read or write.
    #[error("Document store request failed: {0}")]
    Store(#[from] StoreError),
    /// The blocking extraction task was cancelled or panicked.
    #[error("Processing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Validated chunk size and overlap, both measured in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkParams {
    max_size: usize,
    overlap: usize,
}

impl ChunkParams {
    /// Default maximum characters per chunk.
    pub const DEFAULT_MAX_SIZE: usize = 1000;
    /// Default characters carried over between adjacent chunks.
    pub const DEFAULT_OVERLAP: usize = 200;

    /// Validate a chunk size and overlap pair.
    pub fn new(max_size: usize, overlap: usize) -> Result<Self, ChunkingError> {
        if max_size == 0 {
            return Err(ChunkingError::InvalidChunkSize);
        }
        if overlap >= max_size {
            return Err(ChunkingError::OverlapTooLarge { overlap, max_size });
        }
        Ok(Self { max_size, overlap })
    }

    /// Maximum characters per chunk.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Requested overlap in characters.
    pub fn overlap(&self) -> usize {
        self.overlap
    }
}

impl Default for ChunkParams {
    fn default() -> Self {
        Self {
            max_size: Self::DEFAULT_MAX_SIZE,
            overlap: Self::DEFAULT_OVERLAP,
        }
    }
}

/// A bounded span of document text emitted by the chunker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// 0-based position in emission order.
    pub index: usize,
    /// Chunk text.
    pub content: String,
    /// Character count of `content`.
    pub length: usize,
}

impl Chunk {
    pub(crate) fn new(index: usize, content: String) -> Self {
        let length = content.chars().count();
        Self {
            index,
            content,
            length,
        }
    }
}

/// Raw upload handed to [`crate::processing::ProcessingService::submit`].
#[derive(Debug, Clone, Default)]
pub struct Upload {
    /// Original file name, used for the title fallback and stored extension.
    pub filename: String,
    /// Optional user-facing title.
    pub title: Option<String>,
    /// Declared MIME type.
    pub mime_type: String,
    /// File content.
    pub bytes: Vec<u8>,
}

/// Summary of a finished processing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcessingOutcome {
    /// Number of chunks persisted for the document.
    pub chunk_count: usize,
    /// Recovery path that produced the chunked text.
    pub source: TextSource,
}
