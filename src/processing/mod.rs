//! Document processing pipeline: upload validation, chunking, and persistence orchestration.

pub mod chunking;
mod service;
pub mod types;
pub mod validate;

pub use chunking::{MIN_CHUNK_CHARS, chunk, chunk_text};
pub use service::{ProcessingService, ProcessingSettings, Submission, extract_and_chunk};
pub use types::{
    Chunk, ChunkParams, ChunkingError, ProcessingError, ProcessingOutcome, Upload, UploadError,
};
