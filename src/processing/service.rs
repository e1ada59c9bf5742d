//! Processing service coordinating upload validation, extraction, chunking, and persistence.

use crate::{
    config::Config,
    extraction::{self, TextSource},
    metrics::{IngestMetrics, MetricsSnapshot},
    processing::{
        chunking::chunk_text,
        types::{Chunk, ChunkParams, ProcessingError, ProcessingOutcome, Upload},
        validate::{DEFAULT_MAX_UPLOAD_BYTES, resolve_title, storage_path_for, validate_upload},
    },
    store::{ChunkRecord, DocumentRecord, DocumentStore, NewDocument, StatusUpdate},
};
use futures_util::future::try_join_all;
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Tunables applied to every processed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingSettings {
    /// Chunk size and overlap.
    pub chunk_params: ChunkParams,
    /// Largest accepted upload in bytes.
    pub max_upload_bytes: usize,
}

impl ProcessingSettings {
    /// Derive settings from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            chunk_params: config.chunk_params,
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            chunk_params: ChunkParams::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Accepted upload plus the handle of its background processing task.
pub struct Submission {
    /// Document record in the `pending` state.
    pub document: DocumentRecord,
    /// Resolves once processing reached `completed` or `failed`.
    pub task: JoinHandle<Result<ProcessingOutcome, ProcessingError>>,
}

/// Coordinates the ingestion pipeline: upload checks, text extraction, chunking, and writes.
///
/// The service owns a shared handle to the document store and the metrics registry. Cloning is
/// cheap, which lets each accepted upload move a copy into its own background task.
pub struct ProcessingService<S> {
    store: Arc<S>,
    settings: ProcessingSettings,
    metrics: Arc<IngestMetrics>,
}

impl<S> Clone for ProcessingService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            settings: self.settings,
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<S> ProcessingService<S>
where
    S: DocumentStore + 'static,
{
    /// Build a processing service on top of a document store.
    pub fn new(store: Arc<S>, settings: ProcessingSettings) -> Self {
        tracing::debug!(
            max_size = settings.chunk_params.max_size(),
            overlap = settings.chunk_params.overlap(),
            max_upload_bytes = settings.max_upload_bytes,
            "Initializing processing service"
        );
        Self {
            store,
            settings,
            metrics: Arc::new(IngestMetrics::new()),
        }
    }

    /// Validate and store an upload, then process it in the background.
    ///
    /// Returns as soon as the document record exists; the record is `pending` at that point.
    /// If the record cannot be created, the stored file is removed again.
    pub async fn submit(&self, upload: Upload) -> Result<Submission, ProcessingError> {
        validate_upload(&upload, self.settings.max_upload_bytes)?;
        let Upload {
            filename,
            title,
            mime_type,
            bytes,
        } = upload;

        let storage_path = storage_path_for(&filename);
        let file_size = bytes.len();
        self.store.put_file(&storage_path, bytes).await?;

        let new_document = NewDocument {
            title: resolve_title(title, &filename),
            filename,
            storage_path: storage_path.clone(),
            file_size,
            mime_type,
        };
        let document = match self.store.create_document(new_document).await {
            Ok(document) => document,
            Err(error) => {
                if let Err(cleanup) = self.store.remove_file(&storage_path).await {
                    tracing::warn!(
                        path = %storage_path,
                        error = %cleanup,
                        "Failed to remove orphaned upload"
                    );
                }
                return Err(error.into());
            }
        };

        tracing::info!(
            document_id = %document.id,
            filename = %document.filename,
            file_size,
            "Document accepted; processing in background"
        );

        let service = self.clone();
        let document_id = document.id;
        let task = tokio::spawn(async move {
            service
                .process_document(document_id, &storage_path)
                .await
        });

        Ok(Submission { document, task })
    }

    /// Process a stored document to a terminal status.
    ///
    /// On error the document is marked `failed` with the error message before the error is
    /// returned.
    pub async fn process_document(
        &self,
        document_id: Uuid,
        storage_path: &str,
    ) -> Result<ProcessingOutcome, ProcessingError> {
        match self.run(document_id, storage_path).await {
            Ok(outcome) => {
                self.metrics
                    .record_completed(outcome.chunk_count as u64, outcome.source.is_sentinel());
                tracing::info!(
                    document_id = %document_id,
                    chunks = outcome.chunk_count,
                    source = ?outcome.source,
                    "Document processed"
                );
                Ok(outcome)
            }
            Err(error) => {
                self.metrics.record_failed();
                tracing::error!(
                    document_id = %document_id,
                    error = %error,
                    "Document processing failed"
                );
                let update = StatusUpdate::failed(error.to_string());
                if let Err(status_error) = self.store.update_status(document_id, update).await {
                    tracing::warn!(
                        document_id = %document_id,
                        error = %status_error,
                        "Failed to record processing failure"
                    );
                }
                Err(error)
            }
        }
    }

    async fn run(
        &self,
        document_id: Uuid,
        storage_path: &str,
    ) -> Result<ProcessingOutcome, ProcessingError> {
        self.store
            .update_status(document_id, StatusUpdate::processing())
            .await?;
        let bytes = self.store.fetch_file(storage_path).await?;

        let params = self.settings.chunk_params;
        let (source, chunks) =
            tokio::task::spawn_blocking(move || extract_and_chunk(&bytes, params)).await?;
        let chunk_count = chunks.len();

        try_join_all(
            chunks
                .into_iter()
                .map(|chunk| self.store.insert_chunk(chunk_record(document_id, chunk))),
        )
        .await?;

        self.store
            .update_status(document_id, StatusUpdate::completed(chunk_count))
            .await?;

        Ok(ProcessingOutcome {
            chunk_count,
            source,
        })
    }

    /// Return the current ingestion metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

/// Run the synchronous core: extract text from raw bytes, then chunk it.
pub fn extract_and_chunk(bytes: &[u8], params: ChunkParams) -> (TextSource, Vec<Chunk>) {
    let extracted = extraction::extract_text(bytes);
    let chunks = chunk_text(extracted.as_str(), params);
    (extracted.source(), chunks)
}

fn chunk_record(document_id: Uuid, chunk: Chunk) -> ChunkRecord {
    let Chunk {
        index,
        content,
        length,
    } = chunk;
    ChunkRecord {
        document_id,
        chunk_index: index,
        content,
        metadata: json!({ "chunk_size": length }),
    }
}
