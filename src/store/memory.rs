//! In-process [`DocumentStore`] backed by hash maps.

use super::{
    ChunkRecord, DocumentRecord, DocumentStore, NewDocument, ProcessingStatus, StatusUpdate,
    StoreError, types::current_timestamp_rfc3339,
};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Volatile store used by the CLI and tests.
#[derive(Default)]
pub struct MemoryStore {
    files: RwLock<HashMap<String, Vec<u8>>>,
    documents: RwLock<HashMap<Uuid, DocumentRecord>>,
    chunks: RwLock<Vec<ChunkRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn put_file(&self, path: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        self.files.write().await.insert(path.to_string(), bytes);
        Ok(())
    }

    async fn fetch_file(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        self.files
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::FileNotFound(path.to_string()))
    }

    async fn remove_file(&self, path: &str) -> Result<(), StoreError> {
        self.files
            .write()
            .await
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| StoreError::FileNotFound(path.to_string()))
    }

    async fn create_document(&self, document: NewDocument) -> Result<DocumentRecord, StoreError> {
        let NewDocument {
            title,
            filename,
            storage_path,
            file_size,
            mime_type,
        } = document;
        let now = current_timestamp_rfc3339();
        let record = DocumentRecord {
            id: Uuid::new_v4(),
            title,
            filename,
            storage_path,
            file_size,
            mime_type,
            processing_status: ProcessingStatus::Pending,
            chunk_count: None,
            processing_error: None,
            created_at: now.clone(),
            updated_at: now,
        };
        self.documents
            .write()
            .await
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_status(&self, id: Uuid, update: StatusUpdate) -> Result<(), StoreError> {
        let mut documents = self.documents.write().await;
        let record = documents
            .get_mut(&id)
            .ok_or(StoreError::DocumentNotFound(id))?;
        record.processing_status = update.status;
        if update.chunk_count.is_some() {
            record.chunk_count = update.chunk_count;
        }
        if update.error.is_some() {
            record.processing_error = update.error;
        }
        record.updated_at = current_timestamp_rfc3339();
        Ok(())
    }

    async fn insert_chunk(&self, chunk: ChunkRecord) -> Result<(), StoreError> {
        if !self.documents.read().await.contains_key(&chunk.document_id) {
            return Err(StoreError::DocumentNotFound(chunk.document_id));
        }
        self.chunks.write().await.push(chunk);
        Ok(())
    }

    async fn get_document(&self, id: Uuid) -> Result<DocumentRecord, StoreError> {
        self.documents
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::DocumentNotFound(id))
    }

    async fn list_chunks(&self, id: Uuid) -> Result<Vec<ChunkRecord>, StoreError> {
        let mut chunks: Vec<ChunkRecord> = self
            .chunks
            .read()
            .await
            .iter()
            .filter(|chunk| chunk.document_id == id)
            .cloned()
            .collect();
        chunks.sort_by_key(|chunk| chunk.chunk_index);
        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_document() -> NewDocument {
        NewDocument {
            title: "Report".into(),
            filename: "report.pdf".into(),
            storage_path: "documents/report.pdf".into(),
            file_size: 3,
            mime_type: "application/pdf".into(),
        }
    }

    #[tokio::test]
    async fn files_round_trip_and_remove() {
        let store = MemoryStore::new();
        store.put_file("documents/a.pdf", vec![1, 2, 3]).await.unwrap();
        assert_eq!(store.fetch_file("documents/a.pdf").await.unwrap(), vec![1, 2, 3]);
        store.remove_file("documents/a.pdf").await.unwrap();
        assert!(matches!(
            store.fetch_file("documents/a.pdf").await,
            Err(StoreError::FileNotFound(_))
        ));
    }

    #[tokio::test]
    async fn status_updates_keep_previous_fields() {
        let store = MemoryStore::new();
        let record = store.create_document(new_document()).await.unwrap();
        assert_eq!(record.processing_status, ProcessingStatus::Pending);

        store
            .update_status(record.id, StatusUpdate::completed(4))
            .await
            .unwrap();
        store
            .update_status(record.id, StatusUpdate::processing())
            .await
            .unwrap();

        let stored = store.get_document(record.id).await.unwrap();
        assert_eq!(stored.processing_status, ProcessingStatus::Processing);
        assert_eq!(stored.chunk_count, Some(4));
    }

    #[tokio::test]
    async fn chunks_are_listed_in_index_order() {
        let store = MemoryStore::new();
        let record = store.create_document(new_document()).await.unwrap();
        for index in [2usize, 0, 1] {
            store
                .insert_chunk(ChunkRecord {
                    document_id: record.id,
                    chunk_index: index,
                    content: format!("chunk {index}"),
                    metadata: json!({ "chunk_size": 7 }),
                })
                .await
                .unwrap();
        }

        let indices: Vec<usize> = store
            .list_chunks(record.id)
            .await
            .unwrap()
            .iter()
            .map(|chunk| chunk.chunk_index)
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn chunks_require_a_parent_document() {
        let store = MemoryStore::new();
        let orphan = ChunkRecord {
            document_id: Uuid::new_v4(),
            chunk_index: 0,
            content: "orphan".into(),
            metadata: json!({}),
        };
        assert!(matches!(
            store.insert_chunk(orphan).await,
            Err(StoreError::DocumentNotFound(_))
        ));
    }
}
