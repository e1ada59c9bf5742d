use std::sync::Arc;

use rustyingest::{
    extraction::{self, NO_TEXT_MESSAGE, TextSource},
    processing::{
        ChunkParams, ProcessingError, ProcessingService, ProcessingSettings, Upload, UploadError,
        validate::PDF_MIME_TYPE,
    },
    store::{DocumentStore, MemoryStore, ProcessingStatus},
};

const FIRST_PAGE: &str = "Rivers carry sediment from the mountains to the sea. Over long periods the \
deposits build deltas that shift with every flood and every dry season.";
const SECOND_PAGE: &str = "Farmers have settled on delta soil for thousands of years because the \
ground stays fertile. The same floods that feed the fields also threaten the villages.";

/// Assemble a minimal PDF with one content stream per page.
fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    let mut pdf = String::from("%PDF-1.4\n1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n");
    for (offset, page) in pages.iter().enumerate() {
        let content = format!("BT /F1 12 Tf 72 700 Td ({page}) Tj ET");
        pdf.push_str(&format!(
            "{} 0 obj << /Length {} >>\nstream\n{content}\nendstream\nendobj\n",
            offset + 3,
            content.len()
        ));
    }
    pdf.push_str("%%EOF");
    pdf.into_bytes()
}

fn pdf_upload(filename: &str, bytes: Vec<u8>) -> Upload {
    Upload {
        filename: filename.into(),
        title: None,
        mime_type: PDF_MIME_TYPE.into(),
        bytes,
    }
}

fn service_with(
    max_size: usize,
    overlap: usize,
) -> (Arc<MemoryStore>, ProcessingService<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let settings = ProcessingSettings {
        chunk_params: ChunkParams::new(max_size, overlap).expect("chunk params"),
        ..ProcessingSettings::default()
    };
    let service = ProcessingService::new(store.clone(), settings);
    (store, service)
}

#[tokio::test]
async fn text_pdf_is_chunked_and_completed() {
    let (store, service) = service_with(200, 40);
    let upload = pdf_upload("delta.pdf", pdf_with_pages(&[FIRST_PAGE, SECOND_PAGE]));

    let submission = service.submit(upload).await.expect("accepted");
    assert_eq!(submission.document.processing_status, ProcessingStatus::Pending);
    assert_eq!(submission.document.title, "delta.pdf");
    assert!(submission.document.storage_path.starts_with("documents/"));
    assert!(submission.document.storage_path.ends_with(".pdf"));

    let outcome = submission
        .task
        .await
        .expect("task joined")
        .expect("processed");
    assert_eq!(outcome.source, TextSource::TextObjects);
    assert!(outcome.chunk_count >= 2);

    let document = store
        .get_document(submission.document.id)
        .await
        .expect("document");
    assert_eq!(document.processing_status, ProcessingStatus::Completed);
    assert_eq!(document.chunk_count, Some(outcome.chunk_count));
    assert!(document.processing_error.is_none());

    let chunks = store
        .list_chunks(submission.document.id)
        .await
        .expect("chunks");
    assert_eq!(chunks.len(), outcome.chunk_count);
    for (position, chunk) in chunks.iter().enumerate() {
        let length = chunk.content.chars().count();
        assert_eq!(chunk.chunk_index, position);
        assert!(length <= 200, "chunk {position} has {length} chars");
        assert_eq!(chunk.metadata["chunk_size"], length);
    }
    assert!(chunks[0].content.starts_with("Rivers carry sediment"));
    assert!(
        chunks
            .last()
            .is_some_and(|chunk| chunk.content.ends_with("threaten the villages."))
    );

    let metrics = service.metrics_snapshot();
    assert_eq!(metrics.documents_completed, 1);
    assert_eq!(metrics.chunks_produced, outcome.chunk_count as u64);
    assert_eq!(metrics.sentinel_documents, 0);
}

#[tokio::test]
async fn explicit_title_is_trimmed() {
    let (_store, service) = service_with(1000, 200);
    let mut upload = pdf_upload("notes.pdf", pdf_with_pages(&[FIRST_PAGE]));
    upload.title = Some("  River Deltas  ".into());

    let submission = service.submit(upload).await.expect("accepted");
    assert_eq!(submission.document.title, "River Deltas");
    let outcome = submission.task.await.expect("joined").expect("processed");
    assert_eq!(outcome.chunk_count, 1);
}

#[tokio::test]
async fn image_only_pdf_stores_single_sentinel_chunk() {
    let (store, service) = service_with(1000, 200);
    let image_pdf = b"%PDF-1.4\n1 0 obj << /Type /XObject /Subtype /Image /Length 6 >>\n\
stream\n\x00\x01\x02\x03\x04\x05\nendstream\nendobj\n%%EOF"
        .to_vec();

    let submission = service
        .submit(pdf_upload("scan.pdf", image_pdf))
        .await
        .expect("accepted");
    let outcome = submission.task.await.expect("joined").expect("processed");
    assert_eq!(outcome.source, TextSource::NoReadableText);
    assert_eq!(outcome.chunk_count, 1);

    let chunks = store
        .list_chunks(submission.document.id)
        .await
        .expect("chunks");
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].content, NO_TEXT_MESSAGE);

    let document = store
        .get_document(submission.document.id)
        .await
        .expect("document");
    assert_eq!(document.processing_status, ProcessingStatus::Completed);
    assert_eq!(service.metrics_snapshot().sentinel_documents, 1);
}

#[tokio::test]
async fn malformed_hex_operand_does_not_fault() {
    let (store, service) = service_with(1000, 200);
    let bytes = b"%PDF-1.4\nstream\nBT <GG> Tj (Readable words survive) Tj ET\nendstream\n%%EOF"
        .to_vec();

    let submission = service
        .submit(pdf_upload("broken.pdf", bytes))
        .await
        .expect("accepted");
    let outcome = submission.task.await.expect("joined").expect("processed");
    assert!(!outcome.source.is_sentinel());

    let chunks = store
        .list_chunks(submission.document.id)
        .await
        .expect("chunks");
    assert_eq!(chunks.len(), 1);
    assert!(chunks[0].content.contains("Readable words survive"));
}

#[tokio::test]
async fn rejects_non_pdf_mime_type() {
    let (_store, service) = service_with(1000, 200);
    let mut upload = pdf_upload("notes.txt", b"plain text".to_vec());
    upload.mime_type = "text/plain".into();

    let error = service.submit(upload).await.err().expect("rejected");
    assert!(matches!(
        error,
        ProcessingError::Upload(UploadError::UnsupportedType(ref mime)) if mime == "text/plain"
    ));
}

#[tokio::test]
async fn rejects_oversized_upload() {
    let store = Arc::new(MemoryStore::new());
    let settings = ProcessingSettings {
        max_upload_bytes: 64,
        ..ProcessingSettings::default()
    };
    let service = ProcessingService::new(store, settings);

    let error = service
        .submit(pdf_upload("big.pdf", vec![b'a'; 65]))
        .await
        .err()
        .expect("rejected");
    assert!(matches!(
        error,
        ProcessingError::Upload(UploadError::TooLarge {
            size: 65,
            limit: 64
        })
    ));
}

#[tokio::test]
async fn rejects_empty_upload() {
    let (_store, service) = service_with(1000, 200);
    let error = service
        .submit(pdf_upload("empty.pdf", Vec::new()))
        .await
        .err()
        .expect("rejected");
    assert!(matches!(
        error,
        ProcessingError::Upload(UploadError::MissingFile)
    ));
}

#[test]
fn extraction_is_deterministic() {
    let bytes = pdf_with_pages(&[FIRST_PAGE, SECOND_PAGE]);
    let first = extraction::extract_text(&bytes);
    let second = extraction::extract_text(&bytes);
    assert_eq!(first, second);
    assert_eq!(first.as_str(), format!("{FIRST_PAGE}\n\n{SECOND_PAGE}"));
}
