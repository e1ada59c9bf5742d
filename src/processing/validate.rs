//! Upload checks applied before a document enters the pipeline.

use super::types::{Upload, UploadError};
use uuid::Uuid;

/// The only MIME type accepted for ingestion.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Default upload size limit (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const STORAGE_PREFIX: &str = "documents";

/// Reject empty, non-PDF, or oversized uploads.
pub fn validate_upload(upload: &Upload, max_bytes: usize) -> Result<(), UploadError> {
    if upload.bytes.is_empty() {
        return Err(UploadError::MissingFile);
    }
    if upload.mime_type.trim() != PDF_MIME_TYPE {
        return Err(UploadError::UnsupportedType(upload.mime_type.clone()));
    }
    if upload.bytes.len() > max_bytes {
        return Err(UploadError::TooLarge {
            size: upload.bytes.len(),
            limit: max_bytes,
        });
    }
    Ok(())
}

/// Use the trimmed title when present, otherwise the file name.
pub(crate) fn resolve_title(title: Option<String>, filename: &str) -> String {
    title
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| filename.to_string())
}

/// Build a unique storage path that keeps the upload's extension.
pub(crate) fn storage_path_for(filename: &str) -> String {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
        .unwrap_or("pdf");
    format!("{STORAGE_PREFIX}/{}.{extension}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(mime_type: &str, bytes: Vec<u8>) -> Upload {
        Upload {
            filename: "report.pdf".into(),
            title: None,
            mime_type: mime_type.into(),
            bytes,
        }
    }

    #[test]
    fn accepts_pdf_within_limit() {
        assert!(validate_upload(&upload(PDF_MIME_TYPE, vec![1; 16]), 16).is_ok());
    }

    #[test]
    fn rejects_missing_content() {
        assert_eq!(
            validate_upload(&upload(PDF_MIME_TYPE, Vec::new()), 16),
            Err(UploadError::MissingFile)
        );
    }

    #[test]
    fn rejects_other_mime_types() {
        assert_eq!(
            validate_upload(&upload("text/plain", vec![1]), 16),
            Err(UploadError::UnsupportedType("text/plain".into()))
        );
    }

    #[test]
    fn rejects_oversized_uploads() {
        assert_eq!(
            validate_upload(&upload(PDF_MIME_TYPE, vec![1; 17]), 16),
            Err(UploadError::TooLarge { size: 17, limit: 16 })
        );
    }

    #[test]
    fn title_falls_back_to_filename() {
        assert_eq!(resolve_title(Some("  Annual Report ".into()), "a.pdf"), "Annual Report");
        assert_eq!(resolve_title(Some("   ".into()), "a.pdf"), "a.pdf");
        assert_eq!(resolve_title(None, "a.pdf"), "a.pdf");
    }

    #[test]
    fn storage_path_keeps_extension() {
        let path = storage_path_for("scan.final.PDF");
        assert!(path.starts_with("documents/"));
        assert!(path.ends_with(".PDF"));
        assert!(storage_path_for("noext").ends_with(".pdf"));
    }
}
