//! Best-effort text recovery from raw PDF bytes.
//!
//! The extractor never fails from the caller's point of view. It runs an ordered list of
//! recovery strategies over the Latin-1 decoded document:
//!
//! - **Text objects**: string operands inside `BT … ET` regions.
//! - **Show-text operators**: operands of `Tj`/`TJ` invocations found anywhere.
//! - **Raw streams**: text-like printable runs between `stream` and `endstream`.
//!
//! The first strategy whose normalized output is non-empty wins. When none do, a fixed sentinel
//! message is returned; when extraction itself faults, a second sentinel carries the error.

mod literals;
mod normalize;
mod patterns;
mod strategies;

use serde::Serialize;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;
use thiserror::Error;

use patterns::Patterns;
use strategies::STRATEGIES;

/// Placeholder returned when no readable text could be recovered.
pub const NO_TEXT_MESSAGE: &str = "PDF processed but no readable text could be extracted. \
This may be a scanned document, image-based PDF, or the text may be encoded in a format not \
supported by this simple parser.";

/// Build the placeholder returned when extraction faulted.
pub fn extraction_failed_message(reason: &str) -> String {
    format!(
        "PDF uploaded successfully but text extraction failed: {reason}. \
You may need to use OCR for scanned documents."
    )
}

/// Faults caught at the extractor boundary.
#[derive(Debug, Clone, Error)]
pub enum ExtractionError {
    /// A built-in recovery pattern failed to compile.
    #[error("invalid extraction pattern: {0}")]
    Pattern(#[from] regex::Error),
    /// A recovery strategy panicked while scanning the document.
    #[error("extractor panicked: {0}")]
    Panicked(String),
}

/// Which recovery path produced an [`ExtractedText`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSource {
    /// Operands of `BT … ET` text objects.
    TextObjects,
    /// Operands of bare `Tj`/`TJ` invocations.
    ShowTextOperators,
    /// Printable runs from raw stream bodies.
    RawStreams,
    /// Nothing readable was found; the text is [`NO_TEXT_MESSAGE`].
    NoReadableText,
    /// Extraction faulted; the text is an [`extraction_failed_message`].
    ExtractionFailed,
}

impl TextSource {
    /// Whether the text is a diagnostic placeholder rather than document content.
    pub fn is_sentinel(self) -> bool {
        matches!(self, Self::NoReadableText | Self::ExtractionFailed)
    }
}

/// Plain text recovered from a document. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    text: String,
    source: TextSource,
}

impl ExtractedText {
    fn no_text() -> Self {
        Self {
            text: NO_TEXT_MESSAGE.to_string(),
            source: TextSource::NoReadableText,
        }
    }

    fn failed(error: &ExtractionError) -> Self {
        Self {
            text: extraction_failed_message(&error.to_string()),
            source: TextSource::ExtractionFailed,
        }
    }

    /// Borrow the recovered text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Recovery path that produced the text.
    pub fn source(&self) -> TextSource {
        self.source
    }

    /// Whether the text is a sentinel placeholder.
    pub fn is_sentinel(&self) -> bool {
        self.source.is_sentinel()
    }
}

impl fmt::Display for ExtractedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

static PATTERNS: OnceLock<Result<Patterns, regex::Error>> = OnceLock::new();

/// Prepare the extractor's compiled patterns.
///
/// Idempotent: the first call compiles, later calls return the cached outcome.
/// [`extract_text`] calls this implicitly.
pub fn init() -> Result<(), ExtractionError> {
    patterns().map(|_| ())
}

fn patterns() -> Result<&'static Patterns, ExtractionError> {
    PATTERNS
        .get_or_init(Patterns::compile)
        .as_ref()
        .map_err(|error| ExtractionError::Pattern(error.clone()))
}

/// Recover plain text from raw PDF bytes.
///
/// Bytes are decoded one per character regardless of content; no magic-byte check is made.
pub fn extract_text(bytes: &[u8]) -> ExtractedText {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| try_extract(bytes))).unwrap_or_else(
        |payload| Err(ExtractionError::Panicked(panic_message(payload.as_ref()))),
    );

    match outcome {
        Ok(extracted) => extracted,
        Err(error) => {
            tracing::warn!(error = %error, bytes = bytes.len(), "PDF text extraction failed");
            ExtractedText::failed(&error)
        }
    }
}

fn try_extract(bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
    let patterns = patterns()?;
    let document = decode_latin1(bytes);

    let recovered = STRATEGIES.iter().find_map(|(source, strategy)| {
        let text = normalize::normalize(patterns, &strategy(patterns, &document)?);
        if text.is_empty() {
            tracing::trace!(source = ?source, "Strategy output empty after normalization");
            return None;
        }
        Some(ExtractedText {
            text,
            source: *source,
        })
    });

    match recovered {
        Some(extracted) => {
            tracing::debug!(
                source = ?extracted.source,
                chars = extracted.text.len(),
                "Recovered PDF text"
            );
            Ok(extracted)
        }
        None => {
            tracing::info!(bytes = bytes.len(), "No readable text found in PDF");
            Ok(ExtractedText::no_text())
        }
    }
}

/// Map every byte to the `char` of the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_PDF: &[u8] = b"%PDF-1.4\n\
1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n\
4 0 obj << /Length 58 >>\nstream\n\
BT /F1 24 Tf 72 712 Td (Hello from page one) Tj ET\n\
endstream\nendobj\n\
5 0 obj << /Length 60 >>\nstream\n\
BT /F1 12 Tf 72 700 Td [(Second) -120 (page text)] TJ ET\n\
endstream\nendobj\n%%EOF";

    #[test]
    fn init_is_idempotent() {
        assert!(init().is_ok());
        assert!(init().is_ok());
    }

    #[test]
    fn extracts_text_objects_with_page_breaks() {
        let extracted = extract_text(SIMPLE_PDF);
        assert_eq!(extracted.source(), TextSource::TextObjects);
        assert_eq!(extracted.as_str(), "Hello from page one\n\nSecond page text");
        assert!(!extracted.is_sentinel());
    }

    #[test]
    fn falls_back_to_show_text_operators() {
        let document = b"%PDF-1.3\nstream\n/F1 12 Tf (Orphaned operator text) Tj\nendstream";
        let extracted = extract_text(document);
        assert_eq!(extracted.source(), TextSource::ShowTextOperators);
        assert_eq!(extracted.as_str(), "Orphaned operator text");
    }

    #[test]
    fn falls_back_to_raw_stream_runs() {
        let document = b"%PDF-1.3\nstream\n\x01\x02Plain words stored without operators\
                         \x00\x9f\nendstream";
        let extracted = extract_text(document);
        assert_eq!(extracted.source(), TextSource::RawStreams);
        assert_eq!(extracted.as_str(), "Plain words stored without operators");
        assert!(!extracted.is_sentinel());
    }

    #[test]
    fn empty_input_yields_no_text_sentinel() {
        let extracted = extract_text(&[]);
        assert_eq!(extracted.source(), TextSource::NoReadableText);
        assert_eq!(extracted.as_str(), NO_TEXT_MESSAGE);
    }

    #[test]
    fn image_only_pdf_yields_no_text_sentinel() {
        let mut document =
            b"%PDF-1.4\n6 0 obj << /Subtype /Image /Length 64 >>\nstream\n".to_vec();
        document.extend((0u8..64).map(|value| value.wrapping_mul(37) | 0x80));
        document.extend_from_slice(b"\nendstream\nendobj\n%%EOF");

        let extracted = extract_text(&document);
        assert_eq!(extracted.source(), TextSource::NoReadableText);
        assert!(extracted.is_sentinel());
    }

    #[test]
    fn garbage_and_truncated_input_never_fault() {
        let garbage: Vec<u8> = (0..4096u32)
            .map(|n| (n.wrapping_mul(2_654_435_761) >> 24) as u8)
            .collect();
        let extracted = extract_text(&garbage);
        assert!(!extracted.as_str().is_empty());

        let truncated = &SIMPLE_PDF[..40];
        let extracted = extract_text(truncated);
        assert!(!extracted.as_str().is_empty());

        let unterminated = b"%PDF-1.4\nstream\nBT (Never closed";
        let extracted = extract_text(unterminated);
        assert_eq!(extracted.source(), TextSource::NoReadableText);
    }

    #[test]
    fn failure_sentinel_carries_error_description() {
        let error = ExtractionError::Panicked("index out of range".into());
        let extracted = ExtractedText::failed(&error);
        assert_eq!(extracted.source(), TextSource::ExtractionFailed);
        assert!(extracted.as_str().contains("index out of range"));
        assert!(
            extracted
                .as_str()
                .starts_with("PDF uploaded successfully but text extraction failed")
        );
    }

    #[test]
    fn panic_message_reads_common_payloads() {
        assert_eq!(panic_message(&"static message"), "static message");
        assert_eq!(panic_message(&String::from("owned message")), "owned message");
        assert_eq!(panic_message(&42_u8), "unknown panic");
    }
}
