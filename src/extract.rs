//! Text extraction adapters that turn uploaded bytes into plain text.

use crate::error::{RagError, RagResult};

/// Converts a raw document payload into plain text.
pub trait TextExtractor: Send + Sync {
    /// Extracts trimmed text; fails with [`RagError::Extraction`] on malformed input.
    fn extract(&self, bytes: &[u8]) -> RagResult<String>;
}

/// PDF extractor backed by `pdf-extract`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> RagResult<String> {
        if bytes.is_empty() {
            return Err(RagError::Extraction("empty PDF payload".to_string()));
        }
        let text = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|err| RagError::Extraction(err.to_string()))?;
        tracing::debug!(chars = text.len(), "extracted PDF text");
        Ok(text.trim().to_string())
    }
}

/// UTF-8 plain text (and Markdown) extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> RagResult<String> {
        std::str::from_utf8(bytes)
            .map(|text| text.trim().to_string())
            .map_err(|err| RagError::Extraction(format!("payload is not valid UTF-8 text: {err}")))
    }
}

/// Picks an extractor for a file name by extension (PDF unless plain text).
pub fn extractor_for_path(path: &std::path::Path) -> Box<dyn TextExtractor> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("txt" | "md" | "markdown" | "text") => Box::new(PlainTextExtractor),
        _ => Box::new(PdfExtractor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn plain_text_is_trimmed() {
        let text = PlainTextExtractor.extract(b"  hello\nworld \n").unwrap();
        assert_eq!(text, "hello\nworld");
    }

    #[test]
    fn plain_text_rejects_invalid_utf8() {
        let err = PlainTextExtractor.extract(&[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, RagError::Extraction(_)));
    }

    #[test]
    fn pdf_rejects_empty_and_garbage_payloads() {
        assert!(matches!(
            PdfExtractor.extract(b""),
            Err(RagError::Extraction(_))
        ));
        assert!(matches!(
            PdfExtractor.extract(b"definitely not a pdf"),
            Err(RagError::Extraction(_))
        ));
    }

    #[test]
    fn picks_extractor_by_extension() {
        // plain text extractor accepts arbitrary UTF-8, the PDF one does not
        let txt = extractor_for_path(Path::new("notes.TXT"));
        assert_eq!(txt.extract(b"abc").unwrap(), "abc");
        let pdf = extractor_for_path(Path::new("paper.pdf"));
        assert!(pdf.extract(b"abc").is_err());
    }
}
