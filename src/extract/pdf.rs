//! PDF text extractor backed by `lopdf`.
//!
//! Text is pulled page by page so that one unreadable page (broken content
//! stream, unsupported font encoding) costs only that page.

use super::{DocumentKind, ExtractError, TextExtractor};
use lopdf::Document;

/// Extractor for PDF files.
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Pdf
    }

    fn extract(&self, data: &[u8]) -> Result<String, ExtractError> {
        let doc = Document::load_mem(data).map_err(|e| ExtractError::Failed {
            kind: DocumentKind::Pdf,
            message: e.to_string(),
        })?;

        let pages = doc.get_pages();
        let mut texts = Vec::with_capacity(pages.len());

        // get_pages is keyed by page number, so iteration is in page order
        for page_num in pages.keys() {
            match doc.extract_text(&[*page_num]) {
                Ok(text) if !text.trim().is_empty() => texts.push(text.trim().to_string()),
                // a dangling content reference reads as an empty page
                Ok(_) => log::debug!("skipping pdf page {page_num} without text"),
                Err(e) => log::debug!("skipping unreadable pdf page {page_num}: {e}"),
            }
        }

        log::debug!("read {} of {} pdf pages", texts.len(), pages.len());

        Ok(texts.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_a_pdf_fails() {
        let result = PdfExtractor.extract(b"This is not a PDF");
        assert!(matches!(
            result,
            Err(ExtractError::Failed {
                kind: DocumentKind::Pdf,
                ..
            })
        ));
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(PdfExtractor.extract(&[]).is_err());
    }
}
