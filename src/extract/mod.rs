//! Plain-text extraction from uploaded documents.
//!
//! Each supported kind (plain text, PDF, DOCX) implements `TextExtractor`.
//! `extractor_for()` returns the extractor for a kind and `extract()` is the
//! one-call entry point used by uploads.

mod docx;
mod pdf;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use docx::DocxExtractor;
pub use pdf::PdfExtractor;

/// Document kinds accepted on upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Txt,
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Parses a bare extension such as `pdf`, `.PDF` or `docx`.
    pub fn from_extension(ext: &str) -> Result<Self, ExtractError> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "txt" => Ok(Self::Txt),
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            _ => Err(ExtractError::UnsupportedType(ext.to_string())),
        }
    }

    /// Detects the kind from a file name's extension.
    pub fn from_file_name(name: &str) -> Result<Self, ExtractError> {
        std::path::Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| ExtractError::UnsupportedType(name.to_string()))
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Txt => write!(f, "txt"),
            Self::Pdf => write!(f, "pdf"),
            Self::Docx => write!(f, "docx"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("failed to extract {kind} text: {message}")]
    Failed { kind: DocumentKind, message: String },
}

/// Trait for kind-specific text extractors.
pub trait TextExtractor {
    /// Convert raw document bytes into plain text.
    fn extract(&self, data: &[u8]) -> Result<String, ExtractError>;

    /// The kind this extractor handles.
    fn kind(&self) -> DocumentKind;
}

/// Get the extractor for a document kind.
pub fn extractor_for(kind: DocumentKind) -> Box<dyn TextExtractor> {
    match kind {
        DocumentKind::Txt => Box::new(PlainTextExtractor),
        DocumentKind::Pdf => Box::new(PdfExtractor),
        DocumentKind::Docx => Box::new(DocxExtractor),
    }
}

/// Extract plain text from `data` interpreted as `kind`.
pub fn extract(data: &[u8], kind: DocumentKind) -> Result<String, ExtractError> {
    let extractor = extractor_for(kind);
    let text = extractor.extract(data)?;
    log::debug!(
        "extracted {} chars from {} document",
        text.chars().count(),
        extractor.kind()
    );
    Ok(text)
}

/// Bytes are taken as UTF-8 verbatim; invalid sequences are replaced rather
/// than rejected.
struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Txt
    }

    fn extract(&self, data: &[u8]) -> Result<String, ExtractError> {
        Ok(String::from_utf8_lossy(data).into_owned())
    }
}
