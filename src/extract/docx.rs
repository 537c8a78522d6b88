//! DOCX text extractor.
//!
//! A .docx file is a zip container; the document body lives in
//! `word/document.xml`. Paragraphs (`w:p`) hold runs (`w:r`) which hold text
//! spans (`w:t`). Run text is concatenated as-is and paragraphs are joined
//! with newlines. Every other entry in the container is ignored.

use super::{DocumentKind, ExtractError, TextExtractor};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};

const BODY_ENTRY: &str = "word/document.xml";

/// Extractor for DOCX files.
pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Docx
    }

    fn extract(&self, data: &[u8]) -> Result<String, ExtractError> {
        let mut archive =
            zip::ZipArchive::new(Cursor::new(data)).map_err(|e| ExtractError::Failed {
                kind: DocumentKind::Docx,
                message: e.to_string(),
            })?;

        // A readable container without a usable body yields empty text rather
        // than an error; only an unopenable container is fatal.
        let xml = match archive.by_name(BODY_ENTRY) {
            Ok(mut entry) => {
                let mut xml = String::new();
                if let Err(e) = entry.read_to_string(&mut xml) {
                    log::warn!("docx: failed to read {BODY_ENTRY}: {e}");
                    return Ok(String::new());
                }
                xml
            }
            Err(e) => {
                log::warn!("docx: no {BODY_ENTRY} entry: {e}");
                return Ok(String::new());
            }
        };

        match paragraphs_from_xml(&xml) {
            Ok(paragraphs) => Ok(paragraphs.join("\n").trim().to_string()),
            Err(e) => {
                log::warn!("docx: malformed document body: {e}");
                Ok(String::new())
            }
        }
    }
}

/// Walk the body XML and collect the text of each paragraph in document order.
fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);

    let mut paragraphs = Vec::new();
    // paragraphs can nest (text boxes), so keep a stack of open ones
    let mut open: Vec<String> = Vec::new();
    let mut run_depth = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => open.push(String::new()),
                b"r" => run_depth += 1,
                b"t" if run_depth > 0 => in_text = true,
                _ => {}
            },
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"p" {
                    paragraphs.push(String::new());
                }
            }
            Event::Text(t) if in_text => {
                if let Some(paragraph) = open.last_mut() {
                    paragraph.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) if in_text => {
                if let Some(paragraph) = open.last_mut() {
                    paragraph.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"p" => {
                    if let Some(paragraph) = open.pop() {
                        paragraphs.push(paragraph);
                    }
                }
                b"r" => run_depth = run_depth.saturating_sub(1),
                b"t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}
