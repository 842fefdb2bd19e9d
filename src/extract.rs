use crate::error::{ComplianceError, Result};
use log::debug;
use lopdf::Document;
use std::path::Path;

/// Extracts the text of a PDF contract from a file on disk.
pub fn extract_text(path: &Path) -> Result<String> {
    let doc = Document::load(path).map_err(|e| {
        ComplianceError::Extraction(format!("{} is not a readable PDF: {}", path.display(), e))
    })?;
    Ok(text_from_document(&doc))
}

/// Extracts the text of a PDF contract from raw bytes (e.g. an upload).
pub fn extract_text_from_bytes(bytes: &[u8]) -> Result<String> {
    let doc = Document::load_mem(bytes)
        .map_err(|e| ComplianceError::Extraction(format!("input is not a valid PDF: {}", e)))?;
    Ok(text_from_document(&doc))
}

// Pages are visited in page order. A page with no extractable text (pure
// image, broken content stream) contributes nothing; no OCR is attempted.
fn text_from_document(doc: &Document) -> String {
    let mut pages = Vec::new();
    for page_number in doc.get_pages().keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(text) => pages.push(text),
            Err(e) => {
                debug!("no extractable text on page {}: {}", page_number, e);
                pages.push(String::new());
            }
        }
    }
    join_pages(&pages)
}

// Join policy: each page is trimmed, empty pages are dropped, the rest are
// joined with a single space.
fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(|page| page.trim())
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
