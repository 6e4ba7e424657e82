//! PDF loading and metadata extraction

use std::path::Path;
use lopdf::{Document, Object};
use crate::error::{Error, Result};

/// Parse document bytes, reporting any parser failure as a malformed document
pub fn load_document(bytes: &[u8]) -> Result<Document> {
    let doc = Document::load_mem(bytes)
        .map_err(|e| Error::MalformedDocument(e.to_string()))?;

    if doc.get_pages().is_empty() {
        return Err(Error::MalformedDocument("document has no pages".to_string()));
    }

    Ok(doc)
}

/// `Count` declared on the root page tree node, if it is usable.
///
/// Damaged or hand-edited files can declare a different number than the tree
/// actually holds, so this is informational only.
pub fn declared_page_count(doc: &Document) -> Option<usize> {
    let pages_id = match doc.catalog().ok()?.get(b"Pages").ok()? {
        Object::Reference(id) => *id,
        _ => return None,
    };

    match doc.get_dictionary(pages_id).ok()?.get(b"Count").ok()? {
        Object::Integer(n) => usize::try_from(*n).ok(),
        _ => None,
    }
}

/// Number of pages reachable through the page tree.
///
/// This is the same page list compositing indexes into, so a document that
/// passes a page-count check can always have its pages picked.
pub fn page_count(doc: &Document) -> usize {
    doc.get_pages().len()
}

/// PDF metadata
#[derive(Debug, Clone)]
pub struct PdfMetadata {
    /// Number of pages in the PDF
    pub page_count: usize,
    /// Page count declared by the page tree root, when present
    pub declared_page_count: Option<usize>,
    /// Document title (if present)
    pub title: Option<String>,
    /// Document author (if present)
    pub author: Option<String>,
}

/// Extract metadata from a PDF file
pub fn extract_metadata(path: &Path) -> Result<PdfMetadata> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path)?;
    let doc = load_document(&bytes)?;

    Ok(PdfMetadata {
        page_count: page_count(&doc),
        declared_page_count: declared_page_count(&doc),
        title: info_string(&doc, b"Title"),
        author: info_string(&doc, b"Author"),
    })
}

/// Read a text entry from the document Info dictionary
fn info_string(doc: &Document, key: &[u8]) -> Option<String> {
    let info_id = match doc.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => *id,
        _ => return None,
    };

    let info_dict = doc.get_dictionary(info_id).ok()?;
    let bytes = info_dict.get(key).ok()?.as_str().ok()?;
    String::from_utf8(bytes.to_vec()).ok()
}

/// Count the number of pages in a PDF file
pub fn count_pages(path: &Path) -> Result<usize> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path)?;
    let doc = load_document(&bytes)?;
    Ok(page_count(&doc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testing::{document_with_pages, set_declared_count};

    #[test]
    fn test_count_pages_nonexistent_file() {
        let result = count_pages(Path::new("nonexistent.pdf"));
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), Error::FileNotFound(_)));
    }

    #[test]
    fn test_extract_metadata_nonexistent_file() {
        let result = extract_metadata(Path::new("nonexistent.pdf"));
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), Error::FileNotFound(_)));
    }

    #[test]
    fn test_load_document_rejects_garbage() {
        let result = load_document(b"definitely not a pdf");
        assert!(matches!(result, Err(Error::MalformedDocument(_))));
    }

    #[test]
    fn test_page_count_matches_tree() {
        let bytes = document_with_pages(5, 300.0, 300.0);
        let doc = load_document(&bytes).unwrap();
        assert_eq!(page_count(&doc), 5);
        assert_eq!(declared_page_count(&doc), Some(5));
    }

    #[test]
    fn test_page_count_ignores_wrong_declared_count() {
        let bytes = document_with_pages(17, 300.0, 300.0);
        let mut doc = load_document(&bytes).unwrap();

        set_declared_count(&mut doc, Some(16));
        assert_eq!(declared_page_count(&doc), Some(16));
        assert_eq!(page_count(&doc), 17);

        set_declared_count(&mut doc, None);
        assert_eq!(declared_page_count(&doc), None);
        assert_eq!(page_count(&doc), 17);
    }
}
