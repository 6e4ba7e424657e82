//! Structural precondition checked before compositing

use lopdf::Document;
use super::metadata::page_count;

/// Accepts only documents with an exact page count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCountValidator {
    expected: usize,
}

impl PageCountValidator {
    pub fn new(expected: usize) -> Self {
        Self { expected }
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    /// True iff the document has exactly the expected number of pages
    pub fn validate(&self, doc: &Document) -> bool {
        self.accepts(page_count(doc))
    }

    pub fn accepts(&self, count: usize) -> bool {
        count == self.expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpreadConfig;
    use crate::pdf::compose::{PageCompositor, Template};
    use crate::pdf::testing::{document_with_pages, set_declared_count};

    #[test]
    fn test_boundaries() {
        let validator = PageCountValidator::new(17);
        assert!(validator.accepts(17));
        assert!(!validator.accepts(16));
        assert!(!validator.accepts(18));
        assert!(!validator.accepts(0));
    }

    #[test]
    fn test_validate_document() {
        let validator = PageCountValidator::new(4);

        let ok = Document::load_mem(&document_with_pages(4, 200.0, 200.0)).unwrap();
        let short = Document::load_mem(&document_with_pages(3, 200.0, 200.0)).unwrap();
        let long = Document::load_mem(&document_with_pages(5, 200.0, 200.0)).unwrap();

        assert!(validator.validate(&ok));
        assert!(!validator.validate(&short));
        assert!(!validator.validate(&long));
    }

    #[test]
    fn test_declared_count_does_not_decide() {
        let validator = PageCountValidator::new(17);

        // 17 real pages, tree root claims 16
        let mut full = Document::load_mem(&document_with_pages(17, 200.0, 200.0)).unwrap();
        set_declared_count(&mut full, Some(16));
        assert!(validator.validate(&full));

        // 16 real pages, tree root claims 17
        let mut short = Document::load_mem(&document_with_pages(16, 200.0, 200.0)).unwrap();
        set_declared_count(&mut short, Some(17));
        assert!(!validator.validate(&short));
    }

    #[test]
    fn test_accepted_document_always_composes() {
        let template = Template::from_bytes(&document_with_pages(1, 1300.0, 900.0)).unwrap();
        let compositor = PageCompositor::new(template, SpreadConfig::default()).unwrap();
        let validator = PageCountValidator::new(compositor.config().expected_page_count);

        let mut doc = Document::load_mem(&document_with_pages(17, 200.0, 200.0)).unwrap();
        set_declared_count(&mut doc, Some(3));

        assert!(validator.validate(&doc));
        assert!(compositor.compose(&doc).is_ok());
    }
}
