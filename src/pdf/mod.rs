//! PDF manipulation module

pub mod compose;
pub mod metadata;
pub mod page;
pub mod validate;
pub mod xobject;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used items
pub use compose::{compose, PageCompositor, Template};
pub use metadata::{count_pages, extract_metadata, load_document, page_count, PdfMetadata};
pub use validate::PageCountValidator;
