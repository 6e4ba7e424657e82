//! Collaborator seams for listing and downloading source documents
//!
//! The batch pipeline only sees these traits, so the Google Drive client, the
//! local filesystem source and test doubles are interchangeable.

use async_trait::async_trait;
use serde::Deserialize;
use crate::error::Result;

/// One listed document: an opaque id plus its display name
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentRef {
    pub id: String,
    pub name: String,
}

impl DocumentRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Lists the PDF documents contained in a folder
#[async_trait]
pub trait FolderLister: Send + Sync {
    /// Return the folder's documents in listing order.
    ///
    /// An empty folder is `Ok(vec![])`; only transport or authorization
    /// problems are errors.
    async fn list_documents(&self, folder_id: &str) -> Result<Vec<DocumentRef>>;
}

/// Downloads the raw bytes of one listed document
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, document: &DocumentRef) -> Result<Vec<u8>>;
}
