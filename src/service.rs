//! Folder-to-archive orchestration
//!
//! Turns one folder reference into a finished archive: extract the folder id,
//! list the folder, run the batch, package the outcome.

use std::sync::{Arc, LazyLock};
use regex::Regex;
use tracing::{error, info};
use crate::archive::{Archive, ArchiveBuilder};
use crate::batch::BatchProcessor;
use crate::error::{Error, Result};
use crate::source::{DocumentFetcher, FolderLister};

static FOLDER_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/folders/([a-zA-Z0-9_-]+)").expect("folder id pattern is valid")
});

/// Pull the folder id out of a shared-folder link
///
/// The first `/folders/<id>` occurrence wins; the id stops at the first
/// character outside `[A-Za-z0-9_-]`.
pub fn extract_folder_id(reference: &str) -> Option<&str> {
    FOLDER_ID
        .captures(reference)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// End-to-end pipeline over a document source
pub struct CoverSpreadService<S> {
    source: Arc<S>,
    processor: BatchProcessor,
    archiver: ArchiveBuilder,
}

impl<S> CoverSpreadService<S>
where
    S: FolderLister + DocumentFetcher,
{
    pub fn new(source: Arc<S>, processor: BatchProcessor, archiver: ArchiveBuilder) -> Self {
        Self {
            source,
            processor,
            archiver,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Process the folder named by a user-supplied link
    pub async fn process_folder(&self, reference: &str) -> Result<Archive> {
        let folder_id = extract_folder_id(reference)
            .ok_or_else(|| Error::InvalidReference(reference.to_string()))?;
        self.process_folder_id(folder_id).await
    }

    /// Process a folder by id
    pub async fn process_folder_id(&self, folder_id: &str) -> Result<Archive> {
        let documents = self.source.list_documents(folder_id).await.map_err(|e| {
            error!("Listing folder {} failed: {}", folder_id, e);
            match e {
                Error::Listing(_) => e,
                other => Error::Listing(other.to_string()),
            }
        })?;

        if documents.is_empty() {
            return Err(Error::EmptyFolder);
        }
        info!("Found {} PDFs in folder {}", documents.len(), folder_id);

        let outcome = self.processor.run(self.source.as_ref(), &documents).await;
        let archive = self.archiver.build(&outcome)?;

        info!(
            "Built {} ({} composed, {} skipped)",
            archive.name,
            outcome.composed.len(),
            outcome.skipped.len()
        );
        Ok(archive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BatchConfig, SpreadConfig};
    use crate::pdf::testing::document_with_pages;
    use crate::pdf::{PageCompositor, Template};
    use crate::source::DocumentRef;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::io::{Cursor, Read};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use zip::ZipArchive;

    struct MockSource {
        listing: Option<Vec<DocumentRef>>,
        documents: HashMap<String, Vec<u8>>,
        list_calls: AtomicUsize,
    }

    impl MockSource {
        fn with(documents: Vec<(&str, &str, Vec<u8>)>) -> Self {
            Self {
                listing: Some(documents.iter().map(|(id, name, _)| DocumentRef::new(*id, *name)).collect()),
                documents: documents.into_iter().map(|(id, _, b)| (id.to_string(), b)).collect(),
                list_calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                listing: None,
                documents: HashMap::new(),
                list_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl FolderLister for MockSource {
        async fn list_documents(&self, _folder_id: &str) -> Result<Vec<DocumentRef>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            self.listing
                .clone()
                .ok_or_else(|| Error::General("403 forbidden".to_string()))
        }
    }

    #[async_trait]
    impl DocumentFetcher for MockSource {
        async fn fetch(&self, document: &DocumentRef) -> Result<Vec<u8>> {
            self.documents
                .get(&document.id)
                .cloned()
                .ok_or_else(|| Error::General("missing".to_string()))
        }
    }

    fn service(source: MockSource) -> CoverSpreadService<MockSource> {
        let template = Template::from_bytes(&document_with_pages(1, 1300.0, 900.0)).unwrap();
        let config = SpreadConfig {
            expected_page_count: 5,
            left_page_index: 4,
            right_page_index: 0,
            ..SpreadConfig::default()
        };
        let compositor = Arc::new(PageCompositor::new(template, config).unwrap());
        let processor = BatchProcessor::new(compositor, BatchConfig::default()).unwrap();
        CoverSpreadService::new(Arc::new(source), processor, ArchiveBuilder::default())
    }

    fn entries(archive: &Archive) -> Vec<String> {
        let zip = ZipArchive::new(Cursor::new(archive.bytes.as_slice())).unwrap();
        let mut names: Vec<String> = zip.file_names().map(String::from).collect();
        names.sort();
        names
    }

    fn manifest(archive: &Archive) -> String {
        let mut zip = ZipArchive::new(Cursor::new(archive.bytes.as_slice())).unwrap();
        let mut text = String::new();
        zip.by_name("skipped_files.txt").unwrap().read_to_string(&mut text).unwrap();
        text
    }

    const LINK: &str = "https://drive.google.com/drive/folders/abc_DEF-123?usp=sharing";

    #[test]
    fn test_extract_folder_id() {
        assert_eq!(extract_folder_id(LINK), Some("abc_DEF-123"));
        assert_eq!(
            extract_folder_id("https://drive.google.com/drive/u/0/folders/XYZ/folders/second"),
            Some("XYZ")
        );
        assert_eq!(extract_folder_id("https://drive.google.com/file/d/abc/view"), None);
        assert_eq!(extract_folder_id("/folders/"), None);
        assert_eq!(extract_folder_id(""), None);
    }

    #[tokio::test]
    async fn test_all_documents_valid() {
        let service = service(MockSource::with(vec![
            ("1", "one.pdf", document_with_pages(5, 500.0, 500.0)),
            ("2", "two.pdf.pdf", document_with_pages(5, 500.0, 500.0)),
            ("3", "three.pdf", document_with_pages(5, 500.0, 500.0)),
        ]));

        let archive = service.process_folder(LINK).await.unwrap();
        assert!(archive.name.starts_with("spread_Cover_of_pdfs_"));
        assert_eq!(
            entries(&archive),
            vec![
                "cover_page_one.pdf",
                "cover_page_three.pdf",
                "cover_page_two.pdf",
                "skipped_files.txt"
            ]
        );
        assert_eq!(manifest(&archive), "All files processed successfully.");
    }

    #[tokio::test]
    async fn test_wrong_page_count_is_listed() {
        let service = service(MockSource::with(vec![
            ("1", "good.pdf", document_with_pages(5, 500.0, 500.0)),
            ("2", "short.pdf", document_with_pages(4, 500.0, 500.0)),
        ]));

        let archive = service.process_folder(LINK).await.unwrap();
        assert_eq!(entries(&archive), vec!["cover_page_good.pdf", "skipped_files.txt"]);
        assert_eq!(manifest(&archive), "Skipped Files:\nshort.pdf");
    }

    #[tokio::test]
    async fn test_empty_folder() {
        let service = service(MockSource::with(vec![]));
        let err = service.process_folder(LINK).await.unwrap_err();
        assert!(matches!(err, Error::EmptyFolder));
    }

    #[tokio::test]
    async fn test_invalid_reference_never_lists() {
        let service = service(MockSource::with(vec![]));
        let err = service.process_folder("not a link").await.unwrap_err();
        assert!(matches!(err, Error::InvalidReference(_)));
        assert_eq!(service.source().list_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_listing_failure() {
        let service = service(MockSource::failing());
        let err = service.process_folder(LINK).await.unwrap_err();
        assert!(matches!(err, Error::Listing(ref msg) if msg.contains("403")));
    }
}
