//! Sequential batch processing with per-item failure isolation
//!
//! Every input document ends up in exactly one of the two outcome lists:
//! composed or skipped. A failure while fetching, parsing, validating or
//! compositing one document never affects any other.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use crate::config::BatchConfig;
use crate::error::{Error, Result};
use crate::pdf::{load_document, page_count, PageCompositor, PageCountValidator};
use crate::source::{DocumentFetcher, DocumentRef};

/// Why a document was left out of the archive
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Download failed (after all configured attempts)
    FetchFailed(String),
    /// Bytes were not a readable PDF
    Malformed(String),
    /// Page count did not match the configured value
    PageCountMismatch { expected: usize, actual: usize },
    /// Compositing failed after validation passed
    ComposeFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::FetchFailed(e) => write!(f, "download failed: {}", e),
            SkipReason::Malformed(e) => write!(f, "not a readable PDF: {}", e),
            SkipReason::PageCountMismatch { expected, actual } => {
                write!(f, "expected {} pages, found {}", expected, actual)
            }
            SkipReason::ComposeFailed(e) => write!(f, "compositing failed: {}", e),
        }
    }
}

/// A successfully composed output document
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedDocument {
    /// Archive entry name (output prefix + normalized source name)
    pub name: String,
    pub bytes: Vec<u8>,
}

/// A document that was left out, under its normalized display name
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedDocument {
    pub name: String,
    pub reason: SkipReason,
}

/// Result for a single document; exactly one variant holds
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    Composed(ComposedDocument),
    Skipped(SkippedDocument),
}

/// Aggregated result of one batch, in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub composed: Vec<ComposedDocument>,
    pub skipped: Vec<SkippedDocument>,
}

impl BatchOutcome {
    pub fn record(&mut self, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Composed(doc) => self.composed.push(doc),
            ItemOutcome::Skipped(doc) => self.skipped.push(doc),
        }
    }

    pub fn skipped_names(&self) -> Vec<&str> {
        self.skipped.iter().map(|s| s.name.as_str()).collect()
    }

    /// Number of documents accounted for
    pub fn total(&self) -> usize {
        self.composed.len() + self.skipped.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Collapse a doubled `.pdf` suffix, e.g. `report.pdf.pdf` → `report.pdf`.
///
/// Only one trailing `.pdf.pdf` is replaced (`a.pdf.pdf.pdf` → `a.pdf.pdf`);
/// the match is case-sensitive and every other name is returned unchanged.
pub fn normalize_name(name: &str) -> String {
    match name.strip_suffix(".pdf.pdf") {
        Some(stem) => format!("{}.pdf", stem),
        None => name.to_string(),
    }
}

/// Validate and compose a single document whose bytes are already in memory
pub fn process_document(
    compositor: &PageCompositor,
    validator: &PageCountValidator,
    display_name: &str,
    bytes: &[u8],
) -> ItemOutcome {
    let skipped = |reason| {
        ItemOutcome::Skipped(SkippedDocument {
            name: display_name.to_string(),
            reason,
        })
    };

    let doc = match load_document(bytes) {
        Ok(doc) => doc,
        Err(e) => return skipped(SkipReason::Malformed(e.to_string())),
    };

    if !validator.validate(&doc) {
        return skipped(SkipReason::PageCountMismatch {
            expected: validator.expected(),
            actual: page_count(&doc),
        });
    }

    match compositor.compose(&doc) {
        Ok(bytes) => ItemOutcome::Composed(ComposedDocument {
            name: format!("{}{}", compositor.config().output_prefix, display_name),
            bytes,
        }),
        Err(Error::MalformedDocument(e)) => skipped(SkipReason::Malformed(e)),
        Err(e) => skipped(SkipReason::ComposeFailed(e.to_string())),
    }
}

/// Drives fetch, validation and compositing for each document in turn
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    compositor: Arc<PageCompositor>,
    validator: PageCountValidator,
    config: BatchConfig,
}

impl BatchProcessor {
    pub fn new(compositor: Arc<PageCompositor>, config: BatchConfig) -> Result<Self> {
        config.validate()?;
        let validator = PageCountValidator::new(compositor.config().expected_page_count);
        Ok(Self {
            compositor,
            validator,
            config,
        })
    }

    pub fn compositor(&self) -> &PageCompositor {
        &self.compositor
    }

    /// Process every document in order and account for each exactly once
    pub async fn run<F>(&self, fetcher: &F, documents: &[DocumentRef]) -> BatchOutcome
    where
        F: DocumentFetcher + ?Sized,
    {
        info!("Processing {} documents", documents.len());
        let mut outcome = BatchOutcome::default();

        for document in documents {
            let name = normalize_name(&document.name);

            let item = match self.fetch_with_retry(fetcher, document).await {
                Ok(bytes) => self.process_bytes(name, bytes).await,
                Err(e) => ItemOutcome::Skipped(SkippedDocument {
                    name,
                    reason: SkipReason::FetchFailed(e.to_string()),
                }),
            };

            match &item {
                ItemOutcome::Composed(doc) => info!("Composed {}", doc.name),
                ItemOutcome::Skipped(doc) => warn!("Skipped {}: {}", doc.name, doc.reason),
            }
            outcome.record(item);
        }

        if outcome.all_succeeded() {
            info!("Batch finished: all {} documents composed", outcome.total());
        } else {
            warn!(
                "Batch finished: {} composed, {} skipped",
                outcome.composed.len(),
                outcome.skipped.len()
            );
        }
        outcome
    }

    /// Validate and compose one in-memory document off the async runtime
    pub async fn process_bytes(&self, display_name: String, bytes: Vec<u8>) -> ItemOutcome {
        let compositor = Arc::clone(&self.compositor);
        let validator = self.validator;
        let name = display_name.clone();

        let task = tokio::task::spawn_blocking(move || {
            process_document(&compositor, &validator, &name, &bytes)
        });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => ItemOutcome::Skipped(SkippedDocument {
                name: display_name,
                reason: SkipReason::ComposeFailed(e.to_string()),
            }),
        }
    }

    async fn fetch_with_retry<F>(&self, fetcher: &F, document: &DocumentRef) -> Result<Vec<u8>>
    where
        F: DocumentFetcher + ?Sized,
    {
        let attempts = self.config.fetch_attempts;
        let mut attempt = 1;

        loop {
            match fetcher.fetch(document).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) if attempt >= attempts => return Err(e),
                Err(e) => warn!(
                    "Fetch attempt {}/{} for {} failed: {}",
                    attempt, attempts, document.name, e
                ),
            }

            tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
            attempt += 1;
        }
    }
}
