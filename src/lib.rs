//! Cover Spread Library
//!
//! Builds print-ready cover spreads from folders of PDFs. For every source
//! document with the expected page count, two configured pages are placed
//! side by side on a template page; all results are packaged into one zip
//! together with a manifest of the documents that were skipped.
//!
//! This library provides:
//! - Single-page compositing onto a template (`pdf::compose`)
//! - Page-count validation (`pdf::validate`)
//! - Sequential batch processing with per-item isolation (`batch`)
//! - Zip packaging with a skip manifest (`archive`)
//! - Google Drive and local filesystem sources (`drive`, `local`)
//! - An HTTP front end (`server`)
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use cover_spread::archive::ArchiveBuilder;
//! use cover_spread::batch::BatchProcessor;
//! use cover_spread::config::{BatchConfig, SpreadConfig};
//! use cover_spread::local::LocalFolder;
//! use cover_spread::pdf::{PageCompositor, Template};
//! use cover_spread::service::CoverSpreadService;
//!
//! # async fn run() -> cover_spread::Result<()> {
//! let template = Template::load(Path::new("public/pdfs/cover_image.pdf"))?;
//! let compositor = Arc::new(PageCompositor::new(template, SpreadConfig::default())?);
//! let processor = BatchProcessor::new(compositor, BatchConfig::default())?;
//! let source = Arc::new(LocalFolder::from_patterns(&["decks/".to_string()])?);
//!
//! let service = CoverSpreadService::new(source, processor, ArchiveBuilder::default());
//! let archive = service.process_folder_id("decks").await?;
//! std::fs::write(&archive.name, &archive.bytes)?;
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod batch;
pub mod config;
pub mod drive;
pub mod error;
pub mod layout;
pub mod local;
pub mod pdf;
pub mod server;
pub mod service;
pub mod source;

// Re-export commonly used items
pub use error::{Error, Result};
