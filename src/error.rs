//! Error types for the cover spread library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the cover spread library
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Zip archive error
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Document bytes could not be parsed as a usable PDF
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// A page index required for compositing does not exist
    #[error("Page index {index} out of range (document has {page_count} pages)")]
    PageIndexOutOfRange { index: usize, page_count: usize },

    /// Configuration rejected at startup
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No API key was supplied for the Drive client
    #[error("Missing Google Drive API key (set GOOGLE_DRIVE_API_KEY)")]
    MissingApiKey,

    /// Submitted folder reference has no recognizable folder id
    #[error("Invalid Google Drive folder link: {0}")]
    InvalidReference(String),

    /// Listing succeeded but contained no eligible documents
    #[error("No PDF files found in the folder")]
    EmptyFolder,

    /// The folder listing itself failed
    #[error("Folder listing failed: {0}")]
    Listing(String),

    /// Downloading a single document failed
    #[error("Fetch failed for {name}: {reason}")]
    FetchFailed { name: String, reason: String },

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Invalid glob pattern
    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// No files matched pattern
    #[error("No PDF files found matching pattern: {0}")]
    NoFilesMatched(String),

    /// General error
    #[error("{0}")]
    General(String),
}
