//! Local filesystem source
//!
//! Lets the batch pipeline run against PDFs on disk: explicit paths, glob
//! patterns, or directories (which expand to their `*.pdf` files).

use std::path::{Path, PathBuf};
use async_trait::async_trait;
use glob::glob;
use tracing::warn;
use crate::error::{Error, Result};
use crate::source::{DocumentFetcher, DocumentRef, FolderLister};

/// A fixed set of PDF files resolved up front
#[derive(Debug, Clone, Default)]
pub struct LocalFolder {
    paths: Vec<PathBuf>,
}

impl LocalFolder {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    /// Resolve paths, glob patterns and directories into a sorted file list
    pub fn from_patterns(patterns: &[String]) -> Result<Self> {
        let mut paths = Vec::new();

        for pattern in patterns {
            let path = Path::new(pattern);
            if path.is_dir() {
                let joined = path.join("*.pdf");
                paths.extend(expand_glob(&joined.to_string_lossy())?);
            } else if is_glob(pattern) {
                paths.extend(expand_glob(pattern)?);
            } else if path.exists() {
                paths.push(path.to_path_buf());
            } else {
                return Err(Error::FileNotFound(path.to_path_buf()));
            }
        }

        // Sort for a stable processing order
        paths.sort();
        paths.dedup();

        Ok(Self { paths })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Document references for every resolved file; the id is the full path
    pub fn documents(&self) -> Vec<DocumentRef> {
        self.paths
            .iter()
            .map(|path| {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                DocumentRef::new(path.display().to_string(), name)
            })
            .collect()
    }
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?') || pattern.contains('[')
}

fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries = glob(pattern).map_err(|e| Error::InvalidGlob(format!("{}: {}", pattern, e)))?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => paths.push(path),
            Ok(_) => {}
            Err(e) => warn!("Glob error for {}: {}", pattern, e),
        }
    }

    if paths.is_empty() {
        return Err(Error::NoFilesMatched(pattern.to_string()));
    }
    Ok(paths)
}

#[async_trait]
impl FolderLister for LocalFolder {
    /// The folder id is ignored; the file set was fixed at construction
    async fn list_documents(&self, _folder_id: &str) -> Result<Vec<DocumentRef>> {
        Ok(self.documents())
    }
}

#[async_trait]
impl DocumentFetcher for LocalFolder {
    async fn fetch(&self, document: &DocumentRef) -> Result<Vec<u8>> {
        tokio::fs::read(&document.id)
            .await
            .map_err(|e| Error::FetchFailed {
                name: document.name.clone(),
                reason: e.to_string(),
            })
    }
}
