//! Zip packaging of a finished batch
//!
//! The archive is assembled fully in memory and handed back as one value.

use std::collections::HashSet;
use std::io::{Cursor, Write};
use chrono::{Local, NaiveDateTime};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};
use crate::batch::BatchOutcome;
use crate::config::ArchiveConfig;
use crate::error::Result;

/// Manifest header written when at least one document was skipped
pub const SKIPPED_HEADER: &str = "Skipped Files:";

/// Manifest body written when nothing was skipped
pub const ALL_SUCCEEDED: &str = "All files processed successfully.";

/// A finished archive: file name plus complete zip bytes
#[derive(Debug, Clone, PartialEq)]
pub struct Archive {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Text of the skip manifest
pub fn manifest_text<S: AsRef<str>>(skipped: &[S]) -> String {
    if skipped.is_empty() {
        return ALL_SUCCEEDED.to_string();
    }

    let mut text = String::from(SKIPPED_HEADER);
    for name in skipped {
        text.push('\n');
        text.push_str(name.as_ref());
    }
    text
}

/// Archive file name for a given local time
///
/// Format: `<prefix>_MM-DD_hh-mm_AM.zip` on a 12-hour clock.
/// Example: `spread_Cover_of_pdfs_03-05_09-07_PM.zip`
pub fn archive_name(prefix: &str, timestamp: &NaiveDateTime) -> String {
    format!("{}_{}.zip", prefix, timestamp.format("%m-%d_%I-%M_%p"))
}

/// Builds the downloadable archive for a batch
#[derive(Debug, Clone, Default)]
pub struct ArchiveBuilder {
    config: ArchiveConfig,
}

impl ArchiveBuilder {
    pub fn new(config: ArchiveConfig) -> Self {
        Self { config }
    }

    /// Build the archive, naming it after the current local time
    pub fn build(&self, outcome: &BatchOutcome) -> Result<Archive> {
        self.build_at(outcome, &Local::now().naive_local())
    }

    /// Build the archive with an explicit timestamp
    pub fn build_at(&self, outcome: &BatchOutcome, timestamp: &NaiveDateTime) -> Result<Archive> {
        Ok(Archive {
            name: archive_name(&self.config.name_prefix, timestamp),
            bytes: self.write_zip(outcome)?,
        })
    }

    /// Zip every composed document plus exactly one manifest entry
    pub fn write_zip(&self, outcome: &BatchOutcome) -> Result<Vec<u8>> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        // Zip entries must be unique; the manifest name is reserved up front
        let mut used: HashSet<String> = HashSet::new();
        used.insert(self.config.manifest_name.clone());

        for doc in &outcome.composed {
            let entry = unique_entry_name(&mut used, &doc.name);
            zip.start_file(entry, options)?;
            zip.write_all(&doc.bytes)?;
        }

        zip.start_file(self.config.manifest_name.as_str(), options)?;
        zip.write_all(manifest_text(&outcome.skipped_names()).as_bytes())?;

        Ok(zip.finish()?.into_inner())
    }
}

/// Pick `name`, or `name (2)`, `name (3)`… before the extension when taken
fn unique_entry_name(used: &mut HashSet<String>, name: &str) -> String {
    if used.insert(name.to_string()) {
        return name.to_string();
    }

    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, format!(".{}", ext)),
        _ => (name, String::new()),
    };

    let mut n = 2;
    loop {
        let candidate = format!("{} ({}){}", stem, n, ext);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
