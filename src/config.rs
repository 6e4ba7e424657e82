//! Runtime configuration
//!
//! Every tunable used by the pipeline lives here so nothing downstream carries
//! inline literals. Defaults reproduce the reference cover spread layout.

use crate::error::{Error, Result};

/// Environment variable holding the Google Drive API key
pub const API_KEY_ENV: &str = "GOOGLE_DRIVE_API_KEY";

/// Page selection, validation and placement constants for one cover spread
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadConfig {
    /// Exact page count a source document must have
    pub expected_page_count: usize,
    /// Zero-based source page drawn on the left half
    pub left_page_index: usize,
    /// Zero-based source page drawn on the right half
    pub right_page_index: usize,
    /// Print bleed in millimetres, added to both coordinates
    pub bleed_mm: f32,
    /// Side of the square each placed page is scaled to, in points
    pub image_size: f32,
    /// Horizontal distance from the bleed edge to the left image, in points
    pub left_inset: f32,
    /// Vertical distance from the bleed edge to both images, in points
    pub vertical_offset: f32,
    /// Space between the left and right images, in points
    pub horizontal_gap: f32,
    /// Prefix added to every composed output name
    pub output_prefix: String,
}

impl Default for SpreadConfig {
    fn default() -> Self {
        Self {
            expected_page_count: 17,
            left_page_index: 16,
            right_page_index: 0,
            bleed_mm: 5.0,
            image_size: 582.525,
            left_inset: 67.0,
            vertical_offset: 167.0,
            horizontal_gap: 20.0,
            output_prefix: "cover_page_".to_string(),
        }
    }
}

impl SpreadConfig {
    /// Check that the configuration can never produce an out-of-range page
    /// lookup for a document that passed validation.
    pub fn validate(&self) -> Result<()> {
        if self.expected_page_count == 0 {
            return Err(Error::InvalidConfig(
                "expected page count must be at least 1".to_string(),
            ));
        }

        for (label, index) in [
            ("left", self.left_page_index),
            ("right", self.right_page_index),
        ] {
            if index >= self.expected_page_count {
                return Err(Error::InvalidConfig(format!(
                    "{} page index {} is outside a {}-page document",
                    label, index, self.expected_page_count
                )));
            }
        }

        if !self.image_size.is_finite() || self.image_size <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "image size must be positive, got {}",
                self.image_size
            )));
        }

        let offsets = [
            ("bleed", self.bleed_mm),
            ("left inset", self.left_inset),
            ("vertical offset", self.vertical_offset),
            ("horizontal gap", self.horizontal_gap),
        ];
        if let Some((label, value)) = offsets.iter().find(|(_, v)| !v.is_finite()) {
            return Err(Error::InvalidConfig(format!("{} is not a finite number: {}", label, value)));
        }

        Ok(())
    }
}

/// Archive naming and manifest settings
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveConfig {
    /// Prefix of the generated archive file name
    pub name_prefix: String,
    /// Name of the manifest entry inside the archive
    pub manifest_name: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            name_prefix: "spread_Cover_of_pdfs".to_string(),
            manifest_name: "skipped_files.txt".to_string(),
        }
    }
}

/// Per-batch processing policy
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    /// How many times a document download is attempted before it is skipped
    pub fetch_attempts: u32,
    /// Pause between download attempts, in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            fetch_attempts: 1,
            retry_delay_ms: 500,
        }
    }
}

impl BatchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.fetch_attempts == 0 {
            return Err(Error::InvalidConfig(
                "fetch attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Google Drive endpoints and credentials
#[derive(Clone, PartialEq)]
pub struct DriveConfig {
    /// API key used for the files listing
    pub api_key: String,
    /// Base URL of the Drive v3 API
    pub api_base: String,
    /// Base URL used for file downloads
    pub download_base: String,
}

impl std::fmt::Debug for DriveConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveConfig")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("download_base", &self.download_base)
            .finish()
    }
}

impl DriveConfig {
    /// Build a config for the public Google endpoints
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::MissingApiKey);
        }

        Ok(Self {
            api_key,
            api_base: "https://www.googleapis.com".to_string(),
            download_base: "https://drive.google.com".to_string(),
        })
    }

    /// Read the API key from the environment, failing if it is absent
    pub fn from_env() -> Result<Self> {
        let key = std::env::var(API_KEY_ENV).map_err(|_| Error::MissingApiKey)?;
        Self::new(key)
    }

    /// Point both endpoints at another host (used for tests and proxies)
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        self.api_base = base.clone();
        self.download_base = base;
        self
    }
}
