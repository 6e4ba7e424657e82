//! Google Drive folder source
//!
//! Listing goes through the Drive v3 files endpoint with an API key; downloads
//! use the public `uc?export=download` link for each file id.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use crate::config::DriveConfig;
use crate::error::{Error, Result};
use crate::source::{DocumentFetcher, DocumentRef, FolderLister};

const PDF_MIME_TYPE: &str = "application/pdf";

/// One page of the files listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DocumentRef>,
    next_page_token: Option<String>,
}

/// Drive-backed implementation of [`FolderLister`] and [`DocumentFetcher`]
#[derive(Debug, Clone)]
pub struct GoogleDriveClient {
    client: reqwest::Client,
    config: DriveConfig,
}

impl GoogleDriveClient {
    pub fn new(config: DriveConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &DriveConfig {
        &self.config
    }

    fn files_url(&self) -> String {
        format!("{}/drive/v3/files", self.config.api_base)
    }

    fn download_url(&self) -> String {
        format!("{}/uc", self.config.download_base)
    }

    async fn list_page(&self, folder_id: &str, page_token: Option<&str>) -> Result<FileList> {
        let query = format!("'{}' in parents and mimeType='{}'", folder_id, PDF_MIME_TYPE);
        let mut params = vec![
            ("q", query.as_str()),
            ("fields", "nextPageToken,files(id,name)"),
            ("key", self.config.api_key.as_str()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let response = self
            .client
            .get(self.files_url())
            .query(&params)
            .send()
            .await
            .map_err(|e| Error::Listing(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Listing(format!("listing request returned {}", status)));
        }

        response
            .json::<FileList>()
            .await
            .map_err(|e| Error::Listing(format!("unreadable listing response: {}", e.without_url())))
    }
}

#[async_trait]
impl FolderLister for GoogleDriveClient {
    async fn list_documents(&self, folder_id: &str) -> Result<Vec<DocumentRef>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.list_page(folder_id, page_token.as_deref()).await?;
            debug!("Listing page returned {} files", page.files.len());
            documents.extend(page.files);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(documents)
    }
}

#[async_trait]
impl DocumentFetcher for GoogleDriveClient {
    async fn fetch(&self, document: &DocumentRef) -> Result<Vec<u8>> {
        let failed = |reason: String| Error::FetchFailed {
            name: document.name.clone(),
            reason,
        };

        let response = self
            .client
            .get(self.download_url())
            .query(&[("export", "download"), ("id", document.id.as_str())])
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(failed(format!("server returned {}", status)));
        }

        let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_list_parsing() {
        let json = r#"{
            "nextPageToken": "abc",
            "files": [
                {"id": "1", "name": "a.pdf"},
                {"id": "2", "name": "b.pdf.pdf"}
            ]
        }"#;
        let list: FileList = serde_json::from_str(json).unwrap();
        assert_eq!(list.files.len(), 2);
        assert_eq!(list.files[1], DocumentRef::new("2", "b.pdf.pdf"));
        assert_eq!(list.next_page_token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_file_list_without_files_is_empty() {
        let list: FileList = serde_json::from_str("{}").unwrap();
        assert!(list.files.is_empty());
        assert!(list.next_page_token.is_none());
    }

    #[test]
    fn test_urls_follow_config() {
        let config = DriveConfig::new("key").unwrap().with_base_url("http://localhost:1234");
        let client = GoogleDriveClient::new(config);
        assert_eq!(client.files_url(), "http://localhost:1234/drive/v3/files");
        assert_eq!(client.download_url(), "http://localhost:1234/uc");
    }

    #[tokio::test]
    async fn test_transport_failure_hides_api_key() {
        // Nothing listens on port 1
        let config = DriveConfig::new("secret-key-123")
            .unwrap()
            .with_base_url("http://127.0.0.1:1");
        let client = GoogleDriveClient::new(config);

        let err = client.list_documents("folder").await.unwrap_err();
        assert!(matches!(err, Error::Listing(_)));
        assert!(!err.to_string().contains("secret-key-123"));
        assert!(!format!("{:?}", err).contains("secret-key-123"));
    }
}
