//! HTTP front end
//!
//! `GET /` serves the submission form; `POST /process-pdfs` takes the
//! url-encoded `driveLink` field and answers with the zip archive.

use std::sync::Arc;
use axum::extract::{Form, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use crate::archive::Archive;
use crate::error::{Error, Result};
use crate::service::CoverSpreadService;
use crate::source::{DocumentFetcher, FolderLister};

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Cover Spread Generator</title>
</head>
<body>
  <h1>Cover Spread Generator</h1>
  <form action="/process-pdfs" method="post">
    <label for="driveLink">Google Drive folder link</label>
    <input type="url" id="driveLink" name="driveLink" size="80" required>
    <button type="submit">Generate</button>
  </form>
</body>
</html>
"#;

/// Form body of a submission
#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    #[serde(rename = "driveLink", default)]
    pub drive_link: String,
}

/// Build the application router around a shared service
pub fn router<S>(service: Arc<CoverSpreadService<S>>) -> Router
where
    S: FolderLister + DocumentFetcher + 'static,
{
    Router::new()
        .route("/", get(index))
        .route("/process-pdfs", post(process_pdfs::<S>))
        .with_state(service)
}

/// Bind `addr` and serve until the process is stopped
pub async fn serve<S>(addr: &str, service: Arc<CoverSpreadService<S>>) -> Result<()>
where
    S: FolderLister + DocumentFetcher + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    info!("Server running at http://{}", listener.local_addr()?);
    axum::serve(listener, router(service)).await?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn process_pdfs<S>(
    State(service): State<Arc<CoverSpreadService<S>>>,
    Form(request): Form<ProcessRequest>,
) -> Response
where
    S: FolderLister + DocumentFetcher + 'static,
{
    match service.process_folder(&request.drive_link).await {
        Ok(archive) => {
            info!("Sending {}", archive.name);
            archive_response(archive)
        }
        Err(e) => error_response(&e),
    }
}

/// Successful reply: the zip as a download
pub fn archive_response(archive: Archive) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", archive.name);
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        archive.bytes,
    )
        .into_response()
}

/// Map a pipeline error to its status and plain-text message
pub fn error_response(error: &Error) -> Response {
    match error {
        Error::InvalidReference(reference) => {
            warn!("Rejected folder link: {:?}", reference);
            (StatusCode::BAD_REQUEST, "Invalid Google Drive folder link.").into_response()
        }
        // Informational, not a failure
        Error::EmptyFolder => (StatusCode::OK, "No PDF files found in the folder.").into_response(),
        other => {
            error!("Processing failed: {}", other);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error while processing PDFs.").into_response()
        }
    }
}
