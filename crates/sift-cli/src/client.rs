//! Async HTTP client for a Sift backend.
//!
//! Speaks the form/multipart wire format served by `sift-api` and implements
//! [`QueryService`] so a [`Session`](sift_session::Session) can drive it.

use std::time::Duration;

use reqwest::{
  Client, StatusCode,
  multipart::{Form, Part},
};
use serde::de::DeserializeOwned;
use sift_core::{
  document::{DocumentSearchResult, DocumentUpload},
  query::QueryResult,
  service::{ConnectResponse, QueryService, UploadResponse},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
  #[error(transparent)]
  Http(#[from] reqwest::Error),

  #[error("POST {path} returned {status}")]
  Status {
    path:   &'static str,
    status: StatusCode,
  },
}

/// Async HTTP client for the Sift JSON API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpClient {
  client:   Client,
  base_url: String,
}

impl HttpClient {
  pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self {
      client,
      base_url: base_url.into(),
    })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.base_url.trim_end_matches('/'), path)
  }

  async fn post_form<T: DeserializeOwned>(
    &self,
    path: &'static str,
    form: &[(&str, &str)],
  ) -> Result<T, ClientError> {
    let resp = self.client.post(self.url(path)).form(form).send().await?;
    Self::decode(path, resp).await
  }

  async fn decode<T: DeserializeOwned>(
    path: &'static str,
    resp: reqwest::Response,
  ) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
      tracing::debug!(path, %status, "backend rejected request");
      return Err(ClientError::Status { path, status });
    }
    Ok(resp.json().await?)
  }
}

// ─── QueryService ────────────────────────────────────────────────────────────

impl QueryService for HttpClient {
  type Error = ClientError;

  /// `POST /api/ingest/database`
  async fn connect(&self, connection_string: &str) -> Result<ConnectResponse, ClientError> {
    self
      .post_form("/ingest/database", &[("connection_string", connection_string)])
      .await
  }

  /// `POST /api/query`
  async fn run_query(&self, query: &str) -> Result<QueryResult, ClientError> {
    self.post_form("/query", &[("query", query)]).await
  }

  /// `POST /api/ingest/documents`, one `files` part per document.
  async fn upload_documents(
    &self,
    files: Vec<DocumentUpload>,
  ) -> Result<UploadResponse, ClientError> {
    const PATH: &str = "/ingest/documents";

    let mut form = Form::new();
    for file in files {
      let part = Part::bytes(file.bytes)
        .file_name(file.filename)
        .mime_str(&file.content_type)?;
      form = form.part("files", part);
    }

    let resp = self
      .client
      .post(self.url(PATH))
      .multipart(form)
      .send()
      .await?;
    Self::decode(PATH, resp).await
  }

  /// `POST /api/documents/search`
  async fn search_documents(&self, query: &str) -> Result<DocumentSearchResult, ClientError> {
    self.post_form("/documents/search", &[("query", query)]).await
  }
}
