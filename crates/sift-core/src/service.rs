//! The `QueryService` trait: the external request/response boundary.
//!
//! Schema introspection, natural-language-to-SQL translation and document
//! ranking all live behind this trait. The session only knows the shapes
//! that cross it. `sift-cli` implements it over HTTP; `sift-api` exposes any
//! implementation over the same wire contract.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
  document::{DocumentSearchResult, DocumentUpload, UploadedDocument},
  query::QueryResult,
  schema::Schema,
};

// ─── Responses ───────────────────────────────────────────────────────────────

/// Response to a connect request.
///
/// A response without a schema is a failed connection; the caller decides
/// that, the boundary only reports what came back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectResponse {
  /// Backend job handle; opaque, never interpreted.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub job_id: Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status: Option<String>,
  #[serde(default)]
  pub schema: Option<Schema>,
}

/// Response to a document upload batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub job_id: Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status: Option<String>,
  pub files:  Vec<UploadedDocument>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the backend the session talks to.
///
/// All methods return `Send` futures so implementations can be driven from
/// spawned tasks and served from axum handlers.
pub trait QueryService: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Attach to the data source named by `connection_string` and discover
  /// its schema.
  fn connect<'a>(
    &'a self,
    connection_string: &'a str,
  ) -> impl Future<Output = Result<ConnectResponse, Self::Error>> + Send + 'a;

  /// Translate and run a natural-language query against the data source.
  fn run_query<'a>(
    &'a self,
    query: &'a str,
  ) -> impl Future<Output = Result<QueryResult, Self::Error>> + Send + 'a;

  /// Send a batch of files to the document corpus.
  fn upload_documents(
    &self,
    files: Vec<DocumentUpload>,
  ) -> impl Future<Output = Result<UploadResponse, Self::Error>> + Send + '_;

  /// Rank corpus documents against a natural-language query.
  fn search_documents<'a>(
    &'a self,
    query: &'a str,
  ) -> impl Future<Output = Result<DocumentSearchResult, Self::Error>> + Send + 'a;
}
