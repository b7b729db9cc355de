//! Handlers for `/api/ingest/*` endpoints.
//!
//! | Method | Path | Body |
//! |--------|------|------|
//! | `POST` | `/api/ingest/database` | form `connection_string` |
//! | `POST` | `/api/ingest/documents` | multipart, one `files` part per document |

use std::sync::Arc;

use axum::{
  Form, Json,
  extract::{Multipart, State},
};
use serde::Deserialize;
use sift_core::{
  document::{DocumentUpload, content_type_for},
  service::{ConnectResponse, QueryService, UploadResponse},
};

use crate::error::{ApiError, require};

/// Name of the multipart field carrying each uploaded file.
pub const FILES_FIELD: &str = "files";

// ─── Database ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DatabaseForm {
  #[serde(default)]
  pub connection_string: String,
}

/// `POST /api/ingest/database`
pub async fn database<S>(
  State(service): State<Arc<S>>,
  Form(form): Form<DatabaseForm>,
) -> Result<Json<ConnectResponse>, ApiError>
where
  S: QueryService,
{
  require("connection_string", &form.connection_string)?;
  let resp = service
    .connect(&form.connection_string)
    .await
    .map_err(ApiError::service)?;
  Ok(Json(resp))
}

// ─── Documents ───────────────────────────────────────────────────────────────

/// `POST /api/ingest/documents`
///
/// Parts with any other field name are skipped. A `files` part without a
/// file name, or a request with no files at all, is a bad request.
pub async fn documents<S>(
  State(service): State<Arc<S>>,
  mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError>
where
  S: QueryService,
{
  let mut files = Vec::new();
  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| ApiError::BadRequest(e.body_text()))?
  {
    if field.name() != Some(FILES_FIELD) {
      continue;
    }
    let filename = field
      .file_name()
      .map(str::to_owned)
      .ok_or_else(|| ApiError::BadRequest("file part without a file name".into()))?;
    let content_type = field
      .content_type()
      .map(str::to_owned)
      .unwrap_or_else(|| content_type_for(&filename).to_owned());
    let bytes = field
      .bytes()
      .await
      .map_err(|e| ApiError::BadRequest(e.body_text()))?;

    files.push(DocumentUpload {
      filename,
      content_type,
      bytes: bytes.to_vec(),
    });
  }

  if files.is_empty() {
    return Err(ApiError::BadRequest("no files in upload".into()));
  }

  tracing::debug!(count = files.len(), "received upload batch");
  let resp = service
    .upload_documents(files)
    .await
    .map_err(ApiError::service)?;
  Ok(Json(resp))
}
