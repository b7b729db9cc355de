//! Handler for `POST /api/documents/search`.

use std::sync::Arc;

use axum::{Form, Json, extract::State};
use sift_core::{document::DocumentSearchResult, service::QueryService};

use crate::{
  error::{ApiError, require},
  query::QueryForm,
};

/// `POST /api/documents/search` with form `query`.
pub async fn search<S>(
  State(service): State<Arc<S>>,
  Form(form): Form<QueryForm>,
) -> Result<Json<DocumentSearchResult>, ApiError>
where
  S: QueryService,
{
  require("query", &form.query)?;
  let results = service
    .search_documents(&form.query)
    .await
    .map_err(ApiError::service)?;
  Ok(Json(results))
}
