//! Handler for `POST /api/query`.

use std::sync::Arc;

use axum::{Form, Json, extract::State};
use serde::Deserialize;
use sift_core::{query::QueryResult, service::QueryService};

use crate::error::{ApiError, require};

#[derive(Debug, Deserialize)]
pub struct QueryForm {
  #[serde(default)]
  pub query: String,
}

/// `POST /api/query` with form `query`; returns the translated and executed
/// [`QueryResult`].
pub async fn handler<S>(
  State(service): State<Arc<S>>,
  Form(form): Form<QueryForm>,
) -> Result<Json<QueryResult>, ApiError>
where
  S: QueryService,
{
  require("query", &form.query)?;
  let result = service
    .run_query(&form.query)
    .await
    .map_err(ApiError::service)?;
  Ok(Json(result))
}
