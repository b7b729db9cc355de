//! HTTP surface for a Sift backend.
//!
//! Exposes an axum [`Router`] backed by any [`sift_core::service::QueryService`].
//! Request bodies are form-encoded (multipart for uploads); every response
//! body is JSON. Auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = sift_api::api_router(Arc::new(service));
//! axum::serve(listener, app).await?;
//! ```

pub mod documents;
pub mod error;
pub mod ingest;
pub mod query;

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit, routing::post};
use sift_core::service::QueryService;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Largest accepted upload batch.
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Build a fully-materialised API router for `service`, with every route
/// under `/api`.
pub fn api_router<S>(service: Arc<S>) -> Router<()>
where
  S: QueryService + 'static,
{
  Router::new()
    // Ingestion
    .route("/api/ingest/database", post(ingest::database::<S>))
    .route(
      "/api/ingest/documents",
      post(ingest::documents::<S>).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
    )
    // Queries
    .route("/api/query", post(query::handler::<S>))
    .route("/api/documents/search", post(documents::search::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(service)
}
