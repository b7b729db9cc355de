//! Result payload of a natural-language database query.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The payload returned by the query service.
///
/// Only the fields the client renders are typed; everything else the backend
/// sends is kept verbatim in [`extra`](Self::extra).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub query_id:            Option<Value>,
  /// The natural-language text as the backend received it.
  #[serde(default)]
  pub original_query:      String,
  /// Generated SQL.
  #[serde(default)]
  pub sql_query:           String,
  /// Classification, e.g. `"select"`, `"sql"`, `"hybrid"`.
  #[serde(default)]
  pub query_type:          String,
  #[serde(default)]
  pub performance_metrics: PerformanceMetrics,
  /// Where the answer came from (`"database"`, `"documents"`).
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub sources:             Vec<String>,
  #[serde(flatten)]
  pub extra:               Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
  /// Milliseconds spent executing against the database.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub execution_time: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cache_hit:      Option<bool>,
  #[serde(flatten)]
  pub extra:          Map<String, Value>,
}

impl PerformanceMetrics {
  /// `"42ms"`, or `"N/A"` when the backend did not report a time.
  pub fn execution_time_label(&self) -> String {
    match self.execution_time {
      Some(ms) => format!("{ms}ms"),
      None => "N/A".to_owned(),
    }
  }
}
