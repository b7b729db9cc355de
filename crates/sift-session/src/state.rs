//! Session state: everything the session has learned so far.

use sift_core::{
  document::{DocumentSearchResult, UploadedDocument},
  query::QueryResult,
  schema::Schema,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionState {
  /// Last connection string that connected, or the persisted one on
  /// startup.
  pub connection_string: String,
  /// Set by a successful connect; never cleared within a session.
  pub is_connected:      bool,
}

/// The data half of a session.
///
/// Only the [`Session`](crate::Session) mutates it; readers get owned copies
/// through snapshots. Failed operations never touch it, so it always holds
/// the last fully successful result of each kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
  pub connection:       ConnectionState,
  /// Present iff `connection.is_connected`.
  pub schema:           Option<Schema>,
  /// Every document accepted so far, in upload order.
  pub documents:        Vec<UploadedDocument>,
  pub query_result:     Option<QueryResult>,
  pub document_results: Option<DocumentSearchResult>,
}

impl SessionState {
  pub fn is_connected(&self) -> bool { self.connection.is_connected }

  pub(crate) fn seed_connection_string(&mut self, connection_string: String) {
    if !self.connection.is_connected {
      self.connection.connection_string = connection_string;
    }
  }

  pub(crate) fn mark_connected(&mut self, connection_string: &str, schema: Schema) {
    self.connection = ConnectionState {
      connection_string: connection_string.to_owned(),
      is_connected:      true,
    };
    self.schema = Some(schema);
  }

  pub(crate) fn append_documents(&mut self, files: Vec<UploadedDocument>) {
    self.documents.extend(files);
  }

  pub(crate) fn replace_query_result(&mut self, result: QueryResult) {
    self.query_result = Some(result);
  }

  pub(crate) fn replace_document_results(&mut self, results: DocumentSearchResult) {
    self.document_results = Some(results);
  }
}
