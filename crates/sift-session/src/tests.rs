//! Scenario tests for `Session` against a scripted service.

use std::{
  collections::HashMap,
  future,
  sync::{Arc, Mutex},
  time::Duration,
};

use serde_json::json;
use sift_core::{
  document::{DocumentSearchResult, DocumentUpload, UploadedDocument},
  query::QueryResult,
  schema::Schema,
  service::{ConnectResponse, QueryService, UploadResponse},
  settings::{CONNECTION_STRING_KEY, SettingsStore},
  status::{Notification, OperationKind},
};
use tokio::sync::Notify;

use crate::{Session, SessionConfig, SessionError, View};

// ─── Scripted service ────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct MockError(String);

/// What the mock does when an operation reaches it.
#[derive(Clone)]
enum Reply<T> {
  Ok(T),
  Fail,
  /// Never resolves.
  Hang,
  /// Resolves with the value once the gate is notified.
  Gated(Arc<Notify>, T),
}

impl<T: Clone> Reply<T> {
  async fn resolve(self) -> Result<T, MockError> {
    match self {
      Reply::Ok(value) => Ok(value),
      Reply::Fail => Err(MockError("backend returned 500".into())),
      Reply::Hang => future::pending().await,
      Reply::Gated(gate, value) => {
        gate.notified().await;
        Ok(value)
      }
    }
  }
}

struct Script {
  calls:   Mutex<Vec<OperationKind>>,
  connect: Mutex<Reply<ConnectResponse>>,
  query:   Mutex<Reply<QueryResult>>,
  upload:  Mutex<Reply<()>>,
  search:  Mutex<Reply<DocumentSearchResult>>,
}

#[derive(Clone)]
struct MockService(Arc<Script>);

impl MockService {
  fn new() -> Self {
    Self(Arc::new(Script {
      calls:   Mutex::new(Vec::new()),
      connect: Mutex::new(Reply::Ok(ConnectResponse {
        schema: Some(employees_schema()),
        ..ConnectResponse::default()
      })),
      query:   Mutex::new(Reply::Ok(python_query_result())),
      upload:  Mutex::new(Reply::Ok(())),
      search:  Mutex::new(Reply::Ok(DocumentSearchResult {
        query:     "python".into(),
        documents: vec![],
      })),
    }))
  }

  fn on_connect(&self, reply: Reply<ConnectResponse>) { *self.0.connect.lock().unwrap() = reply; }

  fn on_query(&self, reply: Reply<QueryResult>) { *self.0.query.lock().unwrap() = reply; }

  fn on_upload(&self, reply: Reply<()>) { *self.0.upload.lock().unwrap() = reply; }

  fn on_search(&self, reply: Reply<DocumentSearchResult>) { *self.0.search.lock().unwrap() = reply; }

  fn calls(&self) -> Vec<OperationKind> { self.0.calls.lock().unwrap().clone() }

  fn record(&self, kind: OperationKind) { self.0.calls.lock().unwrap().push(kind); }
}

impl QueryService for MockService {
  type Error = MockError;

  async fn connect(&self, _connection_string: &str) -> Result<ConnectResponse, MockError> {
    self.record(OperationKind::Connect);
    let reply = self.0.connect.lock().unwrap().clone();
    reply.resolve().await
  }

  async fn run_query(&self, query: &str) -> Result<QueryResult, MockError> {
    self.record(OperationKind::Query);
    let reply = self.0.query.lock().unwrap().clone();
    let mut result = reply.resolve().await?;
    result.original_query = query.to_owned();
    Ok(result)
  }

  async fn upload_documents(
    &self,
    files: Vec<DocumentUpload>,
  ) -> Result<UploadResponse, MockError> {
    self.record(OperationKind::Upload);
    let reply = self.0.upload.lock().unwrap().clone();
    reply.resolve().await?;
    Ok(UploadResponse {
      files: files
        .into_iter()
        .map(|f| UploadedDocument {
          size:         Some(f.bytes.len() as u64),
          filename:     f.filename,
          content_type: f.content_type,
        })
        .collect(),
      ..UploadResponse::default()
    })
  }

  async fn search_documents(&self, _query: &str) -> Result<DocumentSearchResult, MockError> {
    self.record(OperationKind::Search);
    let reply = self.0.search.lock().unwrap().clone();
    reply.resolve().await
  }
}

// ─── In-memory settings ──────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct MemorySettings {
  values: Arc<Mutex<HashMap<String, String>>>,
  broken: bool,
}

impl MemorySettings {
  fn with(key: &str, value: &str) -> Self {
    let settings = Self::default();
    settings
      .values
      .lock()
      .unwrap()
      .insert(key.to_owned(), value.to_owned());
    settings
  }

  fn broken() -> Self {
    Self {
      broken: true,
      ..Self::default()
    }
  }

  fn value(&self, key: &str) -> Option<String> { self.values.lock().unwrap().get(key).cloned() }
}

impl SettingsStore for MemorySettings {
  type Error = MockError;

  async fn get(&self, key: &str) -> Result<Option<String>, MockError> {
    if self.broken {
      return Err(MockError("disk on fire".into()));
    }
    Ok(self.value(key))
  }

  async fn set(&self, key: &str, value: &str) -> Result<(), MockError> {
    if self.broken {
      return Err(MockError("disk on fire".into()));
    }
    self
      .values
      .lock()
      .unwrap()
      .insert(key.to_owned(), value.to_owned());
    Ok(())
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

const CONN: &str = "postgresql://u:p@host/db";

fn employees_schema() -> Schema {
  serde_json::from_value(json!({
    "tables": [{"name": "employees", "columns": [{"name": "id", "type": "int"}]}],
    "relationships": []
  }))
  .unwrap()
}

fn python_query_result() -> QueryResult {
  serde_json::from_value(json!({
    "original_query": "Show me all Python developers",
    "sql_query": "SELECT * FROM employees WHERE skills LIKE '%Python%'",
    "query_type": "select",
    "performance_metrics": {"execution_time": 42}
  }))
  .unwrap()
}

fn upload(name: &str) -> DocumentUpload { DocumentUpload::new(name, name.as_bytes().to_vec()) }

type TestSession = Session<MockService, MemorySettings>;

fn session() -> (TestSession, MockService, MemorySettings) {
  let service = MockService::new();
  let settings = MemorySettings::default();
  let session = Session::new(service.clone(), settings.clone(), SessionConfig::default());
  (session, service, settings)
}

async fn wait_until_busy(session: &TestSession) {
  while session.snapshot().busy.is_none() {
    tokio::task::yield_now().await;
  }
}

fn assert_idle(session: &TestSession) {
  let snap = session.snapshot();
  assert_eq!(snap.busy, None, "busy flag left set");
  assert_eq!(snap.progress, None, "progress left running");
}

// ─── Connect ─────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn connect_with_schema_switches_to_query_view() {
  let (session, service, settings) = session();

  session.connect(CONN).await.unwrap();

  let snap = session.snapshot();
  assert!(snap.state.is_connected());
  assert_eq!(snap.state.schema, Some(employees_schema()));
  assert_eq!(snap.state.connection.connection_string, CONN);
  assert_eq!(snap.view, View::Query);
  assert_eq!(
    snap.notification,
    Some(Notification::success("Database connected successfully!"))
  );
  assert_eq!(service.calls(), [OperationKind::Connect]);
  assert_eq!(settings.value(CONNECTION_STRING_KEY).as_deref(), Some(CONN));
  assert_idle(&session);
}

#[tokio::test(start_paused = true)]
async fn connect_with_non_uuid_job_id_still_connects() {
  let (session, service, _) = session();
  let response: ConnectResponse = serde_json::from_value(json!({
    "job_id": "job-1",
    "status": "completed",
    "schema": {
      "tables": [{"name": "employees", "columns": [{"name": "id", "type": "int"}]}],
      "relationships": []
    }
  }))
  .unwrap();
  service.on_connect(Reply::Ok(response));

  session.connect(CONN).await.unwrap();

  let snap = session.snapshot();
  assert!(snap.state.is_connected());
  assert_eq!(snap.state.schema, Some(employees_schema()));
  assert_eq!(snap.view, View::Query);
}

#[tokio::test(start_paused = true)]
async fn connect_without_schema_stays_disconnected() {
  let (session, service, settings) = session();
  service.on_connect(Reply::Ok(ConnectResponse::default()));

  let err = session.connect(CONN).await.unwrap_err();
  assert_eq!(err, SessionError::MissingSchema);

  let snap = session.snapshot();
  assert!(!snap.state.is_connected());
  assert_eq!(snap.state.schema, None);
  assert_eq!(snap.view, View::Connect);
  assert_eq!(
    snap.notification,
    Some(Notification::error(
      "Connection failed. Please check your connection string."
    ))
  );
  assert_eq!(settings.value(CONNECTION_STRING_KEY), None);
  assert_idle(&session);
}

#[tokio::test(start_paused = true)]
async fn connect_fault_leaves_connection_state_unchanged() {
  let service = MockService::new();
  let settings = MemorySettings::with(CONNECTION_STRING_KEY, "sqlite://saved.db");
  let session = Session::restore(service.clone(), settings, SessionConfig::default()).await;
  service.on_connect(Reply::Fail);

  let err = session.connect(CONN).await.unwrap_err();
  assert!(matches!(err, SessionError::Service(_)));

  let snap = session.snapshot();
  assert_eq!(snap.state.connection.connection_string, "sqlite://saved.db");
  assert!(!snap.state.connection.is_connected);
  assert_eq!(
    snap.notification,
    Some(Notification::error("Connection failed. Please try again."))
  );
  assert_idle(&session);
}

#[tokio::test(start_paused = true)]
async fn second_connect_is_rejected_once_connected() {
  let (session, service, _) = session();
  session.connect(CONN).await.unwrap();

  let err = session.connect("sqlite://other.db").await.unwrap_err();
  assert_eq!(err, SessionError::AlreadyConnected);
  assert_eq!(service.calls(), [OperationKind::Connect]);
  assert_eq!(
    session.snapshot().state.connection.connection_string,
    CONN
  );
  assert_idle(&session);
}

#[tokio::test(start_paused = true)]
async fn persist_failure_does_not_fail_connect() {
  let service = MockService::new();
  let session = Session::restore(service, MemorySettings::broken(), SessionConfig::default()).await;

  session.connect(CONN).await.unwrap();
  assert!(session.is_connected());
}

#[tokio::test(start_paused = true)]
async fn restore_seeds_connection_string_without_connecting() {
  let settings = MemorySettings::with(CONNECTION_STRING_KEY, CONN);
  let session = Session::restore(MockService::new(), settings, SessionConfig::default()).await;

  let snap = session.snapshot();
  assert_eq!(snap.state.connection.connection_string, CONN);
  assert!(!snap.state.is_connected());
  assert_eq!(snap.view, View::Connect);
}

// ─── Validation ──────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn blank_input_never_reaches_the_service() {
  let (session, service, _) = session();

  let err = session.connect("   ").await.unwrap_err();
  assert_eq!(err, SessionError::Validation("Please enter a connection string"));
  assert_eq!(
    session.snapshot().notification,
    Some(Notification::error("Please enter a connection string"))
  );

  let err = session.query_database(" \t\n").await.unwrap_err();
  assert_eq!(err, SessionError::Validation("Please enter a query"));

  let err = session.search_documents("").await.unwrap_err();
  assert_eq!(err, SessionError::Validation("Please enter a query"));
  assert_eq!(
    session.snapshot().notification,
    Some(Notification::error("Please enter a query"))
  );

  let err = session.upload_documents(vec![]).await.unwrap_err();
  assert_eq!(err, SessionError::Validation("Please select at least one document"));

  assert!(service.calls().is_empty());
  assert_idle(&session);
}

// ─── Query ───────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn query_replaces_result() {
  let (session, _, _) = session();
  session.connect(CONN).await.unwrap();

  session
    .query_database("Show me all Python developers")
    .await
    .unwrap();

  let snap = session.snapshot();
  assert_eq!(snap.state.query_result, Some(python_query_result()));
  assert_eq!(
    snap.notification,
    Some(Notification::success("Query executed successfully!"))
  );

  session.query_database("Count departments").await.unwrap();
  let result = session.snapshot().state.query_result.unwrap();
  assert_eq!(result.original_query, "Count departments");
}

#[tokio::test(start_paused = true)]
async fn failed_query_keeps_previous_result() {
  let (session, service, _) = session();
  session
    .query_database("Show me all Python developers")
    .await
    .unwrap();

  service.on_query(Reply::Fail);
  let err = session.query_database("Anything else").await.unwrap_err();
  assert!(matches!(err, SessionError::Service(_)));

  let snap = session.snapshot();
  assert_eq!(snap.state.query_result, Some(python_query_result()));
  assert_eq!(
    snap.notification,
    Some(Notification::error("Query failed. Please try again."))
  );
  assert_idle(&session);
}

// ─── Upload ──────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn uploads_accumulate_in_order() {
  let (session, _, _) = session();

  session
    .upload_documents(vec![upload("resume.pdf"), upload("review.docx")])
    .await
    .unwrap();
  assert_eq!(
    session.snapshot().notification,
    Some(Notification::success("2 document(s) uploaded successfully!"))
  );

  session.upload_documents(vec![upload("resume.pdf")]).await.unwrap();

  let docs = session.snapshot().state.documents;
  let names: Vec<_> = docs.iter().map(|d| d.filename.as_str()).collect();
  assert_eq!(names, ["resume.pdf", "review.docx", "resume.pdf"]);
  assert_eq!(docs[1].content_type, upload("review.docx").content_type);
}

#[tokio::test(start_paused = true)]
async fn failed_upload_appends_nothing() {
  let (session, service, _) = session();
  session.upload_documents(vec![upload("a.txt")]).await.unwrap();

  service.on_upload(Reply::Fail);
  session
    .upload_documents(vec![upload("b.txt"), upload("c.txt")])
    .await
    .unwrap_err();

  assert_eq!(session.snapshot().state.documents.len(), 1);
  assert_eq!(
    session.snapshot().notification,
    Some(Notification::error("Document upload failed. Please try again."))
  );
}

// ─── Search ──────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn search_replaces_document_results() {
  let (session, service, _) = session();
  let hits: DocumentSearchResult = serde_json::from_value(json!({
    "query": "python",
    "documents": [{"id": 1, "title": "Resume", "content": "Python developer", "score": 0.95}]
  }))
  .unwrap();
  service.on_search(Reply::Ok(hits.clone()));

  session.search_documents("python").await.unwrap();

  let snap = session.snapshot();
  assert_eq!(snap.state.document_results, Some(hits));
  assert_eq!(
    snap.notification,
    Some(Notification::success("Document search completed!"))
  );
  assert_eq!(service.calls(), [OperationKind::Search]);
}

#[tokio::test(start_paused = true)]
async fn failed_search_reports_error() {
  let (session, service, _) = session();
  service.on_search(Reply::Fail);

  session.search_documents("python").await.unwrap_err();

  let snap = session.snapshot();
  assert_eq!(snap.state.document_results, None);
  assert_eq!(
    snap.notification,
    Some(Notification::error("Document search failed. Please try again."))
  );
  assert_idle(&session);
}

// ─── Single flight, progress, timeout ────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn trigger_while_busy_is_rejected() {
  let (session, service, _) = session();
  let gate = Arc::new(Notify::new());
  service.on_connect(Reply::Gated(
    gate.clone(),
    ConnectResponse {
      schema: Some(employees_schema()),
      ..ConnectResponse::default()
    },
  ));

  let running = session.clone();
  let handle = tokio::spawn(async move { running.connect(CONN).await });
  wait_until_busy(&session).await;

  let err = session.query_database("Show me everyone").await.unwrap_err();
  assert_eq!(err, SessionError::Busy(OperationKind::Connect));
  assert_eq!(
    session.snapshot().notification,
    Some(Notification::error("Another operation is already in progress"))
  );
  assert_eq!(session.snapshot().busy, Some(OperationKind::Connect));

  gate.notify_one();
  handle.await.unwrap().unwrap();

  assert_eq!(service.calls(), [OperationKind::Connect]);
  assert!(session.is_connected());
  assert_idle(&session);
}

#[tokio::test(start_paused = true)]
async fn progress_runs_only_while_in_flight() {
  let (session, service, _) = session();
  let gate = Arc::new(Notify::new());
  service.on_query(Reply::Gated(gate.clone(), python_query_result()));

  let running = session.clone();
  let handle = tokio::spawn(async move { running.query_database("Show me all Python developers").await });
  wait_until_busy(&session).await;

  let progress = session.snapshot().progress.unwrap();
  assert_eq!(progress.label, "Processing your natural language query...");
  assert_eq!(progress.percent, 0);

  tokio::time::advance(Duration::from_millis(250)).await;
  for _ in 0..4 {
    tokio::task::yield_now().await;
  }
  assert_eq!(session.snapshot().progress.unwrap().percent, 10);

  // Real completion is independent of the bar.
  gate.notify_one();
  handle.await.unwrap().unwrap();
  assert_idle(&session);
}

#[tokio::test(start_paused = true)]
async fn upload_progress_label_counts_files() {
  let (session, service, _) = session();
  let gate = Arc::new(Notify::new());
  service.on_upload(Reply::Gated(gate.clone(), ()));

  let running = session.clone();
  let handle = tokio::spawn(async move {
    running
      .upload_documents(vec![upload("a.txt"), upload("b.csv"), upload("c.pdf")])
      .await
  });
  wait_until_busy(&session).await;

  assert_eq!(
    session.snapshot().progress.unwrap().label,
    "Uploading 3 document(s)..."
  );
  assert_eq!(session.snapshot().busy, Some(OperationKind::Upload));

  gate.notify_one();
  handle.await.unwrap().unwrap();
  assert_idle(&session);
}

#[tokio::test(start_paused = true)]
async fn hung_call_times_out_and_clears_loading_state() {
  let service = MockService::new();
  service.on_connect(Reply::Hang);
  let config = SessionConfig {
    operation_timeout: Duration::from_secs(5),
    ..SessionConfig::default()
  };
  let session = Session::new(service, MemorySettings::default(), config);

  let err = session.connect(CONN).await.unwrap_err();
  assert_eq!(err, SessionError::Timeout(Duration::from_secs(5)));
  assert!(!session.is_connected());
  assert_eq!(
    session.snapshot().notification,
    Some(Notification::error("Connection failed. Please try again."))
  );
  assert_idle(&session);

  // The session stays usable.
  session.search_documents("python").await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn aborted_operation_releases_busy_and_progress() {
  let (session, service, _) = session();
  service.on_search(Reply::Hang);

  let running = session.clone();
  let handle = tokio::spawn(async move { running.search_documents("python").await });
  wait_until_busy(&session).await;

  handle.abort();
  assert!(handle.await.unwrap_err().is_cancelled());
  assert_idle(&session);
}

// ─── Notifications & navigation ──────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn operation_notification_expires_after_three_seconds() {
  let (session, _, _) = session();
  session.search_documents("python").await.unwrap();
  assert!(session.snapshot().notification.is_some());

  tokio::time::advance(Duration::from_millis(2999)).await;
  tokio::task::yield_now().await;
  assert!(session.snapshot().notification.is_some());

  tokio::time::advance(Duration::from_millis(1)).await;
  for _ in 0..4 {
    tokio::task::yield_now().await;
  }
  assert!(session.snapshot().notification.is_none());
}

#[tokio::test(start_paused = true)]
async fn dismiss_clears_notification() {
  let (session, _, _) = session();
  session.query_database("").await.unwrap_err();
  session.dismiss_notification();
  assert!(session.snapshot().notification.is_none());
}

#[tokio::test(start_paused = true)]
async fn query_view_unreachable_until_connected() {
  let (session, _, _) = session();

  assert!(!session.select_view(View::Query));
  assert_eq!(session.active_view(), View::Connect);

  session.connect(CONN).await.unwrap();
  assert_eq!(session.active_view(), View::Query);

  assert!(session.select_view(View::Connect));
  assert_eq!(session.active_view(), View::Connect);
  assert!(session.select_view(View::Query));
  assert_eq!(session.active_view(), View::Query);
}
