//! [`Session`]: the async operation runner and owner of all session state.

use std::{
  fmt::Display,
  future::Future,
  sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard, PoisonError},
  time::Duration,
};

use sift_core::{
  document::DocumentUpload,
  service::QueryService,
  settings::{CONNECTION_STRING_KEY, SettingsStore},
  status::{Notification, OperationKind, OperationProgress},
};
use tracing::{debug, info, warn};

use crate::{
  SessionError, lock,
  nav::{NavGate, View},
  notification::{NOTIFICATION_TTL, NotificationChannel},
  progress::ProgressReporter,
  state::SessionState,
};

// ─── Operation envelopes ──────────────────────────────────────────────────────

const CONNECT_LABEL: &str = "Connecting to database...";
const CONNECT_NOMINAL: Duration = Duration::from_millis(3000);
const QUERY_LABEL: &str = "Processing your natural language query...";
const QUERY_NOMINAL: Duration = Duration::from_millis(2500);
const UPLOAD_NOMINAL: Duration = Duration::from_millis(4000);
const SEARCH_LABEL: &str = "Searching documents...";
const SEARCH_NOMINAL: Duration = Duration::from_millis(2000);

const EMPTY_CONNECTION_STRING: &str = "Please enter a connection string";
const EMPTY_QUERY: &str = "Please enter a query";
const EMPTY_UPLOAD: &str = "Please select at least one document";

fn failure_message(kind: OperationKind, error: &SessionError) -> &'static str {
  match (kind, error) {
    (OperationKind::Connect, SessionError::MissingSchema) => {
      "Connection failed. Please check your connection string."
    }
    (OperationKind::Connect, _) => "Connection failed. Please try again.",
    (OperationKind::Query, _) => "Query failed. Please try again.",
    (OperationKind::Upload, _) => "Document upload failed. Please try again.",
    (OperationKind::Search, _) => "Document search failed. Please try again.",
  }
}

// ─── Configuration ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SessionConfig {
  /// Upper bound on a single service call. Expiry counts as a failure.
  pub operation_timeout: Duration,
  /// How long notifications stay visible.
  pub notification_ttl:  Duration,
}

impl Default for SessionConfig {
  fn default() -> Self {
    Self {
      operation_timeout: Duration::from_secs(30),
      notification_ttl:  NOTIFICATION_TTL,
    }
  }
}

// ─── Snapshot ─────────────────────────────────────────────────────────────────

/// Everything a front end needs to draw one frame.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
  pub state:        SessionState,
  pub view:         View,
  pub notification: Option<Notification>,
  pub progress:     Option<OperationProgress>,
  /// The operation in flight, if any.
  pub busy:         Option<OperationKind>,
}

impl SessionSnapshot {
  pub fn is_loading(&self) -> bool { self.busy.is_some() }
}

// ─── Session ──────────────────────────────────────────────────────────────────

/// State and navigation live under one lock so a snapshot never shows the
/// query view without the connection that unlocked it.
#[derive(Default)]
struct Shared {
  state: SessionState,
  nav:   NavGate,
}

struct Inner<S, P> {
  service:       S,
  settings:      P,
  config:        SessionConfig,
  shared:        RwLock<Shared>,
  busy:          Mutex<Option<OperationKind>>,
  notifications: NotificationChannel,
  progress:      ProgressReporter,
}

/// The session orchestrator.
///
/// Runs at most one operation at a time; a second trigger while one is in
/// flight is rejected with a notification. Every operation follows the same
/// envelope: validate, take the busy lock, start progress, call the service
/// under a timeout, apply the result or report the failure, and release busy
/// and progress on every exit path.
///
/// Cheap to clone; clones drive the same session.
pub struct Session<S, P> {
  inner: Arc<Inner<S, P>>,
}

impl<S, P> Clone for Session<S, P> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

impl<S, P> Session<S, P>
where
  S: QueryService,
  P: SettingsStore,
{
  /// Create a fresh session with nothing restored.
  pub fn new(service: S, settings: P, config: SessionConfig) -> Self {
    let notifications = NotificationChannel::with_ttl(config.notification_ttl);
    Self {
      inner: Arc::new(Inner {
        service,
        settings,
        config,
        shared: RwLock::new(Shared::default()),
        busy: Mutex::new(None),
        notifications,
        progress: ProgressReporter::new(),
      }),
    }
  }

  /// Create a session and seed the connection string from `settings`.
  ///
  /// A failing settings store is logged and otherwise ignored.
  pub async fn restore(service: S, settings: P, config: SessionConfig) -> Self {
    let session = Self::new(service, settings, config);
    match session.inner.settings.get(CONNECTION_STRING_KEY).await {
      Ok(Some(saved)) => {
        info!("restored saved connection string");
        session.write().state.seed_connection_string(saved);
      }
      Ok(None) => {}
      Err(e) => warn!(error = %e, "failed to read saved connection string"),
    }
    session
  }

  // ── Read side ───────────────────────────────────────────────────────────

  pub fn snapshot(&self) -> SessionSnapshot {
    let (state, view) = {
      let shared = self.read();
      (shared.state.clone(), shared.nav.active())
    };
    SessionSnapshot {
      state,
      view,
      notification: self.inner.notifications.current(),
      progress: self.inner.progress.current(),
      busy: *lock(&self.inner.busy),
    }
  }

  pub fn is_connected(&self) -> bool { self.read().state.is_connected() }

  pub fn active_view(&self) -> View { self.read().nav.active() }

  // ── Navigation ──────────────────────────────────────────────────────────

  /// Request a view change. Returns `false` and leaves the view unchanged
  /// when `view` is not reachable yet.
  pub fn select_view(&self, view: View) -> bool {
    let mut shared = self.write();
    let connected = shared.state.is_connected();
    shared.nav.select(view, connected)
  }

  /// Remove the current notification early.
  pub fn dismiss_notification(&self) { self.inner.notifications.clear(); }

  // ── Operations ──────────────────────────────────────────────────────────

  /// Attach to the data source and discover its schema.
  ///
  /// On success the session is marked connected, the schema is stored, the
  /// connection string is persisted and the query view becomes active.
  pub async fn connect(&self, connection_string: &str) -> Result<(), SessionError> {
    let kind = OperationKind::Connect;
    if connection_string.trim().is_empty() {
      return Err(self.reject(SessionError::Validation(EMPTY_CONNECTION_STRING)));
    }

    let _busy = self.begin(kind)?;
    if self.is_connected() {
      return Err(self.reject(SessionError::AlreadyConnected));
    }
    let _progress = self.inner.progress.start(CONNECT_LABEL, CONNECT_NOMINAL);

    let outcome = self
      .call(kind, self.inner.service.connect(connection_string))
      .await
      .and_then(|resp| resp.schema.ok_or(SessionError::MissingSchema));

    match outcome {
      Ok(schema) => {
        info!(tables = schema.tables.len(), "connected");
        {
          let mut shared = self.write();
          shared.state.mark_connected(connection_string, schema);
          shared.nav.select(View::Query, true);
        }
        self.persist_connection_string(connection_string).await;
        self.succeed("Database connected successfully!");
        Ok(())
      }
      Err(e) => Err(self.fail(kind, e)),
    }
  }

  /// Translate and run a natural-language query; replaces the last result.
  pub async fn query_database(&self, query: &str) -> Result<(), SessionError> {
    let kind = OperationKind::Query;
    if query.trim().is_empty() {
      return Err(self.reject(SessionError::Validation(EMPTY_QUERY)));
    }

    let _busy = self.begin(kind)?;
    let _progress = self.inner.progress.start(QUERY_LABEL, QUERY_NOMINAL);

    match self.call(kind, self.inner.service.run_query(query)).await {
      Ok(result) => {
        self.write().state.replace_query_result(result);
        self.succeed("Query executed successfully!");
        Ok(())
      }
      Err(e) => Err(self.fail(kind, e)),
    }
  }

  /// Send `files` as one batch; accepted descriptors are appended to the
  /// document list in the order the service returns them.
  pub async fn upload_documents(&self, files: Vec<DocumentUpload>) -> Result<(), SessionError> {
    let kind = OperationKind::Upload;
    if files.is_empty() {
      return Err(self.reject(SessionError::Validation(EMPTY_UPLOAD)));
    }

    let count = files.len();
    let _busy = self.begin(kind)?;
    let _progress = self
      .inner
      .progress
      .start(format!("Uploading {count} document(s)..."), UPLOAD_NOMINAL);

    match self.call(kind, self.inner.service.upload_documents(files)).await {
      Ok(resp) => {
        self.write().state.append_documents(resp.files);
        self.succeed(format!("{count} document(s) uploaded successfully!"));
        Ok(())
      }
      Err(e) => Err(self.fail(kind, e)),
    }
  }

  /// Rank corpus documents against `query`; replaces the last hits.
  pub async fn search_documents(&self, query: &str) -> Result<(), SessionError> {
    let kind = OperationKind::Search;
    if query.trim().is_empty() {
      return Err(self.reject(SessionError::Validation(EMPTY_QUERY)));
    }

    let _busy = self.begin(kind)?;
    let _progress = self.inner.progress.start(SEARCH_LABEL, SEARCH_NOMINAL);

    match self.call(kind, self.inner.service.search_documents(query)).await {
      Ok(results) => {
        self.write().state.replace_document_results(results);
        self.succeed("Document search completed!");
        Ok(())
      }
      Err(e) => Err(self.fail(kind, e)),
    }
  }

  // ── Envelope helpers ────────────────────────────────────────────────────

  /// Take the busy lock for `kind`, or report the operation already in
  /// flight.
  fn begin(&self, kind: OperationKind) -> Result<BusyGuard<'_>, SessionError> {
    let mut busy = lock(&self.inner.busy);
    if let Some(running) = *busy {
      drop(busy);
      warn!(operation = %kind, running = %running, "rejected: operation in flight");
      return Err(self.reject(SessionError::Busy(running)));
    }
    *busy = Some(kind);
    info!(operation = %kind, "operation started");
    Ok(BusyGuard {
      slot: &self.inner.busy,
      kind,
    })
  }

  /// Await a service call under the configured timeout, collapsing every
  /// failure into a [`SessionError`].
  async fn call<T, E>(
    &self,
    kind: OperationKind,
    fut: impl Future<Output = Result<T, E>>,
  ) -> Result<T, SessionError>
  where
    E: Display,
  {
    let timeout = self.inner.config.operation_timeout;
    match tokio::time::timeout(timeout, fut).await {
      Ok(Ok(value)) => Ok(value),
      Ok(Err(e)) => {
        debug!(operation = %kind, error = %e, "service call failed");
        Err(SessionError::Service(e.to_string()))
      }
      Err(_) => {
        debug!(operation = %kind, ?timeout, "service call timed out");
        Err(SessionError::Timeout(timeout))
      }
    }
  }

  async fn persist_connection_string(&self, connection_string: &str) {
    if let Err(e) = self
      .inner
      .settings
      .set(CONNECTION_STRING_KEY, connection_string)
      .await
    {
      warn!(error = %e, "failed to persist connection string");
    }
  }

  fn succeed(&self, message: impl Into<String>) {
    self.inner.notifications.notify(Notification::success(message));
  }

  /// Report a local rejection (validation or guard) and hand it back. The
  /// error's display text is the user-facing message.
  fn reject(&self, error: SessionError) -> SessionError {
    self
      .inner
      .notifications
      .notify(Notification::error(error.to_string()));
    error
  }

  /// Report a failed service round trip and hand the error back.
  fn fail(&self, kind: OperationKind, error: SessionError) -> SessionError {
    warn!(operation = %kind, error = %error, "operation failed");
    self
      .inner
      .notifications
      .notify(Notification::error(failure_message(kind, &error)));
    error
  }

  fn read(&self) -> RwLockReadGuard<'_, Shared> {
    self.inner.shared.read().unwrap_or_else(PoisonError::into_inner)
  }

  fn write(&self) -> RwLockWriteGuard<'_, Shared> {
    self.inner.shared.write().unwrap_or_else(PoisonError::into_inner)
  }
}

/// Holds the busy slot for one operation; releases it on drop.
struct BusyGuard<'a> {
  slot: &'a Mutex<Option<OperationKind>>,
  kind: OperationKind,
}

impl Drop for BusyGuard<'_> {
  fn drop(&mut self) {
    *lock(self.slot) = None;
    info!(operation = %self.kind, "operation settled");
  }
}
