//! Application state machine and event dispatcher.
//!
//! The [`Session`] owns everything that is rendered except the text being
//! typed. `App` only keeps input buffers and the files picked for the next
//! upload, and turns key presses into session operations.

use std::{future::Future, path::Path};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use sift_core::{
  document::{DocumentUpload, picker_file_name},
  status::OperationKind,
};
use sift_session::{Session, SessionError, View};
use sift_store_sqlite::SqliteSettings;

use crate::{client::HttpClient, expand_tilde};

pub type AppSession = Session<HttpClient, SqliteSettings>;

// ─── Focus ────────────────────────────────────────────────────────────────────

/// Which input on the query view receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryField {
  /// Natural-language question; Enter queries the database, Ctrl-S searches
  /// documents.
  Question,
  /// File path; Enter adds the file to the batch, or uploads the batch when
  /// the line is empty.
  Files,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub session: AppSession,

  /// Backend base URL, shown in the header.
  pub backend: String,

  /// Connection string being edited on the connect view.
  pub connection_input: String,

  /// Question being edited on the query view.
  pub query_input: String,

  /// Path being typed into the file picker line.
  pub file_input: String,

  /// Files read from disk and waiting for the next upload.
  pub pending: Vec<DocumentUpload>,

  pub query_field: QueryField,

  /// Local, non-session feedback (file picker errors, refused tab switch).
  pub status_msg: String,
}

impl App {
  /// Create an [`App`] over `session`, pre-filling the connection string the
  /// session restored.
  pub fn new(session: AppSession, backend: impl Into<String>) -> Self {
    let connection_input = session.snapshot().state.connection.connection_string;
    Self {
      session,
      backend: backend.into(),
      connection_input,
      query_input: String::new(),
      file_input: String::new(),
      pending: Vec::new(),
      query_field: QueryField::Question,
      status_msg: String::new(),
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global keys.
    match key.code {
      KeyCode::Char('c') | KeyCode::Char('q') if ctrl => return Ok(false),
      KeyCode::F(1) => {
        self.show(View::Connect);
        return Ok(true);
      }
      KeyCode::F(2) => {
        self.show(View::Query);
        return Ok(true);
      }
      KeyCode::Esc => {
        self.session.dismiss_notification();
        self.status_msg.clear();
        return Ok(true);
      }
      _ => {}
    }

    match self.session.active_view() {
      View::Connect => self.handle_connect_key(key),
      View::Query => self.handle_query_key(key, ctrl).await,
    }
    Ok(true)
  }

  fn show(&mut self, view: View) {
    if self.session.select_view(view) {
      self.status_msg.clear();
    } else {
      self.status_msg = "Connect to a database first".into();
    }
  }

  fn handle_connect_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Enter => {
        let connection_string = self.connection_input.clone();
        self.spawn(move |session| async move { session.connect(&connection_string).await });
      }
      KeyCode::Backspace => {
        self.connection_input.pop();
      }
      KeyCode::Char(c) => self.connection_input.push(c),
      _ => {}
    }
  }

  async fn handle_query_key(&mut self, key: KeyEvent, ctrl: bool) {
    match (self.query_field, key.code) {
      (_, KeyCode::Tab) | (_, KeyCode::BackTab) => {
        self.query_field = match self.query_field {
          QueryField::Question => QueryField::Files,
          QueryField::Files => QueryField::Question,
        };
      }

      // Question line
      (QueryField::Question, KeyCode::Char('s')) if ctrl => {
        let query = self.query_input.clone();
        self.spawn(move |session| async move { session.search_documents(&query).await });
      }
      (QueryField::Question, KeyCode::Enter) => {
        let query = self.query_input.clone();
        self.spawn(move |session| async move { session.query_database(&query).await });
      }
      (QueryField::Question, KeyCode::Backspace) => {
        self.query_input.pop();
      }
      (QueryField::Question, KeyCode::Char(c)) if !ctrl => self.query_input.push(c),

      // File picker line
      (QueryField::Files, KeyCode::Enter) if self.file_input.trim().is_empty() => {
        self.upload_pending();
      }
      (QueryField::Files, KeyCode::Enter) => self.add_file().await,
      (QueryField::Files, KeyCode::Backspace) => {
        if self.file_input.pop().is_none() {
          self.pending.pop();
        }
      }
      (QueryField::Files, KeyCode::Char(c)) if !ctrl => self.file_input.push(c),

      _ => {}
    }
  }

  // ── File picking ──────────────────────────────────────────────────────────

  /// Read the file named on the picker line into the pending batch.
  async fn add_file(&mut self) {
    let path = expand_tilde(Path::new(self.file_input.trim()));
    let filename = match picker_file_name(&path) {
      Ok(name) => name,
      Err(e) => {
        self.status_msg = e.to_string();
        return;
      }
    };
    match tokio::fs::read(&path).await {
      Ok(bytes) => {
        tracing::debug!(file = %filename, len = bytes.len(), "picked file");
        self.pending.push(DocumentUpload::new(filename, bytes));
        self.file_input.clear();
        self.status_msg.clear();
      }
      Err(e) => self.status_msg = format!("{}: {e}", path.display()),
    }
  }

  /// Hand the pending batch to the session. An empty batch still goes
  /// through so the session reports it. While another operation is in
  /// flight the batch stays put, since the session would refuse it.
  fn upload_pending(&mut self) {
    if self.session.snapshot().is_loading() {
      self.status_msg = SessionError::Busy(OperationKind::Upload).to_string();
      return;
    }
    let files = std::mem::take(&mut self.pending);
    self.spawn(move |session| async move { session.upload_documents(files).await });
  }

  // ── Operations ────────────────────────────────────────────────────────────

  /// Run an operation in the background so the UI keeps redrawing. The
  /// outcome is reported through the session's notification, so the
  /// returned `Result` is only logged.
  fn spawn<F, Fut>(&self, op: F)
  where
    F: FnOnce(AppSession) -> Fut,
    Fut: Future<Output = Result<(), SessionError>> + Send + 'static,
  {
    let fut = op(self.session.clone());
    tokio::spawn(async move {
      if let Err(e) = fut.await {
        tracing::debug!(error = %e, "operation did not complete");
      }
    });
  }
}
