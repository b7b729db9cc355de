//! Document corpus types: files going up, descriptors coming back, and
//! search hits.

use std::{fmt, path::Path};

use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

/// Extensions offered by the file picker. The backend decides what it
/// actually accepts; this list is a UI affordance only.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["pdf", "docx", "txt", "csv"];

// ─── Upload ──────────────────────────────────────────────────────────────────

/// A file selected for upload, held in memory until the batch is sent.
#[derive(Clone, PartialEq, Eq)]
pub struct DocumentUpload {
  pub filename:     String,
  pub content_type: String,
  pub bytes:        Vec<u8>,
}

impl DocumentUpload {
  /// Build an upload, inferring the content type from the file extension.
  pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
    let filename = filename.into();
    let content_type = content_type_for(&filename).to_owned();
    Self {
      filename,
      content_type,
      bytes,
    }
  }
}

impl fmt::Debug for DocumentUpload {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("DocumentUpload")
      .field("filename", &self.filename)
      .field("content_type", &self.content_type)
      .field("len", &self.bytes.len())
      .finish()
  }
}

/// MIME type for a file name, falling back to `application/octet-stream`.
pub fn content_type_for(filename: &str) -> &'static str {
  let ext = Path::new(filename)
    .extension()
    .and_then(|e| e.to_str())
    .map(str::to_ascii_lowercase);
  match ext.as_deref() {
    Some("pdf") => "application/pdf",
    Some("docx") => {
      "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    }
    Some("txt") => "text/plain",
    Some("csv") => "text/csv",
    _ => "application/octet-stream",
  }
}

/// Check `path` against [`ACCEPTED_EXTENSIONS`] and return its file name.
pub fn picker_file_name(path: &Path) -> Result<String> {
  let name = path
    .file_name()
    .and_then(|n| n.to_str())
    .ok_or_else(|| Error::MissingFileName(path.to_path_buf()))?;
  let ext = path
    .extension()
    .and_then(|e| e.to_str())
    .map(str::to_ascii_lowercase)
    .unwrap_or_default();
  if !ACCEPTED_EXTENSIONS.contains(&ext.as_str()) {
    return Err(Error::UnsupportedExtension(ext));
  }
  Ok(name.to_owned())
}

// ─── Uploaded descriptors ────────────────────────────────────────────────────

/// A document the backend has accepted into the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedDocument {
  pub filename:     String,
  /// Empty when the backend did not record one.
  #[serde(default, deserialize_with = "null_as_empty")]
  pub content_type: String,
  /// Size in bytes as measured by the backend.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub size:         Option<u64>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<String, D::Error> {
  Ok(Option::<String>::deserialize(de)?.unwrap_or_default())
}

// ─── Search ──────────────────────────────────────────────────────────────────

/// Identifier of a search hit; backends use either integers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentId {
  Number(u64),
  Text(String),
}

impl fmt::Display for DocumentId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Number(n) => write!(f, "{n}"),
      Self::Text(s) => f.write_str(s),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentHit {
  pub id:      DocumentId,
  pub title:   String,
  pub content: String,
  /// Relevance in `[0, 1]`.
  pub score:   f64,
}

impl DocumentHit {
  /// Relevance as a percentage with one decimal, e.g. `"95.0%"`.
  pub fn relevance_label(&self) -> String {
    format!("{:.1}%", self.score * 100.0)
  }
}

/// The hits for one document search, replaced wholesale by the next search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSearchResult {
  pub query:     String,
  #[serde(default)]
  pub documents: Vec<DocumentHit>,
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use serde_json::json;

  use super::*;

  #[test]
  fn content_type_inferred_case_insensitively() {
    assert_eq!(content_type_for("report.PDF"), "application/pdf");
    assert_eq!(content_type_for("people.csv"), "text/csv");
    assert_eq!(content_type_for("notes"), "application/octet-stream");
    assert_eq!(DocumentUpload::new("a.txt", vec![]).content_type, "text/plain");
  }

  #[test]
  fn picker_accepts_declared_extensions_only() {
    assert_eq!(
      picker_file_name(&PathBuf::from("/tmp/resume.docx")).unwrap(),
      "resume.docx"
    );
    assert!(matches!(
      picker_file_name(&PathBuf::from("/tmp/image.png")),
      Err(Error::UnsupportedExtension(ext)) if ext == "png"
    ));
    assert!(matches!(
      picker_file_name(&PathBuf::from("/")),
      Err(Error::MissingFileName(_))
    ));
  }

  #[test]
  fn uploaded_document_tolerates_missing_content_type() {
    let doc: UploadedDocument =
      serde_json::from_value(json!({"filename": "a.bin", "content_type": null})).unwrap();
    assert_eq!(doc.content_type, "");

    let doc: UploadedDocument = serde_json::from_value(json!({"filename": "b.bin"})).unwrap();
    assert_eq!(doc.content_type, "");
    assert_eq!(doc.size, None);
  }

  #[test]
  fn search_hits_accept_numeric_and_string_ids() {
    let result: DocumentSearchResult = serde_json::from_value(json!({
      "query": "python",
      "documents": [
        {"id": 1, "title": "Resume", "content": "...", "score": 0.95},
        {"id": "doc-7", "title": "Review", "content": "...", "score": 0.5}
      ]
    }))
    .unwrap();

    assert_eq!(result.documents[0].id, DocumentId::Number(1));
    assert_eq!(result.documents[1].id.to_string(), "doc-7");
    assert_eq!(result.documents[0].relevance_label(), "95.0%");
  }

  #[test]
  fn upload_debug_hides_payload() {
    let upload = DocumentUpload::new("a.txt", b"secret".to_vec());
    let rendered = format!("{upload:?}");
    assert!(rendered.contains("len: 6"));
    assert!(!rendered.contains("secret"));
  }
}
