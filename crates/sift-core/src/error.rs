//! Error types for `sift-core`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unsupported document type: {0:?}")]
  UnsupportedExtension(String),

  #[error("path has no file name: {}", .0.display())]
  MissingFileName(PathBuf),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
