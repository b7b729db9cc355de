//! Error type for `sift-session`.

use std::time::Duration;

use sift_core::status::OperationKind;
use thiserror::Error;

/// Why an operation did not complete.
///
/// By the time a caller sees one of these, the matching error notification
/// has already been published. For local rejections (`Validation`,
/// `AlreadyConnected`, `Busy`) the display text is that notification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
  /// Required input was empty or blank; the service was not called.
  #[error("{0}")]
  Validation(&'static str),

  #[error("Already connected")]
  AlreadyConnected,

  /// Another operation held the busy lock; carries the one in flight.
  #[error("Another operation is already in progress")]
  Busy(OperationKind),

  #[error("connect response did not include a schema")]
  MissingSchema,

  /// Non-2xx response, malformed body or transport fault.
  #[error("service error: {0}")]
  Service(String),

  #[error("operation timed out after {0:?}")]
  Timeout(Duration),
}
