//! Transient, user-facing status: notifications and operation progress.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

// ─── Operations ──────────────────────────────────────────────────────────────

/// The four long-running operations a session can perform.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OperationKind {
  Connect,
  Query,
  Upload,
  Search,
}

// ─── Notifications ───────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationKind {
  Success,
  Error,
}

/// A single transient message for the notification banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
  pub message: String,
  pub kind:    NotificationKind,
}

impl Notification {
  pub fn success(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
      kind:    NotificationKind::Success,
    }
  }

  pub fn error(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
      kind:    NotificationKind::Error,
    }
  }

  pub fn is_error(&self) -> bool { self.kind == NotificationKind::Error }
}

// ─── Progress ────────────────────────────────────────────────────────────────

/// Cosmetic progress of the operation currently in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationProgress {
  /// Always within `0..=100`.
  pub percent: u8,
  pub label:   String,
}

impl OperationProgress {
  pub fn ratio(&self) -> f64 { f64::from(self.percent.min(100)) / 100.0 }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  #[test]
  fn operation_names_are_snake_case() {
    assert_eq!(OperationKind::Connect.to_string(), "connect");
    assert_eq!(OperationKind::Search.as_ref(), "search");
    assert_eq!(OperationKind::from_str("upload").unwrap(), OperationKind::Upload);
  }

  #[test]
  fn notification_constructors_set_kind() {
    assert!(Notification::error("boom").is_error());
    assert!(!Notification::success("ok").is_error());
    assert_eq!(NotificationKind::Success.to_string(), "success");
  }

  #[test]
  fn progress_ratio_is_clamped() {
    let p = OperationProgress {
      percent: 50,
      label:   "x".into(),
    };
    assert!((p.ratio() - 0.5).abs() < f64::EPSILON);
  }
}
