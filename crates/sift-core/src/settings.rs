//! The `SettingsStore` trait: the one piece of state that outlives a session.

use std::future::Future;

/// Key under which the last successful connection string is kept.
pub const CONNECTION_STRING_KEY: &str = "connection_string";

/// A small persistent key-value store.
///
/// The session reads [`CONNECTION_STRING_KEY`] once at startup and writes it
/// once after each successful connect. Nothing else is persisted.
pub trait SettingsStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the value stored under `key`, if any.
  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Insert or replace the value stored under `key`.
  fn set<'a>(
    &'a self,
    key: &'a str,
    value: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
