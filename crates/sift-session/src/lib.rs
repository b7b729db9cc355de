//! Session orchestration for the Sift client.
//!
//! A [`Session`] owns everything a front end renders: connection state, the
//! discovered schema, uploaded documents, the latest results, the single
//! notification slot, the synthetic progress bar and the active view. It is
//! the only writer of that state; front ends take [`SessionSnapshot`]s and
//! trigger the four operations.
//!
//! Operations never fail outward in a way that needs handling: every outcome
//! is reported through the notification channel, and the returned `Result`
//! is informational.

pub mod error;
pub mod nav;
pub mod notification;
pub mod progress;
pub mod session;
pub mod state;

pub use error::SessionError;
pub use nav::{NavGate, View};
pub use notification::NotificationChannel;
pub use progress::{ProgressGuard, ProgressReporter};
pub use session::{Session, SessionConfig, SessionSnapshot};
pub use state::{ConnectionState, SessionState};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering the data if a previous holder panicked.
///
/// Every critical section in this crate leaves its data consistent, so a
/// poisoned lock carries no broken invariant.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests;
