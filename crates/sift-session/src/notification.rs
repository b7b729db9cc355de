//! Single-slot notification channel with automatic expiry.

use std::{
  sync::{Arc, Mutex, Weak},
  time::Duration,
};

use sift_core::status::Notification;
use tokio::{task::JoinHandle, time::Instant};

use crate::lock;

/// How long a notification stays visible.
pub const NOTIFICATION_TTL: Duration = Duration::from_millis(3000);

#[derive(Default)]
struct Slot {
  current:    Option<Notification>,
  /// Bumped on every write; an expiry task only clears the slot it was
  /// scheduled for.
  generation: u64,
  expiry:     Option<JoinHandle<()>>,
}

/// Holds at most one live [`Notification`].
///
/// A new notification replaces the current one and restarts the expiry
/// timer. There is no queue: an unseen notification that gets replaced is
/// simply gone.
///
/// Cheap to clone; clones share the slot.
#[derive(Clone)]
pub struct NotificationChannel {
  slot: Arc<Mutex<Slot>>,
  ttl:  Duration,
}

impl Default for NotificationChannel {
  fn default() -> Self { Self::new() }
}

impl NotificationChannel {
  pub fn new() -> Self { Self::with_ttl(NOTIFICATION_TTL) }

  pub fn with_ttl(ttl: Duration) -> Self {
    Self {
      slot: Arc::new(Mutex::new(Slot::default())),
      ttl,
    }
  }

  /// Publish `notification`, replacing any current one, and schedule its
  /// removal after the channel's TTL.
  ///
  /// Must be called from within a Tokio runtime.
  pub fn notify(&self, notification: Notification) {
    let deadline = Instant::now() + self.ttl;
    let mut slot = lock(&self.slot);

    if let Some(previous) = slot.expiry.take() {
      previous.abort();
    }
    slot.generation = slot.generation.wrapping_add(1);
    slot.current = Some(notification);

    let generation = slot.generation;
    let weak: Weak<Mutex<Slot>> = Arc::downgrade(&self.slot);
    slot.expiry = Some(tokio::spawn(async move {
      tokio::time::sleep_until(deadline).await;
      let Some(shared) = weak.upgrade() else { return };
      let mut slot = lock(&shared);
      if slot.generation == generation {
        tracing::debug!("notification expired");
        slot.current = None;
        slot.expiry = None;
      }
    }));
  }

  /// Remove the current notification, if any, and cancel its timer.
  pub fn clear(&self) {
    let mut slot = lock(&self.slot);
    if let Some(expiry) = slot.expiry.take() {
      expiry.abort();
    }
    slot.generation = slot.generation.wrapping_add(1);
    slot.current = None;
  }

  pub fn current(&self) -> Option<Notification> { lock(&self.slot).current.clone() }
}
