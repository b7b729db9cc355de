//! Two-view navigation gate.

use strum::{AsRefStr, Display};

/// The views a front end can show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum View {
  #[default]
  Connect,
  Query,
}

/// Tracks the active view and refuses `Query` until the session is
/// connected. `Connect` is always reachable; there is no terminal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavGate {
  active: View,
}

impl NavGate {
  pub fn active(&self) -> View { self.active }

  /// Whether `view` may be entered given the connection status.
  pub fn can_enter(view: View, is_connected: bool) -> bool {
    match view {
      View::Connect => true,
      View::Query => is_connected,
    }
  }

  /// Switch to `view` if allowed. Returns `false`, leaving the active view
  /// untouched, when the transition is refused.
  pub fn select(&mut self, view: View, is_connected: bool) -> bool {
    if !Self::can_enter(view, is_connected) {
      return false;
    }
    self.active = view;
    true
  }
}
