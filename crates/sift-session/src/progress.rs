//! Synthetic progress reporting.
//!
//! The percentage shown while an operation runs is cosmetic: it climbs in
//! ten equal steps over a nominal duration and has no relation to when the
//! real request settles. The request may finish before the bar reaches 100,
//! or long after it has sat at 100.

use std::{
  sync::{Arc, Mutex, Weak},
  time::Duration,
};

use sift_core::status::OperationProgress;
use tokio::{task::JoinHandle, time::Instant};

use crate::lock;

/// Number of increments between 0 and 100.
pub const PROGRESS_STEPS: u32 = 10;

const STEP_PERCENT: u8 = 10;

#[derive(Default)]
struct Run {
  current:    Option<OperationProgress>,
  generation: u64,
  ticker:     Option<JoinHandle<()>>,
}

/// Drives a single [`OperationProgress`] at a time.
///
/// Cheap to clone; clones share the run.
#[derive(Clone, Default)]
pub struct ProgressReporter {
  run: Arc<Mutex<Run>>,
}

impl ProgressReporter {
  pub fn new() -> Self { Self::default() }

  /// Begin a run at 0% that advances every `nominal / 10`, replacing any
  /// run already in progress.
  ///
  /// The returned guard stops the run when dropped. Must be called from
  /// within a Tokio runtime.
  #[must_use = "dropping the guard stops the progress run immediately"]
  pub fn start(&self, label: impl Into<String>, nominal: Duration) -> ProgressGuard {
    let step = (nominal / PROGRESS_STEPS).max(Duration::from_millis(1));
    let first_tick = Instant::now() + step;
    let mut run = lock(&self.run);

    if let Some(previous) = run.ticker.take() {
      previous.abort();
    }
    run.generation = run.generation.wrapping_add(1);
    run.current = Some(OperationProgress {
      percent: 0,
      label:   label.into(),
    });

    let generation = run.generation;
    let weak: Weak<Mutex<Run>> = Arc::downgrade(&self.run);
    run.ticker = Some(tokio::spawn(async move {
      let mut interval = tokio::time::interval_at(first_tick, step);
      loop {
        interval.tick().await;
        let Some(shared) = weak.upgrade() else { return };
        let mut run = lock(&shared);
        if run.generation != generation {
          return;
        }
        let Some(progress) = run.current.as_mut() else { return };
        progress.percent = progress.percent.saturating_add(STEP_PERCENT).min(100);
        if progress.percent == 100 {
          run.ticker = None;
          return;
        }
      }
    }));

    ProgressGuard {
      reporter: self.clone(),
      generation,
    }
  }

  /// Halt advancement and return to idle.
  pub fn stop(&self) {
    let mut run = lock(&self.run);
    Self::reset(&mut run);
  }

  pub fn current(&self) -> Option<OperationProgress> { lock(&self.run).current.clone() }

  fn reset(run: &mut Run) {
    if let Some(ticker) = run.ticker.take() {
      ticker.abort();
    }
    run.generation = run.generation.wrapping_add(1);
    run.current = None;
  }
}

/// Stops its progress run on drop, whichever way the operation ends.
///
/// A guard whose run has already been replaced by a newer `start` leaves the
/// newer run alone.
pub struct ProgressGuard {
  reporter:   ProgressReporter,
  generation: u64,
}

impl Drop for ProgressGuard {
  fn drop(&mut self) {
    let mut run = lock(&self.reporter.run);
    if run.generation == self.generation {
      ProgressReporter::reset(&mut run);
    }
  }
}
