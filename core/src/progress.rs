// signflow/src/progress.rs

//! Observers notified as items are fed into a run.
//!
//! Sinks are called on the feeding task between sends. They must return
//! quickly; they cannot slow or stop the pipeline any other way.

use crate::core::payload::Payload;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{event, Level};

pub trait ProgressSink: Send + Sync {
  /// Called once per item, after it was accepted by the first stage.
  fn item_fed(&self, item: &Payload);

  /// Called once when the feed is closed.
  fn feed_closed(&self, _total: u64) {}
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
  fn item_fed(&self, _item: &Payload) {}
}

/// Logs a line every `every` items and once at the end.
#[derive(Debug)]
pub struct LogProgress {
  every: u64,
  expected: Option<u64>,
  fed: AtomicU64,
}

impl LogProgress {
  pub fn new(every: u64) -> Self {
    Self {
      every: every.max(1),
      expected: None,
      fed: AtomicU64::new(0),
    }
  }

  /// Includes the expected total in every log line.
  pub fn with_expected(mut self, expected: u64) -> Self {
    self.expected = Some(expected);
    self
  }

  pub fn fed(&self) -> u64 {
    self.fed.load(Ordering::Relaxed)
  }
}

impl ProgressSink for LogProgress {
  fn item_fed(&self, _item: &Payload) {
    let fed = self.fed.fetch_add(1, Ordering::Relaxed) + 1;
    if fed % self.every == 0 {
      event!(target: "signflow::progress", Level::INFO, fed, expected = ?self.expected, "Feeding pipeline.");
    }
  }

  fn feed_closed(&self, total: u64) {
    event!(target: "signflow::progress", Level::INFO, total, "Feed closed.");
  }
}

/// Remembers every item it was told about, in feed order.
#[derive(Debug, Default)]
pub struct RecordingProgress {
  items: Mutex<Vec<Payload>>,
  closed_with: Mutex<Option<u64>>,
}

impl RecordingProgress {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn items(&self) -> Vec<Payload> {
    self.items.lock().clone()
  }

  /// The total passed to `feed_closed`, if it has been called.
  pub fn closed_with(&self) -> Option<u64> {
    *self.closed_with.lock()
  }
}

impl ProgressSink for RecordingProgress {
  fn item_fed(&self, item: &Payload) {
    self.items.lock().push(item.clone());
  }

  fn feed_closed(&self, total: u64) {
    *self.closed_with.lock() = Some(total);
  }
}
