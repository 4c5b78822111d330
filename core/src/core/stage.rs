// signflow/src/core/stage.rs

//! Defines the `Stage` trait and the shared loop that drives per-item stages.

use crate::core::payload::Payload;
use crate::core::ports::{StageInput, StageOutput};
use crate::error::{SignflowError, SignflowResult};
use async_trait::async_trait;
use tracing::{event, Level};

/// A unit of pipeline work, run as one or more concurrent workers.
///
/// A worker receives from `input` until it is closed and drained, writes zero
/// or more payloads to `output`, then returns. `output` is taken by value so it
/// is dropped, and the downstream channel closed, however `run` exits.
///
/// Implementations must not abort on a payload of the wrong variant. Skip it,
/// log it and keep going.
#[async_trait]
pub trait Stage: Send + Sync {
  /// Name used in logs, spans and error messages.
  fn name(&self) -> &str;

  /// Barrier stages consume their whole input before emitting anything.
  /// The executor never runs more than one worker for them.
  fn is_barrier(&self) -> bool {
    false
  }

  async fn run(&self, input: StageInput, output: StageOutput) -> SignflowResult<StageStats>;
}

/// Counters kept by one worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageStats {
  pub received: u64,
  pub emitted: u64,
  /// Payloads of the wrong variant.
  pub skipped: u64,
  /// Items dropped because a signer failed on them.
  pub failed: u64,
}

impl StageStats {
  pub fn merge(&mut self, other: &StageStats) {
    self.received += other.received;
    self.emitted += other.emitted;
    self.skipped += other.skipped;
    self.failed += other.failed;
  }
}

/// What a per-item transform decided for one payload.
#[derive(Debug)]
pub enum ItemOutcome {
  Emit(Payload),
  /// The payload was not something this stage handles.
  Skip(SignflowError),
  /// Processing the payload failed. Only this item is lost.
  Drop(SignflowError),
}

/// Drives a per-item stage: one payload in, at most one payload out, strictly
/// in receipt order.
///
/// Skips and drops are logged and counted; neither stops the loop. Send and
/// receive errors (cancellation, a vanished downstream) end it.
pub async fn map_each<F>(input: StageInput, output: StageOutput, mut transform: F) -> SignflowResult<StageStats>
where
  F: FnMut(Payload) -> ItemOutcome + Send,
{
  let mut stats = StageStats::default();

  while let Some(payload) = input.recv().await? {
    stats.received += 1;
    match transform(payload) {
      ItemOutcome::Emit(next) => {
        output.send(next).await?;
        stats.emitted += 1;
      }
      ItemOutcome::Skip(reason) => {
        stats.skipped += 1;
        event!(Level::WARN, stage = output.stage(), reason = %reason, "Skipping malformed payload.");
      }
      ItemOutcome::Drop(err) => {
        stats.failed += 1;
        event!(Level::WARN, stage = output.stage(), error = %err, "Dropping item after failure.");
      }
    }
  }

  event!(Level::DEBUG, stage = output.stage(), ?stats, "Input drained.");
  Ok(stats)
}
