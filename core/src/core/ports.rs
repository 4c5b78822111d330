// signflow/src/core/ports.rs

//! Channel ends handed to stage workers.
//!
//! A `StageOutput` owns a sending half. The channel closes once every clone of
//! it is dropped, so a worker that takes its output by value closes it on every
//! exit path: normal return, `?`, cancellation or unwinding. Downstream workers
//! then observe end of input and close their own outputs in turn.
//!
//! Both ends watch the run's `CancellationToken` at every send and receive.

use crate::core::payload::Payload;
use crate::error::{SignflowError, SignflowResult};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

const UNBOUND: &str = "unbound";

/// Creates a connected pair of ports with room for `capacity` in-flight payloads.
///
/// # Panics
/// Panics if `capacity` is zero (see `tokio::sync::mpsc::channel`).
pub fn channel(capacity: usize, cancel: &CancellationToken) -> (StageOutput, StageInput) {
  let (tx, rx) = mpsc::channel(capacity);
  let output = StageOutput {
    stage: Arc::from(UNBOUND),
    tx,
    cancel: cancel.clone(),
  };
  let input = StageInput {
    stage: Arc::from(UNBOUND),
    rx: Arc::new(Mutex::new(rx)),
    cancel: cancel.clone(),
  };
  (output, input)
}

/// Sending end of a stage's output channel.
#[derive(Debug, Clone)]
pub struct StageOutput {
  stage: Arc<str>,
  tx: mpsc::Sender<Payload>,
  cancel: CancellationToken,
}

impl StageOutput {
  /// Labels this port with the name of the stage that writes to it.
  pub fn for_stage(mut self, stage: &str) -> Self {
    self.stage = Arc::from(stage);
    self
  }

  pub fn stage(&self) -> &str {
    &self.stage
  }

  /// Sends one payload, waiting for room downstream.
  ///
  /// Fails with `Cancelled` if the run is cancelled first, or `ChannelClosed`
  /// if the receiving side is gone.
  pub async fn send(&self, payload: impl Into<Payload>) -> SignflowResult<()> {
    let payload = payload.into();
    tokio::select! {
      biased;
      _ = self.cancel.cancelled() => Err(SignflowError::Cancelled {
        stage: self.stage.to_string(),
      }),
      res = self.tx.send(payload) => res.map_err(|_| SignflowError::ChannelClosed {
        stage: self.stage.to_string(),
      }),
    }
  }

  /// Drops this handle. The channel closes once no other clone is alive.
  pub fn close(self) {}
}

/// Receiving end of a stage's input channel.
///
/// Clones share the same receiver, which is how several workers of one stage
/// pull from a single upstream channel. Each payload goes to exactly one worker.
#[derive(Debug, Clone)]
pub struct StageInput {
  stage: Arc<str>,
  rx: Arc<Mutex<mpsc::Receiver<Payload>>>,
  cancel: CancellationToken,
}

impl StageInput {
  /// Labels this port with the name of the stage that reads from it.
  pub fn for_stage(mut self, stage: &str) -> Self {
    self.stage = Arc::from(stage);
    self
  }

  pub fn stage(&self) -> &str {
    &self.stage
  }

  /// Waits for the next payload.
  ///
  /// `Ok(None)` means the upstream channel is closed and fully drained.
  pub async fn recv(&self) -> SignflowResult<Option<Payload>> {
    let cancelled = || SignflowError::Cancelled {
      stage: self.stage.to_string(),
    };
    // The lock is only contended when several workers share this input.
    let mut rx = tokio::select! {
      biased;
      _ = self.cancel.cancelled() => return Err(cancelled()),
      guard = self.rx.lock() => guard,
    };
    tokio::select! {
      biased;
      _ = self.cancel.cancelled() => Err(cancelled()),
      next = rx.recv() => Ok(next),
    }
  }

  pub fn is_cancelled(&self) -> bool {
    self.cancel.is_cancelled()
  }
}
