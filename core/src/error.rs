// signflow/src/error.rs
use anyhow::Error as AnyhowError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignflowError {
  #[error("Signer '{signer}' failed. Source: {source}")]
  SignerFailure {
    signer: String,
    #[source]
    source: AnyhowError,
  },

  #[error("Stage '{stage}' received a {actual} payload (expected {expected})")]
  UnexpectedPayload {
    stage: String,
    expected: &'static str,
    actual: &'static str,
  },

  #[error("Stage '{stage}' was cancelled")]
  Cancelled { stage: String },

  #[error("Downstream of stage '{stage}' hung up while it was still sending")]
  ChannelClosed { stage: String },

  #[error("Worker {worker} of stage '{stage}' panicked: {message}")]
  WorkerPanicked {
    stage: String,
    worker: usize,
    message: String,
  },

  #[error("Expected {expected} from the final stage, got {actual}")]
  UnexpectedOutput { expected: String, actual: String },

  #[error("Pipeline run did not finish within {after:?}")]
  Timeout { after: Duration },

  #[error("Configuration error: {message}")]
  Configuration { message: String },

  #[error("Internal signflow error: {0}")]
  Internal(String),
}

impl SignflowError {
  /// True for errors that only mean "the run was told to stop".
  pub fn is_cancellation(&self) -> bool {
    matches!(self, SignflowError::Cancelled { .. })
  }
}

impl From<AnyhowError> for SignflowError {
  fn from(err: AnyhowError) -> Self {
    // Unwrap instead of nesting when anyhow is already carrying one of ours.
    match err.downcast::<SignflowError>() {
      Ok(inner) => inner,
      // `{:#}` keeps the whole context chain on one line.
      Err(other) => SignflowError::Internal(format!("{:#}", other)),
    }
  }
}

pub type SignflowResult<T, E = SignflowError> = std::result::Result<T, E>;
