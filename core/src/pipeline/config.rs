// signflow/src/pipeline/config.rs

use crate::error::{SignflowError, SignflowResult};
use std::time::Duration;

/// Knobs for one `PipelineExecutor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
  /// Payloads that may sit in each inter-stage channel. `1` keeps producers and
  /// consumers in near lock-step.
  pub channel_capacity: usize,
  /// Workers spawned for each non-barrier stage. Barrier stages always get one.
  pub workers_per_stage: usize,
  /// Upper bound on `PipelineRun::finish` / `feed_and_collect`. The run is
  /// cancelled when it elapses.
  pub run_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      channel_capacity: 1,
      workers_per_stage: 1,
      run_timeout: None,
    }
  }
}

impl PipelineConfig {
  pub fn with_channel_capacity(mut self, channel_capacity: usize) -> Self {
    self.channel_capacity = channel_capacity;
    self
  }

  pub fn with_workers_per_stage(mut self, workers_per_stage: usize) -> Self {
    self.workers_per_stage = workers_per_stage;
    self
  }

  pub fn with_run_timeout(mut self, run_timeout: Duration) -> Self {
    self.run_timeout = Some(run_timeout);
    self
  }

  pub fn validate(&self) -> SignflowResult<()> {
    if self.channel_capacity == 0 {
      return Err(SignflowError::Configuration {
        message: "channel_capacity must be at least 1".to_string(),
      });
    }
    if self.workers_per_stage == 0 {
      return Err(SignflowError::Configuration {
        message: "workers_per_stage must be at least 1".to_string(),
      });
    }
    if self.run_timeout == Some(Duration::ZERO) {
      return Err(SignflowError::Configuration {
        message: "run_timeout must be non-zero when set".to_string(),
      });
    }
    Ok(())
  }
}
