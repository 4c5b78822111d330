// signflow/src/pipeline/executor.rs

//! Wires stages into a chain of channels and launches their workers.

use crate::core::ports::{self, StageInput, StageOutput};
use crate::core::stage::Stage;
use crate::error::SignflowResult;
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::run::{PipelineRun, WorkerHandle};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{event, instrument, span, Instrument, Level};

/// Launches pipeline runs.
///
/// The executor itself holds no per-run state; every `execute` call builds a
/// fresh set of channels, workers and a cancellation token, all owned by the
/// returned `PipelineRun`.
#[derive(Debug, Clone, Default)]
pub struct PipelineExecutor {
  config: PipelineConfig,
}

impl PipelineExecutor {
  pub fn new(config: PipelineConfig) -> SignflowResult<Self> {
    config.validate()?;
    Ok(Self { config })
  }

  pub fn config(&self) -> &PipelineConfig {
    &self.config
  }

  /// Chains `stages` in order and starts their workers, without waiting for
  /// any of them.
  ///
  /// Stage `i` reads from the channel stage `i - 1` writes to; the first stage
  /// reads from the run's feed and the last stage's channel is exposed through
  /// the returned `PipelineRun`. With no stages the feed is wired straight to
  /// the output.
  ///
  /// Must be called from within a tokio runtime.
  #[instrument(
    name = "PipelineExecutor::execute",
    skip_all,
    fields(
      num_stages = stages.len(),
      workers_per_stage = self.config.workers_per_stage,
      channel_capacity = self.config.channel_capacity,
    )
  )]
  pub fn execute(&self, stages: Vec<Arc<dyn Stage>>) -> PipelineRun {
    let cancel = CancellationToken::new();
    let capacity = self.config.channel_capacity;

    let (feed, mut current) = ports::channel(capacity, &cancel);
    let feed = feed.for_stage("feed");
    let mut workers = Vec::new();

    for (stage_index, stage) in stages.into_iter().enumerate() {
      let (output, next) = ports::channel(capacity, &cancel);
      let input = current.for_stage(stage.name());
      let output = output.for_stage(stage.name());

      let worker_count = if stage.is_barrier() {
        1
      } else {
        self.config.workers_per_stage
      };
      for worker in 0..worker_count {
        workers.push(spawn_worker(
          stage_index,
          worker,
          Arc::clone(&stage),
          input.clone(),
          output.clone(),
          cancel.clone(),
        ));
      }
      event!(Level::DEBUG, stage = stage.name(), stage_index, worker_count, "Stage launched.");
      // `input` and `output` drop here: from now on only the workers hold
      // this stage's output, so it closes when the last of them exits.
      current = next;
    }

    event!(Level::DEBUG, num_workers = workers.len(), "Pipeline launched.");
    PipelineRun::new(feed, current.for_stage("collector"), workers, cancel, self.config.run_timeout)
  }
}

fn spawn_worker(
  stage_index: usize,
  worker: usize,
  stage: Arc<dyn Stage>,
  input: StageInput,
  output: StageOutput,
  cancel: CancellationToken,
) -> WorkerHandle {
  let stage_name = stage.name().to_string();
  let worker_span = span!(
    Level::INFO,
    "stage_worker",
    stage = stage_name.as_str(),
    stage_index,
    worker
  );

  let handle = tokio::spawn(
    async move {
      event!(Level::TRACE, "Worker started.");
      let result = stage.run(input, output).await;
      match &result {
        Ok(stats) => event!(Level::DEBUG, ?stats, "Worker finished."),
        Err(e) if e.is_cancellation() => event!(Level::DEBUG, "Worker stopped by cancellation."),
        Err(e) => {
          event!(Level::ERROR, error = %e, "Worker failed, cancelling run.");
          cancel.cancel();
        }
      }
      result
    }
    .instrument(worker_span),
  );

  WorkerHandle {
    stage: stage_name,
    worker,
    handle,
  }
}
