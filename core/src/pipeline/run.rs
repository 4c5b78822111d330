// signflow/src/pipeline/run.rs

//! The handle to one launched pipeline: its feed, its final output and its workers.

use crate::core::payload::Payload;
use crate::core::ports::{StageInput, StageOutput};
use crate::core::stage::StageStats;
use crate::error::{SignflowError, SignflowResult};
use crate::progress::ProgressSink;
use std::any::Any;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{event, instrument, Level};

pub(crate) struct WorkerHandle {
  pub(crate) stage: String,
  pub(crate) worker: usize,
  pub(crate) handle: JoinHandle<SignflowResult<StageStats>>,
}

/// Counters of one finished worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
  pub stage: String,
  pub worker: usize,
  pub stats: StageStats,
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
  /// Payloads emitted by the last stage, in the order they arrived.
  pub outputs: Vec<Payload>,
  /// One report per worker, in launch order.
  pub reports: Vec<StageReport>,
}

impl RunSummary {
  /// Sums the counters of every worker of `stage`.
  pub fn stage_totals(&self, stage: &str) -> StageStats {
    let mut totals = StageStats::default();
    for report in self.reports.iter().filter(|r| r.stage == stage) {
      totals.merge(&report.stats);
    }
    totals
  }

  /// The single token emitted by a run ending in an aggregating stage.
  pub fn into_combined_result(self) -> SignflowResult<String> {
    let count = self.outputs.len();
    let mut outputs = self.outputs.into_iter();
    match (outputs.next(), count) {
      (Some(Payload::Token(combined)), 1) => Ok(combined),
      (first, _) => Err(SignflowError::UnexpectedOutput {
        expected: "exactly one token".to_string(),
        actual: match first {
          None => "no output".to_string(),
          Some(p) => format!("{} output(s), first a {}", count, p.kind()),
        },
      }),
    }
  }
}

/// Write access to the first stage's input.
///
/// Dropping the feed (or calling `close`) is what tells the pipeline no more
/// items are coming.
#[derive(Debug)]
pub struct Feed {
  port: StageOutput,
  fed: u64,
}

impl Feed {
  pub async fn send(&mut self, item: impl Into<Payload>) -> SignflowResult<()> {
    self.port.send(item).await?;
    self.fed += 1;
    Ok(())
  }

  /// Items accepted so far.
  pub fn fed(&self) -> u64 {
    self.fed
  }

  pub fn close(self) {}
}

/// A launched pipeline.
///
/// The first stage's input is reachable through `feed_port` (or fed in one go
/// by `feed_and_collect`); the last stage's output through `recv`. Dropping an
/// unfinished run cancels every worker.
///
/// With the default capacity of 1 the channels hold almost nothing, so when the
/// last stage is not a barrier, feeding and draining must happen concurrently.
/// `feed_and_collect` does this.
pub struct PipelineRun {
  feed: Option<StageOutput>,
  output: StageInput,
  workers: Vec<WorkerHandle>,
  cancel: CancellationToken,
  run_timeout: Option<Duration>,
}

impl PipelineRun {
  pub(crate) fn new(
    feed: StageOutput,
    output: StageInput,
    workers: Vec<WorkerHandle>,
    cancel: CancellationToken,
    run_timeout: Option<Duration>,
  ) -> Self {
    Self {
      feed: Some(feed),
      output,
      workers,
      cancel,
      run_timeout,
    }
  }

  /// Takes the feed. Returns `None` if it was already taken.
  pub fn feed_port(&mut self) -> Option<Feed> {
    self.feed.take().map(|port| Feed { port, fed: 0 })
  }

  /// Next payload from the last stage. `Ok(None)` once the run has drained.
  pub async fn recv(&self) -> SignflowResult<Option<Payload>> {
    self.output.recv().await
  }

  pub fn num_workers(&self) -> usize {
    self.workers.len()
  }

  /// Asks every worker to stop at its next send or receive.
  pub fn cancel(&self) {
    event!(Level::INFO, "Pipeline run cancelled by caller.");
    self.cancel.cancel();
  }

  pub fn cancellation_token(&self) -> CancellationToken {
    self.cancel.clone()
  }

  /// Closes the feed (if this handle still has it), drains the remaining
  /// output and waits for every worker.
  ///
  /// If the feed was taken with `feed_port`, this waits until that `Feed` is
  /// dropped.
  #[instrument(name = "PipelineRun::finish", skip_all, fields(num_workers = self.workers.len()), err(Display))]
  pub async fn finish(mut self) -> SignflowResult<RunSummary> {
    self.feed = None;
    let workers = std::mem::take(&mut self.workers);
    let cancel = self.cancel.clone();
    let output = &self.output;

    let work = async move {
      let (outputs, drain_error) = drain(output).await;
      let (reports, worker_error) = join_workers(workers, &cancel).await;
      settle(outputs, reports, [drain_error, worker_error])
    };
    with_deadline(self.run_timeout, &self.cancel, work).await
  }

  /// Feeds `items` into the run while concurrently draining its output, then
  /// waits for every worker.
  ///
  /// `progress` is told about each item once the first stage has accepted it,
  /// and once more when the feed closes.
  #[instrument(name = "PipelineRun::feed_and_collect", skip_all, fields(num_workers = self.workers.len()), err(Display))]
  pub async fn feed_and_collect<I>(mut self, items: I, progress: &dyn ProgressSink) -> SignflowResult<RunSummary>
  where
    I: IntoIterator,
    I::Item: Into<Payload>,
  {
    let feed = self.feed_port().ok_or_else(|| SignflowError::Configuration {
      message: "feed_and_collect called after the feed was taken".to_string(),
    })?;
    let workers = std::mem::take(&mut self.workers);
    let cancel = self.cancel.clone();
    let output = &self.output;

    let work = async move {
      let (feed_result, (outputs, drain_error)) = tokio::join!(feed_all(feed, items, progress), drain(output));
      let (reports, worker_error) = join_workers(workers, &cancel).await;
      settle(outputs, reports, [feed_result.err(), drain_error, worker_error])
    };
    with_deadline(self.run_timeout, &self.cancel, work).await
  }
}

impl Drop for PipelineRun {
  fn drop(&mut self) {
    if !self.workers.is_empty() {
      event!(Level::DEBUG, "Unfinished pipeline run dropped, cancelling workers.");
      self.cancel.cancel();
    }
  }
}

async fn feed_all<I>(mut feed: Feed, items: I, progress: &dyn ProgressSink) -> SignflowResult<u64>
where
  I: IntoIterator,
  I::Item: Into<Payload>,
{
  for item in items {
    let payload: Payload = item.into();
    feed.send(payload.clone()).await?;
    progress.item_fed(&payload);
  }
  let total = feed.fed();
  feed.close();
  progress.feed_closed(total);
  event!(Level::DEBUG, total, "Feed closed.");
  Ok(total)
}

async fn drain(output: &StageInput) -> (Vec<Payload>, Option<SignflowError>) {
  let mut outputs = Vec::new();
  loop {
    match output.recv().await {
      Ok(Some(payload)) => outputs.push(payload),
      Ok(None) => return (outputs, None),
      Err(e) => return (outputs, Some(e)),
    }
  }
}

async fn join_workers(
  workers: Vec<WorkerHandle>,
  cancel: &CancellationToken,
) -> (Vec<StageReport>, Option<SignflowError>) {
  let mut reports = Vec::with_capacity(workers.len());
  let mut error = None;

  for WorkerHandle { stage, worker, handle } in workers {
    match handle.await {
      Ok(Ok(stats)) => reports.push(StageReport { stage, worker, stats }),
      Ok(Err(e)) => keep_worst(&mut error, e),
      Err(join_error) => {
        // The worker's ports were dropped while unwinding, so neighbours
        // already see a closed channel; make sure the rest stop too.
        cancel.cancel();
        let message = if join_error.is_panic() {
          panic_message(join_error.into_panic())
        } else {
          join_error.to_string()
        };
        event!(Level::ERROR, %stage, worker, %message, "Worker panicked.");
        keep_worst(&mut error, SignflowError::WorkerPanicked { stage, worker, message });
      }
    }
  }
  (reports, error)
}

/// Picks the error that best explains a failed run. Cancellation and hang-ups
/// are usually fallout from some other failure.
fn keep_worst(slot: &mut Option<SignflowError>, candidate: SignflowError) {
  fn rank(e: &SignflowError) -> u8 {
    match e {
      SignflowError::Cancelled { .. } => 0,
      SignflowError::ChannelClosed { .. } => 1,
      _ => 2,
    }
  }
  match slot {
    Some(current) if rank(current) >= rank(&candidate) => {}
    _ => *slot = Some(candidate),
  }
}

fn settle<const N: usize>(
  outputs: Vec<Payload>,
  reports: Vec<StageReport>,
  errors: [Option<SignflowError>; N],
) -> SignflowResult<RunSummary> {
  let mut worst = None;
  for e in errors.into_iter().flatten() {
    keep_worst(&mut worst, e);
  }
  match worst {
    Some(e) => Err(e),
    None => Ok(RunSummary { outputs, reports }),
  }
}

async fn with_deadline<T>(
  deadline: Option<Duration>,
  cancel: &CancellationToken,
  work: impl Future<Output = SignflowResult<T>>,
) -> SignflowResult<T> {
  let Some(after) = deadline else {
    return work.await;
  };
  match tokio::time::timeout(after, work).await {
    Ok(result) => result,
    Err(_) => {
      event!(Level::ERROR, ?after, "Pipeline run timed out, cancelling.");
      cancel.cancel();
      Err(SignflowError::Timeout { after })
    }
  }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
  if let Some(s) = payload.downcast_ref::<&str>() {
    (*s).to_string()
  } else if let Some(s) = payload.downcast_ref::<String>() {
    s.clone()
  } else {
    "non-string panic payload".to_string()
  }
}
