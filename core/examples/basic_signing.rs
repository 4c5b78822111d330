// signflow/examples/basic_signing.rs

use signflow::{signing_stages, HashFunctions, PipelineConfig, PipelineExecutor, RecordingProgress, SignflowError};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), SignflowError> {
  // Initialize tracing (optional, for demonstration)
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Basic Signing Example ---");

  // 1. Build the executor. Defaults: one worker per stage, capacity-1 channels.
  let executor = PipelineExecutor::new(PipelineConfig::default())?;

  // 2. Launch SingleExpand -> MultiExpand -> Aggregate. This returns at once;
  //    the workers are already waiting for input.
  let run = executor.execute(signing_stages(HashFunctions::deterministic()));

  // 3. Feed the items, close the feed, drain the output and join the workers.
  let progress = RecordingProgress::new();
  let summary = run.feed_and_collect(0..8_i64, &progress).await?;

  // 4. Inspect the results
  for report in &summary.reports {
    info!(stage = %report.stage, worker = report.worker, stats = ?report.stats, "Worker report");
  }
  info!("Items fed: {}", progress.items().len());

  let combined = summary.into_combined_result()?;
  info!("Combined result: {}", combined);

  // Eight items in, eight expanded tokens joined by '_' out.
  assert_eq!(combined.split('_').count(), 8);

  Ok(())
}
