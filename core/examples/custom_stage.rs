// signflow/examples/custom_stage.rs

use async_trait::async_trait;
use signflow::{
  map_each, Aggregate, ItemOutcome, NoopProgress, Payload, PipelineConfig, PipelineExecutor, SignflowError,
  SignflowResult, Stage, StageInput, StageOutput, StageStats,
};
use std::sync::Arc;
use tracing::info;

// 1. A stage of our own: renders every odd item as a token and drops the rest.
//    `map_each` runs the receive/send loop, so the stage only decides what to
//    do with one payload.
struct OddsAsTokens;

#[async_trait]
impl Stage for OddsAsTokens {
  fn name(&self) -> &str {
    "odds_as_tokens"
  }

  async fn run(&self, input: StageInput, output: StageOutput) -> SignflowResult<StageStats> {
    map_each(input, output, |payload| match payload {
      Payload::Item(i) if i % 2 != 0 => ItemOutcome::Emit(Payload::Token(format!("odd{:03}", i))),
      Payload::Item(i) => ItemOutcome::Drop(SignflowError::Internal(format!("{} is even", i))),
      other => ItemOutcome::Skip(SignflowError::UnexpectedPayload {
        stage: "odds_as_tokens".to_string(),
        expected: Payload::ITEM,
        actual: other.kind(),
      }),
    })
    .await
  }
}

#[tokio::main]
async fn main() -> Result<(), SignflowError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Custom Stage Example ---");

  // 2. Mix it with a built-in barrier stage. Three workers for the custom
  //    stage; the aggregate always gets exactly one.
  let stages: Vec<Arc<dyn Stage>> = vec![Arc::new(OddsAsTokens), Arc::new(Aggregate::with_delimiter(","))];
  let executor = PipelineExecutor::new(PipelineConfig::default().with_workers_per_stage(3))?;
  let run = executor.execute(stages);

  // 3. Run it. Worker interleaving may shuffle the tokens; the aggregate sorts them.
  let summary = run.feed_and_collect((1..=9_i64).rev(), &NoopProgress).await?;
  info!("Dropped as even: {}", summary.stage_totals("odds_as_tokens").failed);

  let combined = summary.into_combined_result()?;
  info!("Combined: {}", combined);
  assert_eq!(combined, "odd001,odd003,odd005,odd007,odd009");

  Ok(())
}
