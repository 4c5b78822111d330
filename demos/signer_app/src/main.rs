// demos/signer_app/src/main.rs

mod config;
mod errors;

use crate::config::SignerConfig;
use crate::errors::Result as AppResult;
use signflow::{sign_items_with_summary, HashFunctions, HashMode, LogProgress};
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialize tracing subscriber for logging (RUST_LOG overrides the default level)
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .init();

  let config = SignerConfig::from_env()?;
  let combined = run(&config).await?;

  println!("{}", combined);
  println!("Done.");
  Ok(())
}

async fn run(config: &SignerConfig) -> AppResult<String> {
  if config.hash_mode == HashMode::Random {
    tracing::warn!("Random signers selected: the combined result will differ on every run.");
  }

  let progress = LogProgress::new((config.num_jobs as u64 / 10).max(1)).with_expected(config.num_jobs as u64);
  let summary = sign_items_with_summary(
    0..config.num_jobs,
    HashFunctions::for_mode(config.hash_mode),
    config.pipeline_config(),
    &progress,
  )
  .await?;

  for report in &summary.reports {
    tracing::info!(stage = %report.stage, worker = report.worker, stats = ?report.stats, "Stage report.");
  }
  Ok(summary.into_combined_result()?)
}
