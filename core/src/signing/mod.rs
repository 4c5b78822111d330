// signflow/src/signing/mod.rs

//! The signing stages and the helpers that chain them.

pub mod aggregate;
pub mod hashes;
pub mod multi_expand;
pub mod single_expand;

pub use aggregate::{Aggregate, AGGREGATE_DELIMITER};
pub use hashes::{
  infallible_signer, Crc32Signer, DataSigner, DigestSigner, FnSigner, HashFunctions, HashMode, RandomSigner,
};
pub use multi_expand::{MultiExpand, MULTI_EXPAND_ROUNDS};
pub use single_expand::{SingleExpand, SINGLE_EXPAND_SEPARATOR};

use crate::core::stage::Stage;
use crate::error::SignflowResult;
use crate::pipeline::{PipelineConfig, PipelineExecutor, RunSummary};
use crate::progress::ProgressSink;
use std::sync::Arc;
use tracing::instrument;

/// SingleExpand → MultiExpand → Aggregate, sharing one pair of signers.
pub fn signing_stages(hashes: HashFunctions) -> Vec<Arc<dyn Stage>> {
  vec![
    Arc::new(SingleExpand::new(hashes.clone())),
    Arc::new(MultiExpand::new(hashes)),
    Arc::new(Aggregate::new()),
  ]
}

/// Runs `items` through the signing stages and returns the whole summary.
#[instrument(name = "signing::sign_items_with_summary", skip_all, err(Display))]
pub async fn sign_items_with_summary<I>(
  items: I,
  hashes: HashFunctions,
  config: PipelineConfig,
  progress: &dyn ProgressSink,
) -> SignflowResult<RunSummary>
where
  I: IntoIterator<Item = i64>,
{
  let executor = PipelineExecutor::new(config)?;
  let run = executor.execute(signing_stages(hashes));
  run.feed_and_collect(items, progress).await
}

/// Runs `items` through the signing stages and returns the combined result.
pub async fn sign_items<I>(
  items: I,
  hashes: HashFunctions,
  config: PipelineConfig,
  progress: &dyn ProgressSink,
) -> SignflowResult<String>
where
  I: IntoIterator<Item = i64>,
{
  sign_items_with_summary(items, hashes, config, progress)
    .await?
    .into_combined_result()
}
