// signflow/src/lib.rs

//! signflow: a staged, concurrent, in-memory signing pipeline.
//!
//! A run chains stages with bounded channels and runs each stage as its own
//! tokio task(s):
//!  - `SingleExpand` signs every integer item into a two-part token.
//!  - `MultiExpand` expands every token with six salted signing rounds.
//!  - `Aggregate` waits for all tokens, sorts them and joins them into one
//!    combined result.
//!
//! Closing the feed is what ends a run: each stage drains its input, and its
//! output closes when its workers return, so end-of-input travels down the
//! chain without any stage having to remember to close anything.

pub mod core;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod signing;

// --- Re-exports for the Public API ---

pub use crate::core::payload::Payload;
pub use crate::core::ports::{StageInput, StageOutput};
pub use crate::core::stage::{map_each, ItemOutcome, Stage, StageStats};

pub use crate::pipeline::{Feed, PipelineConfig, PipelineExecutor, PipelineRun, RunSummary, StageReport};

pub use crate::progress::{LogProgress, NoopProgress, ProgressSink, RecordingProgress};

pub use crate::signing::{
  sign_items, sign_items_with_summary, signing_stages, Aggregate, DataSigner, HashFunctions, HashMode, MultiExpand,
  SingleExpand,
};

pub use crate::error::{SignflowError, SignflowResult};

/*
    Typical use:
    1. Pick signers: `HashFunctions::deterministic()` or your own `DataSigner`s.
    2. Build a stage list, e.g. `signing_stages(hashes)`.
    3. `PipelineExecutor::new(config)?.execute(stages)` starts the workers and
       returns a `PipelineRun` straight away.
    4. `run.feed_and_collect(items, &progress).await?` feeds, closes the feed,
       drains the output and joins the workers.
    5. `summary.into_combined_result()` yields the aggregate.
*/
