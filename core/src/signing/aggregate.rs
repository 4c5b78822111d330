// signflow/src/signing/aggregate.rs

use crate::core::payload::Payload;
use crate::core::ports::{StageInput, StageOutput};
use crate::core::stage::{Stage, StageStats};
use crate::error::SignflowResult;
use async_trait::async_trait;
use tracing::{event, Level};

/// Joins the sorted tokens of a combined result.
pub const AGGREGATE_DELIMITER: &str = "_";

/// Barrier stage: collects every token, then emits one combined result.
///
/// Nothing is emitted until the input is closed. The result is the tokens
/// sorted byte-wise and joined with the delimiter, so it does not depend on
/// arrival order. An empty input yields one empty string.
#[derive(Debug, Clone)]
pub struct Aggregate {
  delimiter: String,
}

impl Aggregate {
  pub const NAME: &'static str = "aggregate";

  pub fn new() -> Self {
    Self::with_delimiter(AGGREGATE_DELIMITER)
  }

  pub fn with_delimiter(delimiter: impl Into<String>) -> Self {
    Self {
      delimiter: delimiter.into(),
    }
  }

  /// Sorts and joins a finished set of tokens.
  pub fn combine(&self, mut tokens: Vec<String>) -> String {
    // `String`'s `Ord` is byte-wise.
    tokens.sort_unstable();
    tokens.join(&self.delimiter)
  }
}

impl Default for Aggregate {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl Stage for Aggregate {
  fn name(&self) -> &str {
    Self::NAME
  }

  fn is_barrier(&self) -> bool {
    true
  }

  async fn run(&self, input: StageInput, output: StageOutput) -> SignflowResult<StageStats> {
    let mut stats = StageStats::default();
    let mut tokens = Vec::new();

    while let Some(payload) = input.recv().await? {
      stats.received += 1;
      match payload.into_token() {
        Ok(token) => tokens.push(token),
        Err(other) => {
          stats.skipped += 1;
          event!(Level::WARN, stage = Self::NAME, actual = other.kind(), "Skipping non-token payload.");
        }
      }
    }

    event!(Level::DEBUG, stage = Self::NAME, tokens = tokens.len(), "Input closed, combining.");
    output.send(Payload::Token(self.combine(tokens))).await?;
    stats.emitted += 1;
    Ok(stats)
  }
}
