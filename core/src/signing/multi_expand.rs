// signflow/src/signing/multi_expand.rs

use crate::core::payload::Payload;
use crate::core::ports::{StageInput, StageOutput};
use crate::core::stage::{map_each, ItemOutcome, Stage, StageStats};
use crate::error::{SignflowError, SignflowResult};
use crate::signing::hashes::HashFunctions;
use async_trait::async_trait;

/// Number of salted `hashB` rounds concatenated per token.
pub const MULTI_EXPAND_ROUNDS: usize = 6;

/// Expands each token into `hashB("0" + t) ++ hashB("1" + t) ++ … ++ hashB("5" + t)`.
///
/// The rounds run in ascending order and the order is part of the output, so
/// swapping two rounds changes the token.
#[derive(Debug, Clone)]
pub struct MultiExpand {
  hashes: HashFunctions,
}

impl MultiExpand {
  pub const NAME: &'static str = "multi_expand";

  pub fn new(hashes: HashFunctions) -> Self {
    Self { hashes }
  }

  pub fn expand(&self, token: &str) -> SignflowResult<String> {
    let mut expanded = String::new();
    for round in 0..MULTI_EXPAND_ROUNDS {
      expanded.push_str(&self.hashes.hash_b(&format!("{}{}", round, token))?);
    }
    Ok(expanded)
  }
}

#[async_trait]
impl Stage for MultiExpand {
  fn name(&self) -> &str {
    Self::NAME
  }

  async fn run(&self, input: StageInput, output: StageOutput) -> SignflowResult<StageStats> {
    map_each(input, output, |payload| match payload {
      Payload::Token(token) => match self.expand(&token) {
        Ok(expanded) => ItemOutcome::Emit(Payload::Token(expanded)),
        Err(e) => ItemOutcome::Drop(e),
      },
      other => ItemOutcome::Skip(SignflowError::UnexpectedPayload {
        stage: Self::NAME.to_string(),
        expected: Payload::TOKEN,
        actual: other.kind(),
      }),
    })
    .await
  }
}
