// signflow/src/signing/single_expand.rs

use crate::core::payload::Payload;
use crate::core::ports::{StageInput, StageOutput};
use crate::core::stage::{map_each, ItemOutcome, Stage, StageStats};
use crate::error::{SignflowError, SignflowResult};
use crate::signing::hashes::HashFunctions;
use async_trait::async_trait;

/// Separates the two halves of a single-expanded token.
pub const SINGLE_EXPAND_SEPARATOR: char = '~';

/// Turns each integer item into a two-part token.
///
/// For item `x` with `a = hashA(x)`, the token is `hashB(a) ~ hashB(hashB(a))`.
/// Items are independent, so any number of workers may run this stage.
#[derive(Debug, Clone)]
pub struct SingleExpand {
  hashes: HashFunctions,
}

impl SingleExpand {
  pub const NAME: &'static str = "single_expand";

  pub fn new(hashes: HashFunctions) -> Self {
    Self { hashes }
  }

  /// Expands one item. Public so callers can check tokens outside a run.
  pub fn expand(&self, item: i64) -> SignflowResult<String> {
    let digest = self.hashes.hash_a(&item.to_string())?;
    let left = self.hashes.hash_b(&digest)?;
    let right = self.hashes.hash_b(&left)?;
    Ok(format!("{}{}{}", left, SINGLE_EXPAND_SEPARATOR, right))
  }
}

#[async_trait]
impl Stage for SingleExpand {
  fn name(&self) -> &str {
    Self::NAME
  }

  async fn run(&self, input: StageInput, output: StageOutput) -> SignflowResult<StageStats> {
    map_each(input, output, |payload| match payload {
      Payload::Item(item) => match self.expand(item) {
        Ok(token) => ItemOutcome::Emit(Payload::Token(token)),
        Err(e) => ItemOutcome::Drop(e),
      },
      other => ItemOutcome::Skip(SignflowError::UnexpectedPayload {
        stage: Self::NAME.to_string(),
        expected: Payload::ITEM,
        actual: other.kind(),
      }),
    })
    .await
  }
}
