// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use signflow::core::ports;
use signflow::signing::{infallible_signer, FnSigner};
use signflow::{HashFunctions, Payload, SignflowResult, Stage, StageStats};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Level;

// --- Stub signers ---

/// `hashA(s) = "A"`, `hashB(s) = "B:" + s`.
pub fn stub_hashes() -> HashFunctions {
  HashFunctions::new(
    infallible_signer("stub_a", |_| "A".to_string()),
    infallible_signer("stub_b", |s| format!("B:{}", s)),
  )
}

/// Like `stub_hashes`, but `hashA` fails for one specific input.
pub fn hashes_failing_on(poisoned: &'static str) -> HashFunctions {
  HashFunctions::new(
    FnSigner::new("flaky_a", move |s: &str| {
      if s == poisoned {
        anyhow::bail!("refusing to sign '{}'", s)
      }
      Ok(format!("A{}", s))
    }),
    infallible_signer("stub_b", |s| format!("B:{}", s)),
  )
}

pub const STUB_SINGLE: &str = "B:A~B:B:A";
pub const STUB_MULTI: &str =
  "B:0B:A~B:B:AB:1B:A~B:B:AB:2B:A~B:B:AB:3B:A~B:B:AB:4B:A~B:B:AB:5B:A~B:B:A";

// --- Stage harness ---

/// Runs one stage worker over `inputs` outside any executor and returns what it
/// emitted, in order, along with its counters.
pub async fn run_stage(stage: Arc<dyn Stage>, inputs: Vec<Payload>) -> (Vec<Payload>, SignflowResult<StageStats>) {
  let cancel = CancellationToken::new();
  let (feed, stage_in) = ports::channel(1, &cancel);
  let (stage_out, collected) = ports::channel(1, &cancel);

  let worker = {
    let stage = Arc::clone(&stage);
    let stage_in = stage_in.for_stage(stage.name());
    let stage_out = stage_out.for_stage(stage.name());
    tokio::spawn(async move { stage.run(stage_in, stage_out).await })
  };

  let feeder = tokio::spawn(async move {
    for payload in inputs {
      feed.send(payload).await.expect("stage hung up while being fed");
    }
    // `feed` drops here, closing the stage's input.
  });

  let mut outputs = Vec::new();
  while let Some(payload) = collected.recv().await.expect("collector cancelled") {
    outputs.push(payload);
  }
  feeder.await.expect("feeder panicked");
  let stats = worker.await.expect("stage worker panicked");
  (outputs, stats)
}

pub fn tokens(outputs: &[Payload]) -> Vec<&str> {
  outputs
    .iter()
    .map(|p| p.as_token().expect("expected only tokens"))
    .collect()
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
