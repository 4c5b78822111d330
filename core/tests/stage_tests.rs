// tests/stage_tests.rs
mod common;
use common::*;
use serial_test::serial;
use signflow::signing::hashes::HashFunctions;
use signflow::{Aggregate, MultiExpand, Payload, SingleExpand, StageStats};
use std::sync::Arc;

#[tokio::test]
#[serial]
async fn test_single_expand_with_stub_signers() {
  setup_tracing();
  let stage = Arc::new(SingleExpand::new(stub_hashes()));

  let (outputs, stats) = run_stage(stage, vec![Payload::Item(0), Payload::Item(1)]).await;

  assert_eq!(tokens(&outputs), vec![STUB_SINGLE, STUB_SINGLE]);
  assert_eq!(
    stats.unwrap(),
    StageStats {
      received: 2,
      emitted: 2,
      skipped: 0,
      failed: 0
    }
  );
}

#[tokio::test]
#[serial]
async fn test_single_expand_handles_negative_and_extreme_items() {
  setup_tracing();
  let stage = Arc::new(SingleExpand::new(HashFunctions::deterministic()));
  let items = vec![i64::MIN, -42, -1, 0, 1, 42, i64::MAX];

  let (outputs, stats) = run_stage(stage, items.iter().copied().map(Payload::Item).collect()).await;

  assert_eq!(stats.unwrap().emitted, items.len() as u64);
  for token in tokens(&outputs) {
    let parts: Vec<&str> = token.split('~').collect();
    assert_eq!(parts.len(), 2, "token {:?} should have exactly one separator", token);
    assert!(parts.iter().all(|p| !p.is_empty()), "empty half in {:?}", token);
  }
}

#[tokio::test]
#[serial]
async fn test_single_expand_processes_items_in_receipt_order() {
  setup_tracing();
  let single = SingleExpand::new(HashFunctions::deterministic());
  let items = [7_i64, -3, 12, 0];
  let expected: Vec<String> = items.iter().map(|i| single.expand(*i).unwrap()).collect();

  let (outputs, _) = run_stage(Arc::new(single), items.iter().copied().map(Payload::Item).collect()).await;

  assert_eq!(tokens(&outputs), expected.iter().map(String::as_str).collect::<Vec<_>>());
}

#[tokio::test]
#[serial]
async fn test_single_expand_skips_tokens_and_keeps_going() {
  setup_tracing();
  let stage = Arc::new(SingleExpand::new(stub_hashes()));

  let (outputs, stats) = run_stage(
    stage,
    vec![Payload::from("not an item"), Payload::Item(0), Payload::from("again"), Payload::Item(9)],
  )
  .await;

  assert_eq!(tokens(&outputs), vec![STUB_SINGLE, STUB_SINGLE]);
  let stats = stats.unwrap();
  assert_eq!(stats.received, 4);
  assert_eq!(stats.skipped, 2);
  assert_eq!(stats.emitted, 2);
}

#[tokio::test]
#[serial]
async fn test_single_expand_drops_only_the_item_whose_signer_fails() {
  setup_tracing();
  let stage = Arc::new(SingleExpand::new(hashes_failing_on("1")));

  let (outputs, stats) = run_stage(stage, vec![Payload::Item(0), Payload::Item(1), Payload::Item(2)]).await;

  assert_eq!(tokens(&outputs), vec!["B:A0~B:B:A0", "B:A2~B:B:A2"]);
  let stats = stats.unwrap();
  assert_eq!(stats.failed, 1);
  assert_eq!(stats.emitted, 2);
}

#[tokio::test]
#[serial]
async fn test_multi_expand_with_stub_signers() {
  setup_tracing();
  let stage = Arc::new(MultiExpand::new(stub_hashes()));

  let (outputs, stats) = run_stage(stage, vec![Payload::from(STUB_SINGLE)]).await;

  assert_eq!(tokens(&outputs), vec![STUB_MULTI]);
  assert_eq!(stats.unwrap().emitted, 1);
}

#[tokio::test]
#[serial]
async fn test_multi_expand_round_order_is_part_of_the_token() {
  setup_tracing();
  let hashes = stub_hashes();
  let multi = MultiExpand::new(hashes.clone());
  let token = "t";

  let in_order: String = (0..6).map(|i| hashes.hash_b(&format!("{}{}", i, token)).unwrap()).collect();
  let reversed: String = (0..6)
    .rev()
    .map(|i| hashes.hash_b(&format!("{}{}", i, token)).unwrap())
    .collect();

  let expanded = multi.expand(token).unwrap();
  assert_eq!(expanded, in_order);
  assert_ne!(expanded, reversed);
  assert_eq!(expanded, "B:0tB:1tB:2tB:3tB:4tB:5t");
}

#[tokio::test]
#[serial]
async fn test_multi_expand_skips_items() {
  setup_tracing();
  let stage = Arc::new(MultiExpand::new(stub_hashes()));

  let (outputs, stats) = run_stage(stage, vec![Payload::Item(5), Payload::from(STUB_SINGLE)]).await;

  assert_eq!(tokens(&outputs), vec![STUB_MULTI]);
  assert_eq!(stats.unwrap().skipped, 1);
}

#[tokio::test]
#[serial]
async fn test_aggregate_with_no_input_emits_one_empty_result() {
  setup_tracing();
  let (outputs, stats) = run_stage(Arc::new(Aggregate::new()), Vec::new()).await;

  assert_eq!(outputs, vec![Payload::Token(String::new())]);
  assert_eq!(
    stats.unwrap(),
    StageStats {
      received: 0,
      emitted: 1,
      skipped: 0,
      failed: 0
    }
  );
}

#[tokio::test]
#[serial]
async fn test_aggregate_ignores_arrival_order() {
  setup_tracing();
  let orders: [&[&str]; 3] = [&["b", "a", "c", "a"], &["c", "a", "a", "b"], &["a", "b", "a", "c"]];

  let mut results = Vec::new();
  for order in orders {
    let inputs = order.iter().map(|t| Payload::from(*t)).collect();
    let (outputs, _) = run_stage(Arc::new(Aggregate::new()), inputs).await;
    results.push(outputs);
  }

  for outputs in &results {
    assert_eq!(tokens(outputs), vec!["a_a_b_c"]);
  }
}

#[tokio::test]
#[serial]
async fn test_aggregate_sorts_byte_wise() {
  setup_tracing();
  let inputs = vec![Payload::from("b"), Payload::from("B"), Payload::from("a"), Payload::from("10"), Payload::from("9")];

  let (outputs, _) = run_stage(Arc::new(Aggregate::new()), inputs).await;

  assert_eq!(tokens(&outputs), vec!["10_9_B_a_b"]);
}

#[tokio::test]
#[serial]
async fn test_aggregate_skips_items() {
  setup_tracing();
  let inputs = vec![Payload::Item(3), Payload::from("y"), Payload::from("x")];

  let (outputs, stats) = run_stage(Arc::new(Aggregate::with_delimiter("|")), inputs).await;

  assert_eq!(tokens(&outputs), vec!["x|y"]);
  let stats = stats.unwrap();
  assert_eq!(stats.skipped, 1);
  assert_eq!(stats.emitted, 1);
}
