use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use signflow::{signing_stages, HashFunctions, NoopProgress, PipelineConfig, PipelineExecutor, SingleExpand};
use tokio::runtime::Runtime; // To run async code within Criterion

// --- Benchmark Functions ---

fn bench_signing_pipeline(c: &mut Criterion) {
  let mut group = c.benchmark_group("SigningPipeline");
  let rt = Runtime::new().unwrap();

  for num_items in [1_i64, 100, 1_000].iter() {
    for workers in [1_usize, 4].iter() {
      let config = PipelineConfig::default().with_workers_per_stage(*workers);
      let executor = PipelineExecutor::new(config).unwrap();

      group.throughput(Throughput::Elements(*num_items as u64));
      group.bench_with_input(
        BenchmarkId::new(format!("{}workers", workers), num_items),
        num_items,
        |b, &n| {
          b.to_async(&rt).iter(|| {
            let executor = executor.clone();
            async move {
              let run = executor.execute(signing_stages(HashFunctions::deterministic()));
              run.feed_and_collect(0..n, &NoopProgress).await.unwrap()
            }
          });
        },
      );
    }
  }
  group.finish();
}

// Buffering only matters when stages run at different speeds; this measures
// the channel hand-off cost alone.
fn bench_channel_capacity(c: &mut Criterion) {
  let mut group = c.benchmark_group("ChannelCapacity");
  let rt = Runtime::new().unwrap();
  let num_items: i64 = 1_000;

  for capacity in [1_usize, 16, 256].iter() {
    let executor = PipelineExecutor::new(PipelineConfig::default().with_channel_capacity(*capacity)).unwrap();

    group.throughput(Throughput::Elements(num_items as u64));
    group.bench_with_input(BenchmarkId::from_parameter(capacity), capacity, |b, _| {
      b.to_async(&rt).iter(|| {
        let executor = executor.clone();
        async move {
          let run = executor.execute(signing_stages(HashFunctions::deterministic()));
          run.feed_and_collect(0..num_items, &NoopProgress).await.unwrap()
        }
      });
    });
  }
  group.finish();
}

fn bench_single_expand(c: &mut Criterion) {
  let stage = SingleExpand::new(HashFunctions::deterministic());
  c.bench_function("single_expand_one_item", |b| b.iter(|| stage.expand(criterion::black_box(42)).unwrap()));
}

criterion_group!(benches, bench_signing_pipeline, bench_channel_capacity, bench_single_expand);
criterion_main!(benches);
