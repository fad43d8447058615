use std::path::PathBuf;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ember_kv::{
  db::Engine,
  option::Options,
  util::rand_kv::{get_test_key, get_test_value},
};
use rand::{rngs::StdRng, Rng, SeedableRng};

const PRELOAD_KEYS: usize = 20_000;

fn bench_engine(name: &str) -> (Engine, PathBuf) {
  let mut opts = Options::default();
  opts.dir_path = std::env::temp_dir().join(format!("ember-kv-bench-{}", name));
  let _ = std::fs::remove_dir_all(&opts.dir_path);
  let dir = opts.dir_path.clone();
  let engine = Engine::open(opts).expect("failed to open bench engine");
  (engine, dir)
}

fn preload(engine: &Engine) {
  for i in 0..PRELOAD_KEYS {
    engine
      .put(get_test_key(i), get_test_value(i))
      .expect("failed to preload");
  }
}

fn bench_writes(c: &mut Criterion) {
  let (engine, dir) = bench_engine("writes");
  let mut group = c.benchmark_group("writes");

  let mut next = PRELOAD_KEYS;
  group.bench_function("put-fresh", |b| {
    b.iter(|| {
      next += 1;
      engine.put(get_test_key(next), get_test_value(next)).unwrap();
    })
  });

  preload(&engine);
  let mut rng = StdRng::seed_from_u64(17);
  group.bench_function("put-overwrite", |b| {
    b.iter(|| {
      let i = rng.gen_range(0..PRELOAD_KEYS);
      engine.put(get_test_key(i), get_test_value(i)).unwrap();
    })
  });

  group.finish();
  drop(engine);
  std::fs::remove_dir_all(dir).unwrap();
}

fn bench_reads(c: &mut Criterion) {
  let (engine, dir) = bench_engine("reads");
  preload(&engine);

  let mut group = c.benchmark_group("reads");

  let mut rng = StdRng::seed_from_u64(17);
  group.bench_function("get-hit", |b| {
    b.iter(|| {
      let i = rng.gen_range(0..PRELOAD_KEYS);
      black_box(engine.get(get_test_key(i)).unwrap());
    })
  });

  group.bench_function("get-miss", |b| {
    b.iter(|| {
      let i = PRELOAD_KEYS + rng.gen_range(0..PRELOAD_KEYS);
      assert!(engine.get(get_test_key(i)).is_err());
    })
  });

  group.finish();
  drop(engine);
  std::fs::remove_dir_all(dir).unwrap();
}

fn bench_churn(c: &mut Criterion) {
  let (engine, dir) = bench_engine("churn");

  // steady-state write/delete pairs: every iteration appends a record
  // and its tombstone
  let mut next = 0usize;
  c.bench_function("put-delete", |b| {
    b.iter(|| {
      next += 1;
      let key = get_test_key(next);
      engine.put(key.clone(), get_test_value(next)).unwrap();
      engine.delete(key).unwrap();
    })
  });

  drop(engine);
  std::fs::remove_dir_all(dir).unwrap();
}

fn bench_stat(c: &mut Criterion) {
  let (engine, dir) = bench_engine("stat");
  preload(&engine);

  c.bench_function("stat", |b| {
    b.iter(|| {
      let stat = engine.stat().unwrap();
      black_box(stat.key_num);
    })
  });

  drop(engine);
  std::fs::remove_dir_all(dir).unwrap();
}

criterion_group!(benches, bench_writes, bench_reads, bench_churn, bench_stat);
criterion_main!(benches);
