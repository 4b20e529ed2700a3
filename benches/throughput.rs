//! Throughput Benchmark for ZetaKV
//!
//! This benchmark measures the performance of the store
//! under various workloads.

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;
use std::time::Duration;
use zetakv::storage::KvStore;

/// Benchmark SET operations
fn bench_set(c: &mut Criterion) {
    let store = Arc::new(KvStore::new());

    let mut group = c.benchmark_group("set");
    group.throughput(Throughput::Elements(1));

    group.bench_function("set_small", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = Bytes::from(format!("key:{}", i));
            let value = Bytes::from("small_value");
            store.set(key, value);
            i += 1;
        });
    });

    group.bench_function("set_medium", |b| {
        let mut i = 0u64;
        let value = Bytes::from("x".repeat(1024)); // 1KB value
        b.iter(|| {
            let key = Bytes::from(format!("key:{}", i));
            store.set(key, value.clone());
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark GET operations
fn bench_get(c: &mut Criterion) {
    let store = Arc::new(KvStore::new());

    // Pre-populate with data
    for i in 0..100_000 {
        let key = Bytes::from(format!("key:{}", i));
        let value = Bytes::from(format!("value:{}", i));
        store.set(key, value);
    }

    let mut group = c.benchmark_group("get");
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_existing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = Bytes::from(format!("key:{}", i % 100_000));
            black_box(store.get(&key));
            i += 1;
        });
    });

    group.bench_function("get_missing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = Bytes::from(format!("missing:{}", i));
            black_box(store.get(&key));
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark mixed workload (80% reads, 20% writes)
fn bench_mixed(c: &mut Criterion) {
    let store = Arc::new(KvStore::new());

    // Pre-populate
    for i in 0..10_000 {
        let key = Bytes::from(format!("key:{}", i));
        let value = Bytes::from(format!("value:{}", i));
        store.set(key, value);
    }

    let mut group = c.benchmark_group("mixed");
    group.throughput(Throughput::Elements(1));

    group.bench_function("80_read_20_write", |b| {
        let mut i = 0u64;
        b.iter(|| {
            if i % 5 == 0 {
                // 20% writes
                let key = Bytes::from(format!("new:{}", i));
                let value = Bytes::from("value");
                store.set(key, value);
            } else {
                // 80% reads
                let key = Bytes::from(format!("key:{}", i % 10_000));
                black_box(store.get(&key));
            }
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark ZADD operations
fn bench_zadd(c: &mut Criterion) {
    let mut group = c.benchmark_group("zadd");
    group.throughput(Throughput::Elements(1));

    // Distinct members into one growing set
    group.bench_function("zadd_new_members", |b| {
        let store = Arc::new(KvStore::new());
        let key = Bytes::from("board");
        let mut i = 0u64;
        b.iter(|| {
            let member = Bytes::from(format!("member:{}", i));
            store.zadd(key.clone(), member, i as f64);
            i += 1;
        });
    });

    // Re-adding an existing member with the same score is a no-op
    group.bench_function("zadd_noop_readd", |b| {
        let store = Arc::new(KvStore::new());
        let key = Bytes::from("board");
        store.zadd(key.clone(), Bytes::from("member"), 1.0);
        b.iter(|| {
            black_box(store.zadd(key.clone(), Bytes::from("member"), 1.0));
        });
    });

    group.finish();
}

/// Benchmark sorted set queries
fn bench_zset_queries(c: &mut Criterion) {
    let store = Arc::new(KvStore::new());
    let key = Bytes::from("board");

    // Pre-populate
    for i in 0..10_000 {
        let member = Bytes::from(format!("member:{}", i));
        store.zadd(key.clone(), member, i as f64);
    }

    let mut group = c.benchmark_group("zset_queries");
    group.throughput(Throughput::Elements(1));

    group.bench_function("zscore", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let member = format!("member:{}", i % 10_000);
            black_box(store.zscore(&key, member.as_bytes()));
            i += 1;
        });
    });

    group.bench_function("zrank", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let member = format!("member:{}", i % 10_000);
            black_box(store.zrank(&key, member.as_bytes()));
            i += 1;
        });
    });

    group.bench_function("zrange_100", |b| {
        b.iter(|| {
            black_box(store.zrange(&key, 0, 99));
        });
    });

    group.bench_function("zrange_all", |b| {
        b.iter(|| {
            black_box(store.zrange(&key, 0, -1));
        });
    });

    group.finish();
}

/// Benchmark concurrent access
fn bench_concurrent(c: &mut Criterion) {
    use std::thread;

    let mut group = c.benchmark_group("concurrent");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("4_threads_mixed", |b| {
        b.iter(|| {
            let store = Arc::new(KvStore::new());
            let handles: Vec<_> = (0..4)
                .map(|t| {
                    let store = Arc::clone(&store);
                    thread::spawn(move || {
                        for i in 0..10_000 {
                            let key = Bytes::from(format!("key:{}:{}", t, i));
                            let value = Bytes::from("value");
                            store.set(key.clone(), value);
                            store.get(&key);
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }

            black_box(store.stats().keys);
        });
    });

    group.bench_function("4_threads_zadd_shared_key", |b| {
        b.iter(|| {
            let store = Arc::new(KvStore::new());
            let handles: Vec<_> = (0..4)
                .map(|t| {
                    let store = Arc::clone(&store);
                    thread::spawn(move || {
                        let key = Bytes::from("board");
                        for i in 0..2_500 {
                            let member = Bytes::from(format!("member:{}:{}", t, i));
                            store.zadd(key.clone(), member, i as f64);
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }

            black_box(store.zsize(b"board"));
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_set,
    bench_get,
    bench_mixed,
    bench_zadd,
    bench_zset_queries,
    bench_concurrent,
);

criterion_main!(benches);
