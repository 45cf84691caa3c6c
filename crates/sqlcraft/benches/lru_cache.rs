//! Benchmark the LRU policy of `MemoryCache`.

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sqlcraft::{Cache, MemoryCache, Row};

fn make_key(i: usize) -> String {
    format!("query:(select \"t{i}\".*\nfrom \"t{i}\"\nwhere (\"t{i}\".\"id\" = @p0)\n):@p0={i}")
}

fn make_rows(i: usize) -> Arc<Vec<Row>> {
    Arc::new(vec![Row::new().with("id", i as i64)])
}

fn filled(capacity: usize, count: usize) -> MemoryCache {
    let cache = MemoryCache::new(capacity);
    for i in 0..count {
        cache.put(make_key(i), make_rows(i));
    }
    cache
}

fn bench_cache_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("lru_cache/hit");

    for capacity in [64, 256, 1024] {
        let cache = filled(capacity, capacity);
        let hit_key = make_key(capacity / 2);
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &hit_key, |b, key| {
            b.iter(|| black_box(cache.get(key)));
        });
    }

    group.finish();
}

fn bench_cache_miss_and_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("lru_cache/miss_insert");

    for capacity in [64, 256, 1024] {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            &capacity,
            |b, &cap| {
                let cache = filled(cap, cap);
                let mut counter = cap;
                b.iter(|| {
                    counter += 1;
                    cache.put(make_key(counter), make_rows(counter));
                });
            },
        );
    }

    group.finish();
}

fn bench_cache_mixed_workload(c: &mut Criterion) {
    let mut group = c.benchmark_group("lru_cache/mixed");

    for capacity in [64, 256, 1024] {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            &capacity,
            |b, &cap| {
                let prefill = cap * 4 / 5;
                let cache = filled(cap, prefill);
                let mut counter = 0usize;
                b.iter(|| {
                    counter += 1;
                    // 80% hits on existing keys, 20% new keys
                    if counter % 5 == 0 {
                        cache.put(make_key(prefill + counter), make_rows(counter));
                    } else {
                        black_box(cache.get(&make_key(counter % prefill)));
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_cache_hit,
    bench_cache_miss_and_insert,
    bench_cache_mixed_workload
);
criterion_main!(benches);
