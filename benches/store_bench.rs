//! Benchmarks for ChainKV store operations

use std::io::Cursor;

use chainkv::{BincodeCodec, ChainStore, StoreConfig};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

type MemoryStore = ChainStore<Cursor<Vec<u8>>, BincodeCodec<String>>;

const ENTRIES: usize = 1_000;

fn empty_store(bucket_count: u32) -> MemoryStore {
    let config = StoreConfig::builder()
        .bucket_count(bucket_count)
        .prehash_length(3)
        .build();
    ChainStore::create(Cursor::new(Vec::new()), BincodeCodec::new(), config).unwrap()
}

fn populated_store(bucket_count: u32) -> MemoryStore {
    let mut store = empty_store(bucket_count);
    for i in 0..ENTRIES {
        store
            .add(&format!("bench-key-{:05}", i), &format!("value-{}", i))
            .unwrap();
    }
    store
}

fn bench_add(c: &mut Criterion) {
    c.bench_function("add_1000_entries", |b| {
        b.iter_batched(
            || empty_store(1024),
            |mut store| {
                for i in 0..ENTRIES {
                    store
                        .add(&format!("bench-key-{:05}", i), &format!("value-{}", i))
                        .unwrap();
                }
                store
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_get(c: &mut Criterion) {
    let mut store = populated_store(1024);

    c.bench_function("get_hit", |b| {
        b.iter(|| black_box(store.get("bench-key-00500").unwrap()));
    });
}

fn bench_get_long_chain(c: &mut Criterion) {
    // A single bucket degenerates every lookup into a full chain walk
    let mut store = populated_store(1);

    c.bench_function("get_hit_single_bucket_chain", |b| {
        b.iter(|| black_box(store.get("bench-key-00999").unwrap()));
    });
}

fn bench_set_overwrite(c: &mut Criterion) {
    c.bench_function("set_overwrite_100_entries", |b| {
        b.iter_batched(
            || populated_store(1024),
            |mut store| {
                for i in 0..100 {
                    store
                        .set(&format!("bench-key-{:05}", i), &"replacement".to_string())
                        .unwrap();
                }
                store
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_iterate(c: &mut Criterion) {
    let mut store = populated_store(1024);

    c.bench_function("iterate_1000_entries", |b| {
        b.iter(|| {
            let pairs: usize = store.iter().map(|p| p.unwrap()).count();
            black_box(pairs)
        });
    });
}

criterion_group!(
    benches,
    bench_add,
    bench_get,
    bench_get_long_chain,
    bench_set_overwrite,
    bench_iterate
);
criterion_main!(benches);
