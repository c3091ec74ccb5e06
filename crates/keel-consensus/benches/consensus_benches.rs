//! Criterion benchmarks for keel-consensus guard operations.
//!
//! Covers: hardened lookups, last-checkpoint scans, and the sync checkpoint
//! walk on a long chain.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use keel_core::block_index::MemoryBlockIndex;
use keel_core::constants::NetworkType;
use keel_core::types::Hash256;

use keel_consensus::{CheckpointGuard, CheckpointTable};

fn h(n: u64) -> Hash256 {
    let mut bytes = [0u8; 32];
    bytes[..8].copy_from_slice(&n.to_le_bytes());
    Hash256(bytes)
}

fn linear(tip: u64) -> MemoryBlockIndex {
    let mut index = MemoryBlockIndex::new();
    index.insert_genesis(h(0)).unwrap();
    for height in 1..=tip {
        index.insert(h(height), h(height - 1)).unwrap();
    }
    index.set_best(h(tip)).unwrap();
    index
}

fn bench_check_hardened(c: &mut Criterion) {
    let guard = CheckpointGuard::new(NetworkType::Mainnet, 120);
    let hash = Hash256([0x42; 32]);
    c.bench_function("check_hardened", |b| {
        b.iter(|| guard.check_hardened(black_box(100), black_box(&hash)))
    });
}

fn bench_last_checkpoint(c: &mut Criterion) {
    let index = linear(10_000);
    let table = CheckpointTable::from_entries((0..100).map(|i| (i * 1000, h(i * 1000 + 7)))).unwrap();
    let guard = CheckpointGuard::with_table(table, 120);
    c.bench_function("last_checkpoint_miss_all", |b| {
        b.iter(|| guard.last_checkpoint(black_box(&index)))
    });
}

fn bench_sync_checkpoint(c: &mut Criterion) {
    let index = linear(10_000);
    let guard = CheckpointGuard::with_table(CheckpointTable::empty(), 120);
    c.bench_function("auto_select_sync_checkpoint", |b| {
        b.iter(|| guard.auto_select_sync_checkpoint(black_box(&index)))
    });
}

criterion_group!(
    benches,
    bench_check_hardened,
    bench_last_checkpoint,
    bench_sync_checkpoint
);
criterion_main!(benches);
