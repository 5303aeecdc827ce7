//! Micro-benchmark for sparse bit vector rank/select performance.
//!
//! Compares:
//! 1. Elias-Fano SparseBitVec rank/select
//! 2. Plain BitVec rank1/select1 over the same bit set
//! 3. Binary search over the raw position list (baseline)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use csa_sampling::bits::{BitBuf, BitVec, SparseBitVec};
use csa_sampling::RankSelect;

/// Generate `m` distinct sorted positions in [0, n).
fn generate_positions(n: usize, m: usize, seed: u64) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut positions = std::collections::BTreeSet::new();
    while positions.len() < m {
        positions.insert(rng.gen_range(0..n));
    }
    positions.into_iter().collect()
}

fn build_sparse(n: usize, positions: &[usize]) -> SparseBitVec {
    SparseBitVec::from_positions(n, positions.len(), positions.iter().copied()).unwrap()
}

fn build_plain(n: usize, positions: &[usize]) -> BitVec {
    let mut buf = BitBuf::zeroed(n);
    for &p in positions {
        buf.set(p);
    }
    buf.into_bitvec(256)
}

fn bench_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank");

    for &(n, m) in &[(1 << 16, 1 << 10), (1 << 20, 1 << 12), (1 << 22, 1 << 16)] {
        let positions = generate_positions(n, m, 0xC5A);
        let sparse = build_sparse(n, &positions);
        let plain = build_plain(n, &positions);

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let queries: Vec<usize> = (0..1000).map(|_| rng.gen_range(0..n)).collect();

        group.bench_with_input(BenchmarkId::new("sparse", format!("n{}_m{}", n, m)), &(), |b, _| {
            b.iter(|| {
                let mut acc = 0usize;
                for &q in &queries {
                    acc += sparse.rank(black_box(q));
                }
                acc
            })
        });

        group.bench_with_input(BenchmarkId::new("plain", format!("n{}_m{}", n, m)), &(), |b, _| {
            b.iter(|| {
                let mut acc = 0usize;
                for &q in &queries {
                    acc += plain.rank1(black_box(q));
                }
                acc
            })
        });

        group.bench_with_input(
            BenchmarkId::new("binary_search", format!("n{}_m{}", n, m)),
            &(),
            |b, _| {
                b.iter(|| {
                    let mut acc = 0usize;
                    for &q in &queries {
                        acc += positions.partition_point(|&p| p < black_box(q));
                    }
                    acc
                })
            },
        );
    }

    group.finish();
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("select");

    for &(n, m) in &[(1 << 20, 1 << 12), (1 << 22, 1 << 16)] {
        let positions = generate_positions(n, m, 0xC5A);
        let sparse = build_sparse(n, &positions);
        let plain = build_plain(n, &positions);

        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let queries: Vec<usize> = (0..1000).map(|_| rng.gen_range(0..m)).collect();

        group.bench_with_input(BenchmarkId::new("sparse", format!("n{}_m{}", n, m)), &(), |b, _| {
            b.iter(|| {
                let mut acc = 0usize;
                for &q in &queries {
                    acc += sparse.select(black_box(q)).unwrap();
                }
                acc
            })
        });

        group.bench_with_input(BenchmarkId::new("plain", format!("n{}_m{}", n, m)), &(), |b, _| {
            b.iter(|| {
                let mut acc = 0usize;
                for &q in &queries {
                    acc += plain.select1(black_box(q)).unwrap();
                }
                acc
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rank, bench_select);
criterion_main!(benches);
