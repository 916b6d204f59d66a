//! Benchmarks for capture scanning and merging
//!
//! Scans synthetic captures held in memory so the numbers reflect the
//! header checks and the fragment state machine rather than disk speed.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mpegrecover_core::{header, Fragment, Merger, Scanner, Timestamp};
use std::io::Cursor;

const BLOCK_SIZE: usize = 2048;

/// Build a capture of `blocks` blocks where every `cut` blocks the clock
/// jumps far ahead and every 97th block has no pack header.
fn synthetic_capture(blocks: usize, cut: usize) -> Vec<u8> {
    let mut data = vec![0u8; blocks * BLOCK_SIZE];
    let mut clock = 0u64;

    for (i, block) in data.chunks_exact_mut(BLOCK_SIZE).enumerate() {
        if i % cut == 0 {
            clock += 10_000_000;
        }
        clock += 40;
        if i % 97 == 0 {
            continue;
        }
        header::write_pack_header(block, Timestamp::from_ticks(clock))
            .unwrap_or_else(|e| panic!("block {}: {}", i, e));
    }

    data
}

fn bench_header_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("header");

    let mut valid = vec![0u8; BLOCK_SIZE];
    header::write_pack_header(&mut valid, Timestamp::from_integer(6_766_419)).unwrap();
    let invalid = vec![0xFFu8; BLOCK_SIZE];

    group.bench_function("extract/valid", |b| {
        b.iter(|| header::extract(black_box(&valid)));
    });

    group.bench_function("extract/invalid", |b| {
        b.iter(|| header::extract(black_box(&invalid)));
    });

    group.finish();
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");

    for blocks in [1_000usize, 10_000] {
        let data = synthetic_capture(blocks, 250);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("scan_reader", blocks), &data, |b, data| {
            let scanner = Scanner::new();
            b.iter(|| scanner.scan_reader(Cursor::new(black_box(data.as_slice()))));
        });
    }

    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");

    // Interleave two recordings so every fragment has a competing candidate.
    let fragments: Vec<Fragment> = (0..2_000u64)
        .map(|i| {
            let base = if i % 2 == 0 { 0 } else { 500_000_000 };
            let start = base + (i / 2) * 1_000;
            Fragment {
                start_block: i * 10,
                block_count: 10,
                start_time: Timestamp::from_ticks(start),
                end_time: Timestamp::from_ticks(start + 900),
            }
        })
        .collect();

    group.throughput(Throughput::Elements(fragments.len() as u64));
    group.bench_function("interleaved/2000", |b| {
        let merger = Merger::new(Timestamp::from_integer(90_000));
        b.iter(|| merger.merge(black_box(&fragments)));
    });

    group.finish();
}

criterion_group!(benches, bench_header_extract, bench_scan, bench_merge);
criterion_main!(benches);
