use std::time::Duration;

use criterion::{black_box, BatchSize, BenchmarkId, Criterion};
use criterion::{criterion_group, criterion_main};
use tempfile::tempdir;

use lols::codec::{Codec, RunLengthCodec};
use lols::{split, CompressConfig, LaunchMode, Orchestrator};

const INPUT_LEN: usize = 1 << 20;

fn input() -> Vec<u8> {
    (0..INPUT_LEN).map(|i| b'a' + ((i / 7) % 26) as u8).collect()
}

fn bench_split(c: &mut Criterion) {
    let buffer = input();
    let mut group = c.benchmark_group("split");
    for &parts in &[1_usize, 8, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(parts), &parts, |b, &parts| {
            b.iter(|| split(black_box(&buffer), parts).expect("split"));
        });
    }
    group.finish();
}

fn bench_rle(c: &mut Criterion) {
    let buffer = input();
    c.bench_function("rle_1mib", |b| {
        b.iter(|| RunLengthCodec.compress(black_box(&buffer)).expect("compress"));
    });
}

fn bench_thread_run(c: &mut Criterion) {
    let buffer = input();
    let mut group = c.benchmark_group("thread_run");
    for &parts in &[1_i64, 4, 16] {
        group.bench_with_input(BenchmarkId::from_parameter(parts), &parts, |b, &parts| {
            b.iter_batched(
                || {
                    let dir = tempdir().expect("tempdir");
                    let path = dir.path().join("bench.txt");
                    std::fs::write(&path, &buffer).expect("write input");
                    let mut config = CompressConfig::new(&path, parts);
                    config.launch = LaunchMode::Thread;
                    config.poll_interval = Duration::from_micros(200);
                    (dir, config)
                },
                |(_dir, config)| {
                    Orchestrator::new(config).run().expect("run");
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_split, bench_rle, bench_thread_run);
criterion_main!(benches);
