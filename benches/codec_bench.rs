//! Benchmarks for buffer encode and decode paths

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use wirebuf::{Buffer, LogChannel};

/// Benchmark writing a small mixed message
fn bench_write_message(c: &mut Criterion) {
    c.bench_function("write_u8_u32_string", |b| {
        b.iter(|| {
            let mut buf = Buffer::create_with(12, LogChannel::silent()).unwrap();
            buf.write_u8(black_box(7)).unwrap();
            buf.write_u32(black_box(1000)).unwrap();
            buf.write_string(black_box(b"abc")).unwrap();
            black_box(buf.into_bytes())
        })
    });
}

/// Benchmark string round trips for varying payload sizes
fn bench_strings(c: &mut Criterion) {
    let mut group = c.benchmark_group("string_round_trip");

    for &size in &[0usize, 64, 1024, 64 * 1024] {
        let payload = vec![0xa5u8; size];
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_function(format!("{}_bytes", size), |b| {
            b.iter(|| {
                let log = LogChannel::silent();
                let mut out = Buffer::create_with((4 + size) as u32, log.clone()).unwrap();
                out.write_string(&payload).unwrap();
                let mut input = Buffer::from_bytes(out.into_bytes(), log).unwrap();
                black_box(input.read_string().unwrap())
            })
        });
    }

    group.finish();
}

/// Benchmark reading a run of integers
fn bench_read_u32(c: &mut Criterion) {
    let mut out = Buffer::create_with(4 * 1024, LogChannel::silent()).unwrap();
    for i in 0..1024 {
        out.write_u32(i).unwrap();
    }
    let bytes = out.into_bytes();

    let mut group = c.benchmark_group("read_u32");
    group.throughput(Throughput::Elements(1024));
    group.bench_function("1024_values", |b| {
        b.iter(|| {
            let mut input = Buffer::from_slice(&bytes, LogChannel::silent()).unwrap();
            let mut sum = 0u64;
            while let Ok(v) = input.read_u32() {
                sum += u64::from(v);
            }
            black_box(sum)
        })
    });
    group.finish();
}

criterion_group!(benches, bench_write_message, bench_strings, bench_read_u32);
criterion_main!(benches);
