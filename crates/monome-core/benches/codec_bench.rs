//! Criterion benchmarks for the OSC codec.
//!
//! Measures encoding and decoding latency for the message shapes that
//! dominate real traffic: single-LED commands, full-frame map commands, and
//! inbound key events (including classification).
//!
//! Run with:
//! ```bash
//! cargo bench --package monome-core --bench codec_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use monome_core::{classify, decode_message, encode_message, OscArg, OscMessage};

// ── Message fixtures ──────────────────────────────────────────────────────────

fn make_sys_info() -> OscMessage {
    OscMessage::new("/sys/info").expect("fixture address is valid")
}

fn make_sys_prefix() -> OscMessage {
    OscMessage::with_args("/sys/prefix", vec![OscArg::Str("/monome".to_string())])
        .expect("fixture address is valid")
}

fn make_grid_set() -> OscMessage {
    OscMessage::with_args(
        "/monome/grid/led/set",
        vec![OscArg::Int(7), OscArg::Int(3), OscArg::Int(1)],
    )
    .expect("fixture address is valid")
}

fn make_grid_map() -> OscMessage {
    let mut args = vec![OscArg::Int(0), OscArg::Int(0)];
    args.extend((0..8u8).map(|row| OscArg::Byte(0xAA >> (row % 2))));
    OscMessage::with_args("/monome/grid/led/map", args).expect("fixture address is valid")
}

fn make_ring_map() -> OscMessage {
    let mut args = vec![OscArg::Int(0)];
    args.extend((0..64).map(|led| OscArg::Byte((led % 16) as u8)));
    OscMessage::with_args("/monome/ring/map", args).expect("fixture address is valid")
}

fn make_grid_key() -> OscMessage {
    OscMessage::with_args(
        "/monome/grid/key",
        vec![OscArg::Int(15), OscArg::Int(7), OscArg::Int(1)],
    )
    .expect("fixture address is valid")
}

// ── Benchmark groups ──────────────────────────────────────────────────────────

/// Benchmarks `encode_message` for each fixture.
fn bench_encode(c: &mut Criterion) {
    let messages: &[(&str, OscMessage)] = &[
        ("sys_info", make_sys_info()),
        ("sys_prefix", make_sys_prefix()),
        ("grid_set", make_grid_set()),
        ("grid_map", make_grid_map()),
        ("ring_map_64", make_ring_map()),
    ];

    let mut group = c.benchmark_group("encode_message");
    for (name, msg) in messages {
        group.bench_with_input(BenchmarkId::new("msg", name), msg, |b, msg| {
            b.iter(|| encode_message(black_box(msg)).expect("encode must succeed"))
        });
    }
    group.finish();
}

/// Benchmarks `decode_message` for each fixture (from pre-encoded bytes).
fn bench_decode(c: &mut Criterion) {
    let messages: &[(&str, OscMessage)] = &[
        ("sys_info", make_sys_info()),
        ("sys_prefix", make_sys_prefix()),
        ("grid_set", make_grid_set()),
        ("grid_map", make_grid_map()),
        ("ring_map_64", make_ring_map()),
        ("grid_key", make_grid_key()),
    ];

    let mut group = c.benchmark_group("decode_message");
    for (name, msg) in messages {
        let bytes = encode_message(msg).expect("encode must succeed for benchmark setup");
        group.bench_with_input(BenchmarkId::new("msg", name), &bytes, |b, bytes| {
            b.iter(|| decode_message(black_box(bytes)).expect("decode must succeed"))
        });
    }
    group.finish();
}

/// Benchmarks the full inbound hot path: decode then classify a key event.
fn bench_inbound_hot_path(c: &mut Criterion) {
    let bytes = encode_message(&make_grid_key()).expect("encode must succeed for benchmark setup");

    c.bench_function("decode_and_classify_grid_key", |b| {
        b.iter(|| {
            let (msg, _) = decode_message(black_box(&bytes)).expect("decode must succeed");
            classify(&msg).expect("classification must succeed")
        })
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_inbound_hot_path);
criterion_main!(benches);
