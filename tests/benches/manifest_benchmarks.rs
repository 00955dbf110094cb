//! # Manifest Engine Benchmarks
//!
//! | Path | Target |
//! |------|--------|
//! | Token normalization / parsing | < 1µs per token |
//! | Scan ingestion (in-memory adapters) | < 100µs per scan |
//! | Totals recompute | linear in member count |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lm_01_manifest_engine::domain::{normalize, parse_scan};
use lm_01_manifest_engine::{ManifestApi, ScanRequest};
use lm_tests::support::World;
use std::time::Duration;
use tokio::runtime::Runtime;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("benchmark runtime")
}

// ============================================================================
// Token handling
// ============================================================================

fn bench_token_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("token");

    let inputs = [
        ("bare_awb", "12345678901"),
        ("spaced_awb", "  123 456-789_01 "),
        ("label_payload", r#"{"v":1,"type":"shipment","awb":"123-45678901"}"#),
    ];
    for (name, raw) in inputs {
        group.bench_with_input(BenchmarkId::new("normalize", name), raw, |b, raw| {
            b.iter(|| black_box(normalize(raw)))
        });
        group.bench_with_input(BenchmarkId::new("parse_scan", name), raw, |b, raw| {
            b.iter(|| black_box(parse_scan(raw).is_ok()))
        });
    }

    group.finish();
}

// ============================================================================
// Ingestion
// ============================================================================

fn bench_scan_ingestion(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("ingest");
    group.measurement_time(Duration::from_secs(5));

    // Retried scans of one member: the duplicate path
    let world = World::new();
    let manifest = rt
        .block_on(world.open_manifest())
        .expect("benchmark manifest");
    world.book("123-45678901", 1, 1.0);
    rt.block_on(world.scan(manifest.id, "12345678901"))
        .expect("seed scan");

    group.throughput(Throughput::Elements(1));
    group.bench_function("duplicate_scan", |b| {
        b.iter(|| {
            rt.block_on(
                world
                    .engine
                    .ingest_scan(ScanRequest::new(world.org, manifest.id, "12345678901")),
            )
        })
    });

    group.bench_function("unknown_awb", |b| {
        b.iter(|| {
            rt.block_on(
                world
                    .engine
                    .ingest_scan(ScanRequest::new(world.org, manifest.id, "999-99999999")),
            )
        })
    });

    group.finish();
}

fn bench_totals_recompute(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("totals");

    for members in [10usize, 100, 500] {
        let world = World::new();
        let manifest = rt
            .block_on(world.open_manifest())
            .expect("benchmark manifest");
        for n in 0..members {
            let awb = format!("200-{n:08}");
            world.book(&awb, 2, 3.25);
            rt.block_on(world.scan(manifest.id, &awb))
                .expect("seed scan");
        }

        group.throughput(Throughput::Elements(members as u64));
        group.bench_with_input(
            BenchmarkId::new("recompute", members),
            &manifest.id,
            |b, manifest_id| b.iter(|| rt.block_on(world.engine.recompute_totals(*manifest_id))),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_token_parsing,
    bench_scan_ingestion,
    bench_totals_recompute
);
criterion_main!(benches);
