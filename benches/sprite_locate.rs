//! Benchmarks for sprite cell addressing
//!
//! `locate` runs on every pointer move over the seek bar, so it should stay
//! allocation-free and fast.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use vodprep_sprite::{locate, SpriteMetadata, ThumbnailStyle};

const SPRITE_JSON: &str = r#"{
  "version": 1,
  "thumbnailWidth": 160,
  "thumbnailHeight": 90,
  "columns": 10,
  "rows": 30,
  "count": 300,
  "interval": 2.4,
  "duration": 719.5
}"#;

fn bench_locate(c: &mut Criterion) {
    let mut group = c.benchmark_group("locate");

    for &count in &[15u32, 300, 3600] {
        let meta = SpriteMetadata::new_grid(160, 90, 10, count, 1.0, f64::from(count));
        let times: Vec<f64> = (0..1000).map(|i| f64::from(i) * f64::from(count) / 1000.0).collect();

        group.throughput(Throughput::Elements(times.len() as u64));
        group.bench_with_input(BenchmarkId::new("sweep", count), &times, |b, times| {
            b.iter(|| {
                for &t in times {
                    black_box(locate(black_box(t), &meta));
                }
            });
        });
    }

    let meta = SpriteMetadata::new_grid(160, 90, 10, 300, 1.0, 300.0);
    group.bench_function("clamped", |b| {
        b.iter(|| {
            black_box(locate(black_box(-5.0), &meta));
            black_box(locate(black_box(1.0e9), &meta));
            black_box(locate(black_box(f64::NAN), &meta));
        });
    });

    group.finish();
}

fn bench_metadata(c: &mut Criterion) {
    let mut group = c.benchmark_group("metadata");

    group.bench_function("from_json", |b| {
        b.iter(|| SpriteMetadata::from_json(black_box(SPRITE_JSON)));
    });

    let meta = SpriteMetadata::from_json(SPRITE_JSON).unwrap();
    group.bench_function("style", |b| {
        b.iter(|| {
            let cell = locate(black_box(412.7), &meta);
            ThumbnailStyle::new("/streams/wing-it/sprite.avif", &cell)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_locate, bench_metadata);
criterion_main!(benches);
