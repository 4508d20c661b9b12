//! # Curate Performance Benchmarks
//!
//! ## Benchmark Categories
//!
//! - **Table Loading**: CSV parsing into the feature table
//! - **Selection**: Filter-only and filter+rank pipelines at several table sizes
//! - **Export**: Playlist rendering and writing
//!
//! ## Running Benchmarks
//!
//! ```bash
//! cargo bench
//! cargo bench selection
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use curate::{pipeline, playlist, FeatureTable, FilterParameters, Presence, Range};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::hint::black_box;
use tempfile::TempDir;

const GENRES: [&str; 8] = [
    "Blues---Boogie Woogie",
    "Electronic---House",
    "Electronic---Techno",
    "Hip Hop---Trip Hop",
    "Jazz---Bebop",
    "Jazz---Fusion",
    "Rock---Punk",
    "Rock---Shoegaze",
];

/// Helper function to build a CSV feature table with `count` tracks
fn create_table_csv(count: usize) -> String {
    let mut csv = String::from("path,tempo,voice,instrumental,danceability,arousal,valence,key");
    for genre in GENRES {
        csv.push(',');
        csv.push_str(genre);
    }
    csv.push_str(",loudness\n");

    for i in 0..count {
        #[allow(clippy::cast_precision_loss)]
        let f = i as f64;
        let voice = (f * 0.37) % 1.0;
        csv.push_str(&format!(
            "Artist{}/Album{}/Track{i:05}.mp3,{:.2},{voice:.3},{:.3},{:.3},{:.2},{:.2},{}",
            i / 50,
            i / 10,
            70.0 + (f * 1.7) % 110.0,
            1.0 - voice,
            (f * 0.11) % 3.0,
            1.0 + (f * 0.7) % 8.0,
            1.0 + (f * 1.3) % 8.0,
            i % 12,
        ));
        for (g, _) in GENRES.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let activation = (f * (0.13 + g as f64 * 0.07)) % 1.0;
            csv.push_str(&format!(",{activation:.4}"));
        }
        csv.push_str(",-9.5\n");
    }
    csv
}

fn filter_params() -> FilterParameters {
    FilterParameters {
        genres: vec!["Jazz---Bebop".into()],
        activation: Some(Range::new(0.2, 1.0)),
        tempo: Some(Range::new(90.0, 150.0)),
        presence: Presence::Voice,
        danceability: Some(Range::new(0.3, 2.7)),
        ..Default::default()
    }
}

fn benchmark_table_loading(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_loading");
    for size in [100, 1000, 10_000] {
        let csv = create_table_csv(size);
        group.bench_with_input(BenchmarkId::new("from_reader", size), &csv, |b, csv| {
            b.iter(|| FeatureTable::from_reader(black_box(csv.as_bytes())).expect("valid table"))
        });
    }
    group.finish();
}

fn benchmark_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection");
    for size in [100, 1000, 10_000] {
        let table = FeatureTable::from_reader(create_table_csv(size).as_bytes())
            .expect("valid table");

        let filters = filter_params();
        group.bench_with_input(BenchmarkId::new("filters", size), &table, |b, table| {
            b.iter(|| pipeline::select(black_box(table), black_box(&filters)).expect("select"))
        });

        let ranked = FilterParameters {
            rank_by: vec!["Jazz---Bebop".into(), "Jazz---Fusion".into()],
            max_tracks: 50,
            shuffle: true,
            ..filter_params()
        };
        group.bench_with_input(BenchmarkId::new("rank_truncate_shuffle", size), &table, |b, table| {
            let mut rng = StdRng::seed_from_u64(0);
            b.iter(|| {
                pipeline::select_with_rng(black_box(table), black_box(&ranked), &mut rng)
                    .expect("select")
            })
        });
    }
    group.finish();
}

fn benchmark_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("export");
    let tracks: Vec<String> = (0..1000)
        .map(|i| format!("Artist{}/Album{}/Track{i:05}.mp3", i / 50, i / 10))
        .collect();

    group.bench_function("render_1000", |b| {
        b.iter(|| playlist::render(black_box(&tracks)))
    });

    let dir = TempDir::new().expect("Failed to create temp directory");
    let destination = dir.path().join("bench.m3u8");
    group.bench_function("export_1000", |b| {
        b.iter(|| playlist::export(black_box(&tracks), &destination).expect("export"))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_table_loading,
    benchmark_selection,
    benchmark_export
);

criterion_main!(benches);
