//! Performance benchmarks for breadcrumb-trail
//!
//! Run with: cargo bench

use breadcrumb_trail::{BreadcrumbPath, Drawable, PathRenderer};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::sync::Arc;

/// Meters of ground distance per degree of latitude on the mean sphere
const METERS_PER_DEGREE_LAT: f64 = 111_194.93;

/// Generate a wandering sequence of coordinate samples
fn generate_samples(num_points: usize, base_lat: f64, base_lon: f64) -> Vec<(f64, f64)> {
    (0..num_points)
        .map(|i| {
            let t = i as f64;
            // ~15 m strides with a slow sideways drift, every one of which
            // clears the default 10 m filter
            let lat = base_lat + t * 15.0 / METERS_PER_DEGREE_LAT;
            let lon = base_lon + (t * 0.05).sin() * 0.001;
            (lat, lon)
        })
        .collect()
}

/// Build a path pre-loaded with the given samples
fn create_path(samples: &[(f64, f64)]) -> Arc<BreadcrumbPath> {
    let (lat, lon) = samples[0];
    let path = BreadcrumbPath::new(lat, lon);
    for &(lat, lon) in &samples[1..] {
        path.add_coordinate(lat, lon);
    }
    path
}

// ============================================================================
// Core Benchmarks - Key performance indicators
// ============================================================================

fn bench_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest");

    let samples = generate_samples(10_000, 51.5, -0.1);
    group.throughput(Throughput::Elements(samples.len() as u64));
    group.bench_function("accepted_10k", |b| {
        b.iter(|| create_path(&samples));
    });

    // The dominant real-world path: a stationary device feeding samples that
    // never clear the minimum-distance filter.
    let path = BreadcrumbPath::new(51.5, -0.1);
    group.throughput(Throughput::Elements(1));
    group.bench_function("rejected_sample", |b| {
        b.iter(|| path.add_coordinate(51.5, -0.1));
    });

    group.finish();
}

fn bench_draw(c: &mut Criterion) {
    let mut group = c.benchmark_group("draw");

    let samples = generate_samples(50_000, 51.5, -0.1);
    let path = create_path(&samples);
    let renderer = PathRenderer::new(&path);
    let visible = path.bounding_rect();

    group.throughput(Throughput::Elements(path.total_points() as u64));

    // Zoomed out: nearly everything collapses
    group.bench_function("zoomed_out_50k", |b| {
        b.iter(|| renderer.draw(visible, 0.01));
    });

    // Zoomed in: most points survive the minimum delta
    group.bench_function("zoomed_in_50k", |b| {
        b.iter(|| renderer.draw(visible, 10.0));
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(benches, bench_ingest, bench_draw);

criterion_main!(benches);
