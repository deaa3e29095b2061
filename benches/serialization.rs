use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mv1::ser::{render_array, render_snapshot, render_series_row};
use mv1::{Handle, LabelSpec, PointCloud};

fn benchmark_parse_labels(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_labels");

    for labels in ["x; u", "x, y, t; u", "x, y, z, t; u, v, w, T, P, rho"] {
        group.bench_with_input(BenchmarkId::from_parameter(labels), labels, |b, labels| {
            b.iter(|| LabelSpec::parse(black_box(labels)))
        });
    }
    group.finish();
}

fn benchmark_handle(c: &mut Criterion) {
    let spec = LabelSpec::parse("x, y, z, t; u, v, w, T, P, rho").unwrap();

    c.bench_function("encode_handle", |b| b.iter(|| Handle::new(black_box(&spec))));
}

fn benchmark_render_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_array");
    let spec = LabelSpec::parse("x, y; u, v").unwrap();

    for nrow in [10usize, 100, 1000, 10000].iter() {
        let data: Vec<f64> = (0..nrow * 4).map(|i| i as f64 * 0.001).collect();

        group.bench_with_input(BenchmarkId::from_parameter(nrow), &data, |b, data| {
            b.iter(|| render_array(&spec, black_box(data), *nrow, 6))
        });
    }
    group.finish();
}

fn benchmark_render_snapshot(c: &mut Criterion) {
    let spec = LabelSpec::parse("x, y, t; u").unwrap();
    let mut cloud = PointCloud::new(2, 1);
    for i in 0..64u32 {
        for j in 0..64u32 {
            let (x, y) = (f64::from(i) / 64.0, f64::from(j) / 64.0);
            cloud.push(&[x, y], &[(x * y).sin()]).unwrap();
        }
    }

    c.bench_function("render_snapshot_64x64", |b| {
        b.iter(|| render_snapshot(&spec, black_box(&cloud), 6))
    });
}

fn benchmark_render_series_row(c: &mut Criterion) {
    let spec = LabelSpec::parse("t; a, b, c").unwrap();

    c.bench_function("render_series_row", |b| {
        b.iter(|| render_series_row(&spec, black_box(0.125), black_box(&[1.0, 2.0, 3.0]), 6))
    });
}

criterion_group!(
    benches,
    benchmark_parse_labels,
    benchmark_handle,
    benchmark_render_array,
    benchmark_render_snapshot,
    benchmark_render_series_row
);
criterion_main!(benches);
