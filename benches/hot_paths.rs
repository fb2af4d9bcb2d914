use criterion::{black_box, criterion_group, criterion_main, Criterion};
use flood_map::braille::BrailleCanvas;
use flood_map::map::geometry::{fill_polygon, point_in_polygon};
use flood_map::map::projection::Viewport;
use flood_map::risk::{classify, RiskTally};

/// A 64-vertex ring approximating a circle around (77, 20).
fn circle_ring(n: usize) -> Vec<(f64, f64)> {
    (0..n)
        .map(|i| {
            let angle = i as f64 / n as f64 * std::f64::consts::TAU;
            (77.0 + 2.0 * angle.cos(), 20.0 + 2.0 * angle.sin())
        })
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    let levels = [
        "High",
        "Medium Risk",
        "low-lying",
        "Severe",
        "VERY HIGH",
        "",
    ];
    c.bench_function("classify", |b| {
        b.iter(|| {
            for level in levels {
                black_box(classify(black_box(level)));
            }
        })
    });
}

fn bench_tally(c: &mut Criterion) {
    let levels: Vec<String> = (0..10_000)
        .map(|i| match i % 4 {
            0 => "High".to_string(),
            1 => "Medium".to_string(),
            2 => "Low".to_string(),
            _ => "n/a".to_string(),
        })
        .collect();
    c.bench_function("tally_10k", |b| {
        b.iter(|| RiskTally::from_levels(black_box(&levels).iter().map(String::as_str)))
    });
}

fn bench_point_in_polygon(c: &mut Criterion) {
    let rings = vec![circle_ring(64)];
    c.bench_function("point_in_polygon_64", |b| {
        b.iter(|| point_in_polygon(black_box(77.5), black_box(20.5), black_box(&rings)))
    });
}

fn bench_fill_polygon(c: &mut Criterion) {
    let viewport = Viewport::new(77.0, 20.0, 20.0, 240, 160);
    let projected: Vec<Vec<(i32, i32)>> = vec![circle_ring(64)
        .iter()
        .map(|&(lon, lat)| viewport.project(lon, lat))
        .collect()];
    c.bench_function("fill_polygon_64", |b| {
        b.iter(|| {
            let mut canvas = BrailleCanvas::new(120, 40);
            fill_polygon(&mut canvas, black_box(&projected));
            canvas
        })
    });
}

fn bench_project(c: &mut Criterion) {
    let viewport = Viewport::new(78.9629, 20.5937, 8.0, 400, 300);
    let ring = circle_ring(64);
    c.bench_function("project_64", |b| {
        b.iter(|| {
            ring.iter()
                .map(|&(lon, lat)| viewport.project(lon, lat))
                .fold((0i32, 0i32), |acc, p| (acc.0 ^ p.0, acc.1 ^ p.1))
        })
    });
}

criterion_group!(
    benches,
    bench_classify,
    bench_tally,
    bench_point_in_polygon,
    bench_fill_polygon,
    bench_project
);
criterion_main!(benches);
