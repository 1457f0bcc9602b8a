//! Performance benchmarks for course-track-lib
//!
//! Run with: cargo bench --package course-track-lib

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use course_track_lib::{
    ParseOptions, TrackPoint, calculate_distance, parse_geojson, parse_gpx, parse_gpx_with,
    summarize, to_geojson_line_string, to_wkt_line_string,
};
use std::fmt::Write;

/// Generate a wiggly running course with the specified number of points.
fn generate_points(num_points: usize, base_lat: f64, base_lng: f64) -> Vec<TrackPoint> {
    (0..num_points)
        .map(|i| {
            let t = i as f64 / num_points as f64;
            let lat = base_lat + t * 0.05 + (t * 50.0).sin() * 0.001;
            let lng = base_lng + t * 0.05 + (t * 30.0).cos() * 0.001;
            TrackPoint::with_elevation(lat, lng, 20.0 + (t * 10.0).sin() * 5.0)
        })
        .collect()
}

/// Render points as a GPX document, optionally corrupting every tenth point
fn generate_gpx(points: &[TrackPoint], corrupt: bool) -> String {
    let mut xml = String::from(r#"<?xml version="1.0"?><gpx version="1.1"><trk><trkseg>"#);
    for (i, p) in points.iter().enumerate() {
        if corrupt && i % 10 == 0 {
            let _ = write!(xml, r#"<trkpt lon="{}"/>"#, p.lng);
        } else {
            let _ = write!(
                xml,
                r#"<trkpt lat="{}" lon="{}"><ele>{}</ele></trkpt>"#,
                p.lat,
                p.lng,
                p.elevation.unwrap_or_default()
            );
        }
    }
    xml.push_str("</trkseg></trk></gpx>");
    xml
}

fn bench_parse_gpx(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_gpx");

    for &size in &[1_000usize, 50_000] {
        let xml = generate_gpx(&generate_points(size, 37.52, 126.93), false);
        group.throughput(Throughput::Bytes(xml.len() as u64));
        group.bench_with_input(BenchmarkId::new("strict", size), &xml, |b, xml| {
            b.iter(|| parse_gpx(xml).unwrap());
        });

        let corrupted = generate_gpx(&generate_points(size, 37.52, 126.93), true);
        group.bench_with_input(BenchmarkId::new("lenient", size), &corrupted, |b, xml| {
            b.iter(|| parse_gpx_with(xml, &ParseOptions::lenient()).unwrap());
        });
    }

    group.finish();
}

fn bench_geometry(c: &mut Criterion) {
    let mut group = c.benchmark_group("geometry");
    let points = generate_points(50_000, 37.52, 126.93);
    group.throughput(Throughput::Elements(points.len() as u64));

    group.bench_function("distance_50k", |b| b.iter(|| calculate_distance(&points)));
    group.bench_function("summary_50k", |b| b.iter(|| summarize(&points)));

    group.finish();
}

fn bench_converters(c: &mut Criterion) {
    let mut group = c.benchmark_group("converters");
    let points = generate_points(10_000, 37.52, 126.93);
    let geojson = to_geojson_line_string(&points).to_json_string();

    group.bench_function("to_wkt_10k", |b| b.iter(|| to_wkt_line_string(&points)));
    group.bench_function("geojson_parse_10k", |b| {
        b.iter(|| parse_geojson(geojson.as_str()).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_parse_gpx, bench_geometry, bench_converters);
criterion_main!(benches);
