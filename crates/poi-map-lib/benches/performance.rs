//! Performance benchmarks for poi-map-lib
//!
//! Run with: cargo bench --package poi-map-lib

use std::collections::HashSet;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use poi_map_lib::dto::{PlaceElement, PlacesResponse};
use poi_map_lib::render::PoiMarkerRenderer;
use poi_map_lib::{
    Argb, Canvas, CoordinateConverter, LatLng, MapBounds, MapSurface, Poi, PoiType, ScreenPoint, StrokeStyle,
};

const BOUNDS: MapBounds = MapBounds::new(59.9, 60.1, 29.9, 30.1);

/// Places response with `n` cafes and `n` park polygons spread over [`BOUNDS`]
fn generate_response(n: usize) -> PlacesResponse {
    let mut items = Vec::with_capacity(n * 2);
    for i in 0..n {
        let t = i as f64 / n as f64;
        let lat = 59.9 + t * 0.2;
        let lon = 29.9 + (t * 37.0).fract() * 0.2;
        items.push(PlaceElement {
            id: i as i64,
            element_type: "node".into(),
            point: Some([lon, lat]),
            name: Some(format!("Cafe {i}")),
            amenity: Some("cafe".into()),
            ..Default::default()
        });
        let d = 0.0005;
        items.push(PlaceElement {
            id: (n + i) as i64,
            element_type: "way".into(),
            points: Some(vec![
                [lon, lat],
                [lon + d, lat],
                [lon + d, lat + d],
                [lon, lat + d],
                [lon, lat],
            ]),
            leisure: Some("park".into()),
            ..Default::default()
        });
    }
    PlacesResponse {
        count: items.len(),
        items,
        ..Default::default()
    }
}

fn generate_pois(n: usize) -> Vec<Poi> {
    (0..n)
        .map(|i| {
            let t = i as f64 / n as f64;
            Poi::new(
                i.to_string(),
                format!("Cafe {i}"),
                PoiType::Cafe,
                LatLng::new(59.9 + t * 0.2, 29.9 + (t * 37.0).fract() * 0.2),
            )
        })
        .collect()
}

/// Canvas that only counts commands
#[derive(Default)]
struct NullCanvas {
    commands: usize,
}

impl Canvas for NullCanvas {
    type Glyph = ();

    fn size(&self) -> (f32, f32) {
        (1280.0, 720.0)
    }
    fn fill_background(&mut self, _: Argb) {
        self.commands += 1;
    }
    fn line(&mut self, _: ScreenPoint, _: ScreenPoint, _: StrokeStyle) {
        self.commands += 1;
    }
    fn polyline(&mut self, _: &[ScreenPoint], _: StrokeStyle) {
        self.commands += 1;
    }
    fn dashed_line(&mut self, _: ScreenPoint, _: ScreenPoint, _: StrokeStyle, _: f32, _: f32) {
        self.commands += 1;
    }
    fn fill_polygon(&mut self, _: &[ScreenPoint], _: Argb) {
        self.commands += 1;
    }
    fn stroke_polygon(&mut self, _: &[ScreenPoint], _: StrokeStyle) {
        self.commands += 1;
    }
    fn fill_circle(&mut self, _: ScreenPoint, _: f32, _: Argb) {
        self.commands += 1;
    }
    fn stroke_circle(&mut self, _: ScreenPoint, _: f32, _: StrokeStyle) {
        self.commands += 1;
    }
    fn rasterize_glyph(&mut self, _: &str, _: f32) {}
    fn draw_glyph(&mut self, _: &(), _: ScreenPoint, _: f32, _: Argb) {
        self.commands += 1;
    }
}

// ============================================================================
// Core Benchmarks
// ============================================================================

fn bench_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("conversion");

    let response = generate_response(5_000);
    let visited = HashSet::new();
    group.throughput(Throughput::Elements(response.items.len() as u64));
    group.bench_function("into_map_data_10k", |b| {
        b.iter(|| response.clone().into_map_data(BOUNDS, &visited));
    });
    group.bench_function("geometry_bounds_10k", |b| {
        b.iter(|| response.geometry_bounds());
    });

    group.finish();
}

fn bench_hit_test(c: &mut Criterion) {
    let mut group = c.benchmark_group("hit_test");

    let pois = generate_pois(5_000);
    let drawn: Vec<&Poi> = pois.iter().collect();
    let Some(converter) = CoordinateConverter::new(BOUNDS, 1280.0, 720.0) else {
        return;
    };
    let tap = converter.gps_to_screen(pois[2_500].location);

    group.bench_function("tap_5k", |b| {
        b.iter(|| PoiMarkerRenderer::hit_test(&converter, &drawn, tap));
    });
    group.bench_function("miss_5k", |b| {
        b.iter(|| PoiMarkerRenderer::hit_test(&converter, &drawn, ScreenPoint::new(-100.0, -100.0)));
    });

    group.finish();
}

fn bench_draw_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("draw");
    group.sample_size(20);

    let mut surface: MapSurface<()> = MapSurface::default();
    surface.attach();
    surface.set_viewport_size(1280.0, 720.0);
    surface.set_map_data(generate_response(2_000).into_map_data(BOUNDS, &HashSet::new()));
    surface.zoom_to(1.0);

    group.bench_function("full_frame_2k", |b| {
        b.iter(|| {
            let mut canvas = NullCanvas::default();
            surface.draw_frame(&mut canvas);
            canvas.commands
        });
    });

    group.finish();
}

criterion_group!(benches, bench_conversion, bench_hit_test, bench_draw_frame);

criterion_main!(benches);
