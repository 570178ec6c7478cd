//! Stylized terrain: translucent fills with a speckle texture, soft outlines, blurred roads

use std::hash::{DefaultHasher, Hash, Hasher};

use geo::{BooleanOps, Coord, LineString, Polygon};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::converter::CoordinateConverter;
use crate::model::{Argb, BackgroundElement, BackgroundGeometry, BackgroundLayer, LatLng};
use crate::render::{Canvas, ScreenPoint, StrokeStyle};

const FILL_ALPHA: u8 = 150;
const TEXTURE_ALPHA: u8 = 40;
const OUTLINE_ALPHA: u8 = 60;
const OUTLINE_DARKEN: f32 = 0.08;
const OUTLINE_WIDTH: f32 = 1.0;
const OUTLINE_BLUR: f32 = 2.0;
const ROAD_ALPHA: u8 = 100;
const ROAD_WIDTH: f32 = 6.0;
const ROAD_BLUR: f32 = 1.5;
const SPOT_SHADE: f32 = 0.05;
const SPOT_SEGMENTS: usize = 24;

/// One texture spot before clipping
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spot {
    center: ScreenPoint,
    radius: f32,
    color: Argb,
}

pub struct BackgroundRenderer;

impl BackgroundRenderer {
    /// Number of texture spots per polygon ring
    pub fn spot_count(layer: BackgroundLayer) -> u64 {
        match layer {
            BackgroundLayer::Water => 5,
            BackgroundLayer::Greenery => 8,
            BackgroundLayer::Buildings => 3,
            BackgroundLayer::Roads => 5,
        }
    }

    /// Draw every element, lowest layer first
    pub fn draw<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        converter: &CoordinateConverter,
        elements: &[BackgroundElement],
    ) {
        profiling::scope!("BackgroundRenderer::draw");
        for layer in BackgroundLayer::ORDERED {
            for element in elements.iter().filter(|e| e.layer == layer) {
                match &element.geometry {
                    BackgroundGeometry::Polygon(rings) => {
                        for ring in rings {
                            self.draw_ring(canvas, converter, element, ring);
                        }
                    }
                    BackgroundGeometry::Polyline(points) => {
                        self.draw_road(canvas, converter, element, points);
                    }
                }
            }
        }
    }

    fn draw_ring<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        converter: &CoordinateConverter,
        element: &BackgroundElement,
        ring: &[LatLng],
    ) {
        if ring.len() < 3 {
            return;
        }
        let points: Vec<ScreenPoint> = ring.iter().map(|p| converter.gps_to_screen(*p)).collect();
        if !points.iter().all(|p| p.x.is_finite() && p.y.is_finite()) {
            tracing::trace!(id = %element.id, "Ring skipped, projection is not finite");
            return;
        }

        canvas.fill_polygon(&points, element.color.with_alpha(FILL_ALPHA));

        let clip = to_polygon(&points);
        for spot in speckles(element, &points) {
            for patch in clip_spot(&clip, spot) {
                canvas.fill_polygon(&patch, spot.color);
            }
        }

        // Blur approximated by a faint halo under the core stroke
        let outline = element.color.darken(OUTLINE_DARKEN);
        canvas.stroke_polygon(
            &points,
            StrokeStyle::new(OUTLINE_WIDTH + OUTLINE_BLUR * 2.0, outline.with_alpha(OUTLINE_ALPHA / 3)),
        );
        canvas.stroke_polygon(&points, StrokeStyle::new(OUTLINE_WIDTH, outline.with_alpha(OUTLINE_ALPHA)));
    }

    fn draw_road<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        converter: &CoordinateConverter,
        element: &BackgroundElement,
        line: &[LatLng],
    ) {
        if line.len() < 2 {
            return;
        }
        let points: Vec<ScreenPoint> = line.iter().map(|p| converter.gps_to_screen(*p)).collect();

        canvas.polyline(
            &points,
            StrokeStyle::new(ROAD_WIDTH + ROAD_BLUR * 2.0, element.color.with_alpha(ROAD_ALPHA / 3)),
        );
        canvas.polyline(&points, StrokeStyle::new(ROAD_WIDTH, element.color.with_alpha(ROAD_ALPHA)));
    }
}

fn element_seed(id: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    hasher.finish()
}

/// Deterministic texture spots for one ring: same element, same spots on every frame
///
/// Every spot is placed inside the ring's screen bounding box; [`clip_spot`] trims it
/// to the ring itself.
fn speckles(element: &BackgroundElement, points: &[ScreenPoint]) -> Vec<Spot> {
    let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
    let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    let seed = element_seed(&element.id);
    (0..BackgroundRenderer::spot_count(element.layer))
        .map(|i| {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i));
            let x = min_x + rng.r#gen::<f32>() * (max_x - min_x);
            let y = min_y + rng.r#gen::<f32>() * (max_y - min_y);
            let radius = rng.r#gen::<f32>() * 20.0 + 10.0;
            let shade = if rng.r#gen::<bool>() {
                element.color.darken(SPOT_SHADE)
            } else {
                element.color.lighten(SPOT_SHADE)
            };
            Spot {
                center: ScreenPoint::new(x, y),
                radius,
                color: shade.with_alpha(TEXTURE_ALPHA),
            }
        })
        .collect()
}

fn to_polygon(points: &[ScreenPoint]) -> Polygon<f64> {
    let ring: LineString<f64> = points
        .iter()
        .map(|p| Coord {
            x: p.x as f64,
            y: p.y as f64,
        })
        .collect();
    Polygon::new(ring, vec![])
}

/// The parts of a spot that lie inside `ring`, as open point lists
fn clip_spot(ring: &Polygon<f64>, spot: Spot) -> Vec<Vec<ScreenPoint>> {
    let circle: Vec<ScreenPoint> = (0..SPOT_SEGMENTS)
        .map(|i| {
            let angle = i as f32 / SPOT_SEGMENTS as f32 * std::f32::consts::TAU;
            ScreenPoint::new(
                spot.center.x + spot.radius * angle.cos(),
                spot.center.y + spot.radius * angle.sin(),
            )
        })
        .collect();

    ring.intersection(&to_polygon(&circle))
        .into_iter()
        .filter_map(|patch| {
            let (_closing, open) = patch.exterior().0.split_last()?;
            (open.len() >= 3).then(|| {
                open.iter()
                    .map(|c| ScreenPoint::new(c.x as f32, c.y as f32))
                    .collect()
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MapBounds;
    use crate::render::testing::{DrawCommand, RecordingCanvas};

    fn converter() -> CoordinateConverter {
        CoordinateConverter::new(MapBounds::new(0.0, 1.0, 0.0, 1.0), 1000.0, 1000.0)
            .expect("viewport")
    }

    fn square(id: &str, layer: BackgroundLayer) -> BackgroundElement {
        BackgroundElement {
            id: id.to_string(),
            layer,
            color: Argb::from_rgb(0xE3EBE0),
            geometry: BackgroundGeometry::Polygon(vec![vec![
                LatLng::new(0.1, 0.1),
                LatLng::new(0.1, 0.9),
                LatLng::new(0.9, 0.9),
                LatLng::new(0.9, 0.1),
                LatLng::new(0.1, 0.1),
            ]]),
        }
    }

    fn triangle(id: &str, layer: BackgroundLayer) -> BackgroundElement {
        BackgroundElement {
            geometry: BackgroundGeometry::Polygon(vec![vec![
                LatLng::new(0.1, 0.1),
                LatLng::new(0.9, 0.1),
                LatLng::new(0.1, 0.9),
            ]]),
            ..square(id, layer)
        }
    }

    /// Screen points of `element`'s first ring
    fn ring_points(element: &BackgroundElement) -> Vec<ScreenPoint> {
        match &element.geometry {
            BackgroundGeometry::Polygon(rings) => rings[0].iter().map(|p| converter().gps_to_screen(*p)).collect(),
            BackgroundGeometry::Polyline(_) => unreachable!(),
        }
    }

    fn texture_patches(canvas: &RecordingCanvas) -> Vec<(Vec<ScreenPoint>, Argb)> {
        canvas
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillPolygon(points, color) if color.alpha() == TEXTURE_ALPHA => {
                    Some((points.clone(), *color))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_speckles_are_stable_across_frames() {
        let elements = vec![square("way/42", BackgroundLayer::Greenery)];
        let mut first = RecordingCanvas::new(1000.0, 1000.0);
        let mut second = RecordingCanvas::new(1000.0, 1000.0);
        BackgroundRenderer.draw(&mut first, &converter(), &elements);
        BackgroundRenderer.draw(&mut second, &converter(), &elements);

        assert_eq!(first.commands, second.commands);
        // Every spot centre lies in the square, so each spot leaves one patch
        assert_eq!(texture_patches(&first).len(), 8);
    }

    #[test]
    fn test_different_elements_get_different_speckles() {
        let water = |id| {
            let element = square(id, BackgroundLayer::Water);
            speckles(&element, &ring_points(&element))
        };
        assert_ne!(water("way/1"), water("way/2"));
    }

    #[test]
    fn test_spot_count_per_layer_on_any_shape() {
        let expected = [
            (BackgroundLayer::Water, 5),
            (BackgroundLayer::Greenery, 8),
            (BackgroundLayer::Buildings, 3),
        ];
        for (layer, count) in expected {
            for n in 0..20 {
                let element = triangle(&format!("way/{n}"), layer);
                let spots = speckles(&element, &ring_points(&element));
                assert_eq!(spots.len(), count, "{layer:?} way/{n}");
                assert!(spots.iter().all(|s| (10.0..=30.0).contains(&s.radius)));
            }
        }
    }

    #[test]
    fn test_spot_shade_and_alpha() {
        let element = square("way/7", BackgroundLayer::Greenery);
        let darker = element.color.darken(SPOT_SHADE).with_alpha(TEXTURE_ALPHA);
        let lighter = element.color.lighten(SPOT_SHADE).with_alpha(TEXTURE_ALPHA);
        assert_ne!(darker, lighter);

        let mut canvas = RecordingCanvas::new(1000.0, 1000.0);
        BackgroundRenderer.draw(&mut canvas, &converter(), &[element]);
        let patches = texture_patches(&canvas);
        assert!(!patches.is_empty());
        for (_, color) in patches {
            assert_eq!(color.alpha(), 40);
            assert!(color == darker || color == lighter, "{color:?}");
        }
    }

    #[test]
    fn test_spots_are_clipped_to_the_ring() {
        // Screen triangle (100,100) (100,900) (900,900): x >= 100, y <= 900, y >= x
        let inside = |p: &ScreenPoint| p.x >= 100.0 - 0.01 && p.y <= 900.0 + 0.01 && p.y >= p.x - 0.01;
        for n in 0..20 {
            let mut canvas = RecordingCanvas::new(1000.0, 1000.0);
            BackgroundRenderer.draw(&mut canvas, &converter(), &[triangle(&format!("way/{n}"), BackgroundLayer::Greenery)]);
            for (patch, _) in texture_patches(&canvas) {
                assert!(patch.len() >= 3);
                assert!(patch.iter().all(inside), "way/{n}: {patch:?}");
            }
        }
    }

    #[test]
    fn test_spot_straddling_the_edge_keeps_its_inner_part() {
        let element = triangle("t", BackgroundLayer::Water);
        let ring = to_polygon(&ring_points(&element));
        // Centre just outside the hypotenuse y = x
        let spot = Spot {
            center: ScreenPoint::new(510.0, 500.0),
            radius: 20.0,
            color: Argb::WHITE,
        };
        let patches = clip_spot(&ring, spot);
        assert_eq!(patches.len(), 1);
        assert!(patches[0].iter().all(|p| p.y >= p.x - 0.01));
        assert!(patches[0].iter().any(|p| p.y - p.x > 5.0));

        let far = Spot {
            center: ScreenPoint::new(800.0, 200.0),
            ..spot
        };
        assert!(clip_spot(&ring, far).is_empty());
    }

    #[test]
    fn test_non_finite_ring_is_skipped() {
        let mut element = square("nan", BackgroundLayer::Water);
        element.geometry = BackgroundGeometry::Polygon(vec![vec![
            LatLng::new(0.1, 0.1),
            LatLng::new(f64::NAN, 0.5),
            LatLng::new(0.9, 0.9),
        ]]);
        let mut canvas = RecordingCanvas::new(1000.0, 1000.0);
        BackgroundRenderer.draw(&mut canvas, &converter(), &[element]);
        assert!(canvas.commands.is_empty());
    }

    #[test]
    fn test_layers_drawn_in_z_order() {
        let buildings = square("b", BackgroundLayer::Buildings);
        let mut water = square("w", BackgroundLayer::Water);
        water.color = Argb::from_rgb(0xD8E8F0);
        let mut canvas = RecordingCanvas::new(1000.0, 1000.0);
        BackgroundRenderer.draw(&mut canvas, &converter(), &[buildings, water]);

        let fills: Vec<Argb> = canvas
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillPolygon(_, color) if color.alpha() == FILL_ALPHA => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(fills.len(), 2);
        assert_eq!(fills[0], Argb::from_rgb(0xD8E8F0).with_alpha(FILL_ALPHA));
        assert_eq!(fills[1], Argb::from_rgb(0xE3EBE0).with_alpha(FILL_ALPHA));
    }

    #[test]
    fn test_degenerate_geometry_skipped() {
        let ring = BackgroundElement {
            id: "r".into(),
            layer: BackgroundLayer::Water,
            color: Argb::WHITE,
            geometry: BackgroundGeometry::Polygon(vec![vec![LatLng::new(0.1, 0.1), LatLng::new(0.2, 0.2)]]),
        };
        let road = BackgroundElement {
            id: "l".into(),
            layer: BackgroundLayer::Roads,
            color: Argb::WHITE,
            geometry: BackgroundGeometry::Polyline(vec![LatLng::new(0.1, 0.1)]),
        };
        let mut canvas = RecordingCanvas::new(1000.0, 1000.0);
        BackgroundRenderer.draw(&mut canvas, &converter(), &[ring, road]);
        assert!(canvas.commands.is_empty());
    }

    #[test]
    fn test_road_is_halo_then_core() {
        let road = BackgroundElement {
            id: "road".into(),
            layer: BackgroundLayer::Roads,
            color: Argb::from_rgb(0xF0F0F0),
            geometry: BackgroundGeometry::Polyline(vec![LatLng::new(0.5, 0.0), LatLng::new(0.5, 1.0)]),
        };
        let mut canvas = RecordingCanvas::new(1000.0, 1000.0);
        BackgroundRenderer.draw(&mut canvas, &converter(), &[road]);
        match canvas.commands.as_slice() {
            [DrawCommand::Polyline(_, halo), DrawCommand::Polyline(_, core)] => {
                assert!(halo.width > core.width);
                assert_eq!(core.width, ROAD_WIDTH);
                assert_eq!(core.color.alpha(), ROAD_ALPHA);
            }
            other => panic!("unexpected commands: {other:?}"),
        }
    }
}
