use crate::converter::CoordinateConverter;
use crate::geo_utils;
use crate::model::{Argb, LatLng};
use crate::render::{Canvas, ScreenPoint, StrokeStyle};

const ARROW_SIZE: f32 = 32.0;
const ARROW_FILL: Argb = Argb::from_rgb(0x4A4A4A);
const ARROW_BORDER: StrokeStyle = StrokeStyle::new(3.0, Argb::WHITE);

/// Arrow outline pointing north, in units of `ARROW_SIZE`
const ARROW_SHAPE: [(f32, f32); 7] = [
    (0.0, -1.0),
    (0.7, 0.4),
    (0.4, 0.4),
    (0.4, 1.0),
    (-0.4, 1.0),
    (-0.4, 0.4),
    (-0.7, 0.4),
];

/// User position arrow, pointing towards the selected POI (north when none)
pub struct UserMarkerRenderer;

impl UserMarkerRenderer {
    pub fn draw<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        converter: &CoordinateConverter,
        user: LatLng,
        target: Option<LatLng>,
    ) {
        profiling::scope!("UserMarkerRenderer::draw");
        if !converter.is_in_bounds(user) {
            return;
        }
        let center = converter.gps_to_screen(user);
        let heading = target.map(|t| geo_utils::bearing(user, t)).unwrap_or(0.0) as f32;
        let outline = arrow_outline(center, heading);

        canvas.stroke_polygon(&outline, ARROW_BORDER);
        canvas.fill_polygon(&outline, ARROW_FILL);
    }
}

/// Arrow vertices rotated clockwise by `heading_deg` around `center` (screen y points down)
fn arrow_outline(center: ScreenPoint, heading_deg: f32) -> Vec<ScreenPoint> {
    let (sin, cos) = heading_deg.to_radians().sin_cos();
    ARROW_SHAPE
        .iter()
        .map(|&(ux, uy)| {
            let (x, y) = (ux * ARROW_SIZE, uy * ARROW_SIZE);
            ScreenPoint::new(center.x + x * cos - y * sin, center.y + x * sin + y * cos)
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

    fn tip(canvas: &RecordingCanvas) -> ScreenPoint {
        match canvas.commands.last() {
            Some(DrawCommand::FillPolygon(points, _)) => points[0],
            other => panic!("expected arrow fill, got {other:?}"),
        }
    }

    #[test]
    fn test_points_north_without_target() {
        let mut canvas = RecordingCanvas::new(1000.0, 1000.0);
        UserMarkerRenderer.draw(&mut canvas, &converter(), LatLng::new(0.5, 0.5), None);
        assert_eq!(canvas.commands.len(), 2);
        let t = tip(&canvas);
        assert!((t.x - 500.0).abs() < 1e-3);
        assert!((t.y - (500.0 - ARROW_SIZE)).abs() < 1e-3);
    }

    #[test]
    fn test_points_east_towards_target() {
        let mut canvas = RecordingCanvas::new(1000.0, 1000.0);
        UserMarkerRenderer.draw(
            &mut canvas,
            &converter(),
            LatLng::new(0.0, 0.5),
            Some(LatLng::new(0.0, 0.9)),
        );
        let t = tip(&canvas);
        assert!((t.x - (500.0 + ARROW_SIZE)).abs() < 1e-2);
        assert!((t.y - 1000.0).abs() < 1e-2);
    }

    #[test]
    fn test_skipped_out_of_bounds() {
        let mut canvas = RecordingCanvas::new(1000.0, 1000.0);
        UserMarkerRenderer.draw(&mut canvas, &converter(), LatLng::new(2.0, 0.5), None);
        assert!(canvas.commands.is_empty());
    }
}
