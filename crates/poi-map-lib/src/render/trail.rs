use crate::converter::CoordinateConverter;
use crate::icon_cache::{IconCache, IconKey};
use crate::model::{Argb, LatLng};
use crate::render::{Canvas, ScreenPoint};

/// Minimum pixel distance between two consecutive footprints
pub const FOOTPRINT_SPACING: f32 = 70.0;
const FOOTPRINT_SIZE: f32 = 48.0;
const FOOTPRINT_TINT: Argb = Argb::GRAY.with_alpha(180);

/// Footprint glyphs stamped along the walked path, rotated to the walking direction
pub struct TrailRenderer;

impl TrailRenderer {
    pub fn draw<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        converter: &CoordinateConverter,
        icons: &mut IconCache<C::Glyph>,
        path: &[LatLng],
    ) {
        profiling::scope!("TrailRenderer::draw");
        let screen: Vec<ScreenPoint> = path.iter().map(|p| converter.gps_to_screen(*p)).collect();
        let stamps = footprints(&screen);
        if stamps.is_empty() {
            return;
        }

        let glyph = icons.get(canvas, IconKey::Footprint, FOOTPRINT_SIZE);
        for (at, angle) in stamps {
            canvas.draw_glyph(&glyph, at, angle, FOOTPRINT_TINT);
        }
    }
}

/// Stamp positions and rotations (degrees) along a screen-space path
pub(crate) fn footprints(points: &[ScreenPoint]) -> Vec<(ScreenPoint, f32)> {
    let mut stamps = Vec::new();
    if points.len() < 2 {
        return stamps;
    }

    let mut last: Option<ScreenPoint> = None;
    for segment in points.windows(2) {
        let (from, to) = (segment[0], segment[1]);
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let length = dx.hypot(dy);
        let steps = (length / FOOTPRINT_SPACING) as u32;
        let angle = dy.atan2(dx).to_degrees();

        for step in 0..=steps {
            let ratio = step as f32 / steps.max(1) as f32;
            let candidate = ScreenPoint::new(from.x + dx * ratio, from.y + dy * ratio);
            let far_enough = last.is_none_or(|prev| prev.distance(candidate) >= FOOTPRINT_SPACING);
            if far_enough {
                stamps.push((candidate, angle));
                last = Some(candidate);
            }
        }
    }
    stamps
}
