use crate::converter::CoordinateConverter;
use crate::icon_cache::{IconCache, IconKey};
use crate::model::{Argb, Poi};
use crate::render::{Canvas, ScreenPoint, StrokeStyle};

/// Marker circle radius in pixels; also the tap hit radius
pub const MARKER_RADIUS: f32 = 40.0;
const GLYPH_SIZE: f32 = 48.0;

const UNVISITED: Argb = Argb::GRAY.with_alpha(128);
const VISITED: Argb = Argb::from_rgb(0x4CAF50).with_alpha(128);
const VISITED_TODAY: Argb = Argb::from_rgb(0xFFC107).with_alpha(200);
const BORDER: StrokeStyle = StrokeStyle::new(3.0, Argb::WHITE.with_alpha(200));

/// Circle + border + glyph for every POI inside the current bounds
pub struct PoiMarkerRenderer {
    /// Epoch milliseconds of local midnight today; visits at or after it are highlighted
    pub today_start_ms: i64,
}

impl PoiMarkerRenderer {
    fn fill_for(&self, poi: &Poi) -> Argb {
        match (poi.is_visited, poi.visit_date) {
            (true, Some(date)) if date >= self.today_start_ms => VISITED_TODAY,
            (true, _) => VISITED,
            (false, _) => UNVISITED,
        }
    }

    pub fn draw<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        converter: &CoordinateConverter,
        icons: &mut IconCache<C::Glyph>,
        pois: &[&Poi],
    ) {
        profiling::scope!("PoiMarkerRenderer::draw");
        for poi in pois {
            if !converter.is_in_bounds(poi.location) {
                continue;
            }
            let center = converter.gps_to_screen(poi.location);

            canvas.fill_circle(center, MARKER_RADIUS, self.fill_for(poi));
            canvas.stroke_circle(center, MARKER_RADIUS, BORDER);

            let key = if poi.is_visited {
                IconKey::Checkmark
            } else {
                IconKey::Poi(poi.poi_type)
            };
            let glyph = icons.get(canvas, key, GLYPH_SIZE);
            canvas.draw_glyph(&glyph, center, 0.0, Argb::WHITE);
        }
    }

    /// Topmost marker under `tap`: markers are searched in reverse draw order
    pub fn hit_test<'a>(converter: &CoordinateConverter, pois: &[&'a Poi], tap: ScreenPoint) -> Option<&'a Poi> {
        pois.iter()
            .rev()
            .filter(|poi| converter.is_in_bounds(poi.location))
            .find(|poi| converter.gps_to_screen(poi.location).distance(tap) <= MARKER_RADIUS)
            .copied()
    }
}
