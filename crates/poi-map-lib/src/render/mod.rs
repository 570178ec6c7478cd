//! Layer renderers and the drawing abstraction they target
//!
//! Renderers never talk to a GUI toolkit directly. They project through the current
//! [`CoordinateConverter`](crate::CoordinateConverter) and issue primitive commands on a
//! [`Canvas`]; the host application provides the implementation (egui in the viewer).

mod background;
mod grid;
mod poi_markers;
mod search_overlay;
mod trail;
mod user_marker;

pub use background::BackgroundRenderer;
pub use grid::GridRenderer;
pub use poi_markers::{PoiMarkerRenderer, MARKER_RADIUS};
pub use search_overlay::SearchOverlayRenderer;
pub use trail::{TrailRenderer, FOOTPRINT_SPACING};
pub use user_marker::UserMarkerRenderer;

use crate::model::Argb;

/// Screen-space position in pixels, origin at the top-left of the viewport
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: ScreenPoint) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub width: f32,
    pub color: Argb,
}

impl StrokeStyle {
    pub const fn new(width: f32, color: Argb) -> Self {
        Self { width, color }
    }
}

/// Drawing surface the renderers paint on
///
/// Implementations are expected to be immediate-mode: every call paints on top of
/// what was painted before, so call order is z-order.
pub trait Canvas {
    /// Rasterized glyph handle, cached by [`IconCache`](crate::IconCache)
    type Glyph: Clone;

    /// Viewport size in pixels
    fn size(&self) -> (f32, f32);

    fn fill_background(&mut self, color: Argb);

    fn line(&mut self, from: ScreenPoint, to: ScreenPoint, stroke: StrokeStyle);

    fn polyline(&mut self, points: &[ScreenPoint], stroke: StrokeStyle);

    fn dashed_line(
        &mut self,
        from: ScreenPoint,
        to: ScreenPoint,
        stroke: StrokeStyle,
        dash: f32,
        gap: f32,
    );

    fn fill_polygon(&mut self, points: &[ScreenPoint], color: Argb);

    fn stroke_polygon(&mut self, points: &[ScreenPoint], stroke: StrokeStyle);

    fn fill_circle(&mut self, center: ScreenPoint, radius: f32, color: Argb);

    fn stroke_circle(&mut self, center: ScreenPoint, radius: f32, stroke: StrokeStyle);

    /// Lay out `text` at `size` pixels for later stamping
    fn rasterize_glyph(&mut self, text: &str, size: f32) -> Self::Glyph;

    /// Stamp a glyph centred on `center`, rotated clockwise by `rotation_deg`
    fn draw_glyph(&mut self, glyph: &Self::Glyph, center: ScreenPoint, rotation_deg: f32, tint: Argb);
}
