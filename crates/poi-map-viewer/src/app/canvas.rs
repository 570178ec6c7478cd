//! [`Canvas`] implementation over an egui [`Painter`]
//!
//! Engine coordinates are relative to the map rect; this canvas offsets them into
//! egui screen space. Polygons are triangulated (egui only fills convex paths).

use std::sync::Arc;

use egui::epaint::TextShape;
use egui::{Color32, FontId, Galley, Mesh, Painter, Pos2, Rect, Shape, Stroke, Vec2};
use egui::emath::Rot2;
use geo::{Coord, LineString, Polygon, TriangulateEarcut};
use poi_map_lib::{Argb, Canvas, ScreenPoint, StrokeStyle};

pub fn to_color32(color: Argb) -> Color32 {
    Color32::from_rgba_unmultiplied(color.red(), color.green(), color.blue(), color.alpha())
}

fn to_stroke(stroke: StrokeStyle) -> Stroke {
    Stroke::new(stroke.width, to_color32(stroke.color))
}

/// Top-left position that puts the center of a `size` box rotated by `angle_rad` at `center`
fn rotated_origin(center: Pos2, size: Vec2, angle_rad: f32) -> Pos2 {
    center - Rot2::from_angle(angle_rad) * (size / 2.0)
}

pub struct EguiCanvas<'a> {
    painter: &'a Painter,
    rect: Rect,
}

impl<'a> EguiCanvas<'a> {
    pub fn new(painter: &'a Painter, rect: Rect) -> Self {
        Self { painter, rect }
    }

    fn pos(&self, p: ScreenPoint) -> Pos2 {
        self.rect.min + Vec2::new(p.x, p.y)
    }

    fn triangulate(&self, points: &[ScreenPoint], color: Color32) -> Option<Mesh> {
        let ring: LineString<f64> = points
            .iter()
            .map(|p| Coord {
                x: p.x as f64,
                y: p.y as f64,
            })
            .collect();
        let raw = Polygon::new(ring, vec![]).earcut_triangles_raw();
        if raw.triangle_indices.is_empty() {
            return None;
        }

        let mut mesh = Mesh::default();
        for xy in raw.vertices.chunks_exact(2) {
            mesh.colored_vertex(self.pos(ScreenPoint::new(xy[0] as f32, xy[1] as f32)), color);
        }
        for tri in raw.triangle_indices.chunks_exact(3) {
            mesh.add_triangle(tri[0] as u32, tri[1] as u32, tri[2] as u32);
        }
        Some(mesh)
    }
}

impl Canvas for EguiCanvas<'_> {
    type Glyph = Arc<Galley>;

    fn size(&self) -> (f32, f32) {
        (self.rect.width(), self.rect.height())
    }

    fn fill_background(&mut self, color: Argb) {
        self.painter.rect_filled(self.rect, 0.0, to_color32(color));
    }

    fn line(&mut self, from: ScreenPoint, to: ScreenPoint, stroke: StrokeStyle) {
        self.painter
            .line_segment([self.pos(from), self.pos(to)], to_stroke(stroke));
    }

    fn polyline(&mut self, points: &[ScreenPoint], stroke: StrokeStyle) {
        let points = points.iter().map(|p| self.pos(*p)).collect();
        self.painter.add(Shape::line(points, to_stroke(stroke)));
    }

    fn dashed_line(&mut self, from: ScreenPoint, to: ScreenPoint, stroke: StrokeStyle, dash: f32, gap: f32) {
        let path = [self.pos(from), self.pos(to)];
        self.painter
            .extend(Shape::dashed_line(&path, to_stroke(stroke), dash, gap));
    }

    fn fill_polygon(&mut self, points: &[ScreenPoint], color: Argb) {
        if points.len() < 3 {
            return;
        }
        if let Some(mesh) = self.triangulate(points, to_color32(color)) {
            self.painter.add(Shape::mesh(mesh));
        }
    }

    fn stroke_polygon(&mut self, points: &[ScreenPoint], stroke: StrokeStyle) {
        let points = points.iter().map(|p| self.pos(*p)).collect();
        self.painter.add(Shape::closed_line(points, to_stroke(stroke)));
    }

    fn fill_circle(&mut self, center: ScreenPoint, radius: f32, color: Argb) {
        self.painter
            .circle_filled(self.pos(center), radius, to_color32(color));
    }

    fn stroke_circle(&mut self, center: ScreenPoint, radius: f32, stroke: StrokeStyle) {
        self.painter
            .circle_stroke(self.pos(center), radius, to_stroke(stroke));
    }

    fn rasterize_glyph(&mut self, text: &str, size: f32) -> Arc<Galley> {
        profiling::scope!("EguiCanvas::rasterize_glyph");
        self.painter
            .layout_no_wrap(text.to_string(), FontId::proportional(size), Color32::WHITE)
    }

    fn draw_glyph(&mut self, glyph: &Arc<Galley>, center: ScreenPoint, rotation_deg: f32, tint: Argb) {
        let angle = rotation_deg.to_radians();
        let origin = rotated_origin(self.pos(center), glyph.size(), angle);
        let shape = TextShape::new(origin, glyph.clone(), Color32::WHITE)
            .with_override_text_color(to_color32(tint))
            .with_angle(angle);
        self.painter.add(shape);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_conversion() {
        let c = to_color32(Argb::from_rgb(0x4CAF50).with_alpha(255));
        assert_eq!(c, Color32::from_rgb(0x4C, 0xAF, 0x50));
        let translucent = to_color32(Argb(0x80FF0000));
        assert_eq!(translucent.a(), 0x80);
    }

    #[test]
    fn test_rotated_origin_keeps_center() {
        let center = Pos2::new(100.0, 50.0);
        let size = Vec2::new(20.0, 10.0);

        let upright = rotated_origin(center, size, 0.0);
        assert_eq!(upright, Pos2::new(90.0, 45.0));

        // Half a turn puts the origin on the opposite corner
        let flipped = rotated_origin(center, size, std::f32::consts::PI);
        assert!((flipped.x - 110.0).abs() < 1e-3);
        assert!((flipped.y - 55.0).abs() < 1e-3);
    }
}
