use crate::model::Argb;
use crate::render::{Canvas, ScreenPoint, StrokeStyle};

/// Fixed-pixel grid, independent of zoom
pub struct GridRenderer {
    pub cell_size: f32,
    pub stroke: StrokeStyle,
}

impl Default for GridRenderer {
    fn default() -> Self {
        Self {
            cell_size: 200.0,
            stroke: StrokeStyle::new(1.0, Argb::LIGHT_GRAY),
        }
    }
}

impl GridRenderer {
    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        profiling::scope!("GridRenderer::draw");
        let (width, height) = canvas.size();
        if self.cell_size <= 0.0 {
            return;
        }

        let mut x = 0.0;
        while x <= width {
            canvas.line(ScreenPoint::new(x, 0.0), ScreenPoint::new(x, height), self.stroke);
            x += self.cell_size;
        }
        let mut y = 0.0;
        while y <= height {
            canvas.line(ScreenPoint::new(0.0, y), ScreenPoint::new(width, y), self.stroke);
            y += self.cell_size;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::testing::{DrawCommand, RecordingCanvas};

    #[test]
    fn test_line_count() {
        let mut canvas = RecordingCanvas::new(450.0, 250.0);
        GridRenderer::default().draw(&mut canvas);
        // x = 0, 200, 400 and y = 0, 200
        assert_eq!(canvas.commands.len(), 5);
        assert!(canvas.commands.iter().all(|c| matches!(c, DrawCommand::Line(..))));
    }
}
