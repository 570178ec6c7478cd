use std::f32::consts::TAU;

use crate::converter::CoordinateConverter;
use crate::model::{Argb, LatLng};
use crate::render::{Canvas, StrokeStyle};

const ROUTE_LINE: StrokeStyle = StrokeStyle::new(16.0, Argb::from_rgb(0x4A4A4A).with_alpha(220));
const DASH: f32 = 30.0;
const GAP: f32 = 20.0;

const PULSE_PERIOD_MS: u64 = 1500;
const PULSE_BASE_RADIUS: f32 = 50.0;
const PULSE_AMPLITUDE: f32 = 30.0;
const PULSE_WIDTH: f32 = 5.0;

/// Search-mode overlay: dashed line to the target and a pulsing ring on it
pub struct SearchOverlayRenderer;

impl SearchOverlayRenderer {
    pub fn draw<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        converter: &CoordinateConverter,
        user: Option<LatLng>,
        target: LatLng,
        animation_time_ms: u64,
    ) {
        profiling::scope!("SearchOverlayRenderer::draw");
        if let Some(user) = user {
            self.draw_route_line(canvas, converter, user, target);
        }
        self.draw_pulse(canvas, converter, target, animation_time_ms);
    }

    fn draw_route_line<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        converter: &CoordinateConverter,
        user: LatLng,
        target: LatLng,
    ) {
        if !converter.is_in_bounds(user) {
            tracing::warn!(?user, "User location outside the viewport, no route line");
            return;
        }
        if !converter.is_in_bounds(target) {
            tracing::warn!(?target, "Target outside the viewport, no route line");
            return;
        }
        canvas.dashed_line(
            converter.gps_to_screen(user),
            converter.gps_to_screen(target),
            ROUTE_LINE,
            DASH,
            GAP,
        );
    }

    fn draw_pulse<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        converter: &CoordinateConverter,
        target: LatLng,
        animation_time_ms: u64,
    ) {
        if !converter.is_in_bounds(target) {
            return;
        }
        let (radius, alpha) = pulse(animation_time_ms);
        canvas.stroke_circle(
            converter.gps_to_screen(target),
            radius,
            StrokeStyle::new(PULSE_WIDTH, Argb::RED.with_alpha(alpha)),
        );
    }
}

/// Ring radius and alpha at `time_ms` into the animation
pub(crate) fn pulse(time_ms: u64) -> (f32, u8) {
    let progress = (time_ms % PULSE_PERIOD_MS) as f32 / PULSE_PERIOD_MS as f32;
    let radius = PULSE_BASE_RADIUS + PULSE_AMPLITUDE * (progress * TAU).sin();
    let alpha = (255.0 * (1.0 - progress)).clamp(0.0, 255.0) as u8;
    (radius, alpha)
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

    #[test]
    fn test_pulse_curve() {
        let (r0, a0) = pulse(0);
        assert!((r0 - 50.0).abs() < 1e-4);
        assert_eq!(a0, 255);

        let (r_quarter, _) = pulse(375);
        assert!((r_quarter - 80.0).abs() < 1e-3);

        let (r_three_quarters, a) = pulse(1125);
        assert!((r_three_quarters - 20.0).abs() < 1e-3);
        assert_eq!(a, 63);

        // Periodic
        assert_eq!(pulse(200), pulse(1700));
    }

    #[test]
    fn test_line_and_pulse() {
        let mut canvas = RecordingCanvas::new(1000.0, 1000.0);
        SearchOverlayRenderer.draw(
            &mut canvas,
            &converter(),
            Some(LatLng::new(0.1, 0.1)),
            LatLng::new(0.9, 0.9),
            0,
        );
        assert!(matches!(canvas.commands[0], DrawCommand::DashedLine(_, _, s) if s == ROUTE_LINE));
        assert!(matches!(canvas.commands[1], DrawCommand::StrokeCircle(_, r, _) if (r - 50.0).abs() < 1e-4));
    }

    #[test]
    fn test_line_skipped_when_endpoint_out_of_bounds() {
        let mut canvas = RecordingCanvas::new(1000.0, 1000.0);
        SearchOverlayRenderer.draw(
            &mut canvas,
            &converter(),
            Some(LatLng::new(5.0, 0.1)),
            LatLng::new(0.9, 0.9),
            0,
        );
        assert_eq!(canvas.commands.len(), 1);
        assert!(matches!(canvas.commands[0], DrawCommand::StrokeCircle(..)));

        let mut canvas = RecordingCanvas::new(1000.0, 1000.0);
        SearchOverlayRenderer.draw(
            &mut canvas,
            &converter(),
            Some(LatLng::new(0.1, 0.1)),
            LatLng::new(0.9, 5.0),
            0,
        );
        assert!(canvas.commands.is_empty());
    }
}
