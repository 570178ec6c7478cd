//! Pointer gestures → camera changes and POI taps

use crate::controller::MapController;
use crate::model::Poi;
use crate::render::{PoiMarkerRenderer, ScreenPoint};

/// Platform-neutral pointer gesture, in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Drag { dx: f32, dy: f32 },
    Pinch { factor: f32 },
    Tap { x: f32, y: f32 },
}

type PoiClickCallback = Box<dyn FnMut(&Poi) + Send>;

#[derive(Default)]
pub struct GestureHandler {
    on_poi_click: Option<PoiClickCallback>,
}

impl GestureHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_on_poi_click(&mut self, callback: impl FnMut(&Poi) + Send + 'static) {
        self.on_poi_click = Some(Box::new(callback));
    }

    /// Apply `gesture`; `drawn` must be the POIs in draw order. Returns the tapped POI.
    pub fn handle<'a>(
        &mut self,
        gesture: Gesture,
        controller: &mut MapController,
        drawn: &[&'a Poi],
    ) -> Option<&'a Poi> {
        match gesture {
            Gesture::Drag { dx, dy } => {
                controller.apply_scroll(dx, dy);
                None
            }
            Gesture::Pinch { factor } => {
                controller.apply_scale(factor as f64);
                None
            }
            Gesture::Tap { x, y } => {
                let converter = controller.converter()?;
                let hit = PoiMarkerRenderer::hit_test(converter, drawn, ScreenPoint::new(x, y))?;
                tracing::debug!(id = %hit.id, name = %hit.name, "POI tapped");
                if let Some(callback) = self.on_poi_click.as_mut() {
                    callback(hit);
                }
                Some(hit)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LatLng, MapBounds, PoiType};
    use std::sync::{Arc, Mutex};

    fn controller() -> MapController {
        let mut controller = MapController::new();
        controller.set_viewport_size(1000.0, 1000.0);
        controller.initialize(MapBounds::new(0.0, 1.0, 0.0, 1.0));
        controller
    }

    #[test]
    fn test_drag_and_pinch_move_camera() {
        let mut controller = controller();
        let mut handler = GestureHandler::new();

        handler.handle(Gesture::Pinch { factor: 2.0 }, &mut controller, &[]);
        assert_eq!(controller.zoom(), 2.0);

        let before = controller.bounds().expect("bounds");
        handler.handle(Gesture::Drag { dx: 100.0, dy: 0.0 }, &mut controller, &[]);
        let after = controller.bounds().expect("bounds");
        assert!(after.min_lon < before.min_lon);
    }

    #[test]
    fn test_tap_invokes_callback_with_topmost() {
        let mut controller = controller();
        let clicked = Arc::new(Mutex::new(Vec::new()));
        let mut handler = GestureHandler::new();
        let sink = clicked.clone();
        handler.set_on_poi_click(move |poi| {
            if let Ok(mut ids) = sink.lock() {
                ids.push(poi.id.clone());
            }
        });

        let under = Poi::new("under", "Under", PoiType::Cafe, LatLng::new(0.5, 0.5));
        let over = Poi::new("over", "Over", PoiType::Pub, LatLng::new(0.5, 0.52));
        let drawn = [&under, &over];

        let hit = handler.handle(Gesture::Tap { x: 510.0, y: 500.0 }, &mut controller, &drawn);
        assert_eq!(hit.map(|p| p.id.as_str()), Some("over"));

        let miss = handler.handle(Gesture::Tap { x: 10.0, y: 10.0 }, &mut controller, &drawn);
        assert!(miss.is_none());

        assert_eq!(*clicked.lock().expect("lock"), vec!["over".to_string()]);
    }

    #[test]
    fn test_tap_before_layout_is_ignored() {
        let mut controller = MapController::new();
        let poi = Poi::new("1", "A", PoiType::Cafe, LatLng::new(0.5, 0.5));
        let hit = GestureHandler::new().handle(Gesture::Tap { x: 0.0, y: 0.0 }, &mut controller, &[&poi]);
        assert!(hit.is_none());
    }
}
