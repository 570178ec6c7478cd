//! Camera state machine
//!
//! The controller owns the visible bounds and the zoom factor. All zoom math is relative
//! to a reference extent captured once by [`MapController::initialize`], so that after any
//! zoom operation `bounds range == reference range / zoom`.
//!
//! Every mutator rebuilds the [`CoordinateConverter`] and notifies the redraw observer.
//! Mutators are silent no-ops until both the viewport size and the bounds are known,
//! which tolerates host layout transients.

use crate::converter::CoordinateConverter;
use crate::model::{LatLng, MIN_SPAN, MapBounds};

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 60.0;
/// Zoom applied by the one-shot initial centering
pub const INITIAL_ZOOM: f64 = 5.0;
const MIN_FIT_ZOOM: f64 = 1.0;
const MAX_FIT_ZOOM: f64 = 15.0;

/// Saved camera, restored verbatim when leaving search mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSnapshot {
    pub zoom: f64,
    pub bounds: MapBounds,
}

#[derive(Debug, Clone, Copy)]
struct Reference {
    lat_range: f64,
    lon_range: f64,
}

pub struct MapController {
    viewport: Option<(f32, f32)>,
    bounds: Option<MapBounds>,
    reference: Option<Reference>,
    zoom: f64,
    initial_zoom_applied: bool,
    converter: Option<CoordinateConverter>,
    on_change: Option<Box<dyn Fn() + Send + Sync>>,
}

impl Default for MapController {
    fn default() -> Self {
        Self::new()
    }
}

impl MapController {
    pub fn new() -> Self {
        Self {
            viewport: None,
            bounds: None,
            reference: None,
            zoom: 1.0,
            initial_zoom_applied: false,
            converter: None,
            on_change: None,
        }
    }

    /// Register the redraw observer, called after every camera change
    pub fn set_on_change(&mut self, callback: impl Fn() + Send + Sync + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    /// Store the loaded bounds and capture the reference extent for zoom math
    ///
    /// Axes narrower than [`MIN_SPAN`] (a single place, or places on one parallel)
    /// are widened around their centre.
    pub fn initialize(&mut self, bounds: MapBounds) {
        let bounds = match bounds.checked() {
            Ok(bounds) => bounds,
            Err(e) => {
                tracing::warn!("Camera not initialized: {e}");
                return;
            }
        };
        tracing::debug!(?bounds, "Initializing camera");
        self.reference = Some(Reference {
            lat_range: bounds.lat_range(),
            lon_range: bounds.lon_range(),
        });
        self.bounds = Some(bounds);
        self.zoom = 1.0;
        self.changed();
    }

    pub fn set_viewport_size(&mut self, width: f32, height: f32) {
        if self.viewport == Some((width, height)) {
            return;
        }
        tracing::debug!(width, height, "Viewport resized");
        self.viewport = Some((width, height));
        self.changed();
    }

    /// Center on the user and apply a comfortable zoom, once per session
    pub fn apply_initial_zoom_if_needed(&mut self, user_location: Option<LatLng>) {
        if self.initial_zoom_applied {
            self.rebuild_converter();
            return;
        }
        if !self.is_ready() {
            tracing::trace!("Initial zoom deferred until viewport and bounds are known");
            return;
        }
        if let Some(location) = user_location {
            self.pan_to(location);
        }
        self.zoom_to(INITIAL_ZOOM);
        self.initial_zoom_applied = true;
        tracing::debug!(zoom = self.zoom, "Initial zoom applied");
    }

    /// Allow the next [`apply_initial_zoom_if_needed`](Self::apply_initial_zoom_if_needed) to re-center
    pub fn reset_zoom(&mut self) {
        self.initial_zoom_applied = false;
    }

    pub fn is_initial_zoom_applied(&self) -> bool {
        self.initial_zoom_applied
    }

    /// Recenter on `location`, keeping the current extent
    pub fn pan_to(&mut self, location: LatLng) {
        let Some(bounds) = self.ready_bounds() else {
            tracing::trace!("pan_to ignored, camera not ready");
            return;
        };
        self.bounds = Some(MapBounds::around(location, bounds.lat_range(), bounds.lon_range()));
        self.changed();
    }

    /// Clamp `zoom` to [`MIN_ZOOM`, `MAX_ZOOM`] and resize the extent around the current center
    pub fn zoom_to(&mut self, zoom: f64) {
        let (Some(bounds), Some(reference)) = (self.ready_bounds(), self.reference) else {
            tracing::trace!("zoom_to ignored, camera not ready");
            return;
        };
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.bounds = Some(MapBounds::around(
            bounds.center(),
            reference.lat_range / self.zoom,
            reference.lon_range / self.zoom,
        ));
        self.changed();
    }

    /// Fit both points on screen with `padding` (fraction of the span) around them
    pub fn zoom_to_include_both(&mut self, a: LatLng, b: LatLng, padding: f64) {
        let (Some(_), Some(reference)) = (self.ready_bounds(), self.reference) else {
            tracing::trace!("zoom_to_include_both ignored, camera not ready");
            return;
        };
        let center = LatLng::new((a.lat + b.lat) / 2.0, (a.lon + b.lon) / 2.0);
        let lat_span = (a.lat - b.lat).abs().max(MIN_SPAN) * (1.0 + padding);
        let lon_span = (a.lon - b.lon).abs().max(MIN_SPAN) * (1.0 + padding);

        let zoom = (reference.lat_range / lat_span)
            .min(reference.lon_range / lon_span)
            .clamp(MIN_FIT_ZOOM, MAX_FIT_ZOOM);

        self.zoom = zoom;
        self.bounds = Some(MapBounds::around(
            center,
            reference.lat_range / zoom,
            reference.lon_range / zoom,
        ));
        tracing::debug!(zoom, ?center, "Fitted camera to two points");
        self.changed();
    }

    /// Drag-to-pan: content follows the pointer
    pub fn apply_scroll(&mut self, dx: f32, dy: f32) {
        let (Some(bounds), Some((width, height))) = (self.ready_bounds(), self.viewport) else {
            return;
        };
        let delta_lat = dy as f64 / height as f64 * bounds.lat_range();
        let delta_lon = dx as f64 / width as f64 * bounds.lon_range();
        self.bounds = Some(MapBounds::new(
            bounds.min_lat + delta_lat,
            bounds.max_lat + delta_lat,
            bounds.min_lon - delta_lon,
            bounds.max_lon - delta_lon,
        ));
        self.changed();
    }

    /// Pinch: multiply the zoom by `factor`, then re-clamp
    pub fn apply_scale(&mut self, factor: f64) {
        self.zoom_to(self.zoom * factor);
    }

    /// Reinstate a saved camera verbatim
    pub fn restore(&mut self, snapshot: CameraSnapshot) {
        tracing::debug!(zoom = snapshot.zoom, "Restoring camera");
        self.zoom = snapshot.zoom;
        self.bounds = Some(snapshot.bounds);
        self.changed();
    }

    pub fn snapshot(&self) -> Option<CameraSnapshot> {
        self.bounds.map(|bounds| CameraSnapshot {
            zoom: self.zoom,
            bounds,
        })
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn bounds(&self) -> Option<MapBounds> {
        self.bounds
    }

    pub fn center(&self) -> Option<LatLng> {
        self.bounds.map(|b| b.center())
    }

    pub fn viewport(&self) -> Option<(f32, f32)> {
        self.viewport
    }

    /// Projection for the current camera; `None` until viewport and bounds are known
    pub fn converter(&self) -> Option<&CoordinateConverter> {
        self.converter.as_ref()
    }

    fn is_ready(&self) -> bool {
        self.ready_bounds().is_some()
    }

    fn ready_bounds(&self) -> Option<MapBounds> {
        match self.viewport {
            Some((w, h)) if w > 0.0 && h > 0.0 => self.bounds,
            _ => None,
        }
    }

    fn rebuild_converter(&mut self) {
        self.converter = match (self.bounds, self.viewport) {
            (Some(bounds), Some((w, h))) => CoordinateConverter::new(bounds, w, h),
            _ => None,
        };
    }

    fn changed(&mut self) {
        self.rebuild_converter();
        if let Some(callback) = &self.on_change {
            callback();
        }
    }
}
