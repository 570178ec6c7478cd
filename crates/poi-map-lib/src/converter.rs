//! GPS ↔ screen projection for a rectangular viewport
//!
//! Longitude maps linearly onto x, latitude maps inversely onto y (north up).
//! A converter is immutable: the controller builds a new one whenever the bounds
//! or the viewport size change. Bounds must have a positive range on both axes.

use crate::model::{LatLng, MapBounds, METERS_PER_DEGREE};
use crate::render::ScreenPoint;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateConverter {
    bounds: MapBounds,
    width: f32,
    height: f32,
}

impl CoordinateConverter {
    /// Returns `None` for an empty viewport or bounds without area
    pub fn new(bounds: MapBounds, width: f32, height: f32) -> Option<Self> {
        if width <= 0.0 || height <= 0.0 {
            return None;
        }
        if !bounds.is_finite() || bounds.lat_range() <= 0.0 || bounds.lon_range() <= 0.0 {
            tracing::warn!(?bounds, "No projection for bounds without area");
            return None;
        }
        Some(Self {
            bounds,
            width,
            height,
        })
    }

    pub fn bounds(&self) -> MapBounds {
        self.bounds
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    #[inline]
    pub fn gps_to_screen(&self, p: LatLng) -> ScreenPoint {
        let nx = (p.lon - self.bounds.min_lon) / self.bounds.lon_range();
        let ny = (self.bounds.max_lat - p.lat) / self.bounds.lat_range();
        ScreenPoint::new(
            (nx * self.width as f64) as f32,
            (ny * self.height as f64) as f32,
        )
    }

    #[inline]
    pub fn screen_to_gps(&self, x: f32, y: f32) -> LatLng {
        let lon = self.bounds.min_lon + (x as f64 / self.width as f64) * self.bounds.lon_range();
        let lat = self.bounds.max_lat - (y as f64 / self.height as f64) * self.bounds.lat_range();
        LatLng::new(lat, lon)
    }

    pub fn is_in_bounds(&self, p: LatLng) -> bool {
        self.bounds.contains(p)
    }

    /// Vertical scale using the 111 km per degree of latitude approximation
    pub fn meters_per_pixel(&self) -> f64 {
        self.bounds.lat_range() * METERS_PER_DEGREE / self.height as f64
    }
}
