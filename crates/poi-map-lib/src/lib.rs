//! POI Map Library - Core Engine for the Interactive Points-of-Interest Map
//!
//! This library owns everything about the map that does not depend on a GUI toolkit:
//! projecting GPS coordinates onto a viewport, the camera/zoom state machine, gesture
//! translation, the layered rendering pipeline (against an abstract [`Canvas`]), the
//! guided-search animation loop, and the repository that merges backend place data
//! with the user's visit journal.
//!
//! # Architecture
//!
//! - **[`CoordinateConverter`]**: Immutable GPS ↔ screen projection for one viewport
//! - **[`MapController`]**: Camera state (bounds, zoom), rebuilds the converter on change
//! - **[`GestureHandler`]**: Drag/pinch/tap → controller calls and POI hit-testing
//! - **[`SearchModeController`]**: Idle ⇄ searching with a repeating animation task
//! - **[`MapSurface`]**: Owns the above plus the data and draws every layer per frame
//! - **[`MapDataRepository`]**: Loads places and journal entries into [`MapData`]
//!
//! # Draw order
//!
//! Background colour, terrain, grid, POI markers, trail, user marker, search overlay.

mod backend;
mod controller;
mod converter;
pub mod dto;
mod gesture;
pub mod geo_utils;
mod icon_cache;
pub mod journal;
mod model;
pub mod render;
mod repository;
mod scheduler;
mod search;
mod surface;
mod walk;

// Public API exports
pub use backend::{ArRenderer, Canvas2DRenderer, MapRenderer, RendererKind, create_renderer};
pub use controller::{CameraSnapshot, MapController};
pub use converter::CoordinateConverter;
pub use gesture::{Gesture, GestureHandler};
pub use icon_cache::{IconCache, IconKey};
pub use model::{
    Argb, BackgroundElement, BackgroundGeometry, BackgroundLayer, LatLng, MIN_SPAN, MapBounds,
    MapData, Poi, PoiType,
};
pub use render::{Canvas, ScreenPoint, StrokeStyle};
pub use repository::{
    JournalService, MapDataRepository, PlacesService, SessionProvider, DEFAULT_BOUNDS,
};
pub use scheduler::{FrameScheduler, RepeatingTask, Scheduler};
pub use search::SearchModeController;
pub use surface::{MapSurface, SurfaceConfig, is_allowed_poi_type};
pub use walk::WalkTracker;

/// Error types for the map engine
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Service returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("The 2D renderer needs a map surface")]
    MissingSurface,
}

pub type Result<T> = std::result::Result<T, MapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        let _: fn() -> MapController = MapController::new;
        let _: fn() -> SearchModeController = SearchModeController::new;
        let _: fn(LatLng, LatLng) -> f64 = geo_utils::distance;
    }

    #[test]
    fn test_error_display() {
        let err = MapError::Service {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "Service returned 503: unavailable");
    }
}
