//! Renderer backends selectable at runtime

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::model::{LatLng, Poi};
use crate::surface::MapSurface;
use crate::{MapError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum RendererKind {
    #[default]
    #[cfg_attr(feature = "clap", value(name = "canvas2d", alias = "2d"))]
    Canvas2D,
    Ar,
}

impl fmt::Display for RendererKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RendererKind::Canvas2D => write!(f, "canvas2d"),
            RendererKind::Ar => write!(f, "ar"),
        }
    }
}

/// What the host can ask of any map backend
pub trait MapRenderer {
    fn render_pois(&mut self, pois: Vec<Poi>);

    /// Show a path between two points
    fn render_path(&mut self, from: LatLng, to: LatLng);

    fn update_user_location(&mut self, location: LatLng);

    /// Recenter on `location`, then zoom when `zoom` is given
    fn center_on_point(&mut self, location: LatLng, zoom: Option<f64>);

    fn clear(&mut self);

    fn cleanup(&mut self);

    fn kind(&self) -> RendererKind;
}

/// Drives a shared [`MapSurface`]
pub struct Canvas2DRenderer<G> {
    surface: Arc<Mutex<MapSurface<G>>>,
}

impl<G: Clone> Canvas2DRenderer<G> {
    pub fn new(surface: Arc<Mutex<MapSurface<G>>>) -> Self {
        Self { surface }
    }

    fn surface(&self) -> MutexGuard<'_, MapSurface<G>> {
        match self.surface.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("Map surface lock poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}

impl<G: Clone> MapRenderer for Canvas2DRenderer<G> {
    fn render_pois(&mut self, pois: Vec<Poi>) {
        self.surface().update_pois(pois);
    }

    fn render_path(&mut self, from: LatLng, to: LatLng) {
        self.surface().set_trail(vec![from, to]);
    }

    fn update_user_location(&mut self, location: LatLng) {
        self.surface().update_user_location(location);
    }

    fn center_on_point(&mut self, location: LatLng, zoom: Option<f64>) {
        let mut surface = self.surface();
        surface.pan_to(location);
        if let Some(zoom) = zoom {
            surface.zoom_to(zoom);
        }
    }

    fn clear(&mut self) {
        self.surface().update_pois(Vec::new());
    }

    /// Detach the surface, dropping its glyph cache and stopping any animation
    fn cleanup(&mut self) {
        self.surface().detach();
    }

    fn kind(&self) -> RendererKind {
        RendererKind::Canvas2D
    }
}

/// Augmented-reality placeholder; accepts every call and draws nothing
#[derive(Debug, Default)]
pub struct ArRenderer;

impl MapRenderer for ArRenderer {
    fn render_pois(&mut self, pois: Vec<Poi>) {
        tracing::trace!(pois = pois.len(), "AR renderer ignores POIs");
    }

    fn render_path(&mut self, _from: LatLng, _to: LatLng) {}

    fn update_user_location(&mut self, _location: LatLng) {}

    fn center_on_point(&mut self, _location: LatLng, _zoom: Option<f64>) {}

    fn clear(&mut self) {}

    fn cleanup(&mut self) {}

    fn kind(&self) -> RendererKind {
        RendererKind::Ar
    }
}

/// Build the backend for `kind`. The 2D backend needs the surface it draws into.
pub fn create_renderer<G>(
    kind: RendererKind,
    surface: Option<Arc<Mutex<MapSurface<G>>>>,
) -> Result<Box<dyn MapRenderer>>
where
    G: Clone + 'static,
{
    tracing::info!(%kind, "Creating map renderer");
    match kind {
        RendererKind::Canvas2D => {
            let surface = surface.ok_or(MapError::MissingSurface)?;
            Ok(Box::new(Canvas2DRenderer::new(surface)))
        }
        RendererKind::Ar => Ok(Box::new(ArRenderer)),
    }
}
