//! Rendering surface: owns the camera, search mode, gestures, glyph cache and map data,
//! and draws every layer once per frame.

use std::sync::Arc;

use instant::Instant;

use crate::controller::MapController;
use crate::gesture::{Gesture, GestureHandler};
use crate::icon_cache::IconCache;
use crate::journal;
use crate::model::{Argb, LatLng, MapData, Poi, PoiType};
use crate::render::{
    BackgroundRenderer, Canvas, GridRenderer, PoiMarkerRenderer, SearchOverlayRenderer, TrailRenderer,
    UserMarkerRenderer,
};
use crate::scheduler::FrameScheduler;
use crate::search::SearchModeController;
use crate::walk::WalkTracker;

/// Category keywords (matched against the OSM tag) that the map shows
const ALLOWED_KEYWORDS: [&str; 13] = [
    "cafe",
    "coffee",
    "restaurant",
    "food",
    "bar",
    "pub",
    "nightclub",
    "hookah",
    "shisha",
    "park",
    "garden",
    "playground",
    "кальян",
];

#[derive(Debug, Clone)]
pub struct SurfaceConfig {
    /// Soft beige paper colour behind everything
    pub background: Argb,
    /// Extra span around user and target when search mode fits both on screen
    pub fit_padding: f64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            background: Argb(0xFFF8_F8F6),
            fit_padding: 0.3,
        }
    }
}

pub fn is_allowed_poi_type(poi_type: PoiType) -> bool {
    let tag = poi_type.osm_tag().to_lowercase();
    !tag.is_empty() && ALLOWED_KEYWORDS.iter().any(|k| tag.contains(k))
}

type Redraw = Arc<dyn Fn() + Send + Sync>;

pub struct MapSurface<G> {
    config: SurfaceConfig,
    controller: MapController,
    frames: FrameScheduler,
    search: SearchModeController,
    gestures: GestureHandler,
    icons: Option<IconCache<G>>,

    data: Option<MapData>,
    pois: Vec<Poi>,
    user_location: Option<LatLng>,
    selected: Option<Poi>,
    trail: Vec<LatLng>,
    walk: WalkTracker,

    redraw: Option<Redraw>,

    background: BackgroundRenderer,
    grid: GridRenderer,
    trail_renderer: TrailRenderer,
    user_marker: UserMarkerRenderer,
    overlay: SearchOverlayRenderer,
}

impl<G: Clone> Default for MapSurface<G> {
    fn default() -> Self {
        Self::new(SurfaceConfig::default())
    }
}

impl<G: Clone> MapSurface<G> {
    /// Detached surface; call [`attach`](Self::attach) before drawing
    pub fn new(config: SurfaceConfig) -> Self {
        let frames = FrameScheduler::new();
        let search = SearchModeController::with_scheduler(Arc::new(frames.clone()));
        Self {
            config,
            controller: MapController::new(),
            frames,
            search,
            gestures: GestureHandler::new(),
            icons: None,
            data: None,
            pois: Vec::new(),
            user_location: None,
            selected: None,
            trail: Vec::new(),
            walk: WalkTracker::new(),
            redraw: None,
            background: BackgroundRenderer,
            grid: GridRenderer::default(),
            trail_renderer: TrailRenderer,
            user_marker: UserMarkerRenderer,
            overlay: SearchOverlayRenderer,
        }
    }

    /// Called whenever the surface needs repainting (camera change, animation tick, new data)
    pub fn set_on_redraw(&mut self, callback: impl Fn() + Send + Sync + 'static) {
        let redraw: Redraw = Arc::new(callback);
        let on_change = redraw.clone();
        self.controller.set_on_change(move || on_change());
        let on_frame = redraw.clone();
        self.search.set_on_frame(move || on_frame());
        self.redraw = Some(redraw);
    }

    pub fn on_poi_clicked(&mut self, callback: impl FnMut(&Poi) + Send + 'static) {
        self.gestures.set_on_poi_click(callback);
    }

    /// Host surface became visible: create the glyph cache
    pub fn attach(&mut self) {
        if self.icons.is_none() {
            tracing::debug!("Surface attached");
            self.icons = Some(IconCache::new());
        }
    }

    /// Host surface went away: drop cached glyphs and stop the animation loop
    pub fn detach(&mut self) {
        if let Some(mut icons) = self.icons.take() {
            tracing::debug!(glyphs = icons.len(), "Surface detached");
            icons.clear();
        }
        self.search.stop();
        self.walk.stop();
    }

    pub fn is_attached(&self) -> bool {
        self.icons.is_some()
    }

    pub fn set_map_data(&mut self, data: MapData) {
        tracing::debug!(
            pois = data.pois.len(),
            background = data.background_elements.len(),
            "Setting map data"
        );
        self.pois = data.pois.iter().filter(|p| is_allowed_poi_type(p.poi_type)).cloned().collect();
        if data.user_location.is_some() {
            self.user_location = data.user_location;
        }
        let bounds = data.bounds;
        self.data = Some(data);

        if self.has_viewport() {
            self.controller.initialize(bounds);
            if !self.search.is_searching() {
                self.controller.apply_initial_zoom_if_needed(self.user_location);
            }
        }
        self.request_redraw();
    }

    pub fn set_viewport_size(&mut self, width: f32, height: f32) {
        self.controller.set_viewport_size(width, height);
        if !self.has_viewport() {
            return;
        }
        if self.controller.bounds().is_none()
            && let Some(bounds) = self.data.as_ref().map(|d| d.bounds)
        {
            self.controller.initialize(bounds);
        }
        if !self.search.is_searching() {
            self.controller.apply_initial_zoom_if_needed(self.user_location);
        }
    }

    pub fn update_user_location(&mut self, location: LatLng) {
        self.user_location = Some(location);
        self.walk.update(location);
        self.request_redraw();
    }

    pub fn update_pois(&mut self, pois: Vec<Poi>) {
        tracing::debug!(pois = pois.len(), "Updating POIs");
        self.pois = pois.into_iter().filter(|p| is_allowed_poi_type(p.poi_type)).collect();
        self.request_redraw();
    }

    pub fn set_trail(&mut self, points: Vec<LatLng>) {
        self.trail = points;
        self.request_redraw();
    }

    /// Selected POI, which the user arrow points at
    pub fn set_selected_poi(&mut self, poi: Option<Poi>) {
        tracing::debug!(selected = ?poi.as_ref().map(|p| &p.name), "Selecting POI");
        self.selected = poi;
        self.request_redraw();
    }

    /// Snapshot the camera, start animating and frame the user together with the target
    pub fn start_search_mode(&mut self) {
        let Some(snapshot) = self.controller.snapshot() else {
            tracing::warn!("Search mode requested before the map has bounds");
            return;
        };
        self.search.start(snapshot.zoom, snapshot.bounds);

        if let Some(target) = &self.selected {
            self.walk.start(target, &self.pois, self.user_location);
            if let Some(user) = self.user_location {
                self.controller
                    .zoom_to_include_both(user, target.location, self.config.fit_padding);
            }
        }
        self.request_redraw();
    }

    /// Stop animating and put the camera back where it was when search started
    pub fn stop_search_mode(&mut self) {
        if let Some(snapshot) = self.search.stop() {
            self.controller.restore(snapshot);
        }
        self.walk.stop();
        self.request_redraw();
    }

    pub fn reset_zoom(&mut self) {
        self.controller.reset_zoom();
        self.controller.apply_initial_zoom_if_needed(self.user_location);
    }

    pub fn pan_to(&mut self, location: LatLng) {
        self.controller.pan_to(location);
    }

    pub fn zoom_to(&mut self, zoom: f64) {
        self.controller.zoom_to(zoom);
    }

    pub fn zoom_to_include_both(&mut self, a: LatLng, b: LatLng, padding: f64) {
        self.controller.zoom_to_include_both(a, b, padding);
    }

    /// Apply a pointer gesture; returns the tapped POI, if any
    pub fn handle_gesture(&mut self, gesture: Gesture) -> Option<Poi> {
        let drawn = visible_pois(&self.pois, self.selected.as_ref(), self.search.is_searching());
        self.gestures
            .handle(gesture, &mut self.controller, &drawn)
            .cloned()
    }

    /// Run due animation ticks; returns how many ran
    pub fn pump(&self, now: Instant) -> usize {
        self.frames.pump(now)
    }

    /// When the next animation tick is due
    pub fn next_deadline(&self) -> Option<Instant> {
        self.frames.next_deadline()
    }

    /// Draw one frame: background, terrain, grid, markers, trail, user marker, search overlay
    pub fn draw_frame<C>(&mut self, canvas: &mut C)
    where
        C: Canvas<Glyph = G> + ?Sized,
    {
        profiling::scope!("MapSurface::draw_frame");
        canvas.fill_background(self.config.background);

        let Some(icons) = self.icons.as_mut() else {
            tracing::trace!("Surface detached, skipping layers");
            return;
        };
        let Some(converter) = self.controller.converter() else {
            return;
        };

        if let Some(data) = &self.data
            && !data.background_elements.is_empty()
        {
            self.background.draw(canvas, converter, &data.background_elements);
        }

        self.grid.draw(canvas);

        let searching = self.search.is_searching();
        let markers = PoiMarkerRenderer {
            today_start_ms: journal::today_start_millis(),
        };
        let drawn = visible_pois(&self.pois, self.selected.as_ref(), searching);
        markers.draw(canvas, converter, icons, &drawn);

        let trail = if self.walk.is_walking() {
            self.walk.path()
        } else {
            &self.trail
        };
        if !trail.is_empty() {
            self.trail_renderer.draw(canvas, converter, icons, trail);
        }

        let target = self.selected.as_ref().map(|p| p.location);
        if let Some(user) = self.user_location {
            self.user_marker.draw(canvas, converter, user, target);
        }

        if searching && let Some(target) = target {
            self.overlay
                .draw(canvas, converter, self.user_location, target, self.search.animation_time());
        }
    }

    pub fn controller(&self) -> &MapController {
        &self.controller
    }

    pub fn is_searching(&self) -> bool {
        self.search.is_searching()
    }

    pub fn pois(&self) -> &[Poi] {
        &self.pois
    }

    pub fn selected_poi(&self) -> Option<&Poi> {
        self.selected.as_ref()
    }

    pub fn user_location(&self) -> Option<LatLng> {
        self.user_location
    }

    pub fn walk(&self) -> &WalkTracker {
        &self.walk
    }

    fn has_viewport(&self) -> bool {
        matches!(self.controller.viewport(), Some((w, h)) if w > 0.0 && h > 0.0)
    }

    fn request_redraw(&self) {
        if let Some(redraw) = &self.redraw {
            redraw();
        }
    }
}

/// POIs in draw order; while searching with a selection only the target is shown
fn visible_pois<'a>(pois: &'a [Poi], selected: Option<&'a Poi>, searching: bool) -> Vec<&'a Poi> {
    match selected {
        Some(target) if searching => vec![target],
        _ => pois.iter().collect(),
    }
}
