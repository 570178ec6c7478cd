//! Application module
//!
//! - Full-screen map drawn by the engine through an egui canvas
//! - Side panel with load status, the selected place and search controls
//! - Drag to pan, pinch or scroll to zoom, click a marker to select it
//! - Arrow keys simulate walking, which feeds the walk tracker during search

mod canvas;
mod client;
mod loader;
pub(crate) mod settings;

use std::sync::{Arc, Mutex, MutexGuard};

use eframe::egui;
use poi_map_lib::{
    ArRenderer, Gesture, LatLng, MapDataRepository, MapRenderer, MapSurface, Poi, RendererKind, create_renderer,
    geo_utils, journal,
};

use crate::app::canvas::EguiCanvas;
use crate::app::client::HttpPlacesClient;
use crate::app::loader::{LoadEvent, LoadRequest, MapLoader};
use crate::app::settings::Settings;

/// Zoom factor per scrolled point
const SCROLL_ZOOM_SPEED: f32 = 0.002;

type SharedSurface = Arc<Mutex<MapSurface<Arc<egui::Galley>>>>;

enum Status {
    Loading,
    Ready { location_name: Option<String>, pois: usize },
    Failed(String),
}

pub struct PoiMapViewerApp {
    settings: Settings,
    surface: SharedSurface,
    renderer: Box<dyn MapRenderer>,
    loader: MapLoader,
    status: Status,
    show_help: bool,
}

fn lock(surface: &SharedSurface) -> MutexGuard<'_, MapSurface<Arc<egui::Galley>>> {
    match surface.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// `from` moved `meters` north and east
fn offset_meters(from: LatLng, north: f64, east: f64) -> LatLng {
    const METERS_PER_DEGREE: f64 = 111_000.0;
    let lon_scale = from.lat.to_radians().cos().max(1e-6);
    LatLng::new(
        from.lat + north / METERS_PER_DEGREE,
        from.lon + east / (METERS_PER_DEGREE * lon_scale),
    )
}

impl PoiMapViewerApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = Settings::from_cli();
        tracing::info!(server = %settings.server_url, renderer = %settings.renderer, "Starting viewer");

        let mut surface = MapSurface::default();
        surface.attach();
        let ctx = cc.egui_ctx.clone();
        surface.set_on_redraw(move || ctx.request_repaint());
        surface.on_poi_clicked(|poi| tracing::info!(id = %poi.id, name = %poi.name, "Place clicked"));
        let surface: SharedSurface = Arc::new(Mutex::new(surface));

        let renderer = match create_renderer(settings.renderer, Some(surface.clone())) {
            Ok(renderer) => renderer,
            Err(e) => {
                tracing::error!("Falling back to the AR stub: {e}");
                Box::new(ArRenderer)
            }
        };

        let client = Arc::new(HttpPlacesClient::new(settings.server_url.clone(), settings.account_id.clone()));
        let repository = Arc::new(MapDataRepository::new(client.clone(), client.clone(), client));

        let mut app = Self {
            settings,
            surface,
            renderer,
            loader: MapLoader::new(repository),
            status: Status::Loading,
            show_help: false,
        };
        app.reload(&cc.egui_ctx);
        app
    }

    fn reload(&mut self, ctx: &egui::Context) {
        let request = match self.settings.location_id {
            Some(id) => LoadRequest::Location(id),
            None => LoadRequest::Around {
                center: self.settings.start_location(),
                radius_m: self.settings.radius,
            },
        };
        self.status = Status::Loading;
        let ctx = ctx.clone();
        self.loader.request(request, move || ctx.request_repaint());
    }

    fn process_load_results(&mut self) {
        while let Some(event) = self.loader.poll() {
            match event {
                LoadEvent::Loaded { data, location_name } => {
                    let mut surface = lock(&self.surface);
                    surface.set_map_data(data);
                    self.status = Status::Ready {
                        location_name,
                        pois: surface.pois().len(),
                    };
                }
                LoadEvent::Failed(message) => self.status = Status::Failed(message),
            }
        }
    }

    fn current_user_location(&self) -> LatLng {
        lock(&self.surface)
            .user_location()
            .unwrap_or_else(|| self.settings.start_location())
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        let (step, escape, center, help) = ctx.input(|i| {
            let pressed = |key| i.key_pressed(key);
            let step = self.settings.step_meters;
            let mut north = 0.0;
            let mut east = 0.0;
            if pressed(egui::Key::ArrowUp) {
                north += step;
            }
            if pressed(egui::Key::ArrowDown) {
                north -= step;
            }
            if pressed(egui::Key::ArrowRight) {
                east += step;
            }
            if pressed(egui::Key::ArrowLeft) {
                east -= step;
            }
            (
                (north != 0.0 || east != 0.0).then_some((north, east)),
                pressed(egui::Key::Escape),
                pressed(egui::Key::Space),
                pressed(egui::Key::F1),
            )
        });

        if let Some((north, east)) = step {
            let next = offset_meters(self.current_user_location(), north, east);
            self.renderer.update_user_location(next);
        }
        if escape {
            lock(&self.surface).stop_search_mode();
        }
        if center {
            let user = self.current_user_location();
            self.renderer.center_on_point(user, None);
        }
        if help {
            self.show_help = !self.show_help;
        }
    }

    fn side_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("poi_panel")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("POI Map");
                ui.label(format!("Renderer: {}", self.renderer.kind()));
                ui.separator();

                match &self.status {
                    Status::Loading => {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label("Loading places…");
                        });
                    }
                    Status::Ready { location_name, pois } => {
                        if let Some(name) = location_name {
                            ui.label(format!("📍 {name}"));
                        }
                        ui.label(format!("{pois} places"));
                    }
                    Status::Failed(message) => {
                        ui.colored_label(egui::Color32::RED, format!("Load failed: {message}"));
                    }
                }
                if ui.add_enabled(!self.loader.is_loading(), egui::Button::new("Reload")).clicked() {
                    self.reload(ctx);
                }
                ui.separator();

                let mut surface = lock(&self.surface);
                let user = surface.user_location();

                match surface.selected_poi().cloned() {
                    Some(poi) => {
                        selected_poi_ui(ui, &poi, user);
                        ui.horizontal(|ui| {
                            if surface.is_searching() {
                                if ui.button("⏹ Stop search").clicked() {
                                    surface.stop_search_mode();
                                }
                            } else {
                                if ui.button("🔍 Start search").clicked() {
                                    surface.start_search_mode();
                                }
                                if ui.button("Clear").clicked() {
                                    surface.set_selected_poi(None);
                                }
                            }
                        });
                    }
                    None => {
                        ui.label("Click a marker to select a place");
                    }
                }

                if surface.is_searching() {
                    ui.separator();
                    let walk = surface.walk();
                    ui.label(format!("Walked {}", geo_utils::format_distance(walk.walked_meters())));
                    if !walk.nearby().is_empty() {
                        ui.label("Nearby on the way:");
                        for (poi, distance) in walk.nearby() {
                            ui.label(format!(
                                "{} {} · {}",
                                poi.poi_type.glyph(),
                                poi.name,
                                geo_utils::format_distance(*distance)
                            ));
                        }
                    }
                }

                ui.separator();
                ui.label(format!("Zoom ×{:.1}", surface.controller().zoom()));
                if let Some(converter) = surface.controller().converter() {
                    let per_100px = geo_utils::format_distance(converter.meters_per_pixel() * 100.0);
                    ui.label(format!("Scale {per_100px} per 100 px"));
                }
                if ui.button("Reset zoom").clicked() {
                    surface.reset_zoom();
                }
                ui.small("Arrows: walk · Space: center · Esc: stop search · F1: help");
            });
    }

    fn map_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                profiling::scope!("map_panel");

                if self.renderer.kind() == RendererKind::Ar {
                    ui.centered_and_justified(|ui| {
                        ui.label("The AR renderer has no 2D view");
                    });
                    return;
                }

                let (rect, response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
                let mut surface = lock(&self.surface);
                surface.set_viewport_size(rect.width(), rect.height());

                if response.dragged() {
                    let delta = response.drag_delta();
                    if delta != egui::Vec2::ZERO {
                        surface.handle_gesture(Gesture::Drag {
                            dx: delta.x,
                            dy: delta.y,
                        });
                    }
                }
                if response.hovered() {
                    let (zoom, scroll) = ui.input(|i| (i.zoom_delta(), i.smooth_scroll_delta.y));
                    if zoom != 1.0 {
                        surface.handle_gesture(Gesture::Pinch { factor: zoom });
                    }
                    if scroll != 0.0 {
                        surface.handle_gesture(Gesture::Pinch {
                            factor: (scroll * SCROLL_ZOOM_SPEED).exp(),
                        });
                    }
                }
                if response.clicked()
                    && let Some(pos) = response.interact_pointer_pos()
                {
                    let local = pos - rect.min;
                    if let Some(poi) = surface.handle_gesture(Gesture::Tap { x: local.x, y: local.y }) {
                        surface.set_selected_poi(Some(poi));
                    }
                }

                let painter = ui.painter_at(rect);
                let mut canvas = EguiCanvas::new(&painter, rect);
                surface.draw_frame(&mut canvas);
            });
    }
}

fn selected_poi_ui(ui: &mut egui::Ui, poi: &Poi, user: Option<LatLng>) {
    ui.label(egui::RichText::new(format!("{} {}", poi.poi_type.glyph(), poi.name)).strong());
    if let Some(user) = user {
        ui.label(format!(
            "{} away, bearing {:.0}°",
            geo_utils::format_distance(geo_utils::distance(user, poi.location)),
            geo_utils::bearing(user, poi.location)
        ));
    }
    if poi.is_visited {
        match poi.impression.as_deref().and_then(journal::emotion_by_name) {
            Some(emotion) => {
                let color = canvas::to_color32(poi_map_lib::Argb::from_rgb(emotion.color));
                ui.colored_label(color, format!("✔️ Visited: {} {}", emotion.emoji, emotion.name));
            }
            None => {
                ui.label("✔️ Visited");
            }
        }
    }
}

fn help_window(ctx: &egui::Context, open: &mut bool) {
    egui::Window::new("Help")
        .open(open)
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.label("Drag to pan, pinch or scroll to zoom.");
            ui.label("Click a marker to select it, then start a search to walk there.");
            ui.label("Arrow keys move your position; the trail follows you while searching.");
        });
}

#[profiling::all_functions]
impl eframe::App for PoiMapViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_load_results();

        {
            let surface = lock(&self.surface);
            let now = instant::Instant::now();
            surface.pump(now);
            if let Some(deadline) = surface.next_deadline() {
                ctx.request_repaint_after(deadline.saturating_duration_since(now));
            }
        }

        self.handle_keyboard(ctx);

        if self.show_help {
            help_window(ctx, &mut self.show_help);
        }

        self.side_panel(ctx);
        self.map_panel(ctx);
    }

    fn on_exit(&mut self) {
        self.renderer.cleanup();
        lock(&self.surface).detach();
        tracing::debug!("Viewer closed");
    }
}
