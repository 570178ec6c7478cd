//! POI Map Viewer - Desktop host for the POI map engine
//!
//! Wires the engine's [`MapSurface`](poi_map_lib::MapSurface) into an eframe window:
//! an egui-backed canvas, pointer gestures, an HTTP client for places and the visit
//! journal, and command-line settings.

mod app;
mod logging;

pub use app::PoiMapViewerApp;
pub use logging::{log_version_info, setup_logging};

/// Entry point for desktop platforms; must run inside a tokio runtime
pub async fn native_main(
    app_name: &str,
    app_creator: impl FnOnce(&eframe::CreationContext<'_>) -> Box<dyn eframe::App>,
) {
    // Before any logging
    setup_logging();

    log_version_info();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title(app_name),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(app_name, native_options, Box::new(move |cc| Ok(app_creator(cc)))) {
        tracing::error!("Window closed with error: {e}");
    }
}
