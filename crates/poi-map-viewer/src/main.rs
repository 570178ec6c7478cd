#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use poi_map_viewer::PoiMapViewerApp;

fn main() {
    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start the async runtime: {e}");
            std::process::exit(1);
        }
    };

    rt.block_on(async {
        poi_map_viewer::native_main("POI Map Viewer", |cc| Box::new(PoiMapViewerApp::new(cc))).await;
    });
}
