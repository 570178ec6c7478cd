//! Logging setup: `tracing-subscriber` fmt layer filtered by `RUST_LOG`

use tracing_subscriber::prelude::*;

#[cfg(debug_assertions)]
const DEFAULT_FILTER: &str = "debug,eframe=warn,egui=warn,wgpu_core=warn,wgpu_hal=warn,naga=warn,hyper_util=info,reqwest=info";
#[cfg(not(debug_assertions))]
const DEFAULT_FILTER: &str = "info,wgpu_hal=warn,eframe=warn";

pub fn setup_logging() {
    if std::env::var("RUST_LOG").is_err() {
        // Safety: single-threaded at startup
        unsafe {
            std::env::set_var("RUST_LOG", DEFAULT_FILTER);
        }
    }

    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(tracing_subscriber::EnvFilter::from_default_env());

    if tracing_subscriber::registry().with(fmt_layer).try_init().is_err() {
        tracing::warn!("Global subscriber already installed, keeping it");
    }
}

pub fn log_version_info() {
    tracing::info!(
        "{} v{} ({})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        if cfg!(debug_assertions) { "debug" } else { "release" }
    );
}
