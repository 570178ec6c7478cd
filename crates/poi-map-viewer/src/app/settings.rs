use clap::Parser;
use poi_map_lib::{LatLng, RendererKind};

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// POI Map Viewer - Interactive map of nearby places annotated with your visit journal
pub struct Settings {
    /// Base URL of the places backend
    #[clap(long, default_value = "http://localhost:8000")]
    pub server_url: String,

    /// Account whose places and journal are shown
    #[clap(long, default_value = "test_user")]
    pub account_id: String,

    /// Latitude of the starting position
    #[clap(long, default_value = "55.751244", allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude of the starting position
    #[clap(long, default_value = "37.618423", allow_hyphen_values = true)]
    pub lon: f64,

    /// Radius in meters of the area loaded around the starting position
    #[clap(short, long, default_value = "2000")]
    pub radius: f64,

    /// Load a saved location instead of the area around the starting position
    #[clap(long)]
    pub location_id: Option<i64>,

    /// Rendering backend
    #[clap(long, value_enum, ignore_case = true, default_value = "canvas2d")]
    pub renderer: RendererKind,

    /// Distance in meters of one simulated step (arrow keys)
    #[clap(long, default_value = "5.0")]
    pub step_meters: f64,
}

impl Settings {
    pub fn from_cli() -> Self {
        match Settings::try_parse() {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }

    pub fn start_location(&self) -> LatLng {
        LatLng::new(self.lat, self.lon)
    }
}
