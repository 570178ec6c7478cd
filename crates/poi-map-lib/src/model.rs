//! Map data model: coordinates, bounds, POIs and terrain geometry

use std::collections::HashMap;

use geo::{Coord, Point, Rect};

/// Meters per degree of latitude (and of longitude at the equator)
pub(crate) const METERS_PER_DEGREE: f64 = 111_000.0;

/// Smallest span in degrees (≈200 m) a visible axis may have
pub const MIN_SPAN: f64 = 0.002;

/// An immutable geographic point in degrees
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lon: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl From<LatLng> for Point<f64> {
    fn from(p: LatLng) -> Self {
        Point::new(p.lon, p.lat)
    }
}

impl From<Point<f64>> for LatLng {
    fn from(p: Point<f64>) -> Self {
        LatLng::new(p.y(), p.x())
    }
}

impl From<LatLng> for Coord<f64> {
    fn from(p: LatLng) -> Self {
        Coord { x: p.lon, y: p.lat }
    }
}

/// Latitude/longitude rectangle mapped onto the viewport
///
/// Invariant: `min_lat <= max_lat` and `min_lon <= max_lon`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MapBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl MapBounds {
    pub const fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// Square-ish box of `radius_m` around `center`, widened in longitude by latitude
    pub fn from_center_and_radius(center: LatLng, radius_m: f64) -> Self {
        let delta_lat = radius_m / METERS_PER_DEGREE;
        let delta_lon = radius_m / (METERS_PER_DEGREE * center.lat.to_radians().cos());
        Self::new(
            center.lat - delta_lat,
            center.lat + delta_lat,
            center.lon - delta_lon,
            center.lon + delta_lon,
        )
    }

    /// Box of the given ranges centred on `center`
    pub fn around(center: LatLng, lat_range: f64, lon_range: f64) -> Self {
        Self::new(
            center.lat - lat_range / 2.0,
            center.lat + lat_range / 2.0,
            center.lon - lon_range / 2.0,
            center.lon + lon_range / 2.0,
        )
    }

    pub fn lat_range(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn lon_range(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    /// Inclusive containment test
    pub fn contains(&self, p: LatLng) -> bool {
        p.lat >= self.min_lat && p.lat <= self.max_lat && p.lon >= self.min_lon && p.lon <= self.max_lon
    }

    pub fn is_finite(&self) -> bool {
        [self.min_lat, self.max_lat, self.min_lon, self.max_lon]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Widen any axis narrower than `min_span` symmetrically around the centre
    pub fn with_min_span(self, min_span: f64) -> Self {
        let center = self.center();
        let lat_range = self.lat_range().max(min_span);
        let lon_range = self.lon_range().max(min_span);
        if lat_range == self.lat_range() && lon_range == self.lon_range() {
            return self;
        }
        Self::around(center, lat_range, lon_range)
    }

    /// Finite, ordered bounds with both axes at least [`MIN_SPAN`] wide
    pub fn checked(self) -> crate::Result<Self> {
        if !self.is_finite() || self.min_lat > self.max_lat || self.min_lon > self.max_lon {
            return Err(crate::MapError::InvalidGeometry(format!("unusable bounds {self:?}")));
        }
        Ok(self.with_min_span(MIN_SPAN))
    }

    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            Coord {
                x: self.min_lon,
                y: self.min_lat,
            },
            Coord {
                x: self.max_lon,
                y: self.max_lat,
            },
        )
    }

    pub fn from_rect(rect: Rect<f64>) -> Self {
        Self::new(rect.min().y, rect.max().y, rect.min().x, rect.max().x)
    }
}

/// 32-bit ARGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Argb(pub u32);

impl Argb {
    pub const WHITE: Argb = Argb(0xFFFF_FFFF);
    pub const LIGHT_GRAY: Argb = Argb(0xFFCC_CCCC);
    pub const GRAY: Argb = Argb(0xFF88_8888);
    pub const RED: Argb = Argb(0xFFFF_0000);

    pub const fn from_rgb(rgb: u32) -> Self {
        Argb(0xFF00_0000 | (rgb & 0x00FF_FFFF))
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    pub const fn with_alpha(self, alpha: u8) -> Self {
        Argb((self.0 & 0x00FF_FFFF) | ((alpha as u32) << 24))
    }

    fn map_channels(self, f: impl Fn(u8) -> u8) -> Self {
        let (r, g, b) = (f(self.red()), f(self.green()), f(self.blue()));
        Argb(((self.alpha() as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Scale every channel towards black by `factor` (0..=1)
    pub fn darken(self, factor: f32) -> Self {
        self.map_channels(|c| (c as f32 * (1.0 - factor)).clamp(0.0, 255.0) as u8)
    }

    /// Move every channel towards white by `factor` (0..=1)
    pub fn lighten(self, factor: f32) -> Self {
        self.map_channels(|c| (c as f32 + (255.0 - c as f32) * factor).clamp(0.0, 255.0) as u8)
    }
}

/// OSM place categories the map knows how to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PoiType {
    Cafe,
    Restaurant,
    FastFood,
    Bar,
    Pub,
    Park,
    Garden,
    Museum,
    Gallery,
    Cinema,
    Theatre,
    Shop,
    Supermarket,
    Hotel,
    Pharmacy,
    Hospital,
    School,
    University,
    Library,
    Bank,
    Atm,
    Gym,
    FitnessCentre,
    Other,
}

impl PoiType {
    pub const ALL: [PoiType; 24] = [
        PoiType::Cafe,
        PoiType::Restaurant,
        PoiType::FastFood,
        PoiType::Bar,
        PoiType::Pub,
        PoiType::Park,
        PoiType::Garden,
        PoiType::Museum,
        PoiType::Gallery,
        PoiType::Cinema,
        PoiType::Theatre,
        PoiType::Shop,
        PoiType::Supermarket,
        PoiType::Hotel,
        PoiType::Pharmacy,
        PoiType::Hospital,
        PoiType::School,
        PoiType::University,
        PoiType::Library,
        PoiType::Bank,
        PoiType::Atm,
        PoiType::Gym,
        PoiType::FitnessCentre,
        PoiType::Other,
    ];

    pub fn osm_tag(self) -> &'static str {
        match self {
            PoiType::Cafe => "cafe",
            PoiType::Restaurant => "restaurant",
            PoiType::FastFood => "fast_food",
            PoiType::Bar => "bar",
            PoiType::Pub => "pub",
            PoiType::Park => "park",
            PoiType::Garden => "garden",
            PoiType::Museum => "museum",
            PoiType::Gallery => "gallery",
            PoiType::Cinema => "cinema",
            PoiType::Theatre => "theatre",
            PoiType::Shop => "shop",
            PoiType::Supermarket => "supermarket",
            PoiType::Hotel => "hotel",
            PoiType::Pharmacy => "pharmacy",
            PoiType::Hospital => "hospital",
            PoiType::School => "school",
            PoiType::University => "university",
            PoiType::Library => "library",
            PoiType::Bank => "bank",
            PoiType::Atm => "atm",
            PoiType::Gym => "gym",
            PoiType::FitnessCentre => "fitness_centre",
            PoiType::Other => "other",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            PoiType::Cafe => "☕",
            PoiType::Restaurant => "🍽️",
            PoiType::FastFood => "🍔",
            PoiType::Bar | PoiType::Pub => "🍺",
            PoiType::Park | PoiType::Garden => "🌳",
            PoiType::Museum | PoiType::Gallery => "🖼️",
            PoiType::Cinema | PoiType::Theatre => "🎭",
            PoiType::Shop => "🛍️",
            PoiType::Supermarket => "🛒",
            PoiType::Hotel => "🏨",
            PoiType::Pharmacy => "💊",
            PoiType::Hospital => "🏥",
            PoiType::School | PoiType::University => "🎓",
            PoiType::Library => "📚",
            PoiType::Bank | PoiType::Atm => "🏦",
            PoiType::Gym | PoiType::FitnessCentre => "💪",
            PoiType::Other => "📍",
        }
    }

    pub fn from_osm_tag(tag: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.osm_tag() == tag)
            .unwrap_or(PoiType::Other)
    }

    /// Classify from the first present of amenity, shop, leisure, tourism
    pub fn from_osm_tags(
        amenity: Option<&str>,
        shop: Option<&str>,
        leisure: Option<&str>,
        tourism: Option<&str>,
    ) -> Self {
        amenity
            .or(shop)
            .or(leisure)
            .or(tourism)
            .map(Self::from_osm_tag)
            .unwrap_or(PoiType::Other)
    }
}

/// A named, typed, geolocated point of interest
#[derive(Debug, Clone, PartialEq)]
pub struct Poi {
    pub id: String,
    pub name: String,
    pub poi_type: PoiType,
    pub location: LatLng,
    /// Derived by journal matching on every load
    pub is_visited: bool,
    /// Emotion name of the most recent matching journal entry
    pub impression: Option<String>,
    /// Epoch milliseconds of the visit (local midnight)
    pub visit_date: Option<i64>,
    pub element_type: String,
    pub tags: HashMap<String, String>,
}

impl Poi {
    pub fn new(id: impl Into<String>, name: impl Into<String>, poi_type: PoiType, location: LatLng) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            poi_type,
            location,
            is_visited: false,
            impression: None,
            visit_date: None,
            element_type: "node".to_string(),
            tags: HashMap::new(),
        }
    }
}

/// Terrain layers, drawn in ascending z-order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BackgroundLayer {
    Water,
    Greenery,
    Roads,
    Buildings,
}

impl BackgroundLayer {
    pub const ORDERED: [BackgroundLayer; 4] = [
        BackgroundLayer::Water,
        BackgroundLayer::Greenery,
        BackgroundLayer::Roads,
        BackgroundLayer::Buildings,
    ];

    pub fn z_index(self) -> u8 {
        match self {
            BackgroundLayer::Water => 0,
            BackgroundLayer::Greenery => 1,
            BackgroundLayer::Roads => 2,
            BackgroundLayer::Buildings => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundGeometry {
    Polyline(Vec<LatLng>),
    /// One or more rings
    Polygon(Vec<Vec<LatLng>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundElement {
    pub id: String,
    pub layer: BackgroundLayer,
    pub color: Argb,
    pub geometry: BackgroundGeometry,
}

/// Everything drawn on the map, replaced wholesale on every load
#[derive(Debug, Clone, PartialEq)]
pub struct MapData {
    pub pois: Vec<Poi>,
    pub background_elements: Vec<BackgroundElement>,
    pub bounds: MapBounds,
    pub user_location: Option<LatLng>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_from_center_and_radius() {
        let b = MapBounds::from_center_and_radius(LatLng::new(60.0, 30.0), 500.0);
        assert!((b.lat_range() - 1000.0 / 111_000.0).abs() < 1e-12);
        // cos(60°) = 0.5 doubles the longitude span
        assert!((b.lon_range() - 2000.0 / 111_000.0).abs() < 1e-9);
        let c = b.center();
        assert!((c.lat - 60.0).abs() < 1e-12);
        assert!((c.lon - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_bounds_contains_is_inclusive() {
        let b = MapBounds::new(0.0, 1.0, 0.0, 1.0);
        assert!(b.contains(LatLng::new(0.0, 0.0)));
        assert!(b.contains(LatLng::new(1.0, 1.0)));
        assert!(!b.contains(LatLng::new(1.0001, 0.5)));
    }

    #[test]
    fn test_bounds_rect_conversion() {
        let b = MapBounds::new(55.7, 55.8, 37.6, 37.7);
        assert_eq!(MapBounds::from_rect(b.to_rect()), b);
    }

    #[test]
    fn test_argb_darken_lighten() {
        let c = Argb(0xFF64_C8FF);
        assert_eq!(c.darken(0.5), Argb(0xFF32_647F));
        assert_eq!(c.lighten(1.0), Argb::WHITE);
        assert_eq!(c.with_alpha(0x40).alpha(), 0x40);
        assert_eq!(c.darken(0.1).alpha(), 0xFF);
    }

    #[test]
    fn test_argb_shade_truncates() {
        // 0x65 * 0.95 = 95.95 and 0x65 + 154 * 0.05 = 108.7
        let c = Argb(0xFF65_6565);
        assert_eq!(c.darken(0.05), Argb(0xFF5F_5F5F));
        assert_eq!(c.lighten(0.05), Argb(0xFF6C_6C6C));
    }

    #[test]
    fn test_min_span_widens_around_center() {
        let point = MapBounds::new(60.0, 60.0, 30.0, 30.0);
        let widened = point.with_min_span(MIN_SPAN);
        assert!((widened.lat_range() - MIN_SPAN).abs() < 1e-12);
        assert!((widened.lon_range() - MIN_SPAN).abs() < 1e-12);
        assert_eq!(widened.center(), LatLng::new(60.0, 30.0));

        // One flat axis only
        let flat = MapBounds::new(60.0, 60.0, 29.5, 30.5).with_min_span(MIN_SPAN);
        assert!((flat.lat_range() - MIN_SPAN).abs() < 1e-12);
        assert_eq!((flat.min_lon, flat.max_lon), (29.5, 30.5));

        let wide = MapBounds::new(55.7, 55.8, 37.6, 37.7);
        assert_eq!(wide.with_min_span(MIN_SPAN), wide);
    }

    #[test]
    fn test_checked_rejects_unusable_bounds() {
        assert!(matches!(
            MapBounds::new(f64::NAN, 1.0, 0.0, 1.0).checked(),
            Err(crate::MapError::InvalidGeometry(_))
        ));
        assert!(MapBounds::new(1.0, 0.0, 0.0, 1.0).checked().is_err());
        let ok = MapBounds::new(60.0, 60.0, 30.0, 30.0).checked().expect("widened");
        assert!(ok.lat_range() > 0.0 && ok.lon_range() > 0.0);
    }

    #[test]
    fn test_poi_type_from_tags() {
        assert_eq!(PoiType::from_osm_tags(Some("cafe"), Some("supermarket"), None, None), PoiType::Cafe);
        assert_eq!(PoiType::from_osm_tags(None, Some("supermarket"), None, None), PoiType::Supermarket);
        assert_eq!(PoiType::from_osm_tags(None, None, Some("park"), None), PoiType::Park);
        assert_eq!(PoiType::from_osm_tags(None, None, None, Some("hotel")), PoiType::Hotel);
        assert_eq!(PoiType::from_osm_tags(Some("bench"), None, None, None), PoiType::Other);
        assert_eq!(PoiType::from_osm_tags(None, None, None, None), PoiType::Other);
    }

    #[test]
    fn test_poi_type_tags_are_unique() {
        for t in PoiType::ALL {
            assert_eq!(PoiType::from_osm_tag(t.osm_tag()), t);
        }
    }

    #[test]
    fn test_layer_order() {
        let z: Vec<u8> = BackgroundLayer::ORDERED.iter().map(|l| l.z_index()).collect();
        assert_eq!(z, vec![0, 1, 2, 3]);
    }
}
