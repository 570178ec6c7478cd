//! Places/journal payloads and their conversion into [`MapData`]
//!
//! Coordinates on the wire are `[lon, lat]` pairs.

use std::collections::{HashMap, HashSet};

use geo::{BoundingRect, MultiPoint, Point};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::model::{
    Argb, BackgroundElement, BackgroundGeometry, BackgroundLayer, LatLng, MIN_SPAN, MapBounds,
    MapData, Poi, PoiType,
};

/// Desaturated terrain palette
pub mod palette {
    use crate::model::Argb;

    pub const WATER: Argb = Argb::from_rgb(0xD8E8F0);
    pub const PARK: Argb = Argb::from_rgb(0xE3EBE0);
    pub const FOREST: Argb = Argb::from_rgb(0xD5E0D0);
    pub const MEADOW: Argb = Argb::from_rgb(0xEBEDE0);
    pub const ROAD: Argb = Argb::from_rgb(0xF0F0F0);
    pub const BUILDING: Argb = Argb::from_rgb(0xEAEAEA);
    pub const BRIDGE: Argb = Argb::from_rgb(0xE0E5E8);
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacesResponse {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub items: Vec<PlaceElement>,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceElement {
    pub id: i64,
    /// `node`, `way` or `relation`
    #[serde(rename = "type")]
    pub element_type: String,
    #[serde(default)]
    pub point: Option<[f64; 2]>,
    #[serde(default)]
    pub points: Option<Vec<[f64; 2]>>,
    #[serde(default)]
    pub rings: Option<Vec<Vec<[f64; 2]>>>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub amenity: Option<String>,
    #[serde(default)]
    pub shop: Option<String>,
    #[serde(default)]
    pub leisure: Option<String>,
    #[serde(default)]
    pub tourism: Option<String>,
    #[serde(default)]
    pub landuse: Option<String>,
    #[serde(default)]
    pub natural: Option<String>,
    #[serde(default)]
    pub waterway: Option<String>,
    #[serde(default)]
    pub highway: Option<String>,
    #[serde(default)]
    pub building: Option<String>,
    #[serde(default)]
    pub bridge: Option<String>,
    #[serde(default)]
    pub tags: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    #[serde(default)]
    pub id: Option<i64>,
    /// `YYYY-MM-DD`
    pub date: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub photo_path: Option<String>,
    #[serde(default)]
    pub poi_name: Option<String>,
    #[serde(default)]
    pub session_id: Option<i64>,
}

fn to_lat_lng(pair: &[f64; 2]) -> LatLng {
    LatLng::new(pair[1], pair[0])
}

impl PlaceElement {
    /// Flattened OSM tags; the free-form `tags` map wins over the unpacked fields
    pub fn tags_map(&self) -> HashMap<String, String> {
        let mut tags = HashMap::new();
        let fields = [
            ("amenity", &self.amenity),
            ("name", &self.name),
            ("shop", &self.shop),
            ("leisure", &self.leisure),
            ("tourism", &self.tourism),
            ("landuse", &self.landuse),
            ("natural", &self.natural),
            ("waterway", &self.waterway),
            ("highway", &self.highway),
            ("building", &self.building),
            ("bridge", &self.bridge),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                tags.insert(key.to_string(), value.clone());
            }
        }
        if let Some(extra) = &self.tags {
            tags.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        tags
    }

    fn is_poi_candidate(&self) -> bool {
        self.element_type == "node"
            && self.point.is_some()
            && (self.amenity.is_some() || self.shop.is_some() || self.leisure.is_some() || self.tourism.is_some())
    }

    /// POI for a tagged node, `None` for anything else
    pub fn to_poi(&self, visited_ids: &HashSet<String>) -> Option<Poi> {
        if !self.is_poi_candidate() {
            return None;
        }
        let location = to_lat_lng(self.point.as_ref()?);
        let tags = self.tags_map();
        let id = self.id.to_string();
        let name = tags
            .get("name")
            .or_else(|| tags.get("amenity"))
            .cloned()
            .unwrap_or_else(|| "Unknown".to_string());
        let poi_type = PoiType::from_osm_tags(
            tags.get("amenity").map(String::as_str),
            tags.get("shop").map(String::as_str),
            tags.get("leisure").map(String::as_str),
            tags.get("tourism").map(String::as_str),
        );

        Some(Poi {
            is_visited: visited_ids.contains(&id),
            id,
            name,
            poi_type,
            location,
            impression: None,
            visit_date: None,
            element_type: self.element_type.clone(),
            tags,
        })
    }

    /// Terrain layer and colour from tags, `None` if the element is not terrain
    pub fn classify_terrain(&self) -> Option<(BackgroundLayer, Argb)> {
        let tags = self.tags_map();
        let tag = |key: &str| tags.get(key).map(String::as_str);

        let class = match () {
            _ if tag("natural") == Some("water") || tag("waterway") == Some("riverbank") => {
                (BackgroundLayer::Water, palette::WATER)
            }
            _ if matches!(tag("leisure"), Some("park" | "garden")) => (BackgroundLayer::Greenery, palette::PARK),
            _ if tag("landuse") == Some("forest") => (BackgroundLayer::Greenery, palette::FOREST),
            _ if matches!(tag("landuse"), Some("meadow" | "grass")) => (BackgroundLayer::Greenery, palette::MEADOW),
            _ if matches!(tag("highway"), Some("motorway" | "trunk" | "primary" | "secondary")) => {
                (BackgroundLayer::Roads, palette::ROAD)
            }
            _ if tag("bridge") == Some("yes") => (BackgroundLayer::Roads, palette::BRIDGE),
            _ if tag("building").is_some() => (BackgroundLayer::Buildings, palette::BUILDING),
            _ => return None,
        };
        Some(class)
    }

    /// Closed ways become polygons, open ways polylines, relations polygons from rings
    pub fn terrain_geometry(&self) -> Option<BackgroundGeometry> {
        match self.element_type.as_str() {
            "way" => {
                let points: Vec<LatLng> = self.points.as_ref()?.iter().map(to_lat_lng).collect();
                if points.is_empty() {
                    return None;
                }
                let closed = points.len() > 2 && points.first() == points.last();
                Some(if closed {
                    BackgroundGeometry::Polygon(vec![points])
                } else {
                    BackgroundGeometry::Polyline(points)
                })
            }
            "relation" => {
                let rings = self.rings.as_ref()?;
                if rings.is_empty() {
                    return None;
                }
                Some(BackgroundGeometry::Polygon(
                    rings.iter().map(|ring| ring.iter().map(to_lat_lng).collect()).collect(),
                ))
            }
            _ => None,
        }
    }

    pub fn to_background(&self) -> Option<BackgroundElement> {
        if self.element_type != "way" && self.element_type != "relation" {
            return None;
        }
        let (layer, color) = self.classify_terrain()?;
        let Some(geometry) = self.terrain_geometry() else {
            tracing::warn!(id = self.id, kind = %self.element_type, "Terrain element without usable geometry");
            return None;
        };
        Some(BackgroundElement {
            id: self.id.to_string(),
            layer,
            color,
            geometry,
        })
    }

    fn coordinates(&self) -> impl Iterator<Item = &[f64; 2]> {
        self.point
            .iter()
            .chain(self.points.iter().flatten())
            .chain(self.rings.iter().flatten().flatten())
    }
}

impl PlacesResponse {
    /// Convert into map data for the given bounds
    pub fn into_map_data(self, bounds: MapBounds, visited_ids: &HashSet<String>) -> MapData {
        profiling::scope!("PlacesResponse::into_map_data");
        let pois: Vec<Poi> = self.items.par_iter().filter_map(|e| e.to_poi(visited_ids)).collect();
        let background_elements: Vec<BackgroundElement> =
            self.items.par_iter().filter_map(PlaceElement::to_background).collect();

        let terrain_candidates = self
            .items
            .iter()
            .filter(|e| e.element_type == "way" || e.element_type == "relation")
            .count();
        tracing::debug!(
            items = self.items.len(),
            pois = pois.len(),
            terrain = background_elements.len(),
            terrain_candidates,
            "Converted places response"
        );
        if terrain_candidates > 0 && background_elements.is_empty() {
            tracing::warn!("Ways/relations present but none classified as terrain");
        }

        MapData {
            pois,
            background_elements,
            bounds,
            user_location: None,
        }
    }

    /// Min/max over every coordinate of every point, polyline and ring
    ///
    /// A flat axis (one node, or nodes on one parallel) is widened to [`MIN_SPAN`].
    pub fn geometry_bounds(&self) -> Option<MapBounds> {
        let points: MultiPoint<f64> = self
            .items
            .iter()
            .flat_map(|e| e.coordinates())
            .map(|c| Point::new(c[0], c[1]))
            .collect();
        points
            .bounding_rect()
            .map(|rect| MapBounds::from_rect(rect).with_min_span(MIN_SPAN))
    }
}
