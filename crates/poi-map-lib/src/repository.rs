//! Map data repository: places + journal → [`MapData`]

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::dto::{JournalEntry, PlacesResponse};
use crate::journal;
use crate::model::{LatLng, MapBounds, MapData};

/// Bounds used when a location response carries no geometry at all
pub const DEFAULT_BOUNDS: MapBounds = MapBounds::new(55.7, 55.8, 37.6, 37.7);

/// Places fetched around a point
pub const PLACES_LIMIT: usize = 15_000;

/// Port for fetching places from the backend
#[async_trait]
pub trait PlacesService: Send + Sync {
    async fn get_places(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
        limit: usize,
    ) -> Result<PlacesResponse>;

    async fn get_location_places(&self, location_id: i64, account_id: &str) -> Result<PlacesResponse>;
}

/// Port for fetching the user's visit journal
#[async_trait]
pub trait JournalService: Send + Sync {
    async fn get_journal_entries(&self, account_id: &str) -> Result<Vec<JournalEntry>>;
}

pub trait SessionProvider: Send + Sync {
    fn current_account_id(&self) -> String;
}

pub struct MapDataRepository {
    places: Arc<dyn PlacesService>,
    journal: Arc<dyn JournalService>,
    session: Arc<dyn SessionProvider>,
}

impl MapDataRepository {
    pub fn new(
        places: Arc<dyn PlacesService>,
        journal: Arc<dyn JournalService>,
        session: Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            places,
            journal,
            session,
        }
    }

    /// Places within `radius_m` of `center`; bounds come from the radius, not the geometry
    pub async fn load_around_location(
        &self,
        center: LatLng,
        radius_m: f64,
        visited_ids: &HashSet<String>,
    ) -> Result<MapData> {
        let radius_km = radius_m / 1000.0;
        tracing::info!(lat = center.lat, lon = center.lon, radius_km, "Loading places around location");
        let bounds = MapBounds::from_center_and_radius(center, radius_m).checked()?;

        let response = self
            .places
            .get_places(center.lat, center.lon, radius_km, PLACES_LIMIT)
            .await?;
        tracing::debug!(count = response.count, items = response.items.len(), "Places received");

        let journal = self.load_journal().await;
        let mut data = response.into_map_data(bounds, visited_ids);
        data.pois = journal::annotate_pois(std::mem::take(&mut data.pois), &journal);
        data.user_location = Some(center);
        Ok(data)
    }

    /// Places of a saved location and its name; bounds cover every returned coordinate
    pub async fn load_for_location(
        &self,
        location_id: i64,
        visited_ids: &HashSet<String>,
    ) -> Result<(MapData, Option<String>)> {
        tracing::info!(location_id, "Loading places for saved location");

        let account_id = self.session.current_account_id();
        let response = self.places.get_location_places(location_id, &account_id).await?;
        tracing::debug!(
            location = ?response.location,
            count = response.count,
            items = response.items.len(),
            "Location places received"
        );

        let journal = self.load_journal().await;
        let bounds = match response.geometry_bounds() {
            Some(bounds) => bounds,
            None => {
                tracing::warn!(location_id, "No coordinates in response, using default bounds");
                DEFAULT_BOUNDS
            }
        };
        let name = response.location.clone();
        let mut data = response.into_map_data(bounds, visited_ids);
        data.pois = journal::annotate_pois(std::mem::take(&mut data.pois), &journal);
        tracing::info!(location = ?name, pois = data.pois.len(), "Location map loaded");
        Ok((data, name))
    }

    /// Journal map, empty on any failure
    async fn load_journal(&self) -> std::collections::HashMap<String, journal::JournalVisit> {
        let account_id = self.session.current_account_id();
        match self.journal.get_journal_entries(&account_id).await {
            Ok(entries) => {
                tracing::debug!(entries = entries.len(), "Journal loaded");
                journal::build_journal_map(&entries, chrono::Utc::now().timestamp_millis())
            }
            Err(e) => {
                tracing::error!("Failed to load journal, continuing without visits: {e}");
                Default::default()
            }
        }
    }
}
