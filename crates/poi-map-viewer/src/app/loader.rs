//! Background map loading: repository calls run on tokio, results come back over a channel

use std::collections::HashSet;
use std::sync::Arc;

use poi_map_lib::{LatLng, MapData, MapDataRepository};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadRequest {
    Around { center: LatLng, radius_m: f64 },
    Location(i64),
}

#[derive(Debug)]
pub enum LoadEvent {
    Loaded {
        data: MapData,
        location_name: Option<String>,
    },
    Failed(String),
}

pub struct MapLoader {
    repository: Arc<MapDataRepository>,
    runtime: Option<Handle>,
    tx: mpsc::UnboundedSender<LoadEvent>,
    rx: mpsc::UnboundedReceiver<LoadEvent>,
    in_flight: usize,
}

impl MapLoader {
    /// Uses the tokio runtime of the calling thread, if there is one
    pub fn new(repository: Arc<MapDataRepository>) -> Self {
        let runtime = Handle::try_current().ok();
        if runtime.is_none() {
            tracing::error!("No tokio runtime on this thread, map data cannot be loaded");
        }
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            repository,
            runtime,
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Start loading; `notify` is called once the result is ready to [`poll`](Self::poll)
    pub fn request(&mut self, request: LoadRequest, notify: impl Fn() + Send + 'static) {
        let Some(runtime) = &self.runtime else {
            let _ = self.tx.send(LoadEvent::Failed("no async runtime available".into()));
            self.in_flight += 1;
            notify();
            return;
        };

        tracing::info!(?request, "Loading map data");
        self.in_flight += 1;
        let repository = self.repository.clone();
        let tx = self.tx.clone();
        runtime.spawn(async move {
            // Visited ids are not persisted by this host; visits come from the journal
            let visited = HashSet::new();
            let event = match request {
                LoadRequest::Around { center, radius_m } => repository
                    .load_around_location(center, radius_m, &visited)
                    .await
                    .map(|data| LoadEvent::Loaded {
                        data,
                        location_name: None,
                    }),
                LoadRequest::Location(id) => repository
                    .load_for_location(id, &visited)
                    .await
                    .map(|(data, location_name)| LoadEvent::Loaded { data, location_name }),
            }
            .unwrap_or_else(|e| {
                tracing::error!("Failed to load map data: {e}");
                LoadEvent::Failed(e.to_string())
            });

            if tx.send(event).is_err() {
                tracing::debug!("Viewer closed before map data arrived");
            }
            notify();
        });
    }

    /// Next finished load, without blocking
    pub fn poll(&mut self) -> Option<LoadEvent> {
        let event = self.rx.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(event)
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use poi_map_lib::dto::{JournalEntry, PlaceElement, PlacesResponse};
    use poi_map_lib::{JournalService, MapError, PlacesService, SessionProvider};

    struct OnePark;

    #[async_trait]
    impl PlacesService for OnePark {
        async fn get_places(&self, lat: f64, lon: f64, _: f64, _: usize) -> poi_map_lib::Result<PlacesResponse> {
            Ok(PlacesResponse {
                items: vec![PlaceElement {
                    id: 1,
                    element_type: "node".into(),
                    point: Some([lon, lat]),
                    name: Some("Park".into()),
                    leisure: Some("park".into()),
                    ..Default::default()
                }],
                count: 1,
                ..Default::default()
            })
        }

        async fn get_location_places(&self, location_id: i64, _: &str) -> poi_map_lib::Result<PlacesResponse> {
            Err(MapError::Service {
                status: 404,
                message: format!("location {location_id} not found"),
            })
        }
    }

    struct NoJournal;

    #[async_trait]
    impl JournalService for NoJournal {
        async fn get_journal_entries(&self, _: &str) -> poi_map_lib::Result<Vec<JournalEntry>> {
            Ok(vec![])
        }
    }

    struct Me;

    impl SessionProvider for Me {
        fn current_account_id(&self) -> String {
            "me".into()
        }
    }

    fn loader() -> MapLoader {
        MapLoader::new(Arc::new(MapDataRepository::new(
            Arc::new(OnePark),
            Arc::new(NoJournal),
            Arc::new(Me),
        )))
    }

    #[tokio::test]
    async fn test_load_around_arrives_on_channel() {
        let mut loader = loader();
        let center = LatLng::new(60.0, 30.0);
        loader.request(
            LoadRequest::Around {
                center,
                radius_m: 500.0,
            },
            || {},
        );
        assert!(loader.is_loading());

        let event = loader.rx.recv().await.expect("event");
        match event {
            LoadEvent::Loaded { data, location_name } => {
                assert_eq!(data.pois.len(), 1);
                assert_eq!(data.user_location, Some(center));
                assert!(location_name.is_none());
            }
            LoadEvent::Failed(e) => panic!("unexpected failure: {e}"),
        }
    }

    #[tokio::test]
    async fn test_failure_is_reported() {
        let mut loader = loader();
        loader.request(LoadRequest::Location(3), || {});
        let event = loader.rx.recv().await.expect("event");
        assert!(matches!(event, LoadEvent::Failed(ref message) if message.contains("404")));
    }

    #[test]
    fn test_without_runtime_fails_immediately() {
        let mut loader = loader();
        loader.request(LoadRequest::Location(1), || {});
        assert!(matches!(loader.poll(), Some(LoadEvent::Failed(_))));
        assert!(!loader.is_loading());
    }
}
