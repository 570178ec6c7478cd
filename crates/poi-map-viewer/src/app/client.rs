//! HTTP client for the places backend and the visit journal

use async_trait::async_trait;
use poi_map_lib::dto::{JournalEntry, PlacesResponse};
use poi_map_lib::{JournalService, MapError, PlacesService, SessionProvider};
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<ClientError> for MapError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Request(e) => MapError::Http(e.to_string()),
            ClientError::Status { status, body } => MapError::Service { status, message: body },
            ClientError::Decode(e) => MapError::Decode(e.to_string()),
        }
    }
}

/// Places, journal and session backed by one REST server
pub struct HttpPlacesClient {
    http: reqwest::Client,
    base_url: String,
    account_id: String,
}

impl HttpPlacesClient {
    pub fn new(base_url: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            account_id: account_id.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ClientError> {
        let url = self.endpoint(path);
        tracing::debug!(%url, "GET");
        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "Request rejected");
        }
        decode_body(status, body)
    }
}

/// JSON body of a successful response, or the status and body of a rejected one
fn decode_body<T: DeserializeOwned>(status: reqwest::StatusCode, body: String) -> Result<T, ClientError> {
    if !status.is_success() {
        return Err(ClientError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl PlacesService for HttpPlacesClient {
    async fn get_places(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
        limit: usize,
    ) -> poi_map_lib::Result<PlacesResponse> {
        let query = [
            ("account_id", self.account_id.clone()),
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("radius_km", radius_km.to_string()),
            ("limit", limit.to_string()),
            ("offset", "0".to_string()),
        ];
        Ok(self.get_json("places", &query).await?)
    }

    async fn get_location_places(&self, location_id: i64, account_id: &str) -> poi_map_lib::Result<PlacesResponse> {
        let path = format!("places/locations/{location_id}/places");
        Ok(self.get_json(&path, &[("account_id", account_id.to_string())]).await?)
    }
}

#[async_trait]
impl JournalService for HttpPlacesClient {
    async fn get_journal_entries(&self, account_id: &str) -> poi_map_lib::Result<Vec<JournalEntry>> {
        Ok(self
            .get_json("api/journal/", &[("account_id", account_id.to_string())])
            .await?)
    }
}

impl SessionProvider for HttpPlacesClient {
    fn current_account_id(&self) -> String {
        self.account_id.clone()
    }
}
