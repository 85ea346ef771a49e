use super::{ProviderError, SeismicCatalog};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;

const BASE_URL: &str = "https://earthquake.usgs.gov/fdsnws/event/1/query";
const SEARCH_RADIUS_KM: f64 = 50.0;
const LOOKBACK_DAYS: i64 = 365;

/// Counts catalogued earthquakes near a point over the past year.
#[derive(Clone)]
pub struct UsgsEarthquakeClient {
    http: reqwest::Client,
    base_url: String,
    radius_km: f64,
    lookback_days: i64,
}

impl UsgsEarthquakeClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: BASE_URL.to_string(),
            radius_km: SEARCH_RADIUS_KM,
            lookback_days: LOOKBACK_DAYS,
        }
    }

    pub fn with_base_url(http: reqwest::Client, base_url: String) -> Self {
        Self {
            base_url,
            ..Self::new(http)
        }
    }
}

#[derive(Debug, Deserialize)]
struct EventQueryResponse {
    features: Vec<serde_json::Value>,
}

#[async_trait]
impl SeismicCatalog for UsgsEarthquakeClient {
    async fn event_count(&self, lon: f64, lat: f64) -> Result<f64, ProviderError> {
        let end = Utc::now().date_naive();
        let start = end - Duration::days(self.lookback_days);

        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("format", "geojson".to_string()),
                ("starttime", start.to_string()),
                ("endtime", end.to_string()),
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                ("maxradiuskm", self.radius_km.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let parsed: EventQueryResponse = response.json().await?;
        Ok(parsed.features.len() as f64)
    }
}
