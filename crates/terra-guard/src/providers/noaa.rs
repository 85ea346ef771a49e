use super::{HurricaneCatalog, ProviderError};
use async_trait::async_trait;
use chrono::{Datelike, Utc};

const BASE_URL: &str = "https://www.ncei.noaa.gov/access/services/data/v1";
const LOOKBACK_YEARS: i32 = 5;
const SEARCH_RADIUS_DEG: f64 = 1.0;

/// Counts NOAA storm events recorded near a point over the past years.
#[derive(Clone)]
pub struct StormEventsClient {
    http: reqwest::Client,
    base_url: String,
    lookback_years: i32,
    radius_deg: f64,
}

impl StormEventsClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: BASE_URL.to_string(),
            lookback_years: LOOKBACK_YEARS,
            radius_deg: SEARCH_RADIUS_DEG,
        }
    }

    pub fn with_base_url(http: reqwest::Client, base_url: String) -> Self {
        Self {
            base_url,
            ..Self::new(http)
        }
    }
}

#[async_trait]
impl HurricaneCatalog for StormEventsClient {
    async fn storm_count(&self, lon: f64, lat: f64) -> Result<f64, ProviderError> {
        let end = Utc::now().date_naive();
        let start = end
            .with_year(end.year() - self.lookback_years)
            .unwrap_or(end);

        // North, west, south, east corners around the point.
        let bounding_box = format!(
            "{},{},{},{}",
            lat + self.radius_deg,
            lon - self.radius_deg,
            lat - self.radius_deg,
            lon + self.radius_deg
        );

        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("dataset", "stormevents".to_string()),
                ("dataTypes", "all".to_string()),
                ("format", "json".to_string()),
                ("startDate", start.to_string()),
                ("endDate", end.to_string()),
                ("boundingBox", bounding_box),
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

        let events: Vec<serde_json::Value> = response.json().await?;
        Ok(events.len() as f64)
    }
}
