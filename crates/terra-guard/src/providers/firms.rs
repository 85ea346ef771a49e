use super::{FireCatalog, ProviderError};
use async_trait::async_trait;

const BASE_URL: &str = "https://firms.modaps.eosdis.nasa.gov/api/area/csv";
const SENSOR: &str = "VIIRS_SNPP_NRT";
// The area API caps the range at ten days per request.
const LOOKBACK_DAYS: u32 = 10;
const SEARCH_RADIUS_DEG: f64 = 0.5;

/// Counts satellite fire detections near a point via the FIRMS area API,
/// which only speaks CSV.
#[derive(Clone)]
pub struct FirmsClient {
    http: reqwest::Client,
    base_url: String,
    map_key: Option<String>,
    lookback_days: u32,
    radius_deg: f64,
}

impl FirmsClient {
    pub fn new(http: reqwest::Client, map_key: Option<String>) -> Self {
        Self {
            http,
            base_url: BASE_URL.to_string(),
            map_key,
            lookback_days: LOOKBACK_DAYS,
            radius_deg: SEARCH_RADIUS_DEG,
        }
    }

    pub fn with_base_url(http: reqwest::Client, base_url: String, map_key: Option<String>) -> Self {
        Self {
            base_url,
            ..Self::new(http, map_key)
        }
    }
}

fn count_detections(body: &str) -> f64 {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());
    reader.records().filter(|record| record.is_ok()).count() as f64
}

#[async_trait]
impl FireCatalog for FirmsClient {
    async fn detection_count(&self, lon: f64, lat: f64) -> Result<f64, ProviderError> {
        let map_key = self
            .map_key
            .as_deref()
            .ok_or(ProviderError::NotConfigured("APP_FIRMS_MAP_KEY"))?;

        let west = lon - self.radius_deg;
        let south = lat - self.radius_deg;
        let east = lon + self.radius_deg;
        let north = lat + self.radius_deg;
        let url = format!(
            "{}/{}/{}/{west},{south},{east},{north}/{}",
            self.base_url, map_key, SENSOR, self.lookback_days
        );

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.text().await?;
        Ok(count_detections(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_csv_rows_without_the_header() {
        let body = "latitude,longitude,bright_ti4,acq_date\n\
                    25.1,-100.2,330.5,2024-05-01\n\
                    25.3,-100.4,335.0,2024-05-02\n";
        assert_eq!(count_detections(body), 2.0);
    }

    #[test]
    fn header_only_body_counts_zero() {
        assert_eq!(count_detections("latitude,longitude\n"), 0.0);
    }
}
