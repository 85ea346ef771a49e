use super::{GeoSampler, ProviderError};
use crate::risk::RawValue;
use async_trait::async_trait;
use serde_json::json;

const BASE_URL: &str = "https://earthengine.googleapis.com";
const FLOOD_ASSET: &str = "JRC/CEMS_GLOFAS/FloodHazard/v2_1";
const NDVI_ASSET: &str = "MODIS/006/MOD13A2";
const ELEVATION_ASSET: &str = "USGS/SRTMGL1_003";
const SAMPLE_SCALE_M: u32 = 30;

/// Point-samples Earth Engine raster assets: flood hazard depth categories,
/// the MODIS vegetation index, and SRTM elevation.
#[derive(Clone)]
pub struct EarthEngineClient {
    http: reqwest::Client,
    base_url: String,
    project: String,
    token: Option<String>,
}

impl EarthEngineClient {
    pub fn new(http: reqwest::Client, project: String, token: Option<String>) -> Self {
        Self {
            http,
            base_url: BASE_URL.to_string(),
            project,
            token,
        }
    }

    pub fn with_base_url(
        http: reqwest::Client,
        base_url: String,
        project: String,
        token: Option<String>,
    ) -> Self {
        Self {
            base_url,
            ..Self::new(http, project, token)
        }
    }

    /// Evaluates a point-sample expression server-side and returns the raw
    /// result payload.
    async fn sample(&self, expression: serde_json::Value) -> Result<RawValue, ProviderError> {
        let token = self
            .token
            .as_deref()
            .ok_or(ProviderError::NotConfigured("APP_EE_TOKEN"))?;

        let url = format!("{}/v1/projects/{}/value:compute", self.base_url, self.project);
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&json!({ "expression": expression }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body: serde_json::Value = response.json().await?;
        let result = body
            .get("result")
            .ok_or_else(|| ProviderError::InvalidResponse("missing result field".to_string()))?;
        Ok(RawValue::from(result))
    }
}

fn point_sample(
    asset: &str,
    bands: &[&str],
    lon: f64,
    lat: f64,
    year: Option<i32>,
) -> serde_json::Value {
    json!({
        "sample": {
            "asset": asset,
            "bands": bands,
            "point": { "longitude": lon, "latitude": lat },
            "scale": SAMPLE_SCALE_M,
            "year": year,
        }
    })
}

#[async_trait]
impl GeoSampler for EarthEngineClient {
    async fn flood_hazard(&self, lon: f64, lat: f64) -> Result<RawValue, ProviderError> {
        // All return-period bands come back as one keyed record; scoring
        // reads the first category in document order.
        self.sample(point_sample(
            FLOOD_ASSET,
            &[
                "RP10_depth_category",
                "RP50_depth_category",
                "RP100_depth_category",
            ],
            lon,
            lat,
            None,
        ))
        .await
    }

    async fn vegetation_index(&self, lon: f64, lat: f64) -> Result<RawValue, ProviderError> {
        self.sample(point_sample(NDVI_ASSET, &["NDVI"], lon, lat, None))
            .await
    }

    async fn vegetation_index_for_year(
        &self,
        lon: f64,
        lat: f64,
        year: i32,
    ) -> Result<RawValue, ProviderError> {
        self.sample(point_sample(NDVI_ASSET, &["NDVI"], lon, lat, Some(year)))
            .await
    }

    async fn elevation(&self, lon: f64, lat: f64) -> Result<RawValue, ProviderError> {
        self.sample(point_sample(ELEVATION_ASSET, &["elevation"], lon, lat, None))
            .await
    }
}
