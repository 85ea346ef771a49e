mod collector;
mod earth_engine;
mod firms;
mod noaa;
mod open_meteo;
mod usgs;

pub use collector::{FactorCollector, ProviderSet};
pub use earth_engine::EarthEngineClient;
pub use firms::FirmsClient;
pub use noaa::StormEventsClient;
pub use open_meteo::OpenMeteoClient;
pub use usgs::UsgsEarthquakeClient;

use crate::risk::RawValue;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider API error: status={status}, body={body}")]
    Api { status: u16, body: String },

    #[error("provider returned invalid response: {0}")]
    InvalidResponse(String),

    #[error("provider not configured: {0}")]
    NotConfigured(&'static str),
}

/// One averaged weather observation window for a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub precipitation: f64,
}

/// Geospatial raster sampling (flood hazard, vegetation index, elevation).
#[async_trait]
pub trait GeoSampler: Send + Sync {
    async fn flood_hazard(&self, lon: f64, lat: f64) -> Result<RawValue, ProviderError>;

    async fn vegetation_index(&self, lon: f64, lat: f64) -> Result<RawValue, ProviderError>;

    /// Vegetation index for a specific target year instead of the latest
    /// observation.
    async fn vegetation_index_for_year(
        &self,
        lon: f64,
        lat: f64,
        year: i32,
    ) -> Result<RawValue, ProviderError>;

    async fn elevation(&self, lon: f64, lat: f64) -> Result<RawValue, ProviderError>;
}

/// Current and projected weather for a point.
#[async_trait]
pub trait WeatherService: Send + Sync {
    async fn current(&self, lon: f64, lat: f64) -> Result<WeatherSample, ProviderError>;

    async fn projected(
        &self,
        lon: f64,
        lat: f64,
        year: i32,
    ) -> Result<WeatherSample, ProviderError>;
}

/// Earthquake occurrences near a point over the catalog lookback window.
#[async_trait]
pub trait SeismicCatalog: Send + Sync {
    async fn event_count(&self, lon: f64, lat: f64) -> Result<f64, ProviderError>;
}

/// Storm and hurricane occurrences near a point.
#[async_trait]
pub trait HurricaneCatalog: Send + Sync {
    async fn storm_count(&self, lon: f64, lat: f64) -> Result<f64, ProviderError>;
}

/// Satellite fire detections near a point.
#[async_trait]
pub trait FireCatalog: Send + Sync {
    async fn detection_count(&self, lon: f64, lat: f64) -> Result<f64, ProviderError>;
}
