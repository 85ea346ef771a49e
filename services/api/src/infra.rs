use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use terra_guard::advisory::{GeminiExplainer, RiskExplainer, TemplateExplainer};
use terra_guard::config::ProvidersConfig;
use terra_guard::providers::{
    EarthEngineClient, FactorCollector, FireCatalog, FirmsClient, GeoSampler, HurricaneCatalog,
    OpenMeteoClient, ProviderError, ProviderSet, SeismicCatalog, StormEventsClient,
    UsgsEarthquakeClient, WeatherSample, WeatherService,
};
use terra_guard::risk::{RawValue, RiskEngine};
use terra_guard::underwriting::PayoutPolicy;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) collector: Arc<FactorCollector>,
    pub(crate) engine: Arc<RiskEngine>,
    pub(crate) explainer: Arc<dyn RiskExplainer>,
    pub(crate) payouts: PayoutPolicy,
}

pub(crate) fn http_client(config: &ProvidersConfig) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(config.call_timeout())
        .build()
        .map_err(ProviderError::Http)
}

pub(crate) fn live_provider_set(http: reqwest::Client, config: &ProvidersConfig) -> ProviderSet {
    ProviderSet {
        geo: Arc::new(EarthEngineClient::new(
            http.clone(),
            config.earth_engine_project.clone(),
            config.earth_engine_token.clone(),
        )),
        weather: Arc::new(OpenMeteoClient::new(http.clone())),
        seismic: Arc::new(UsgsEarthquakeClient::new(http.clone())),
        hurricanes: Arc::new(StormEventsClient::new(http.clone())),
        fires: Arc::new(FirmsClient::new(http, config.firms_map_key.clone())),
    }
}

pub(crate) fn explainer_from(
    http: reqwest::Client,
    config: &ProvidersConfig,
) -> Arc<dyn RiskExplainer> {
    match &config.gemini_api_key {
        Some(key) => Arc::new(GeminiExplainer::new(http, key.clone())),
        None => Arc::new(TemplateExplainer),
    }
}

/// Fixed hazard readings serving as every provider at once. Keeps demos and
/// endpoint tests off the network.
#[derive(Debug, Clone)]
pub(crate) struct StaticHazardData {
    pub(crate) flood_category: f64,
    pub(crate) vegetation_index: f64,
    pub(crate) elevation_m: f64,
    pub(crate) weather: WeatherSample,
    pub(crate) earthquakes: f64,
    pub(crate) storms: f64,
    pub(crate) fires: f64,
}

impl StaticHazardData {
    /// Readings resembling a rainy-season fetch for Monterrey, MX.
    pub(crate) fn monterrey() -> Self {
        Self {
            flood_category: 2.0,
            vegetation_index: 6200.0,
            elevation_m: 540.0,
            weather: WeatherSample {
                temperature: 28.0,
                humidity: 45.0,
                wind_speed: 18.0,
                precipitation: 120.0,
            },
            earthquakes: 12.0,
            storms: 6.0,
            fires: 3.0,
        }
    }

    pub(crate) fn provider_set(self) -> ProviderSet {
        let shared = Arc::new(self);
        ProviderSet {
            geo: shared.clone(),
            weather: shared.clone(),
            seismic: shared.clone(),
            hurricanes: shared.clone(),
            fires: shared,
        }
    }
}

#[async_trait]
impl GeoSampler for StaticHazardData {
    async fn flood_hazard(&self, _lon: f64, _lat: f64) -> Result<RawValue, ProviderError> {
        Ok(RawValue::Keyed(vec![
            (
                "RP10_depth_category".to_string(),
                RawValue::Number(self.flood_category),
            ),
            (
                "RP100_depth_category".to_string(),
                RawValue::Number(self.flood_category + 1.0),
            ),
        ]))
    }

    async fn vegetation_index(&self, _lon: f64, _lat: f64) -> Result<RawValue, ProviderError> {
        Ok(RawValue::Number(self.vegetation_index))
    }

    async fn vegetation_index_for_year(
        &self,
        _lon: f64,
        _lat: f64,
        _year: i32,
    ) -> Result<RawValue, ProviderError> {
        // The projection trends drier than today's observation.
        Ok(RawValue::Number(self.vegetation_index * 0.9))
    }

    async fn elevation(&self, _lon: f64, _lat: f64) -> Result<RawValue, ProviderError> {
        Ok(RawValue::Number(self.elevation_m))
    }
}

#[async_trait]
impl WeatherService for StaticHazardData {
    async fn current(&self, _lon: f64, _lat: f64) -> Result<WeatherSample, ProviderError> {
        Ok(self.weather)
    }

    async fn projected(
        &self,
        _lon: f64,
        _lat: f64,
        _year: i32,
    ) -> Result<WeatherSample, ProviderError> {
        Ok(WeatherSample {
            temperature: self.weather.temperature + 2.0,
            humidity: self.weather.humidity - 5.0,
            ..self.weather
        })
    }
}

#[async_trait]
impl SeismicCatalog for StaticHazardData {
    async fn event_count(&self, _lon: f64, _lat: f64) -> Result<f64, ProviderError> {
        Ok(self.earthquakes)
    }
}

#[async_trait]
impl HurricaneCatalog for StaticHazardData {
    async fn storm_count(&self, _lon: f64, _lat: f64) -> Result<f64, ProviderError> {
        Ok(self.storms)
    }
}

#[async_trait]
impl FireCatalog for StaticHazardData {
    async fn detection_count(&self, _lon: f64, _lat: f64) -> Result<f64, ProviderError> {
        Ok(self.fires)
    }
}
