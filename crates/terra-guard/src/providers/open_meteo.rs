use super::{ProviderError, WeatherSample, WeatherService};
use async_trait::async_trait;
use serde::Deserialize;

const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const CLIMATE_URL: &str = "https://climate-api.open-meteo.com/v1/climate";
const CLIMATE_MODEL: &str = "EC_Earth3P_HR";

/// Open-Meteo client: current conditions from the forecast API, target-year
/// conditions from the climate projection API.
#[derive(Clone)]
pub struct OpenMeteoClient {
    http: reqwest::Client,
    forecast_url: String,
    climate_url: String,
}

impl OpenMeteoClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            forecast_url: FORECAST_URL.to_string(),
            climate_url: CLIMATE_URL.to_string(),
        }
    }

    pub fn with_base_urls(http: reqwest::Client, forecast_url: String, climate_url: String) -> Self {
        Self {
            http,
            forecast_url,
            climate_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    hourly: HourlySeries,
}

#[derive(Debug, Deserialize)]
struct HourlySeries {
    temperature_2m: Vec<Option<f64>>,
    relative_humidity_2m: Vec<Option<f64>>,
    precipitation: Vec<Option<f64>>,
    wind_speed_10m: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ClimateResponse {
    daily: DailySeries,
}

#[derive(Debug, Deserialize)]
struct DailySeries {
    temperature_2m_mean: Vec<Option<f64>>,
    relative_humidity_2m_mean: Vec<Option<f64>>,
    precipitation_sum: Vec<Option<f64>>,
    wind_speed_10m_mean: Vec<Option<f64>>,
}

fn mean(series: &[Option<f64>], field: &str) -> Result<f64, ProviderError> {
    let values: Vec<f64> = series.iter().flatten().copied().collect();
    if values.is_empty() {
        return Err(ProviderError::InvalidResponse(format!(
            "no readings in series '{field}'"
        )));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

fn total(series: &[Option<f64>]) -> f64 {
    series.iter().flatten().sum()
}

async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Api {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        });
    }
    Ok(response.json::<T>().await?)
}

#[async_trait]
impl WeatherService for OpenMeteoClient {
    async fn current(&self, lon: f64, lat: f64) -> Result<WeatherSample, ProviderError> {
        let response = self
            .http
            .get(&self.forecast_url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                (
                    "hourly",
                    "temperature_2m,relative_humidity_2m,precipitation,wind_speed_10m".to_string(),
                ),
            ])
            .send()
            .await?;
        let parsed: ForecastResponse = read_json(response).await?;
        let hourly = parsed.hourly;

        Ok(WeatherSample {
            temperature: mean(&hourly.temperature_2m, "temperature_2m")?,
            humidity: mean(&hourly.relative_humidity_2m, "relative_humidity_2m")?,
            wind_speed: mean(&hourly.wind_speed_10m, "wind_speed_10m")?,
            precipitation: total(&hourly.precipitation),
        })
    }

    async fn projected(
        &self,
        lon: f64,
        lat: f64,
        year: i32,
    ) -> Result<WeatherSample, ProviderError> {
        let response = self
            .http
            .get(&self.climate_url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                ("start_date", format!("{year}-01-01")),
                ("end_date", format!("{year}-12-31")),
                ("models", CLIMATE_MODEL.to_string()),
                (
                    "daily",
                    "temperature_2m_mean,relative_humidity_2m_mean,precipitation_sum,wind_speed_10m_mean"
                        .to_string(),
                ),
            ])
            .send()
            .await?;
        let parsed: ClimateResponse = read_json(response).await?;
        let daily = parsed.daily;

        Ok(WeatherSample {
            temperature: mean(&daily.temperature_2m_mean, "temperature_2m_mean")?,
            humidity: mean(&daily.relative_humidity_2m_mean, "relative_humidity_2m_mean")?,
            wind_speed: mean(&daily.wind_speed_10m_mean, "wind_speed_10m_mean")?,
            precipitation: total(&daily.precipitation_sum),
        })
    }
}
