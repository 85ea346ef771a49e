use super::{
    FireCatalog, GeoSampler, HurricaneCatalog, ProviderError, SeismicCatalog, WeatherService,
};
use crate::risk::{RawFactors, RawValue};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::warn;

/// The external collaborators a collection round talks to.
#[derive(Clone)]
pub struct ProviderSet {
    pub geo: Arc<dyn GeoSampler>,
    pub weather: Arc<dyn WeatherService>,
    pub seismic: Arc<dyn SeismicCatalog>,
    pub hurricanes: Arc<dyn HurricaneCatalog>,
    pub fires: Arc<dyn FireCatalog>,
}

/// Gathers the ten raw factor readings for a point.
///
/// Calls run concurrently and independently: a failure or timeout on one
/// provider substitutes that factor's default and never aborts the rest.
#[derive(Clone)]
pub struct FactorCollector {
    providers: ProviderSet,
    call_timeout: Duration,
}

impl FactorCollector {
    pub fn new(providers: ProviderSet, call_timeout: Duration) -> Self {
        Self {
            providers,
            call_timeout,
        }
    }

    /// One collection round. With `target_year` set, weather and vegetation
    /// come from the projected-data collaborators; everything else is
    /// static regardless of year.
    pub async fn collect(&self, lon: f64, lat: f64, target_year: Option<i32>) -> RawFactors {
        let geo = &self.providers.geo;

        let (flood, vegetation, elevation, weather, seismic, hurricane, fire) = tokio::join!(
            self.guarded("flood_rate", geo.flood_hazard(lon, lat)),
            self.guarded("vegetation", async {
                match target_year {
                    Some(year) => geo.vegetation_index_for_year(lon, lat, year).await,
                    None => geo.vegetation_index(lon, lat).await,
                }
            }),
            self.guarded("elevation", geo.elevation(lon, lat)),
            self.guarded("weather", async {
                match target_year {
                    Some(year) => self.providers.weather.projected(lon, lat, year).await,
                    None => self.providers.weather.current(lon, lat).await,
                }
            }),
            self.guarded("seismic_rate", self.providers.seismic.event_count(lon, lat)),
            self.guarded(
                "hurricane_rate",
                self.providers.hurricanes.storm_count(lon, lat)
            ),
            self.guarded("fire_rate", self.providers.fires.detection_count(lon, lat)),
        );

        let (temperature, humidity, wind, precipitation) = match weather {
            Some(sample) => (
                RawValue::Number(sample.temperature),
                RawValue::Number(sample.humidity),
                RawValue::Number(sample.wind_speed),
                RawValue::Number(sample.precipitation),
            ),
            None => (
                RawValue::Missing,
                RawValue::Missing,
                RawValue::Missing,
                RawValue::Missing,
            ),
        };

        RawFactors {
            seismic_rate: RawValue::Number(seismic.unwrap_or(0.0)),
            flood_rate: flood.unwrap_or(RawValue::Number(0.0)),
            hurricane_rate: RawValue::Number(hurricane.unwrap_or(0.0)),
            fire_rate: RawValue::Number(fire.unwrap_or(0.0)),
            temperature,
            humidity,
            wind,
            precipitation,
            vegetation: vegetation.unwrap_or(RawValue::Missing),
            elevation: elevation.unwrap_or(RawValue::Number(0.0)),
        }
    }

    async fn guarded<T>(
        &self,
        factor: &'static str,
        call: impl Future<Output = Result<T, ProviderError>>,
    ) -> Option<T> {
        match timeout(self.call_timeout, call).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(err)) => {
                warn!(factor, error = %err, "provider call failed; substituting default");
                None
            }
            Err(_) => {
                warn!(
                    factor,
                    timeout = ?self.call_timeout,
                    "provider call timed out; substituting default"
                );
                None
            }
        }
    }
}
