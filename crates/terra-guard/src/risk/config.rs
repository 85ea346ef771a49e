use super::raw::Factor;
use super::weights::WeightTable;
use serde::{Deserialize, Serialize};

/// Ceiling per factor used to scale a raw magnitude into [0,1]. Readings at
/// or above the ceiling count as maximal risk for that factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorCeilings {
    /// Earthquakes per year within 50 km (USGS catalog count).
    pub seismic_rate: f64,
    /// Flood depth category at the sampled return period.
    pub flood_rate: f64,
    /// Storm events near the point over the lookback window.
    pub hurricane_rate: f64,
    /// Satellite fire detections per year.
    pub fire_rate: f64,
    /// Mean air temperature, degrees Celsius.
    pub temperature: f64,
    /// Relative humidity, percent.
    pub humidity: f64,
    /// Mean wind speed, km/h.
    pub wind: f64,
    /// Accumulated precipitation over the sample window, mm.
    pub precipitation: f64,
    /// Terrain elevation, metres; below this the inverse scaling applies.
    pub elevation: f64,
}

impl FactorCeilings {
    /// Ceiling for a directly-scaled (ratio) factor. Vegetation has no
    /// ceiling; it goes through greenness normalization instead.
    pub fn get(&self, factor: Factor) -> Option<f64> {
        match factor {
            Factor::SeismicRate => Some(self.seismic_rate),
            Factor::FloodRate => Some(self.flood_rate),
            Factor::HurricaneRate => Some(self.hurricane_rate),
            Factor::FireRate => Some(self.fire_rate),
            Factor::Temperature => Some(self.temperature),
            Factor::Humidity => Some(self.humidity),
            Factor::Wind => Some(self.wind),
            Factor::Precipitation => Some(self.precipitation),
            Factor::Elevation => Some(self.elevation),
            Factor::Vegetation => None,
        }
    }
}

impl Default for FactorCeilings {
    fn default() -> Self {
        Self {
            seismic_rate: 100.0,
            flood_rate: 5.0,
            hurricane_rate: 50.0,
            fire_rate: 100.0,
            temperature: 50.0,
            humidity: 100.0,
            wind: 120.0,
            precipitation: 300.0,
            elevation: 3000.0,
        }
    }
}

/// The tables the scoring engine runs on: base blending weights plus the
/// magnitude ceilings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskModelConfig {
    pub base_weights: WeightTable,
    pub ceilings: FactorCeilings,
}

impl Default for RiskModelConfig {
    fn default() -> Self {
        Self {
            base_weights: WeightTable {
                seismic: 0.15,
                flood: 0.15,
                hurricane: 0.10,
                fire: 0.10,
                temperature: 0.10,
                humidity: 0.05,
                wind: 0.10,
                precipitation: 0.10,
                vegetation: 0.10,
                elevation: 0.05,
            },
            ceilings: FactorCeilings::default(),
        }
    }
}
