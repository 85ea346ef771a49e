use super::raw::{Factor, RawFactors};
use serde::{Deserialize, Serialize};

/// Blending weight per factor. Non-negative; an all-zero table is
/// degenerate and scores 0 downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightTable {
    pub seismic: f64,
    pub flood: f64,
    pub hurricane: f64,
    pub fire: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub wind: f64,
    pub precipitation: f64,
    pub vegetation: f64,
    pub elevation: f64,
}

impl WeightTable {
    pub fn get(&self, factor: Factor) -> f64 {
        match factor {
            Factor::SeismicRate => self.seismic,
            Factor::FloodRate => self.flood,
            Factor::HurricaneRate => self.hurricane,
            Factor::FireRate => self.fire,
            Factor::Temperature => self.temperature,
            Factor::Humidity => self.humidity,
            Factor::Wind => self.wind,
            Factor::Precipitation => self.precipitation,
            Factor::Vegetation => self.vegetation,
            Factor::Elevation => self.elevation,
        }
    }

    pub fn sum(&self) -> f64 {
        Factor::ALL.iter().map(|factor| self.get(*factor)).sum()
    }

    pub fn is_degenerate(&self) -> bool {
        self.sum() == 0.0
    }

    fn scale(&mut self, divisor: f64) {
        self.seismic /= divisor;
        self.flood /= divisor;
        self.hurricane /= divisor;
        self.fire /= divisor;
        self.temperature /= divisor;
        self.humidity /= divisor;
        self.wind /= divisor;
        self.precipitation /= divisor;
        self.vegetation /= divisor;
        self.elevation /= divisor;
    }
}

/// Derives the blending weights for one request from the base table and the
/// raw readings. The rules compound in a fixed order: each one sees the
/// weights already modified by its predecessors.
pub fn adjust(raw: &RawFactors, base: &WeightTable) -> WeightTable {
    let mut weights = base.clone();

    // No fire activity: wind and rain matter less, vegetation not at all.
    if raw.fire_rate.as_number() == 0.0 {
        weights.wind *= 0.5;
        weights.precipitation *= 0.5;
        weights.vegetation = 0.0;
    }

    // No hurricane history halves wind again on top of the fire rule.
    if raw.hurricane_rate.as_number() == 0.0 {
        weights.wind *= 0.5;
    }

    // Temperature stays in the breakdown but never weighs into the blend.
    weights.temperature = 0.0;

    if raw.seismic_rate.as_number() == 0.0 {
        weights.seismic *= 0.5;
    }

    // Dense vegetation on the untransformed index dampens fire weighting.
    if raw.vegetation.as_number() > 0.5 {
        weights.fire *= 0.6;
    }

    // Low-lying terrain amplifies flood and hurricane exposure.
    if raw.elevation.as_number() < 100.0 {
        weights.flood *= 1.3;
        weights.hurricane *= 1.2;
    }

    // Dry air amplifies fire exposure.
    if raw.humidity.as_number() < 30.0 {
        weights.fire *= 1.4;
    }

    let total = weights.sum();
    if total > 0.0 {
        weights.scale(total);
    }
    weights
}

#[cfg(test)]
mod tests {
    use super::super::config::RiskModelConfig;
    use super::super::raw::RawValue;
    use super::*;

    fn base() -> WeightTable {
        RiskModelConfig::default().base_weights
    }

    fn factors_with(build: impl FnOnce(&mut RawFactors)) -> RawFactors {
        let mut raw = RawFactors::default();
        build(&mut raw);
        raw
    }

    #[test]
    fn adjusted_weights_sum_to_one_for_positive_base() {
        let raw = factors_with(|raw| {
            raw.fire_rate = RawValue::Number(3.0);
            raw.hurricane_rate = RawValue::Number(1.0);
            raw.seismic_rate = RawValue::Number(10.0);
            raw.humidity = RawValue::Number(55.0);
            raw.elevation = RawValue::Number(450.0);
        });
        let adjusted = adjust(&raw, &base());
        assert!((adjusted.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn absent_hazards_compound_the_wind_penalty() {
        // fire_rate and hurricane_rate both zero: wind is quartered
        // relative to precipitation, which is only halved.
        let raw = RawFactors::default();
        let adjusted = adjust(&raw, &base());
        let base = base();
        let wind_ratio = adjusted.wind / adjusted.precipitation;
        let base_ratio = base.wind / base.precipitation;
        assert!((wind_ratio - base_ratio * 0.5).abs() < 1e-9);
        assert_eq!(adjusted.vegetation, 0.0);
    }

    #[test]
    fn temperature_weight_is_always_zero() {
        let raw = factors_with(|raw| {
            raw.temperature = RawValue::Number(45.0);
        });
        assert_eq!(adjust(&raw, &base()).temperature, 0.0);
    }

    #[test]
    fn quiet_faults_halve_the_seismic_weight() {
        let active = factors_with(|raw| {
            raw.seismic_rate = RawValue::Number(8.0);
        });
        let quiet = RawFactors::default();
        let adjusted_active = adjust(&active, &base());
        let adjusted_quiet = adjust(&quiet, &base());
        // Compare against flood, which both tables boost identically.
        let active_ratio = adjusted_active.seismic / adjusted_active.flood;
        let quiet_ratio = adjusted_quiet.seismic / adjusted_quiet.flood;
        assert!((quiet_ratio - active_ratio * 0.5).abs() < 1e-9);
    }

    #[test]
    fn dense_vegetation_and_dry_air_both_touch_fire() {
        let raw = factors_with(|raw| {
            raw.vegetation = RawValue::Number(8000.0);
            raw.humidity = RawValue::Number(20.0);
            raw.elevation = RawValue::Number(500.0);
            raw.fire_rate = RawValue::Number(1.0);
            raw.hurricane_rate = RawValue::Number(1.0);
            raw.seismic_rate = RawValue::Number(1.0);
        });
        let adjusted = adjust(&raw, &base());
        let reference = base();
        // Only the fire rules fired: 0.6 then 1.4 compounding.
        let expected = reference.fire * 0.6 * 1.4;
        let rescale = adjusted.wind / reference.wind;
        assert!((adjusted.fire - expected * rescale).abs() < 1e-9);
    }

    #[test]
    fn low_elevation_boosts_flood_and_hurricane() {
        let low = factors_with(|raw| {
            raw.elevation = RawValue::Number(50.0);
            raw.fire_rate = RawValue::Number(1.0);
            raw.hurricane_rate = RawValue::Number(1.0);
            raw.seismic_rate = RawValue::Number(1.0);
            raw.humidity = RawValue::Number(60.0);
        });
        let high = factors_with(|raw| {
            raw.elevation = RawValue::Number(900.0);
            raw.fire_rate = RawValue::Number(1.0);
            raw.hurricane_rate = RawValue::Number(1.0);
            raw.seismic_rate = RawValue::Number(1.0);
            raw.humidity = RawValue::Number(60.0);
        });
        let adjusted_low = adjust(&low, &base());
        let adjusted_high = adjust(&high, &base());
        let flood_ratio =
            (adjusted_low.flood / adjusted_low.wind) / (adjusted_high.flood / adjusted_high.wind);
        let hurricane_ratio = (adjusted_low.hurricane / adjusted_low.wind)
            / (adjusted_high.hurricane / adjusted_high.wind);
        assert!((flood_ratio - 1.3).abs() < 1e-9);
        assert!((hurricane_ratio - 1.2).abs() < 1e-9);
    }

    #[test]
    fn zero_base_table_stays_degenerate() {
        let zero = WeightTable {
            seismic: 0.0,
            flood: 0.0,
            hurricane: 0.0,
            fire: 0.0,
            temperature: 0.0,
            humidity: 0.0,
            wind: 0.0,
            precipitation: 0.0,
            vegetation: 0.0,
            elevation: 0.0,
        };
        let adjusted = adjust(&RawFactors::default(), &zero);
        assert!(adjusted.is_degenerate());
        for factor in Factor::ALL {
            assert_eq!(adjusted.get(factor), 0.0);
        }
    }
}
