use super::config::FactorCeilings;
use super::raw::{Factor, RawFactors};
use super::vegetation::greenness;
use super::weights::WeightTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Final score with the per-factor breakdown and the readings it was
/// derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_percent: u8,
    pub metrics_percent: BTreeMap<Factor, f64>,
    pub raw_factors: RawFactors,
}

/// Clamps to [0,1]; NaN reads as 0.0 so a bad reading never poisons the sum.
pub fn clip01(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Normalized risk contribution of one factor, in [0,1], increasing with
/// assessed risk.
pub fn metric(factor: Factor, raw: &RawFactors, ceilings: &FactorCeilings) -> f64 {
    match factor {
        Factor::Vegetation => {
            // Sparse vegetation means more risk, but a zero reading is an
            // absent signal, not bare ground.
            if raw.vegetation.as_number() == 0.0 {
                0.0
            } else {
                clip01(1.0 - greenness(&raw.vegetation))
            }
        }
        Factor::Elevation => {
            // Low terrain means more flood-adjacent risk; zero is treated
            // as an absent reading, like vegetation.
            let elevation = raw.elevation.as_number();
            if elevation == 0.0 {
                0.0
            } else {
                clip01(1.0 - clip01(elevation / ceilings.elevation))
            }
        }
        ratio => {
            let ceiling = ceilings.get(ratio).unwrap_or(f64::INFINITY);
            clip01(raw.get(ratio).as_number() / ceiling)
        }
    }
}

/// Blends the normalized metrics with the adjusted weights. Pure and total:
/// no I/O, nothing to fail on, any well-formed input scores in [0,100].
pub fn aggregate(raw: RawFactors, weights: &WeightTable, ceilings: &FactorCeilings) -> RiskAssessment {
    let mut blended = 0.0;
    let mut metrics_percent = BTreeMap::new();

    for factor in Factor::ALL {
        let value = metric(factor, &raw, ceilings);
        blended += weights.get(factor) * value;
        // Reported for every factor, weighted or not.
        metrics_percent.insert(factor, round2(value * 100.0));
    }

    let risk_percent = (blended * 100.0).round().clamp(0.0, 100.0) as u8;

    RiskAssessment {
        risk_percent,
        metrics_percent,
        raw_factors: raw,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::super::config::RiskModelConfig;
    use super::super::raw::RawValue;
    use super::super::weights::adjust;
    use super::*;

    fn config() -> RiskModelConfig {
        RiskModelConfig::default()
    }

    #[test]
    fn clip01_is_total() {
        assert_eq!(clip01(f64::NAN), 0.0);
        assert_eq!(clip01(-3.0), 0.0);
        assert_eq!(clip01(0.25), 0.25);
        assert_eq!(clip01(7.0), 1.0);
    }

    #[test]
    fn ratio_metric_scales_against_the_ceiling() {
        let config = config();
        let mut raw = RawFactors::default();
        raw.flood_rate = RawValue::Number(2.5);
        assert_eq!(metric(Factor::FloodRate, &raw, &config.ceilings), 0.5);

        raw.flood_rate = RawValue::Number(50.0);
        assert_eq!(metric(Factor::FloodRate, &raw, &config.ceilings), 1.0);
    }

    #[test]
    fn elevation_metric_is_inverse() {
        let config = config();
        let mut raw = RawFactors::default();
        raw.elevation = RawValue::Number(3000.0);
        assert_eq!(metric(Factor::Elevation, &raw, &config.ceilings), 0.0);

        raw.elevation = RawValue::Number(1500.0);
        assert_eq!(metric(Factor::Elevation, &raw, &config.ceilings), 0.5);

        raw.elevation = RawValue::Missing;
        assert_eq!(metric(Factor::Elevation, &raw, &config.ceilings), 0.0);
    }

    #[test]
    fn vegetation_metric_inverts_greenness() {
        let config = config();
        let mut raw = RawFactors::default();
        raw.vegetation = RawValue::Number(8000.0);
        let value = metric(Factor::Vegetation, &raw, &config.ceilings);
        assert!((value - 0.1).abs() < 1e-12);

        raw.vegetation = RawValue::Missing;
        assert_eq!(metric(Factor::Vegetation, &raw, &config.ceilings), 0.0);
    }

    #[test]
    fn breakdown_reports_exact_percentages() {
        let config = config();
        let mut raw = RawFactors::default();
        raw.flood_rate = RawValue::Number(2.5);
        let weights = adjust(&raw, &config.base_weights);
        let assessment = aggregate(raw, &weights, &config.ceilings);
        assert_eq!(assessment.metrics_percent[&Factor::FloodRate], 50.0);
        assert_eq!(assessment.metrics_percent.len(), 10);
    }

    #[test]
    fn breakdown_includes_zero_weighted_factors() {
        let config = config();
        let mut raw = RawFactors::default();
        raw.temperature = RawValue::Number(25.0);
        let weights = adjust(&raw, &config.base_weights);
        assert_eq!(weights.temperature, 0.0);
        let assessment = aggregate(raw, &weights, &config.ceilings);
        assert_eq!(assessment.metrics_percent[&Factor::Temperature], 50.0);
    }

    #[test]
    fn degenerate_weights_score_zero() {
        let config = config();
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
        let mut raw = RawFactors::default();
        raw.flood_rate = RawValue::Number(5.0);
        let assessment = aggregate(raw, &zero, &config.ceilings);
        assert_eq!(assessment.risk_percent, 0);
    }

    #[test]
    fn malformed_shapes_never_panic() {
        let config = config();
        let raw = RawFactors {
            seismic_rate: RawValue::Keyed(vec![("note".to_string(), RawValue::Missing)]),
            flood_rate: RawValue::Sequence(vec![]),
            wind: RawValue::Number(f64::NAN),
            precipitation: RawValue::Number(f64::INFINITY),
            ..RawFactors::default()
        };
        let weights = adjust(&raw, &config.base_weights);
        let assessment = aggregate(raw, &weights, &config.ceilings);
        assert!(assessment.risk_percent <= 100);
    }
}
