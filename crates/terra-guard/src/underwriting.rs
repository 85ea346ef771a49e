use serde::{Deserialize, Serialize};

/// Coarse banding of a risk score, used for payout estimation and map
/// styling downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    Low,
    Moderate,
    High,
}

impl RiskBand {
    pub fn from_percent(risk_percent: u8) -> Self {
        match risk_percent {
            0..=30 => RiskBand::Low,
            31..=60 => RiskBand::Moderate,
            _ => RiskBand::High,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskBand::Low => "Low",
            RiskBand::Moderate => "Moderate",
            RiskBand::High => "High",
        }
    }
}

/// Loss ratios applied to the insured value per band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutPolicy {
    pub high: f64,
    pub moderate: f64,
    pub low: f64,
}

impl Default for PayoutPolicy {
    fn default() -> Self {
        Self {
            high: 0.9,
            moderate: 0.5,
            low: 0.1,
        }
    }
}

impl PayoutPolicy {
    pub fn estimate(&self, band: RiskBand, insured_value: f64) -> f64 {
        let ratio = match band {
            RiskBand::High => self.high,
            RiskBand::Moderate => self.moderate,
            RiskBand::Low => self.low,
        };
        insured_value * ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_split_at_thirty_and_sixty() {
        assert_eq!(RiskBand::from_percent(0), RiskBand::Low);
        assert_eq!(RiskBand::from_percent(30), RiskBand::Low);
        assert_eq!(RiskBand::from_percent(31), RiskBand::Moderate);
        assert_eq!(RiskBand::from_percent(60), RiskBand::Moderate);
        assert_eq!(RiskBand::from_percent(61), RiskBand::High);
        assert_eq!(RiskBand::from_percent(100), RiskBand::High);
    }

    #[test]
    fn payout_scales_with_the_band() {
        let policy = PayoutPolicy::default();
        assert_eq!(policy.estimate(RiskBand::High, 10_000.0), 9_000.0);
        assert_eq!(policy.estimate(RiskBand::Moderate, 10_000.0), 5_000.0);
        assert_eq!(policy.estimate(RiskBand::Low, 10_000.0), 1_000.0);
    }
}
