mod config;
mod raw;
mod score;
mod vegetation;
mod weights;

pub use config::{FactorCeilings, RiskModelConfig};
pub use raw::{Factor, RawFactors, RawValue};
pub use score::{clip01, RiskAssessment};
pub use vegetation::greenness;
pub use weights::{adjust, WeightTable};

use tracing::warn;

/// Stateless scoring engine: adjusts the blending weights to the collected
/// readings, then folds the normalized metrics into one score.
#[derive(Debug, Clone)]
pub struct RiskEngine {
    config: RiskModelConfig,
}

impl RiskEngine {
    pub fn new(config: RiskModelConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(RiskModelConfig::default())
    }

    pub fn config(&self) -> &RiskModelConfig {
        &self.config
    }

    pub fn assess(&self, raw: RawFactors) -> RiskAssessment {
        let weights = weights::adjust(&raw, &self.config.base_weights);
        if weights.is_degenerate() {
            warn!("weight table collapsed to zero; scoring 0");
        }
        score::aggregate(raw, &weights, &self.config.ceilings)
    }
}
