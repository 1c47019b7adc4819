//! Request-to-decision pipeline
//!
//! `RiskEngine` owns the strategy chosen at startup and is shared read-only
//! between request handlers.

use crate::decision::RiskAssessment;
use crate::errors::RiskResult;
use crate::features::{encode, PredictionRequest};
use crate::scorer::ScoringStrategy;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct RiskEngine {
    strategy: ScoringStrategy,
}

impl RiskEngine {
    pub fn new(strategy: ScoringStrategy) -> Self {
        Self { strategy }
    }

    /// Engine that never consults a model
    pub fn heuristic() -> Self {
        Self::new(ScoringStrategy::HeuristicDefault)
    }

    /// Blocking, one-time artifact load. Call before serving traffic.
    pub fn from_model_path(path: &Path) -> Self {
        Self::new(ScoringStrategy::select(path))
    }

    pub fn model_loaded(&self) -> bool {
        self.strategy.is_learned()
    }

    pub fn strategy(&self) -> &ScoringStrategy {
        &self.strategy
    }

    pub fn assess(&self, request: &PredictionRequest) -> RiskResult<RiskAssessment> {
        let features = encode(request)?;
        let drug_type = request.drug_type()?;
        let probability = self.strategy.score(&features);

        let assessment = RiskAssessment::from_probability(probability, drug_type);
        debug!(
            strategy = self.strategy.name(),
            probability,
            level = %assessment.risk_level,
            "Scored request"
        );
        Ok(assessment)
    }
}
