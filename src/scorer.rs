//! Risk scoring strategies
//!
//! One strategy is picked at startup and kept for the life of the process.
//! Both are pure functions of the feature vector.

use crate::features::FeatureVector;
use crate::model::{load_model, LinearModel};
use std::path::Path;
use tracing::{error, info, warn};

/// Probability used when the trained model yields a non-numeric value.
/// Matches the heuristic's base.
pub const ANOMALY_FALLBACK: f64 = 0.5;

pub const HEURISTIC_BASE: f64 = 0.5;
pub const HIGH_DOSAGE_THRESHOLD: f64 = 100.0;

#[derive(Debug, Clone)]
pub enum ScoringStrategy {
    LearnedModel(LinearModel),
    HeuristicDefault,
}

impl ScoringStrategy {
    /// Load the artifact once and pick a strategy. A missing artifact is a
    /// fresh install; anything else that fails is a deployment fault and is
    /// logged as one. Both fall back to the heuristic.
    pub fn select(model_path: &Path) -> Self {
        match load_model(model_path) {
            Ok(model) => {
                info!(
                    path = %model_path.display(),
                    trained_at = %model.trained_at,
                    "Loaded trained model"
                );
                Self::LearnedModel(model)
            }
            Err(e) if e.is_not_found() => {
                info!(
                    path = %model_path.display(),
                    "No trained model found, using default heuristic"
                );
                Self::HeuristicDefault
            }
            Err(e) => {
                error!(
                    path = %model_path.display(),
                    error = %e,
                    "Model artifact is unusable, using default heuristic"
                );
                Self::HeuristicDefault
            }
        }
    }

    pub fn is_learned(&self) -> bool {
        matches!(self, Self::LearnedModel(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::LearnedModel(_) => "learned_model",
            Self::HeuristicDefault => "heuristic_default",
        }
    }

    /// Probability of an MRL violation, always within [0, 1].
    pub fn score(&self, features: &FeatureVector) -> f64 {
        match self {
            Self::LearnedModel(model) => learned_probability(model, features),
            Self::HeuristicDefault => heuristic_probability(features),
        }
    }
}

fn learned_probability(model: &LinearModel, features: &FeatureVector) -> f64 {
    let raw = model.predict(features);
    if !raw.is_finite() {
        warn!(raw = %raw, "Model returned a non-numeric score, substituting fallback");
        return ANOMALY_FALLBACK;
    }
    raw.clamp(0.0, 1.0)
}

/// Additive rule set used when no model is loaded. The base never drops, so
/// this path cannot report low risk.
pub fn heuristic_probability(features: &FeatureVector) -> f64 {
    let mut score = HEURISTIC_BASE;
    if features.dosage > HIGH_DOSAGE_THRESHOLD {
        score += 0.2;
    }
    if features.previous_violations > 0.0 {
        score += 0.2;
    }
    if features.frequency > 2.0 {
        score += 0.1;
    }
    score.min(1.0)
}
