//! Library root for the `mrl_risk` crate
//! Scores the risk that a veterinary dosage regimen breaches a maximum residue limit

// Core error handling
pub mod api_errors;
pub mod errors;

// Request-to-decision pipeline
pub mod decision;
pub mod engine;
pub mod features;
pub mod scorer;

// Trained model artifact & offline training
pub mod model;
pub mod training;

// Configuration & CLI
pub mod cli;
pub mod config_loader;

// Web server interface
pub mod web;

// Logging
pub mod log_sink;


pub use decision::{RiskAssessment, RiskLevel};
pub use engine::RiskEngine;
pub use errors::{RiskError, RiskResult};
pub use features::{FeatureVector, PredictionRequest};
pub use scorer::ScoringStrategy;
