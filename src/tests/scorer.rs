use crate::decision::{RiskAssessment, RiskLevel};
use crate::engine::RiskEngine;
use crate::features::{FeatureVector, PredictionRequest};
use crate::model::LinearModel;
use crate::scorer::{heuristic_probability, ScoringStrategy, ANOMALY_FALLBACK};
use serde_json::json;

fn features(dosage: f64, frequency: f64, previous_violations: f64) -> FeatureVector {
    FeatureVector::from_array([dosage, frequency, 1.0, 1.0, previous_violations])
}

#[test]
fn heuristic_saturates_at_one() {
    let p = heuristic_probability(&features(150.0, 7.0, 1.0));
    assert!((p - 1.0).abs() < 1e-9, "p = {p}");
    assert!(p <= 1.0);

    let assessment = RiskAssessment::from_probability(p, "antibiotic");
    assert_eq!(assessment.risk_level, RiskLevel::High);
    assert_eq!(assessment.risk_score, 1.0);
    assert_eq!(assessment.violation_probability, 100.0);
}

#[test]
fn heuristic_base_case_is_medium() {
    let p = heuristic_probability(&features(50.0, 1.0, 0.0));
    assert_eq!(p, 0.5);
    assert_eq!(RiskLevel::from_probability(p), RiskLevel::Medium);
}

#[test]
fn heuristic_never_reports_low_risk() {
    for dosage in [0.0, 50.0, 100.0, 100.01, 500.0] {
        for frequency in [1.0, 2.0, 3.0, 7.0] {
            for violations in [0.0, 1.0, 4.0] {
                let p = heuristic_probability(&features(dosage, frequency, violations));
                assert!(p >= 0.5, "p = {p}");
                assert_ne!(RiskLevel::from_probability(p), RiskLevel::Low);
            }
        }
    }
}

#[test]
fn heuristic_thresholds_are_strict() {
    // dosage must exceed 100 and frequency must exceed 2
    assert_eq!(heuristic_probability(&features(100.0, 2.0, 0.0)), 0.5);
    assert!((heuristic_probability(&features(100.5, 2.0, 0.0)) - 0.7).abs() < 1e-12);
    assert!((heuristic_probability(&features(0.0, 3.0, 0.0)) - 0.6).abs() < 1e-12);
}

#[test]
fn learned_model_uses_linear_output() {
    let model = LinearModel::new([0.003, 0.05, 0.02, 0.0, 0.15], 0.0);
    let strategy = ScoringStrategy::LearnedModel(model);
    let p = strategy.score(&FeatureVector::from_array([100.0, 1.0, 1.0, 2.0, 0.0]));
    assert!((p - 0.37).abs() < 1e-12, "p = {p}");
    assert_eq!(RiskLevel::from_probability(p), RiskLevel::Low);
}

#[test]
fn learned_model_non_numeric_output_falls_back() {
    let mut model = LinearModel::new([0.0; 5], 0.0);
    model.intercept = f64::NAN;
    let strategy = ScoringStrategy::LearnedModel(model);
    assert_eq!(strategy.score(&features(10.0, 1.0, 0.0)), ANOMALY_FALLBACK);

    let mut model = LinearModel::new([1.0, 0.0, 0.0, 0.0, 0.0], 0.0);
    model.coefficients[0] = f64::INFINITY;
    let strategy = ScoringStrategy::LearnedModel(model);
    assert_eq!(strategy.score(&features(10.0, 1.0, 0.0)), 0.5);
}

#[test]
fn learned_model_output_is_clamped() {
    let strategy = ScoringStrategy::LearnedModel(LinearModel::new([0.01, 0.0, 0.0, 0.0, 0.0], 0.0));
    assert_eq!(strategy.score(&features(500.0, 1.0, 0.0)), 1.0);

    let strategy = ScoringStrategy::LearnedModel(LinearModel::new([0.0; 5], -0.3));
    assert_eq!(strategy.score(&features(0.0, 1.0, 0.0)), 0.0);
}

#[test]
fn scoring_is_idempotent() {
    let strategies = [
        ScoringStrategy::HeuristicDefault,
        ScoringStrategy::LearnedModel(LinearModel::new([0.003, 0.05, 0.02, 0.001, 0.15], 0.02)),
    ];
    let input = FeatureVector::from_array([120.0, 3.0, 2.0, 4.5, 1.0]);
    for strategy in &strategies {
        let first = strategy.score(&input);
        for _ in 0..10 {
            assert_eq!(strategy.score(&input), first);
        }
    }
}

#[test]
fn engine_reports_strategy_availability() {
    assert!(!RiskEngine::heuristic().model_loaded());
    let engine = RiskEngine::new(ScoringStrategy::LearnedModel(LinearModel::new([0.0; 5], 0.1)));
    assert!(engine.model_loaded());
}

#[test]
fn engine_assesses_empty_request() {
    let assessment = RiskEngine::heuristic()
        .assess(&PredictionRequest::default())
        .unwrap();
    assert_eq!(assessment.risk_score, 0.5);
    assert_eq!(assessment.risk_level, RiskLevel::Medium);
    assert_eq!(assessment.violation_probability, 50.0);
    assert_eq!(
        assessment.recommendation,
        "Moderate risk detected. Monitor animal closely and ensure proper withdrawal period for antibiotic."
    );
}

#[test]
fn engine_low_risk_through_learned_model() {
    let engine = RiskEngine::new(ScoringStrategy::LearnedModel(LinearModel::new(
        [0.003, 0.05, 0.02, 0.0, 0.15],
        0.0,
    )));
    let request = PredictionRequest::from_value(json!({
        "dosage": 20,
        "frequency": "once",
        "drugType": "Vitamin"
    }))
    .unwrap();

    let assessment = engine.assess(&request).unwrap();
    // 0.06 + 0.05 + 0.08
    assert_eq!(assessment.risk_score, 0.19);
    assert_eq!(assessment.violation_probability, 19.0);
    assert_eq!(assessment.risk_level, RiskLevel::Low);
    assert_eq!(
        assessment.recommendation,
        "Low risk. Current dosage appears safe for Vitamin. Follow standard withdrawal period."
    );
}

#[test]
fn engine_high_risk_recommendation_names_drug() {
    let request = PredictionRequest::from_value(json!({
        "dosage": 150,
        "frequency": "daily",
        "drugType": "antiparasitic",
        "previousViolations": 2
    }))
    .unwrap();
    let assessment = RiskEngine::heuristic().assess(&request).unwrap();
    assert_eq!(assessment.risk_level, RiskLevel::High);
    assert_eq!(
        assessment.recommendation,
        "High risk of MRL violation. Recommend reducing dosage or choosing alternative medicine for antiparasitic."
    );
}

#[test]
fn engine_rejects_text_dosage() {
    let request = PredictionRequest::from_value(json!({ "dosage": "lots" })).unwrap();
    let err = RiskEngine::heuristic().assess(&request).unwrap_err();
    assert!(err.is_client_error());
}

#[test]
fn engine_scores_out_of_range_values() {
    let engine = RiskEngine::heuristic();
    for body in [
        json!({ "animalAge": 0 }),
        json!({ "dosage": -5 }),
        json!({ "previousViolations": -2 }),
    ] {
        let request = PredictionRequest::from_value(body.clone()).unwrap();
        let assessment = engine.assess(&request).unwrap();
        assert_eq!(assessment.risk_level, RiskLevel::Medium, "body {body}");
    }

    // 0.5 base + 0.2 for violations lands exactly on the high boundary
    let request =
        PredictionRequest::from_value(json!({ "previousViolations": 5_000_000_000u64 })).unwrap();
    let assessment = engine.assess(&request).unwrap();
    assert_eq!(assessment.risk_level, RiskLevel::High);
    assert_eq!(assessment.risk_score, 0.7);
}
