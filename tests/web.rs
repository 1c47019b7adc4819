// tests/web.rs
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use mrl_risk::engine::RiskEngine;
use mrl_risk::model::LinearModel;
use mrl_risk::scorer::ScoringStrategy;
use mrl_risk::web::build_router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt; // for .oneshot()

fn heuristic_app() -> Router {
    build_router(Arc::new(RiskEngine::heuristic()))
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json_val: Value = serde_json::from_slice(&body).unwrap();
    (status, json_val)
}

fn predict_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .uri("/predict")
        .method(Method::POST)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

#[tokio::test]
async fn health_reports_heuristic_mode() {
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(heuristic_app(), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "message": "ML Service is running",
            "model_loaded": false
        })
    );
}

#[tokio::test]
async fn health_reports_loaded_model() {
    let engine = RiskEngine::new(ScoringStrategy::LearnedModel(LinearModel::new([0.0; 5], 0.2)));
    let app = build_router(Arc::new(engine));
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (_, body) = send(app, req).await;
    assert_eq!(body["model_loaded"], json!(true));
}

#[tokio::test]
async fn predict_high_risk_regimen() {
    let payload = json!({
        "dosage": 150,
        "frequency": "daily",
        "drugType": "antibiotic",
        "animalAge": 3,
        "previousViolations": 1
    });
    let (status, body) = send(heuristic_app(), predict_request(payload.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    let prediction = &body["prediction"];
    assert_eq!(prediction["risk_score"], json!(1.0));
    assert_eq!(prediction["risk_level"], json!("high"));
    assert_eq!(prediction["violation_probability"], json!(100.0));
    assert_eq!(
        prediction["recommendation"],
        json!("High risk of MRL violation. Recommend reducing dosage or choosing alternative medicine for antibiotic.")
    );
}

#[tokio::test]
async fn empty_body_uses_defaults() {
    for body in ["", "{}"] {
        let (status, json_val) = send(heuristic_app(), predict_request(body)).await;
        assert_eq!(status, StatusCode::OK, "body {body:?}");
        assert_eq!(json_val["prediction"]["risk_score"], json!(0.5));
        assert_eq!(json_val["prediction"]["risk_level"], json!("medium"));
        assert_eq!(json_val["prediction"]["violation_probability"], json!(50.0));
    }
}

#[tokio::test]
async fn text_dosage_is_a_client_error() {
    let payload = json!({ "dosage": "twenty" });
    let (status, body) = send(heuristic_app(), predict_request(payload.to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("dosage"), "message: {message}");
    assert!(body.get("prediction").is_none());
}

#[tokio::test]
async fn malformed_json_gets_failure_envelope() {
    let (status, body) = send(heuristic_app(), predict_request("{\"dosage\": ")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn failed_request_does_not_affect_the_next() {
    let app = heuristic_app();

    let bad = json!({ "previousViolations": "several" });
    let (status, _) = send(app.clone(), predict_request(bad.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let good = json!({ "dosage": 10, "frequency": "twice" });
    let (status, body) = send(app, predict_request(good.to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"]["risk_level"], json!("medium"));
}

#[tokio::test]
async fn unknown_labels_are_accepted() {
    let payload = json!({ "frequency": "fortnightly", "drugType": "Hormone" });
    let (status, body) = send(heuristic_app(), predict_request(payload.to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["prediction"]["recommendation"]
        .as_str()
        .unwrap()
        .ends_with("for Hormone."));
}

#[tokio::test]
async fn cors_preflight_is_allowed() {
    let req = Request::builder()
        .uri("/predict")
        .method(Method::OPTIONS)
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = heuristic_app().oneshot(req).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let req = Request::builder().uri("/train").body(Body::empty()).unwrap();
    let response = heuristic_app().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn negative_dosage_is_scored() {
    let payload = json!({ "dosage": -5, "animalAge": 0 });
    let (status, body) = send(heuristic_app(), predict_request(payload.to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"]["risk_level"], json!("medium"));
}
