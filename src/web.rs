use crate::api_errors::AppError;
use crate::decision::RiskAssessment;
use crate::engine::RiskEngine;
use crate::features::PredictionRequest;
use axum::{
    body::Bytes,
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
    pub model_loaded: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub success: bool,
    pub prediction: RiskAssessment,
}

/// Build the service router: health probe, prediction, permissive CORS
pub fn build_router(engine: Arc<RiskEngine>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(engine)
}

async fn health(State(engine): State<Arc<RiskEngine>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "ML Service is running".to_string(),
        model_loaded: engine.model_loaded(),
    })
}

// Body is taken raw so malformed JSON gets the same failure envelope as a
// bad field instead of axum's plain-text rejection.
async fn predict(
    State(engine): State<Arc<RiskEngine>>,
    body: Bytes,
) -> Result<Json<PredictResponse>, AppError> {
    let request = PredictionRequest::from_slice(&body)?;
    let prediction = engine.assess(&request).map_err(|e| {
        tracing::info!(error = %e, "Rejected prediction request");
        AppError::from(e)
    })?;

    Ok(Json(PredictResponse {
        success: true,
        prediction,
    }))
}
