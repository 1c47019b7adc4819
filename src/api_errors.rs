use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::errors::RiskError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Failure envelope shared by every endpoint
#[derive(Serialize)]
struct ErrBody {
    success: bool,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::BadRequest(s) => s,
            AppError::Internal(s) => {
                tracing::error!("Internal error: {}", s);
                "Internal server error".to_string()
            }
        };
        (
            status,
            Json(ErrBody {
                success: false,
                message,
            }),
        )
            .into_response()
    }
}

impl From<RiskError> for AppError {
    fn from(err: RiskError) -> Self {
        if err.is_client_error() {
            AppError::bad_request(err.to_string())
        } else {
            AppError::internal(err.to_string())
        }
    }
}
