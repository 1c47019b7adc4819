//! Error types for the MRL risk service
//!
//! `RiskError` covers everything that can go wrong while turning a
//! request into an assessment. Model loading and training carry their own
//! error enums because they happen outside the request path.

use thiserror::Error;

/// Main error type for the request-to-decision pipeline
#[derive(Error, Debug)]
pub enum RiskError {
    #[error("Invalid value for {field}: {message}")]
    InvalidInput { field: String, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result alias used across the crate
pub type RiskResult<T> = Result<T, RiskError>;

impl RiskError {
    /// Create an input coercion error for a named request field
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the caller sent something we refuse to score
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }
}

impl From<figment::Error> for RiskError {
    fn from(err: figment::Error) -> Self {
        RiskError::config(err.to_string())
    }
}
