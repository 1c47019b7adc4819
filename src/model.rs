//! Persisted linear model artifact
//!
//! The trainer writes `amu_predictor.json` plus a `model_manifest.json`
//! sidecar carrying the artifact's SHA-256. The service reads both once at
//! startup.

use crate::features::{FeatureVector, FEATURE_NAMES};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const FORMAT_VERSION: u32 = 1;
pub const MANIFEST_FILE: &str = "model_manifest.json";

/// Why the artifact could not be used. `NotFound` is the normal state of a
/// fresh install; every other variant points at a broken deployment.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("model artifact not found at {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("corrupt model artifact {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("checksum mismatch for {path}: manifest {expected}, file {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("incompatible model artifact {path}: {reason}")]
    Incompatible { path: PathBuf, reason: String },
}

impl ModelLoadError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Held-out evaluation recorded by the trainer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub mse: f64,
    pub r2: f64,
    pub n_train: usize,
    pub n_test: usize,
}

/// Ordinary least squares regression over the five request features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub format_version: u32,
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub trained_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<TrainingMetrics>,
}

impl LinearModel {
    pub fn new(coefficients: [f64; 5], intercept: f64) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            coefficients: coefficients.to_vec(),
            intercept,
            trained_at: Utc::now(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: TrainingMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Raw regression output. Unbounded, and NaN if a weight is.
    pub fn predict(&self, features: &FeatureVector) -> f64 {
        self.intercept
            + features
                .to_array()
                .iter()
                .zip(self.coefficients.iter())
                .map(|(x, w)| x * w)
                .sum::<f64>()
    }

    fn check_compatible(&self) -> Result<(), String> {
        if self.format_version != FORMAT_VERSION {
            return Err(format!(
                "format_version {} (expected {FORMAT_VERSION})",
                self.format_version
            ));
        }
        if self.feature_names != FEATURE_NAMES {
            return Err(format!(
                "feature order {:?} (expected {:?})",
                self.feature_names, FEATURE_NAMES
            ));
        }
        if self.coefficients.len() != FEATURE_NAMES.len() {
            return Err(format!(
                "{} coefficients for {} features",
                self.coefficients.len(),
                FEATURE_NAMES.len()
            ));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|w| !w.is_finite()) {
            return Err("non-finite weights".to_string());
        }
        Ok(())
    }

    /// Write the artifact and its manifest next to it.
    pub fn save(&self, path: &Path) -> io::Result<ModelManifest> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let body = serde_json::to_vec_pretty(self)?;
        fs::write(path, &body)?;

        let manifest = ModelManifest {
            model_file: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            sha256: sha256_hex(&body),
            format_version: self.format_version,
            feature_names: self.feature_names.clone(),
            trained_at: self.trained_at,
        };
        fs::write(manifest_path(path), serde_json::to_vec_pretty(&manifest)?)?;
        Ok(manifest)
    }
}

/// Deployment record written beside the artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelManifest {
    pub model_file: String,
    pub sha256: String,
    pub format_version: u32,
    pub feature_names: Vec<String>,
    pub trained_at: DateTime<Utc>,
}

pub fn manifest_path(model_path: &Path) -> PathBuf {
    model_path.with_file_name(MANIFEST_FILE)
}

pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Load and validate the artifact at `path`.
pub fn load_model(path: &Path) -> Result<LinearModel, ModelLoadError> {
    let body = match fs::read(path) {
        Ok(body) => body,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ModelLoadError::NotFound(path.to_path_buf()))
        }
        Err(source) => {
            return Err(ModelLoadError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    verify_manifest(path, &body)?;

    let model: LinearModel =
        serde_json::from_slice(&body).map_err(|source| ModelLoadError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;

    model
        .check_compatible()
        .map_err(|reason| ModelLoadError::Incompatible {
            path: path.to_path_buf(),
            reason,
        })?;

    Ok(model)
}

fn verify_manifest(path: &Path, body: &[u8]) -> Result<(), ModelLoadError> {
    let manifest_path = manifest_path(path);
    let raw = match fs::read(&manifest_path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(source) => {
            return Err(ModelLoadError::Io {
                path: manifest_path,
                source,
            })
        }
    };

    let manifest: ModelManifest =
        serde_json::from_slice(&raw).map_err(|source| ModelLoadError::Corrupt {
            path: manifest_path.clone(),
            source,
        })?;

    let actual = sha256_hex(body);
    if !manifest.sha256.eq_ignore_ascii_case(&actual) {
        return Err(ModelLoadError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: manifest.sha256,
            actual,
        });
    }
    Ok(())
}
