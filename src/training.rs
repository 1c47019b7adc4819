//! Offline training for the MRL risk model
//!
//! Generates synthetic regimens, fits ordinary least squares by the normal
//! equations and evaluates on a held-out split. The result is a
//! [`LinearModel`] the service can load.

use crate::features::{FeatureVector, FEATURE_NAMES};
use crate::model::{LinearModel, TrainingMetrics};
use ndarray::{s, Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

const FREQUENCY_CODES: [f64; 4] = [1.0, 2.0, 3.0, 7.0];
const DRUG_TYPE_CODES: [f64; 5] = [1.0, 2.0, 3.0, 4.0, 0.0];
const VIOLATION_COUNTS: [f64; 4] = [0.0, 1.0, 2.0, 3.0];
const NOISE_STD: f64 = 0.1;
const RIDGE: f64 = 1e-10;

#[derive(Error, Debug)]
pub enum TrainingError {
    #[error("no training samples")]
    Empty,

    #[error("dimension mismatch: {rows} feature rows, {targets} targets")]
    DimensionMismatch { rows: usize, targets: usize },

    #[error("normal equations are singular")]
    SingularMatrix,

    #[error("test fraction must be in (0, 1), got {0}")]
    InvalidSplit(f64),

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// One synthetic regimen with its target score. Codes match the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    pub dosage: f64,
    pub frequency: f64,
    pub drug_type: f64,
    pub animal_age: f64,
    pub previous_violations: f64,
    pub risk_score: f64,
}

impl TrainingSample {
    pub fn features(&self) -> [f64; 5] {
        [
            self.dosage,
            self.frequency,
            self.drug_type,
            self.animal_age,
            self.previous_violations,
        ]
    }
}

/// Risk grows with dosage, frequency, drug class and violation history.
/// Animal age carries no signal.
pub fn synthetic_target(features: &[f64; 5]) -> f64 {
    let [dosage, frequency, drug_type, _animal_age, previous_violations] = *features;
    dosage * 0.003 + frequency * 0.05 + drug_type * 0.02 + previous_violations * 0.15
}

pub fn generate_synthetic(n: usize, seed: u64) -> Vec<TrainingSample> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let features = [
                rng.random_range(0.0..200.0),
                pick(&FREQUENCY_CODES, &mut rng),
                pick(&DRUG_TYPE_CODES, &mut rng),
                rng.random_range(0.5..10.0),
                pick(&VIOLATION_COUNTS, &mut rng),
            ];
            let noisy = synthetic_target(&features) + NOISE_STD * standard_normal(&mut rng);
            let [dosage, frequency, drug_type, animal_age, previous_violations] = features;
            TrainingSample {
                dosage,
                frequency,
                drug_type,
                animal_age,
                previous_violations,
                risk_score: noisy.clamp(0.0, 1.0),
            }
        })
        .collect()
}

fn pick(values: &[f64], rng: &mut StdRng) -> f64 {
    values.choose(rng).copied().unwrap_or_default()
}

// Box-Muller
fn standard_normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = 1.0 - rng.random::<f64>();
    let u2: f64 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Shuffle and split; the test side gets `ceil(n * test_fraction)` samples.
pub fn train_test_split(
    samples: &[TrainingSample],
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<TrainingSample>, Vec<TrainingSample>), TrainingError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(TrainingError::InvalidSplit(test_fraction));
    }
    let mut shuffled = samples.to_vec();
    shuffled.shuffle(&mut StdRng::seed_from_u64(seed));

    let n_test = ((samples.len() as f64) * test_fraction).ceil() as usize;
    let train = shuffled.split_off(n_test.min(shuffled.len()));
    Ok((train, shuffled))
}

/// Fit `y = b0 + Σ bi·xi` by solving `(X'X) b = X'y`.
pub fn fit_ols(x: &[[f64; 5]], y: &[f64]) -> Result<LinearModel, TrainingError> {
    if x.is_empty() {
        return Err(TrainingError::Empty);
    }
    if x.len() != y.len() {
        return Err(TrainingError::DimensionMismatch {
            rows: x.len(),
            targets: y.len(),
        });
    }

    // leading ones column carries the intercept
    let p = FEATURE_NAMES.len() + 1;
    let design = Array2::from_shape_fn((x.len(), p), |(i, j)| {
        if j == 0 {
            1.0
        } else {
            x[i][j - 1]
        }
    });
    let targets = ArrayView1::from(y);

    let xt = design.t();
    let mut xtx = xt.dot(&design);
    let xty = xt.dot(&targets);
    for i in 0..p {
        xtx[[i, i]] += RIDGE;
    }

    let beta = cholesky_solve(&xtx, &xty)?;
    let mut coefficients = [0.0; 5];
    for (slot, b) in coefficients.iter_mut().zip(beta.slice(s![1..])) {
        *slot = *b;
    }
    Ok(LinearModel::new(coefficients, beta[0]))
}

fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>, TrainingError> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[[i, k]] * l[[j, k]]).sum();
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 || !diag.is_finite() {
                    return Err(TrainingError::SingularMatrix);
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // L z = b
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let sum: f64 = (0..i).map(|j| l[[i, j]] * z[j]).sum();
        z[i] = (b[i] - sum) / l[[i, i]];
    }

    // L' x = z
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let sum: f64 = ((i + 1)..n).map(|j| l[[j, i]] * x[j]).sum();
        x[i] = (z[i] - sum) / l[[i, i]];
    }
    Ok(x)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionMetrics {
    pub mse: f64,
    pub r2: f64,
}

impl RegressionMetrics {
    pub fn calculate(y_true: &[f64], y_pred: &[f64]) -> Self {
        let n = y_true.len() as f64;
        let ss_res: f64 = y_true
            .iter()
            .zip(y_pred)
            .map(|(t, p)| (t - p).powi(2))
            .sum();
        let mean = y_true.iter().sum::<f64>() / n;
        let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

        Self {
            mse: ss_res / n,
            r2: if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 },
        }
    }
}

pub fn write_training_csv(path: &Path, samples: &[TrainingSample]) -> Result<(), TrainingError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for sample in samples {
        writer.serialize(sample)?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct TrainingOptions {
    pub samples: usize,
    pub seed: u64,
    pub test_fraction: f64,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            samples: 1000,
            seed: 42,
            test_fraction: 0.2,
        }
    }
}

pub struct TrainingRun {
    pub samples: Vec<TrainingSample>,
    pub model: LinearModel,
    pub metrics: TrainingMetrics,
}

/// Generate, split, fit and evaluate. Writing results is left to the caller.
pub fn run_training(options: &TrainingOptions) -> Result<TrainingRun, TrainingError> {
    let samples = generate_synthetic(options.samples, options.seed);
    let (train, test) = train_test_split(&samples, options.test_fraction, options.seed)?;
    if test.is_empty() {
        return Err(TrainingError::Empty);
    }

    let x_train: Vec<[f64; 5]> = train.iter().map(TrainingSample::features).collect();
    let y_train: Vec<f64> = train.iter().map(|s| s.risk_score).collect();
    let model = fit_ols(&x_train, &y_train)?;

    let y_test: Vec<f64> = test.iter().map(|s| s.risk_score).collect();
    let y_pred: Vec<f64> = test
        .iter()
        .map(|s| model.predict(&FeatureVector::from_array(s.features())))
        .collect();
    let eval = RegressionMetrics::calculate(&y_test, &y_pred);

    let metrics = TrainingMetrics {
        mse: eval.mse,
        r2: eval.r2,
        n_train: train.len(),
        n_test: test.len(),
    };
    Ok(TrainingRun {
        samples,
        model: model.with_metrics(metrics),
        metrics,
    })
}
