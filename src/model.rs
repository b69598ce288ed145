//! Fit the win-probability classifier on standardized, augmented rows.
use linfa::prelude::*;
use linfa_logistic::LogisticRegression;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::artifact::{TrainedModel, TrainingMetadata, BUNDLE_FORMAT};
use crate::error::{PredictorError, Result};
use crate::features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
use crate::preprocess::TrainingRow;
use crate::scaler::StandardScaler;

/// Anything that can score a bout for the fighter in the red (first) position.
pub trait WinProbability {
    /// `P(red wins | features)`.
    fn red_win_probability(&self, features: &FeatureVector) -> f64;
}

/// Binary logistic model over standardized features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub weights: Vec<f64>,
    pub intercept: f64,
}

impl LogisticModel {
    pub fn probability(&self, x: &[f64]) -> f64 {
        let z: f64 = self
            .weights
            .iter()
            .zip(x)
            .map(|(w, v)| w * v)
            .sum::<f64>()
            + self.intercept;
        sigmoid(z)
    }

    /// Weights paired with feature names, largest magnitude first.
    pub fn ranked_weights(&self) -> Vec<(String, f64)> {
        let mut vec: Vec<(String, f64)> = FEATURE_NAMES
            .iter()
            .zip(&self.weights)
            .map(|(&n, &w)| (n.to_string(), w))
            .collect();
        vec.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
        vec
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Share of rows held out for evaluation.
    pub test_ratio: f64,
    pub split_seed: u64,
    pub max_iterations: u64,
    pub gradient_tolerance: f64,
    /// L2 regularisation strength.
    pub alpha: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            test_ratio: 0.3,
            split_seed: 42,
            max_iterations: 300,
            gradient_tolerance: 1e-4,
            alpha: 1.0,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            return Err(PredictorError::Config(format!(
                "test_ratio must be in (0, 1), got {}",
                self.test_ratio
            )));
        }
        if self.max_iterations == 0 {
            return Err(PredictorError::Config("max_iterations must be positive".into()));
        }
        if !(self.gradient_tolerance > 0.0) {
            return Err(PredictorError::Config("gradient_tolerance must be positive".into()));
        }
        if !(self.alpha >= 0.0) {
            return Err(PredictorError::Config("alpha must be non-negative".into()));
        }
        Ok(())
    }
}

/// Shuffles `0..n` with a seeded RNG and returns `(train, test)` indices.
/// Both partitions are non-empty when `n >= 2`.
pub fn train_test_split(n: usize, test_ratio: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut idx: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    idx.shuffle(&mut rng);

    let n_test = ((n as f64 * test_ratio).ceil() as usize).clamp(1, n.saturating_sub(1).max(1));
    let test = idx.split_off(n - n_test.min(n));
    (idx, test)
}

fn to_matrix(rows: &[TrainingRow], idx: &[usize]) -> Array2<f64> {
    let mut x = Array2::<f64>::zeros((idx.len(), FEATURE_COUNT));
    for (i, &r) in idx.iter().enumerate() {
        for (j, v) in rows[r].features.as_slice().iter().enumerate() {
            x[(i, j)] = *v;
        }
    }
    x
}

/// Splits, standardizes on the training partition only, fits, and evaluates
/// on the held-out partition. `rows` are expected to be augmented already.
pub fn fit(rows: &[TrainingRow], config: &TrainConfig) -> Result<TrainedModel> {
    config.validate()?;
    if rows.len() < 2 {
        return Err(PredictorError::EmptyDataset(format!(
            "need at least 2 rows to split, got {}",
            rows.len()
        )));
    }

    let (train_idx, test_idx) = train_test_split(rows.len(), config.test_ratio, config.split_seed);
    debug!(train = train_idx.len(), test = test_idx.len(), "split rows");

    let x_train = to_matrix(rows, &train_idx);
    let scaler = StandardScaler::fit(x_train.view())?;
    let x_train = scaler.transform(x_train.view());
    let y_train: Array1<bool> = train_idx.iter().map(|&i| rows[i].label == 1).collect();

    let ds = Dataset::new(x_train, y_train);
    let fitted = LogisticRegression::default()
        .alpha(config.alpha)
        .max_iterations(config.max_iterations)
        .gradient_tolerance(config.gradient_tolerance)
        .fit(&ds)
        .map_err(|e| PredictorError::Training(e.to_string()))?;

    // Orient the weights so the model scores the `true` (red wins) class.
    let sign = if fitted.labels().pos.class { 1.0 } else { -1.0 };
    let classifier = LogisticModel {
        weights: fitted.params().iter().map(|w| w * sign).collect(),
        intercept: fitted.intercept() * sign,
    };

    let x_test = scaler.transform(to_matrix(rows, &test_idx).view());
    let correct = test_idx
        .iter()
        .enumerate()
        .filter(|&(k, &i)| {
            let x = x_test.row(k).to_vec();
            let predicted = u8::from(classifier.probability(&x) > 0.5);
            predicted == rows[i].label
        })
        .count();
    let test_accuracy = correct as f64 / test_idx.len() as f64;

    info!(
        accuracy = test_accuracy,
        train_rows = train_idx.len(),
        test_rows = test_idx.len(),
        "model fitted"
    );

    let metadata = TrainingMetadata {
        format: BUNDLE_FORMAT.to_string(),
        trained_at: chrono::Utc::now(),
        test_accuracy,
        num_features: FEATURE_COUNT,
        num_training_samples: train_idx.len(),
        num_test_samples: test_idx.len(),
        hyperparameters: config.clone(),
    };

    TrainedModel::new(
        FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        scaler,
        classifier,
        metadata,
    )
}
