//! The persisted model bundle.
//!
//! Classifier parameters, scaler parameters and the ordered feature names
//! are written as one file and validated as one unit on load. A
//! [`TrainedModel`] can only be obtained from a bundle whose feature list
//! matches [`FEATURE_NAMES`] exactly.
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PredictorError, Result};
use crate::features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
use crate::model::{LogisticModel, TrainConfig, WinProbability};
use crate::scaler::StandardScaler;

/// Bump whenever the bundle layout or the feature builder changes.
pub const BUNDLE_FORMAT: &str = "ufc-predictor/bundle-v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetadata {
    pub format: String,
    pub trained_at: DateTime<Utc>,
    pub test_accuracy: f64,
    pub num_features: usize,
    pub num_training_samples: usize,
    pub num_test_samples: usize,
    pub hyperparameters: TrainConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    pub format: String,
    pub feature_names: Vec<String>,
    pub scaler: StandardScaler,
    pub classifier: LogisticModel,
    pub metadata: TrainingMetadata,
}

/// A validated model: scaler and classifier agree with the current feature layout.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    feature_names: Vec<String>,
    scaler: StandardScaler,
    classifier: LogisticModel,
    metadata: TrainingMetadata,
}

/// Fails with `SchemaMismatch` unless `names` equals [`FEATURE_NAMES`] in
/// length and order.
pub fn check_feature_names(names: &[String]) -> Result<()> {
    if names.iter().map(String::as_str).eq(FEATURE_NAMES.iter().copied()) {
        Ok(())
    } else {
        Err(PredictorError::SchemaMismatch {
            expected: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            found: names.to_vec(),
        })
    }
}

fn check_len(what: &str, len: usize, names: &[String]) -> Result<()> {
    if len == FEATURE_COUNT {
        return Ok(());
    }
    Err(PredictorError::SchemaMismatch {
        expected: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        found: vec![format!("{} {} values for {} features", what, len, names.len())],
    })
}

fn check_finite(what: &str, values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        None => Ok(()),
        Some(i) => Err(PredictorError::CorruptArtifact(format!(
            "{} [{}] is {}",
            what, i, values[i]
        ))),
    }
}

/// Scale divides every feature, so it must be finite and strictly positive.
fn check_scale(scale: &[f64]) -> Result<()> {
    match scale.iter().position(|s| !(s.is_finite() && *s > 0.0)) {
        None => Ok(()),
        Some(i) => Err(PredictorError::CorruptArtifact(format!(
            "scaler scale [{}] is {}",
            FEATURE_NAMES[i], scale[i]
        ))),
    }
}

impl TrainedModel {
    pub fn new(
        feature_names: Vec<String>,
        scaler: StandardScaler,
        classifier: LogisticModel,
        metadata: TrainingMetadata,
    ) -> Result<Self> {
        check_feature_names(&feature_names)?;
        check_len("scaler mean", scaler.mean.len(), &feature_names)?;
        check_len("scaler scale", scaler.scale.len(), &feature_names)?;
        check_len("classifier", classifier.weights.len(), &feature_names)?;
        check_finite("scaler mean", &scaler.mean)?;
        check_scale(&scaler.scale)?;
        check_finite("classifier weight", &classifier.weights)?;
        check_finite("classifier intercept", &[classifier.intercept])?;
        Ok(Self {
            feature_names,
            scaler,
            classifier,
            metadata,
        })
    }

    pub fn from_bundle(bundle: ModelBundle) -> Result<Self> {
        if bundle.format != BUNDLE_FORMAT {
            return Err(PredictorError::BundleVersion {
                expected: BUNDLE_FORMAT.to_string(),
                found: bundle.format,
            });
        }
        Self::new(
            bundle.feature_names,
            bundle.scaler,
            bundle.classifier,
            bundle.metadata,
        )
    }

    pub fn to_bundle(&self) -> ModelBundle {
        ModelBundle {
            format: BUNDLE_FORMAT.to_string(),
            feature_names: self.feature_names.clone(),
            scaler: self.scaler.clone(),
            classifier: self.classifier.clone(),
            metadata: self.metadata.clone(),
        }
    }

    /// Reads and validates a bundle. Any mismatch is fatal here, before a
    /// single prediction can be served.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bundle: ModelBundle = serde_json::from_slice(&fs::read(path)?)?;
        let model = Self::from_bundle(bundle)?;
        info!(
            path = %path.display(),
            trained_at = %model.metadata.trained_at,
            accuracy = model.metadata.test_accuracy,
            "model loaded"
        );
        Ok(model)
    }

    /// Writes the bundle and a `.meta.json` sidecar, each via
    /// write-then-rename so a reader never sees a half-written file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        write_atomic(path, &serde_json::to_vec_pretty(&self.to_bundle())?)?;
        write_atomic(
            &metadata_path(path),
            &serde_json::to_vec_pretty(&self.metadata)?,
        )?;
        info!(path = %path.display(), "model saved");
        Ok(())
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn classifier(&self) -> &LogisticModel {
        &self.classifier
    }

    pub fn metadata(&self) -> &TrainingMetadata {
        &self.metadata
    }
}

impl WinProbability for TrainedModel {
    fn red_win_probability(&self, features: &FeatureVector) -> f64 {
        self.classifier
            .probability(&self.scaler.transform_row(features.as_slice()))
    }
}

/// `models/ufc.json` -> `models/ufc.meta.json`
pub fn metadata_path(path: &Path) -> PathBuf {
    path.with_extension("meta.json")
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
