//! Predicts the winner of a UFC bout from the two fighters' career
//! statistics, with the red/blue corner bias of historical data removed at
//! both training time (mirror augmentation) and prediction time (two-sided
//! scoring).
pub mod artifact;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod model;
pub mod plot;
pub mod predictor;
pub mod preprocess;
pub mod scaler;
pub mod stats;

pub use artifact::TrainedModel;
pub use error::{PredictorError, Result};
pub use features::{FeatureVector, FEATURE_NAMES};
pub use predictor::{DebiasedPredictor, Prediction};
pub use stats::{FighterStats, Stat, StatsStore};
