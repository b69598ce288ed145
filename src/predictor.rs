//! Position-debiased prediction.
//!
//! Every request scores the bout twice, once with each fighter in the red
//! position, and combines the two so that whatever the model learned about
//! corner assignment cancels out.
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::artifact::TrainedModel;
use crate::error::Result;
use crate::features;
use crate::model::WinProbability;
use crate::stats::StatsStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub winner: String,
    pub red_fighter: String,
    pub blue_fighter: String,
    pub red_win_probability: f64,
    pub blue_win_probability: f64,
    pub confidence: f64,
}

/// Fighter-A win probability from the two corner orderings.
///
/// `p_forward` scores A in red, `p_swapped` scores B in red. For a model with
/// `P(v) + P(-v) = 1` this returns `p_forward` unchanged.
pub fn debias(p_forward: f64, p_swapped: f64) -> f64 {
    (p_forward + (1.0 - p_swapped)) / 2.0
}

/// Immutable prediction context: the roster and the model, shared by every
/// request. Cloning is cheap and clones are safe to use from any thread.
#[derive(Debug)]
pub struct DebiasedPredictor<M = TrainedModel> {
    store: Arc<StatsStore>,
    model: Arc<M>,
}

impl<M> Clone for DebiasedPredictor<M> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            model: Arc::clone(&self.model),
        }
    }
}

impl DebiasedPredictor<TrainedModel> {
    /// Loads and validates the model before the roster, so a schema
    /// mismatch stops startup without touching the stats table.
    pub fn load(stats_path: impl AsRef<Path>, model_path: impl AsRef<Path>) -> Result<Self> {
        let model = TrainedModel::load(model_path)?;
        let store = StatsStore::load(stats_path)?;
        Ok(Self::new(store, model))
    }
}

impl<M: WinProbability> DebiasedPredictor<M> {
    pub fn new(store: StatsStore, model: M) -> Self {
        Self {
            store: Arc::new(store),
            model: Arc::new(model),
        }
    }

    pub fn store(&self) -> &StatsStore {
        &self.store
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Predicts the bout between `name_a` (red) and `name_b` (blue).
    ///
    /// Both names are resolved before the model runs; an unknown name fails
    /// with `NotFound`. When the averaged probabilities tie at exactly 0.5
    /// the winner is `name_b`.
    pub fn predict(&self, name_a: &str, name_b: &str) -> Result<Prediction> {
        let a = self.store.lookup(name_a)?;
        let b = self.store.lookup(name_b)?;

        let forward = features::build(a, b);
        // Same as build(b, a): see features::tests::swapping_fighters_negates_exactly.
        let swapped = -forward;

        let p_forward = self.model.red_win_probability(&forward);
        let p_swapped = self.model.red_win_probability(&swapped);

        let prob_a = debias(p_forward, p_swapped);
        let prob_b = 1.0 - prob_a;
        debug!(
            red = name_a,
            blue = name_b,
            p_forward,
            p_swapped,
            prob_a,
            "scored bout"
        );

        let (winner, confidence) = if prob_a > prob_b {
            (name_a, prob_a)
        } else {
            (name_b, prob_b)
        };

        Ok(Prediction {
            winner: winner.to_string(),
            red_fighter: name_a.to_string(),
            blue_fighter: name_b.to_string(),
            red_win_probability: prob_a,
            blue_win_probability: prob_b,
            confidence,
        })
    }
}
