//! Differential feature construction.
//!
//! This is the only place fighter statistics become model inputs. Training
//! and prediction both call [`build_with_report`], so the column order in
//! [`FEATURE_NAMES`] is the order the persisted model was fitted on.
use std::ops::Neg;

use tracing::warn;

use crate::stats::{FighterStats, Stat};

pub const FEATURE_COUNT: usize = Stat::COUNT;

/// Ordered feature names. Persisted with every model and compared on load.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    Stat::ReachCm.name(),
    Stat::SsLandedPerMinute.name(),
    Stat::SsAccuracy.name(),
    Stat::SsAbsorbedPerMin.name(),
    Stat::SsDefence.name(),
    Stat::AvgTdPer15.name(),
    Stat::TdAccuracy.name(),
    Stat::TdDefence.name(),
    Stat::AvgSubAttemptPer15.name(),
];

/// `red - blue` per tracked statistic, in [`FEATURE_NAMES`] order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, stat: Stat) -> f64 {
        self.0[stat as usize]
    }
}

impl Neg for FeatureVector {
    type Output = FeatureVector;

    fn neg(self) -> FeatureVector {
        FeatureVector(self.0.map(|v| -v))
    }
}

/// A statistic that was absent for one side and zero-filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingStatistic {
    pub fighter: String,
    pub stat: Stat,
}

fn usable(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// The zero-fill policy: a differential with a missing or non-finite side is 0.
pub fn differential_or_zero(red: Option<f64>, blue: Option<f64>) -> f64 {
    match (usable(red), usable(blue)) {
        (Some(r), Some(b)) => r - b,
        _ => 0.0,
    }
}

/// Builds the differential vector and reports every zero-filled entry.
pub fn build_with_report(
    red: &FighterStats,
    blue: &FighterStats,
) -> (FeatureVector, Vec<MissingStatistic>) {
    let mut values = [0.0; FEATURE_COUNT];
    let mut missing = Vec::new();

    for stat in Stat::ALL {
        let (r, b) = (red.get(stat), blue.get(stat));
        values[stat as usize] = differential_or_zero(r, b);
        for (side, value) in [(red, r), (blue, b)] {
            if usable(value).is_none() {
                missing.push(MissingStatistic {
                    fighter: side.name.clone(),
                    stat,
                });
            }
        }
    }

    (FeatureVector(values), missing)
}

/// Builds the differential vector, logging a warning per zero-filled entry.
pub fn build(red: &FighterStats, blue: &FighterStats) -> FeatureVector {
    let (vector, missing) = build_with_report(red, blue);
    for m in &missing {
        warn!(fighter = %m.fighter, stat = %m.stat, "missing statistic, differential zero-filled");
    }
    vector
}
