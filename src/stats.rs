//! Fighter career statistics and the in-memory roster they are served from.
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::Path;

use tracing::warn;

use crate::error::{PredictorError, Result};
use crate::io::{self, FighterRecord};

/// The tracked career statistics, in feature order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    ReachCm,
    SsLandedPerMinute,
    SsAccuracy,
    SsAbsorbedPerMin,
    SsDefence,
    AvgTdPer15,
    TdAccuracy,
    TdDefence,
    AvgSubAttemptPer15,
}

impl Stat {
    pub const COUNT: usize = 9;

    pub const ALL: [Stat; Stat::COUNT] = [
        Stat::ReachCm,
        Stat::SsLandedPerMinute,
        Stat::SsAccuracy,
        Stat::SsAbsorbedPerMin,
        Stat::SsDefence,
        Stat::AvgTdPer15,
        Stat::TdAccuracy,
        Stat::TdDefence,
        Stat::AvgSubAttemptPer15,
    ];

    /// Column name, shared by the fighter table and the persisted feature list.
    pub const fn name(self) -> &'static str {
        match self {
            Stat::ReachCm => "reach_cm",
            Stat::SsLandedPerMinute => "ss_landed_per_minute",
            Stat::SsAccuracy => "ss_accuracy",
            Stat::SsAbsorbedPerMin => "ss_absorbed_per_min",
            Stat::SsDefence => "ss_defence",
            Stat::AvgTdPer15 => "avg_td_per_15",
            Stat::TdAccuracy => "td_accuracy",
            Stat::TdDefence => "td_defence",
            Stat::AvgSubAttemptPer15 => "avg_sub_attempt_per_15",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fighter's full record. Individual values may be absent, but a record
/// is never partially present in the store.
#[derive(Debug, Clone, PartialEq)]
pub struct FighterStats {
    pub name: String,
    values: [Option<f64>; Stat::COUNT],
}

impl FighterStats {
    pub fn new(name: impl Into<String>, values: [Option<f64>; Stat::COUNT]) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn get(&self, stat: Stat) -> Option<f64> {
        self.values[stat as usize]
    }

    pub fn with(mut self, stat: Stat, value: Option<f64>) -> Self {
        self.values[stat as usize] = value;
        self
    }
}

impl From<FighterRecord> for FighterStats {
    fn from(r: FighterRecord) -> Self {
        FighterStats::new(
            r.name,
            [
                r.reach_cm,
                r.ss_landed_per_minute,
                r.ss_accuracy,
                r.ss_absorbed_per_min,
                r.ss_defence,
                r.avg_td_per_15,
                r.td_accuracy,
                r.td_defence,
                r.avg_sub_attempt_per_15,
            ],
        )
    }
}

/// Read-only roster keyed by exact fighter name.
#[derive(Debug, Clone, Default)]
pub struct StatsStore {
    by_name: HashMap<String, FighterStats>,
    names: Vec<String>,
}

impl StatsStore {
    /// Builds the store; when a name repeats, the first record is kept.
    pub fn from_stats(records: impl IntoIterator<Item = FighterStats>) -> Self {
        let mut by_name = HashMap::new();
        let mut names = BTreeSet::new();
        for stats in records {
            if by_name.contains_key(&stats.name) {
                warn!(fighter = %stats.name, "duplicate fighter record ignored");
                continue;
            }
            names.insert(stats.name.clone());
            by_name.insert(stats.name.clone(), stats);
        }
        Self {
            by_name,
            names: names.into_iter().collect(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let records = io::load_fighters(path)?;
        Ok(Self::from_stats(records.into_iter().map(FighterStats::from)))
    }

    /// Exact, case-sensitive lookup.
    pub fn lookup(&self, name: &str) -> Result<&FighterStats> {
        self.by_name
            .get(name)
            .ok_or_else(|| PredictorError::NotFound(name.to_string()))
    }

    /// Sorted, de-duplicated roster.
    pub fn list_names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
