// Turning historical fights into labelled training rows, and the mirror augmentation.
use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::features::{self, FeatureVector};
use crate::io::FightRecord;
use crate::stats::{Stat, StatsStore};

/// Result of a bout from the red corner's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    RedWin,
    BlueWin,
    /// Draw, no-contest, or a winner that matches neither corner.
    LabelIndeterminate,
}

impl Outcome {
    pub fn of(fight: &FightRecord) -> Outcome {
        match fight.winner.as_deref() {
            Some(w) if w == fight.red_fighter => Outcome::RedWin,
            Some(w) if w == fight.blue_fighter => Outcome::BlueWin,
            _ => Outcome::LabelIndeterminate,
        }
    }

    /// 1 when the red/first fighter won.
    pub fn label(self) -> Option<u8> {
        match self {
            Outcome::RedWin => Some(1),
            Outcome::BlueWin => Some(0),
            Outcome::LabelIndeterminate => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingRow {
    pub features: FeatureVector,
    pub label: u8,
}

impl TrainingRow {
    /// The same bout with the corners swapped.
    pub fn mirrored(&self) -> TrainingRow {
        TrainingRow {
            features: -self.features,
            label: 1 - self.label,
        }
    }
}

/// A training row together with the bout it came from.
#[derive(Debug, Clone)]
pub struct AssembledRow {
    pub red_fighter: String,
    pub blue_fighter: String,
    pub row: TrainingRow,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssemblyReport {
    pub total_fights: usize,
    pub kept: usize,
    pub indeterminate: usize,
    pub unknown_fighter: usize,
    pub zero_filled: BTreeMap<&'static str, usize>,
}

/// Joins fights with fighter statistics and labels each bout.
///
/// Draws and no-contests are dropped, as are bouts where either fighter is
/// missing from the store. Features come from the same builder the
/// predictor uses.
pub fn build_training_rows(
    fights: &[FightRecord],
    store: &StatsStore,
) -> (Vec<AssembledRow>, AssemblyReport) {
    let mut report = AssemblyReport {
        total_fights: fights.len(),
        ..Default::default()
    };
    let mut rows = Vec::with_capacity(fights.len());

    for fight in fights {
        let Some(label) = Outcome::of(fight).label() else {
            debug!(red = %fight.red_fighter, blue = %fight.blue_fighter, "no resolvable winner, skipped");
            report.indeterminate += 1;
            continue;
        };

        let (red, blue) = match (
            store.lookup(&fight.red_fighter),
            store.lookup(&fight.blue_fighter),
        ) {
            (Ok(r), Ok(b)) => (r, b),
            (Err(e), _) | (_, Err(e)) => {
                debug!("skipping bout {} vs {}: {}", fight.red_fighter, fight.blue_fighter, e);
                report.unknown_fighter += 1;
                continue;
            }
        };

        let (features, missing) = features::build_with_report(red, blue);
        for m in missing {
            *report.zero_filled.entry(m.stat.name()).or_default() += 1;
        }

        rows.push(AssembledRow {
            red_fighter: fight.red_fighter.clone(),
            blue_fighter: fight.blue_fighter.clone(),
            row: TrainingRow { features, label },
        });
    }

    report.kept = rows.len();
    info!(
        total = report.total_fights,
        kept = report.kept,
        indeterminate = report.indeterminate,
        unknown_fighter = report.unknown_fighter,
        "assembled training rows"
    );
    for stat in Stat::ALL {
        if let Some(count) = report.zero_filled.get(stat.name()) {
            warn!(stat = %stat, count, "statistic zero-filled in training rows");
        }
    }

    (rows, report)
}

/// Emits every row followed by its corner-swapped mirror, so the output is
/// exactly twice the input and symmetric under feature negation.
pub fn augment(rows: &[TrainingRow]) -> Vec<TrainingRow> {
    let mut out = Vec::with_capacity(rows.len() * 2);
    for row in rows {
        out.push(*row);
        out.push(row.mirrored());
    }
    debug!(original = rows.len(), augmented = out.len(), "augmented dataset");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FEATURE_COUNT;
    use crate::stats::FighterStats;
    use proptest::prelude::*;

    fn fight(red: &str, blue: &str, winner: Option<&str>) -> FightRecord {
        FightRecord {
            red_fighter: red.into(),
            blue_fighter: blue.into(),
            winner: winner.map(str::to_string),
        }
    }

    fn store() -> StatsStore {
        StatsStore::from_stats(vec![
            FighterStats::new("A", [Some(2.0); FEATURE_COUNT]),
            FighterStats::new("B", [Some(1.0); FEATURE_COUNT]).with(Stat::TdDefence, None),
            FighterStats::new("C", [Some(1.5); FEATURE_COUNT]),
        ])
    }

    #[test]
    fn outcome_resolves_from_winner_name() {
        assert_eq!(Outcome::of(&fight("A", "B", Some("A"))), Outcome::RedWin);
        assert_eq!(Outcome::of(&fight("A", "B", Some("B"))), Outcome::BlueWin);
        assert_eq!(Outcome::of(&fight("A", "B", None)), Outcome::LabelIndeterminate);
        assert_eq!(
            Outcome::of(&fight("A", "B", Some("Somebody Else"))),
            Outcome::LabelIndeterminate
        );
    }

    #[test]
    fn drops_indeterminate_and_unknown_fighters() {
        let fights = vec![
            fight("A", "B", Some("A")),
            fight("C", "A", Some("A")),
            fight("A", "C", None),
            fight("A", "Ghost", Some("A")),
        ];
        let (rows, report) = build_training_rows(&fights, &store());

        assert_eq!(rows.len(), 2);
        assert_eq!(report.total_fights, 4);
        assert_eq!(report.kept, 2);
        assert_eq!(report.indeterminate, 1);
        assert_eq!(report.unknown_fighter, 1);
        assert_eq!(report.zero_filled.get("td_defence"), Some(&1));

        assert_eq!(rows[0].row.label, 1);
        assert_eq!(rows[0].row.features.get(Stat::ReachCm), 1.0);
        assert_eq!(rows[0].row.features.get(Stat::TdDefence), 0.0);
        assert_eq!(rows[1].row.label, 0);
        assert_eq!(rows[1].row.features.get(Stat::ReachCm), -0.5);
    }

    #[test]
    fn augment_doubles_and_pairs_rows() {
        let rows: Vec<TrainingRow> = (0..5)
            .map(|i| TrainingRow {
                features: FeatureVector::new([i as f64 + 0.5; FEATURE_COUNT]),
                label: (i % 2) as u8,
            })
            .collect();
        let out = augment(&rows);
        assert_eq!(out.len(), 10);
        for row in &rows {
            assert!(out.contains(row));
            assert!(out.contains(&TrainingRow {
                features: -row.features,
                label: 1 - row.label,
            }));
        }
    }

    proptest! {
        #[test]
        fn every_row_has_its_mirror(
            raw in prop::collection::vec((prop::array::uniform9(-100.0f64..100.0), 0u8..=1), 0..40)
        ) {
            let rows: Vec<TrainingRow> = raw
                .into_iter()
                .map(|(v, label)| TrainingRow { features: FeatureVector::new(v), label })
                .collect();
            let out = augment(&rows);
            prop_assert_eq!(out.len(), rows.len() * 2);
            for row in &rows {
                prop_assert!(out.contains(row));
                prop_assert!(out.contains(&row.mirrored()));
            }
            let positives = out.iter().filter(|r| r.label == 1).count();
            prop_assert_eq!(positives, rows.len());
        }
    }
}
