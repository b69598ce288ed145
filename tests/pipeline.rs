// End-to-end: CSV feeds -> training -> saved bundle -> debiased predictions.
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use approx::assert_abs_diff_eq;
use tempfile::tempdir;
use ufc_predictor::artifact::ModelBundle;
use ufc_predictor::model::{self, TrainConfig};
use ufc_predictor::preprocess::{augment, build_training_rows, TrainingRow};
use ufc_predictor::{io, DebiasedPredictor, PredictorError, StatsStore, TrainedModel};

const FIGHTERS: usize = 40;

fn fighter_name(i: usize) -> String {
    format!("Fighter {:02}", i)
}

/// Fighter `i` has skill `i`; striking output and defence track skill,
/// the rest is noise.
fn write_fighters(path: &Path) {
    let mut csv = String::from(
        "name,reach_cm,stance,dob,ss_landed_per_minute,ss_accuracy,ss_absorbed_per_min,\
ss_defence,avg_td_per_15,td_accuracy,td_defence,avg_sub_attempt_per_15\n",
    );
    for i in 0..FIGHTERS {
        let reach = 170 + (i * 7) % 15;
        let landed = 2.0 + 0.1 * i as f64;
        let accuracy = 40 + (i * 3) % 11;
        let absorbed = 4.5 - 0.05 * i as f64;
        let defence = 45 + i / 2;
        let td = ((i * 5) % 9) as f64 * 0.3;
        // one fighter with no recorded takedown accuracy
        let td_acc = if i == 13 { String::new() } else { format!("{}", 30 + (i * 11) % 20) };
        writeln!(
            csv,
            "{},{},Orthodox,1990-01-01,{:.2},{}%,{:.2},{}%,{:.1},{},{},{:.1}",
            fighter_name(i),
            reach,
            landed,
            accuracy,
            absorbed,
            defence,
            td,
            td_acc,
            50 + (i * 13) % 40,
            ((i * 3) % 5) as f64 * 0.2,
        )
        .unwrap();
    }
    fs::write(path, csv).unwrap();
}

/// The stronger fighter always wins; the favourite usually gets the red
/// corner, which is the bias the pipeline has to remove.
fn write_fights(path: &Path) {
    let mut csv = String::from("Event,RedFighter,BlueFighter,Winner,Weight_Class\n");
    let mut n = 0;
    for i in 0..FIGHTERS {
        for gap in 1..=6 {
            let j = i + gap;
            if j >= FIGHTERS {
                break;
            }
            let (strong, weak) = (fighter_name(j), fighter_name(i));
            let (red, blue) = if n % 10 < 7 { (&strong, &weak) } else { (&weak, &strong) };
            writeln!(csv, "UFC {},{},{},{},Middleweight", n, red, blue, strong).unwrap();
            n += 1;
        }
    }
    writeln!(csv, "UFC Draw,{},{},,Middleweight", fighter_name(3), fighter_name(4)).unwrap();
    writeln!(csv, "UFC NC,{},Nobody,{},Middleweight", fighter_name(3), fighter_name(3)).unwrap();
    fs::write(path, csv).unwrap();
}

fn train_into(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let stats_path = dir.join("fighter_data.csv");
    let fights_path = dir.join("UFC_Events.csv");
    let model_path = dir.join("models").join("ufc_model.json");
    write_fighters(&stats_path);
    write_fights(&fights_path);

    let store = StatsStore::load(&stats_path).unwrap();
    let fights = io::load_fights(&fights_path).unwrap();
    let (assembled, report) = build_training_rows(&fights, &store);
    assert_eq!(report.indeterminate, 1);
    assert_eq!(report.unknown_fighter, 1);
    assert!(report.zero_filled.get("td_accuracy").copied().unwrap_or(0) > 0);

    let rows: Vec<TrainingRow> = assembled.iter().map(|r| r.row).collect();
    let augmented = augment(&rows);
    assert_eq!(augmented.len(), rows.len() * 2);

    let trained = model::fit(&augmented, &TrainConfig::default()).unwrap();
    trained.save(&model_path).unwrap();
    (stats_path, model_path)
}

#[test]
fn trains_saves_loads_and_predicts() {
    let dir = tempdir().unwrap();
    let (stats_path, model_path) = train_into(dir.path());

    let predictor = DebiasedPredictor::load(&stats_path, &model_path).unwrap();
    assert!(predictor.model().metadata().test_accuracy > 0.8);
    assert_eq!(predictor.store().list_names().len(), FIGHTERS);

    let strong = fighter_name(FIGHTERS - 1);
    let weak = fighter_name(0);

    let p = predictor.predict(&strong, &weak).unwrap();
    assert_eq!(p.winner, strong);
    assert!(p.red_win_probability > 0.5);
    assert_abs_diff_eq!(p.red_win_probability + p.blue_win_probability, 1.0, epsilon = 1e-9);
    assert_eq!(p.confidence, p.red_win_probability);

    let q = predictor.predict(&weak, &strong).unwrap();
    assert_eq!(q.winner, strong);
    assert_abs_diff_eq!(p.red_win_probability, q.blue_win_probability, epsilon = 1e-9);
}

#[test]
fn unknown_fighter_is_not_found() {
    let dir = tempdir().unwrap();
    let (stats_path, model_path) = train_into(dir.path());
    let predictor = DebiasedPredictor::load(&stats_path, &model_path).unwrap();

    let err = predictor
        .predict("Unknown Fighter X", &fighter_name(5))
        .unwrap_err();
    assert!(matches!(err, PredictorError::NotFound(ref name) if name == "Unknown Fighter X"));
}

#[test]
fn tampered_feature_order_refuses_to_start() {
    let dir = tempdir().unwrap();
    let (stats_path, model_path) = train_into(dir.path());

    let mut bundle: ModelBundle = serde_json::from_slice(&fs::read(&model_path).unwrap()).unwrap();
    bundle.feature_names.swap(2, 5);
    fs::write(&model_path, serde_json::to_vec(&bundle).unwrap()).unwrap();

    assert!(matches!(
        TrainedModel::load(&model_path),
        Err(PredictorError::SchemaMismatch { .. })
    ));
    assert!(matches!(
        DebiasedPredictor::load(&stats_path, &model_path),
        Err(PredictorError::SchemaMismatch { .. })
    ));
}

#[test]
fn export_writes_one_line_per_kept_bout() {
    let dir = tempdir().unwrap();
    let stats_path = dir.path().join("fighter_data.csv");
    let fights_path = dir.path().join("UFC_Events.csv");
    write_fighters(&stats_path);
    write_fights(&fights_path);

    let store = StatsStore::load(&stats_path).unwrap();
    let fights = io::load_fights(&fights_path).unwrap();
    let (assembled, _) = build_training_rows(&fights, &store);

    let out = dir.path().join("rows.csv");
    io::write_rows(&out, &assembled).unwrap();
    let text = fs::read_to_string(&out).unwrap();
    let mut lines = text.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("red_fighter,blue_fighter,reach_cm,"));
    assert!(header.ends_with(",label"));
    assert_eq!(lines.count(), assembled.len());
}
