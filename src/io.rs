// Loading the two data feeds: the fighter statistics table and the fight results table.
// Both readers validate headers, skip unusable rows, and log what they skipped.
use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::features::FEATURE_NAMES;
use crate::preprocess::AssembledRow;

mod lenient_f64 {
    use serde::{Deserialize, Deserializer};

    /// Empty cells, `--` placeholders and anything unparsable become `None`.
    /// A trailing `%` on percentage columns is accepted.
    pub fn deserialize<'de, D>(d: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw.and_then(|s| {
            let s = s.trim().trim_end_matches('%').trim();
            s.parse::<f64>().ok().filter(|v| v.is_finite())
        }))
    }
}

mod blank_as_none {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(d: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()))
    }
}

/// One row of the fighter table. Columns other than these are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct FighterRecord {
    pub name: String,
    #[serde(default, deserialize_with = "lenient_f64::deserialize")]
    pub reach_cm: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64::deserialize")]
    pub ss_landed_per_minute: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64::deserialize")]
    pub ss_accuracy: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64::deserialize")]
    pub ss_absorbed_per_min: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64::deserialize")]
    pub ss_defence: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64::deserialize")]
    pub avg_td_per_15: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64::deserialize")]
    pub td_accuracy: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64::deserialize")]
    pub td_defence: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64::deserialize")]
    pub avg_sub_attempt_per_15: Option<f64>,
}

/// One historical bout. `winner` holds the winning fighter's name and is
/// empty for draws and no-contests.
#[derive(Debug, Clone, Deserialize)]
pub struct FightRecord {
    #[serde(rename = "RedFighter")]
    pub red_fighter: String,
    #[serde(rename = "BlueFighter")]
    pub blue_fighter: String,
    #[serde(rename = "Winner", default, deserialize_with = "blank_as_none::deserialize")]
    pub winner: Option<String>,
}

pub fn load_fighters(path: impl AsRef<Path>) -> Result<Vec<FighterRecord>> {
    load_csv(path.as_ref())
}

pub fn load_fights(path: impl AsRef<Path>) -> Result<Vec<FightRecord>> {
    load_csv(path.as_ref())
}

fn load_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path)?;
    let mut rdr = ReaderBuilder::new()
        .delimiter(b',')
        .flexible(true)
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(file);

    let headers = rdr.headers()?.clone();
    let expected_len = headers.len();

    let mut out = Vec::new();
    let mut skipped = 0usize;
    for result in rdr.records() {
        let raw: StringRecord = result?;
        let line = raw.position().map(|p| p.line()).unwrap_or(0);

        if raw.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        if raw.len() != expected_len {
            warn!(
                "skipping line {}: expected {} fields, found {}",
                line,
                expected_len,
                raw.len()
            );
            skipped += 1;
            continue;
        }

        match raw.deserialize::<T>(Some(&headers)) {
            Ok(rec) => out.push(rec),
            Err(e) => {
                warn!("skipping malformed record at line {}: {}", line, e);
                skipped += 1;
            }
        }
    }

    info!(
        path = %path.display(),
        loaded = out.len(),
        skipped,
        "loaded csv"
    );
    Ok(out)
}

/// Writes assembled (non-augmented) rows for auditing the training input.
pub fn write_rows(path: impl AsRef<Path>, rows: &[AssembledRow]) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path.as_ref())?;

    let mut header = vec!["red_fighter".to_string(), "blue_fighter".to_string()];
    header.extend(FEATURE_NAMES.iter().map(|n| n.to_string()));
    header.push("label".to_string());
    wtr.write_record(&header)?;

    for row in rows {
        let mut record = vec![row.red_fighter.clone(), row.blue_fighter.clone()];
        record.extend(row.row.features.as_slice().iter().map(|v| v.to_string()));
        record.push(row.row.label.to_string());
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}
