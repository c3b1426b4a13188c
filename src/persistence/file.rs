use super::{PersistenceResult, StateStore};
use crate::rota::{Rota, RotaCell};
use crate::state::{ScheduleState, StoredState};
use chrono::NaiveDate;
use log::debug;
use serde::Serialize;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Keeps the state record as one pretty-printed JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonFileStore {
    fn save_state(&self, state: &ScheduleState) -> PersistenceResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&self.path)?;
        serde_json::to_writer_pretty(file, state)?;
        debug!("saved state to {}", self.path.display());
        Ok(())
    }

    fn load_state(&self) -> PersistenceResult<Option<StoredState>> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        super::parse_stored_state(&json).map(Some)
    }
}

#[derive(Serialize)]
struct RotaCsvRecord {
    week: u32,
    month: String,
    start: String,
    end: String,
    dates: String,
    assignee: String,
    is_override: bool,
    is_current: bool,
}

impl From<&RotaCell> for RotaCsvRecord {
    fn from(cell: &RotaCell) -> Self {
        Self {
            week: cell.week.week_number,
            month: cell.week.month_name().to_string(),
            start: format_date(cell.week.start),
            end: format_date(cell.week.end),
            dates: cell.week.date_range_label(),
            assignee: cell.assignee.clone(),
            is_override: cell.is_override,
            is_current: cell.is_current,
        }
    }
}

/// Write one CSV row per week of the rota.
pub fn save_rota_to_csv<P: AsRef<Path>>(rota: &Rota, path: P) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for cell in rota.cells() {
        writer.serialize(RotaCsvRecord::from(cell))?;
    }
    writer.flush()?;
    Ok(())
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
