use crate::config::StateDefaults;
use crate::state::{ScheduleState, StoredState};
use chrono::NaiveDate;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::{Error as SerdeJsonError, Map, Value};
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum PersistenceError {
    Serialization(SerdeJsonError),
    Io(io::Error),
    #[cfg(feature = "sqlite")]
    Sqlite(rusqlite::Error),
    Csv(csv::Error),
    InvalidData(String),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Serialization(err) => write!(f, "serialization error: {err}"),
            PersistenceError::Io(err) => write!(f, "io error: {err}"),
            #[cfg(feature = "sqlite")]
            PersistenceError::Sqlite(err) => write!(f, "sqlite error: {err}"),
            PersistenceError::Csv(err) => write!(f, "csv error: {err}"),
            PersistenceError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<SerdeJsonError> for PersistenceError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}

impl From<io::Error> for PersistenceError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<csv::Error> for PersistenceError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// A backend holding the single state record.
pub trait StateStore {
    fn save_state(&self, state: &ScheduleState) -> PersistenceResult<()>;
    /// `Ok(None)` when nothing has been stored yet.
    fn load_state(&self) -> PersistenceResult<Option<StoredState>>;
}

impl<S: StateStore + ?Sized> StateStore for Box<S> {
    fn save_state(&self, state: &ScheduleState) -> PersistenceResult<()> {
        (**self).save_state(state)
    }

    fn load_state(&self) -> PersistenceResult<Option<StoredState>> {
        (**self).load_state()
    }
}

/// Parse a stored record field by field.
///
/// Text that is not a JSON object is rejected as a whole. Inside an object a
/// field of the wrong type is dropped on its own, as is any override whose
/// name is not a string, so the remaining fields still load.
pub fn parse_stored_state(json: &str) -> PersistenceResult<StoredState> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Object(mut record) = value else {
        return Err(PersistenceError::InvalidData(
            "stored state is not a JSON object".into(),
        ));
    };

    Ok(StoredState {
        year: take_field(&mut record, "year"),
        neighbors: take_field(&mut record, "neighbors"),
        address: take_field(&mut record, "address"),
        custom_assignments: take_field::<Map<String, Value>>(&mut record, "customAssignments")
            .map(|assignments| {
                assignments
                    .into_iter()
                    .filter_map(|(key, name)| match name {
                        Value::String(name) => Some((key, name)),
                        other => {
                            warn!("dropping stored override {key}: expected a name, got {other}");
                            None
                        }
                    })
                    .collect()
            }),
    })
}

fn take_field<T: DeserializeOwned>(record: &mut Map<String, Value>, field: &str) -> Option<T> {
    match record.remove(field)? {
        Value::Null => None,
        value => match serde_json::from_value(value) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                warn!("ignoring stored field '{field}': {err}");
                None
            }
        },
    }
}

pub fn encode_state(state: &ScheduleState) -> PersistenceResult<String> {
    Ok(serde_json::to_string(state)?)
}

/// Load the state from `store`, falling back to `defaults`.
///
/// Stored fields replace defaults one by one. A record that cannot be read
/// or parsed is treated as if nothing were stored.
pub fn load_state_or_default<S: StateStore + ?Sized>(
    store: &S,
    defaults: &StateDefaults,
    today: NaiveDate,
) -> ScheduleState {
    let base = ScheduleState::from_defaults(defaults, today);
    match store.load_state() {
        Ok(Some(stored)) => {
            debug!("loaded stored state");
            stored.merge_onto(base)
        }
        Ok(None) => {
            debug!("no stored state, using defaults");
            base
        }
        Err(err) => {
            warn!("stored state unreadable, using defaults: {err}");
            base
        }
    }
}

pub mod file;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{JsonFileStore, save_rota_to_csv};
pub use memory::MemoryStateStore;
