use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeJsonError;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

pub const DEFAULT_STORAGE_KEY: &str = "uklidSchodu";
pub const DEFAULT_ADDRESS: &str = "Vaše adresa";
pub const DEFAULT_NEIGHBOR_PREFIX: &str = "Soused";

/// Values a fresh or partially stored state falls back to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateDefaults {
    /// `None` means the current calendar year at load time.
    pub year: Option<i32>,
    pub neighbors: Vec<String>,
    pub address: String,
    /// Prefix for generated neighbor names (`"Soused 4"`).
    pub neighbor_prefix: String,
    /// Record key used by key-value backends.
    pub storage_key: String,
}

impl Default for StateDefaults {
    fn default() -> Self {
        Self {
            year: None,
            neighbors: (1..=3)
                .map(|n| format!("{DEFAULT_NEIGHBOR_PREFIX} {n}"))
                .collect(),
            address: DEFAULT_ADDRESS.to_string(),
            neighbor_prefix: DEFAULT_NEIGHBOR_PREFIX.to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl StateDefaults {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let defaults = serde_json::from_reader(file)?;
        Ok(defaults)
    }

    pub fn save_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Name given to the neighbor appended at position `count + 1`.
    pub fn neighbor_name(&self, count: usize) -> String {
        format!("{} {}", self.neighbor_prefix, count + 1)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Serialization(SerdeJsonError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "io error: {err}"),
            ConfigError::Serialization(err) => write!(f, "invalid defaults file: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<SerdeJsonError> for ConfigError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}
