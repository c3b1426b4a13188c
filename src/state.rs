use crate::assignment::WeekKey;
use crate::config::StateDefaults;
use chrono::{Datelike, NaiveDate};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The whole persisted application state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleState {
    pub year: i32,
    /// Rotation order; entries may repeat.
    pub neighbors: Vec<String>,
    pub address: String,
    #[serde(rename = "customAssignments")]
    pub overrides: BTreeMap<WeekKey, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    EmptyName,
    LastNeighbor,
    NeighborOutOfRange { index: usize, len: usize },
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::EmptyName => write!(f, "name must not be empty"),
            StateError::LastNeighbor => write!(f, "at least one neighbor must remain"),
            StateError::NeighborOutOfRange { index, len } => write!(
                f,
                "neighbor position {} is out of range (have {len})",
                index + 1
            ),
        }
    }
}

impl std::error::Error for StateError {}

fn validated_name(name: &str) -> Result<String, StateError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(StateError::EmptyName);
    }
    Ok(trimmed.to_string())
}

impl ScheduleState {
    pub fn new(year: i32, neighbors: Vec<String>) -> Self {
        Self {
            year,
            neighbors,
            address: String::new(),
            overrides: BTreeMap::new(),
        }
    }

    pub fn from_defaults(defaults: &StateDefaults, today: NaiveDate) -> Self {
        Self {
            year: defaults.year.unwrap_or_else(|| today.year()),
            neighbors: defaults.neighbors.clone(),
            address: defaults.address.clone(),
            overrides: BTreeMap::new(),
        }
    }

    fn check_index(&self, index: usize) -> Result<(), StateError> {
        if index >= self.neighbors.len() {
            return Err(StateError::NeighborOutOfRange {
                index,
                len: self.neighbors.len(),
            });
        }
        Ok(())
    }

    /// Append a neighbor to the end of the rotation, returning its index.
    pub fn add_neighbor(&mut self, name: &str) -> Result<usize, StateError> {
        let name = validated_name(name)?;
        self.neighbors.push(name);
        Ok(self.neighbors.len() - 1)
    }

    /// Remove a neighbor; refused when it is the only one left.
    pub fn remove_neighbor(&mut self, index: usize) -> Result<String, StateError> {
        self.check_index(index)?;
        if self.neighbors.len() <= 1 {
            return Err(StateError::LastNeighbor);
        }
        Ok(self.neighbors.remove(index))
    }

    pub fn rename_neighbor(&mut self, index: usize, name: &str) -> Result<(), StateError> {
        self.check_index(index)?;
        self.neighbors[index] = validated_name(name)?;
        Ok(())
    }

    pub fn set_override(&mut self, key: WeekKey, name: &str) -> Result<(), StateError> {
        let name = validated_name(name)?;
        self.overrides.insert(key, name);
        Ok(())
    }

    pub fn clear_override(&mut self, key: WeekKey) -> Option<String> {
        self.overrides.remove(&key)
    }

    pub fn set_year(&mut self, year: i32) {
        self.year = year;
    }

    /// Blank input resets the address to `placeholder`.
    pub fn set_address(&mut self, address: &str, placeholder: &str) {
        let trimmed = address.trim();
        self.address = if trimmed.is_empty() {
            placeholder.to_string()
        } else {
            trimmed.to_string()
        };
    }
}

/// A stored record as read back from a backend. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighbors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(
        rename = "customAssignments",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_assignments: Option<BTreeMap<String, String>>,
}

impl StoredState {
    /// Overlay the stored fields onto `base`; fields absent here keep their base value.
    pub fn merge_onto(self, mut base: ScheduleState) -> ScheduleState {
        if let Some(year) = self.year {
            base.year = year;
        }
        if let Some(neighbors) = self.neighbors {
            base.neighbors = neighbors;
        }
        if let Some(address) = self.address {
            base.address = address;
        }
        if let Some(assignments) = self.custom_assignments {
            base.overrides = assignments
                .into_iter()
                .filter_map(|(raw, name)| match raw.parse::<WeekKey>() {
                    Ok(key) => Some((key, name)),
                    Err(err) => {
                        warn!("dropping stored override: {err}");
                        None
                    }
                })
                .collect();
        }
        base
    }
}

impl From<&ScheduleState> for StoredState {
    fn from(state: &ScheduleState) -> Self {
        Self {
            year: Some(state.year),
            neighbors: Some(state.neighbors.clone()),
            address: Some(state.address.clone()),
            custom_assignments: Some(
                state
                    .overrides
                    .iter()
                    .map(|(key, name)| (key.to_string(), name.clone()))
                    .collect(),
            ),
        }
    }
}
