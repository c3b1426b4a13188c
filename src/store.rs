use crate::assignment::WeekKey;
use crate::config::StateDefaults;
use crate::persistence::{self, PersistenceError, StateStore};
use crate::rota::Rota;
use crate::state::{ScheduleState, StateError};
use chrono::{Local, NaiveDate};
use log::info;
use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    State(StateError),
    Persistence(PersistenceError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::State(err) => write!(f, "{err}"),
            StoreError::Persistence(err) => write!(f, "could not save: {err}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::State(err) => Some(err),
            StoreError::Persistence(err) => Some(err),
        }
    }
}

impl From<StateError> for StoreError {
    fn from(value: StateError) -> Self {
        Self::State(value)
    }
}

impl From<PersistenceError> for StoreError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Owns the state and its backend; every mutation is saved before returning.
///
/// A rejected mutation leaves both the in-memory state and the stored record
/// untouched.
pub struct ScheduleStore<S: StateStore> {
    backend: S,
    defaults: StateDefaults,
    state: ScheduleState,
}

impl<S: StateStore> ScheduleStore<S> {
    pub fn open(backend: S, defaults: StateDefaults) -> Self {
        Self::open_at(backend, defaults, Local::now().date_naive())
    }

    /// Like [`ScheduleStore::open`], with `today` deciding the default year.
    pub fn open_at(backend: S, defaults: StateDefaults, today: NaiveDate) -> Self {
        let state = persistence::load_state_or_default(&backend, &defaults, today);
        Self {
            backend,
            defaults,
            state,
        }
    }

    pub fn state(&self) -> &ScheduleState {
        &self.state
    }

    pub fn defaults(&self) -> &StateDefaults {
        &self.defaults
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn into_parts(self) -> (S, ScheduleState) {
        (self.backend, self.state)
    }

    pub fn save(&self) -> StoreResult<()> {
        self.backend.save_state(&self.state)?;
        Ok(())
    }

    pub fn rota(&self, today: NaiveDate) -> Rota {
        Rota::build(&self.state, today)
    }

    fn mutate<T, F>(&mut self, mutator: F) -> StoreResult<T>
    where
        F: FnOnce(&mut ScheduleState, &StateDefaults) -> Result<T, StateError>,
    {
        let mut next = self.state.clone();
        let value = mutator(&mut next, &self.defaults)?;
        self.backend.save_state(&next)?;
        self.state = next;
        Ok(value)
    }

    /// Append `"<prefix> <n>"` to the rotation and return its name.
    pub fn add_neighbor(&mut self) -> StoreResult<String> {
        let name = self.mutate(|state, defaults| {
            let name = defaults.neighbor_name(state.neighbors.len());
            state.add_neighbor(&name)?;
            Ok(name)
        })?;
        info!("added neighbor '{name}'");
        Ok(name)
    }

    pub fn remove_neighbor(&mut self, index: usize) -> StoreResult<String> {
        let removed = self.mutate(|state, _| state.remove_neighbor(index))?;
        info!("removed neighbor '{removed}'");
        Ok(removed)
    }

    pub fn rename_neighbor(&mut self, index: usize, name: &str) -> StoreResult<()> {
        self.mutate(|state, _| state.rename_neighbor(index, name))?;
        info!("renamed neighbor {} to '{}'", index + 1, name.trim());
        Ok(())
    }

    pub fn set_override(&mut self, key: WeekKey, name: &str) -> StoreResult<()> {
        self.mutate(|state, _| state.set_override(key, name))?;
        info!("week {key} assigned to '{}'", name.trim());
        Ok(())
    }

    pub fn clear_override(&mut self, key: WeekKey) -> StoreResult<Option<String>> {
        self.mutate(|state, _| Ok(state.clear_override(key)))
    }

    pub fn set_year(&mut self, year: i32) -> StoreResult<()> {
        self.mutate(|state, _| {
            state.set_year(year);
            Ok(())
        })
    }

    pub fn previous_year(&mut self) -> StoreResult<i32> {
        let year = self.state.year.saturating_sub(1);
        self.set_year(year)?;
        Ok(year)
    }

    pub fn next_year(&mut self) -> StoreResult<i32> {
        let year = self.state.year.saturating_add(1);
        self.set_year(year)?;
        Ok(year)
    }

    pub fn set_address(&mut self, address: &str) -> StoreResult<()> {
        self.mutate(|state, defaults| {
            state.set_address(address, &defaults.address);
            Ok(())
        })
    }
}
