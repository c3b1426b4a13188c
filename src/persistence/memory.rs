use super::{PersistenceResult, StateStore};
use crate::state::{ScheduleState, StoredState};
use std::cell::RefCell;

/// In-process store holding the serialized record, like a browser's local storage slot.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    slot: RefCell<Option<String>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from raw stored text, which need not be valid.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: RefCell::new(Some(raw.into())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl StateStore for MemoryStateStore {
    fn save_state(&self, state: &ScheduleState) -> PersistenceResult<()> {
        let json = super::encode_state(state)?;
        self.slot.replace(Some(json));
        Ok(())
    }

    fn load_state(&self) -> PersistenceResult<Option<StoredState>> {
        match self.slot.borrow().as_deref() {
            Some(json) => super::parse_stored_state(json).map(Some),
            None => Ok(None),
        }
    }
}
