pub mod assignment;
pub mod calendar;
pub mod config;
pub mod persistence;
pub mod rota;
pub mod state;
pub mod store;

pub use assignment::{
    Assignee, AssigneeSource, NO_NEIGHBOR, WeekKey, WeekKeyParseError, is_current_week,
    is_current_week_at, resolve, resolve_assignee,
};
pub use calendar::{CalendarWeek, compute_weeks, group_by_month, month_name};
pub use config::{ConfigError, StateDefaults};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteStateStore;
pub use persistence::{
    JsonFileStore, MemoryStateStore, PersistenceError, PersistenceResult, StateStore,
    load_state_or_default, save_rota_to_csv,
};
pub use rota::{MonthRow, Rota, RotaCell};
pub use state::{ScheduleState, StateError, StoredState};
pub use store::{ScheduleStore, StoreError, StoreResult};
