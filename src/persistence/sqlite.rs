use super::{PersistenceResult, StateStore};
use crate::state::{ScheduleState, StoredState};
use log::debug;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

/// Key-value table holding the state record under a single storage key.
pub struct SqliteStateStore {
    connection: Connection,
    key: String,
}

impl SqliteStateStore {
    pub fn new<P: AsRef<Path>>(path: P, key: impl Into<String>) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::from_connection(connection, key)
    }

    pub fn in_memory(key: impl Into<String>) -> PersistenceResult<Self> {
        Self::from_connection(Connection::open_in_memory()?, key)
    }

    fn from_connection(connection: Connection, key: impl Into<String>) -> PersistenceResult<Self> {
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection,
            key: key.into(),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Overwrite the stored value with arbitrary text.
    pub fn put_raw(&self, value: &str) -> PersistenceResult<()> {
        self.connection.execute(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![self.key, value],
        )?;
        Ok(())
    }

    pub fn get_raw(&self) -> PersistenceResult<Option<String>> {
        let mut stmt = self
            .connection
            .prepare("SELECT value FROM kv_store WHERE key = ?1")?;
        let value = stmt
            .query_row(params![self.key], |row| row.get::<_, String>(0))
            .optional()?;
        Ok(value)
    }
}

impl StateStore for SqliteStateStore {
    fn save_state(&self, state: &ScheduleState) -> PersistenceResult<()> {
        let json = super::encode_state(state)?;
        self.put_raw(&json)?;
        debug!("saved state under key '{}'", self.key);
        Ok(())
    }

    fn load_state(&self) -> PersistenceResult<Option<StoredState>> {
        let Some(json) = self.get_raw()? else {
            return Ok(None);
        };
        super::parse_stored_state(&json).map(Some)
    }
}
