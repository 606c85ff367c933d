mod counter;
mod day_state;
mod error;
mod helpers;
mod migrations;
mod records;
mod settings;

use std::path::Path;

use rusqlite::Connection;

pub use error::{DbError, Result};
pub use settings::{HEARTBEAT_INTERVAL_MS_KEY, STRIDE_LENGTH_KEY};

/// SQLite-backed store for step accounting state.
pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "temp_store", "MEMORY")?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }
}
