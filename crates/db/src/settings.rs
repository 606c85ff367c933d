use rusqlite::params;
use steps_core::{DEFAULT_HEARTBEAT_INTERVAL_MS, DEFAULT_STRIDE_LENGTH_M};

use crate::Db;
use crate::error::Result;

pub const STRIDE_LENGTH_KEY: &str = "stride_length_m";
pub const HEARTBEAT_INTERVAL_MS_KEY: &str = "heartbeat_interval_ms";

impl Db {
    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM app_setting WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row.get::<_, String>(0)?))
        } else {
            Ok(None)
        }
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO app_setting (key, value)
            VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    pub fn get_stride_length_m(&self) -> Result<f64> {
        let stride = self
            .get_setting(STRIDE_LENGTH_KEY)?
            .and_then(|value| value.parse::<f64>().ok())
            .filter(|value| value.is_finite() && *value > 0.0)
            .unwrap_or(DEFAULT_STRIDE_LENGTH_M);
        Ok(stride)
    }

    pub fn set_stride_length_m(&self, meters: f64) -> Result<()> {
        self.set_setting(STRIDE_LENGTH_KEY, &meters.to_string())
    }

    /// Zero is a valid stored value and means no heartbeat.
    pub fn get_heartbeat_interval_ms(&self) -> Result<u64> {
        let interval = self
            .get_setting(HEARTBEAT_INTERVAL_MS_KEY)?
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_HEARTBEAT_INTERVAL_MS);
        Ok(interval)
    }

    pub fn set_heartbeat_interval_ms(&self, millis: u64) -> Result<()> {
        self.set_setting(HEARTBEAT_INTERVAL_MS_KEY, &millis.to_string())
    }
}
