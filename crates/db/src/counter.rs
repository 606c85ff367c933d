use rusqlite::{OptionalExtension, params};
use steps_core::CounterObservation;

use crate::Db;
use crate::error::Result;
use crate::helpers::parse_day;

impl Db {
    pub fn last_counter(&self) -> Result<Option<CounterObservation>> {
        let row = self
            .conn
            .query_row(
                "SELECT raw_value, day_code FROM counter_observation WHERE id = 1",
                [],
                |row| Ok((row.get::<_, f64>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        match row {
            Some((raw, day)) => Ok(Some(CounterObservation {
                raw,
                day: parse_day(&day)?,
            })),
            None => Ok(None),
        }
    }

    pub fn put_last_counter(&self, observation: &CounterObservation) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO counter_observation (id, raw_value, day_code)
            VALUES (1, ?1, ?2)
            ON CONFLICT(id) DO UPDATE SET
              raw_value = excluded.raw_value,
              day_code = excluded.day_code
            "#,
            params![observation.raw, observation.day.to_string()],
        )?;
        Ok(())
    }
}
