use rusqlite::{OptionalExtension, params};
use steps_core::DailyRecord;

use crate::Db;
use crate::error::Result;
use crate::helpers::{parse_day, steps_from_sql, steps_to_sql};

impl Db {
    pub fn daily_record(&self) -> Result<Option<DailyRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT steps, day_code FROM daily_record WHERE id = 1",
                [],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        match row {
            Some((steps, day)) => Ok(Some(DailyRecord {
                steps: steps_from_sql(steps),
                day: parse_day(&day)?,
            })),
            None => Ok(None),
        }
    }

    pub fn put_daily_record(&self, record: &DailyRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO daily_record (id, steps, day_code)
            VALUES (1, ?1, ?2)
            ON CONFLICT(id) DO UPDATE SET
              steps = excluded.steps,
              day_code = excluded.day_code
            "#,
            params![steps_to_sql(record.steps), record.day.to_string()],
        )?;
        Ok(())
    }
}
