use rusqlite::{OptionalExtension, params};
use steps_core::{DayCode, DayState, DayTotal};

use crate::Db;
use crate::error::Result;
use crate::helpers::{now_rfc3339, parse_day, steps_from_sql, steps_to_sql};

impl Db {
    pub fn day_state(&self, day: DayCode) -> Result<Option<DayState>> {
        let state = self
            .conn
            .query_row(
                "SELECT calibration_offset, steps_today FROM day_state WHERE day_code = ?1",
                params![day.to_string()],
                |row| {
                    Ok(DayState {
                        calibration_offset: row.get::<_, Option<f64>>(0)?,
                        steps_today: steps_from_sql(row.get::<_, i64>(1)?),
                    })
                },
            )
            .optional()?;
        Ok(state)
    }

    pub fn put_day_state(&self, day: DayCode, state: &DayState) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO day_state (day_code, calibration_offset, steps_today, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(day_code) DO UPDATE SET
              calibration_offset = excluded.calibration_offset,
              steps_today = excluded.steps_today,
              updated_at = excluded.updated_at
            "#,
            params![
                day.to_string(),
                state.calibration_offset,
                steps_to_sql(state.steps_today),
                now_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Stored totals for `start..=end`, oldest first. Days without a row are omitted.
    pub fn day_totals(&self, start: DayCode, end: DayCode) -> Result<Vec<DayTotal>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT day_code, steps_today
            FROM day_state
            WHERE day_code >= ?1 AND day_code <= ?2
            ORDER BY day_code ASC
            "#,
        )?;
        let rows = stmt.query_map(params![start.to_string(), end.to_string()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        let mut totals = Vec::new();
        for row in rows {
            let (day, steps) = row?;
            totals.push(DayTotal {
                day: parse_day(&day)?,
                steps: steps_from_sql(steps),
            });
        }
        Ok(totals)
    }

    pub fn best_day(&self) -> Result<Option<DayTotal>> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT day_code, steps_today
                FROM day_state
                ORDER BY steps_today DESC, day_code ASC
                LIMIT 1
                "#,
                [],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;
        match row {
            Some((day, steps)) => Ok(Some(DayTotal {
                day: parse_day(&day)?,
                steps: steps_from_sql(steps),
            })),
            None => Ok(None),
        }
    }
}
