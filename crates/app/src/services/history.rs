use step_accounting::week_summary;
use steps_core::{DailyRecord, DayCode, DayRange, DayTotal, WeekSummary};
use steps_db::Db;

use crate::error::{AppError, Result};
use crate::services::{SharedConfig, open_db};

/// Read-only views over the persisted per-day totals.
#[derive(Clone)]
pub struct HistoryService {
    config: SharedConfig,
}

impl HistoryService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    pub fn day_totals(&self, range: &DayRange) -> Result<Vec<DayTotal>> {
        if range.start > range.end {
            return Err(AppError::InvalidInput(format!(
                "range start {} is after end {}",
                range.start, range.end
            )));
        }
        let db = self.db()?;
        Ok(db.day_totals(range.start, range.end)?)
    }

    pub fn week_summary(&self, end: DayCode) -> Result<WeekSummary> {
        let db = self.db()?;
        let stride = db.get_stride_length_m()?;
        Ok(week_summary(&db, end, stride)?)
    }

    pub fn daily_record(&self) -> Result<Option<DailyRecord>> {
        let db = self.db()?;
        Ok(db.daily_record()?)
    }

    /// Highest stored day, including the day still in progress.
    pub fn best_day(&self) -> Result<Option<DayTotal>> {
        let db = self.db()?;
        Ok(db.best_day()?)
    }
}
