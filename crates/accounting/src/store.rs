use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use steps_core::{CounterObservation, DailyRecord, DayCode, DayState, DayTotal};
use steps_db::Db;

use crate::types::Result;

/// Durable home for accountant state, keyed by category and day.
pub trait StepStore: Send {
    fn day_state(&self, day: DayCode) -> Result<Option<DayState>>;
    fn put_day_state(&self, day: DayCode, state: &DayState) -> Result<()>;
    fn last_counter(&self) -> Result<Option<CounterObservation>>;
    fn put_last_counter(&self, observation: &CounterObservation) -> Result<()>;
    fn daily_record(&self) -> Result<Option<DailyRecord>>;
    fn put_daily_record(&self, record: &DailyRecord) -> Result<()>;
    /// Stored totals for `start..=end`, oldest first.
    fn day_totals(&self, start: DayCode, end: DayCode) -> Result<Vec<DayTotal>>;
}

impl StepStore for Db {
    fn day_state(&self, day: DayCode) -> Result<Option<DayState>> {
        Ok(Db::day_state(self, day)?)
    }

    fn put_day_state(&self, day: DayCode, state: &DayState) -> Result<()> {
        Ok(Db::put_day_state(self, day, state)?)
    }

    fn last_counter(&self) -> Result<Option<CounterObservation>> {
        Ok(Db::last_counter(self)?)
    }

    fn put_last_counter(&self, observation: &CounterObservation) -> Result<()> {
        Ok(Db::put_last_counter(self, observation)?)
    }

    fn daily_record(&self) -> Result<Option<DailyRecord>> {
        Ok(Db::daily_record(self)?)
    }

    fn put_daily_record(&self, record: &DailyRecord) -> Result<()> {
        Ok(Db::put_daily_record(self, record)?)
    }

    fn day_totals(&self, start: DayCode, end: DayCode) -> Result<Vec<DayTotal>> {
        Ok(Db::day_totals(self, start, end)?)
    }
}

/// Process-local store. Clones share the same state, which lets a second
/// accountant observe what a previous one persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    days: BTreeMap<DayCode, DayState>,
    last_counter: Option<CounterObservation>,
    record: Option<DailyRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StepStore for MemoryStore {
    fn day_state(&self, day: DayCode) -> Result<Option<DayState>> {
        Ok(self.state().days.get(&day).copied())
    }

    fn put_day_state(&self, day: DayCode, state: &DayState) -> Result<()> {
        self.state().days.insert(day, *state);
        Ok(())
    }

    fn last_counter(&self) -> Result<Option<CounterObservation>> {
        Ok(self.state().last_counter)
    }

    fn put_last_counter(&self, observation: &CounterObservation) -> Result<()> {
        self.state().last_counter = Some(*observation);
        Ok(())
    }

    fn daily_record(&self) -> Result<Option<DailyRecord>> {
        Ok(self.state().record)
    }

    fn put_daily_record(&self, record: &DailyRecord) -> Result<()> {
        self.state().record = Some(*record);
        Ok(())
    }

    fn day_totals(&self, start: DayCode, end: DayCode) -> Result<Vec<DayTotal>> {
        if start > end {
            return Ok(Vec::new());
        }
        Ok(self
            .state()
            .days
            .range(start..=end)
            .map(|(day, state)| DayTotal {
                day: *day,
                steps: state.steps_today,
            })
            .collect())
    }
}
