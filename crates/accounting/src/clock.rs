use std::sync::{Arc, Mutex, PoisonError};

use chrono::{Local, NaiveDate};
use steps_core::DayCode;

/// Source of the current local day.
pub trait DayClock: Send + Sync {
    fn today(&self) -> DayCode;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl DayClock for LocalClock {
    fn today(&self) -> DayCode {
        DayCode::from_date(Local::now().date_naive())
    }
}

/// Clock that only moves when told to. Clones share the same date.
#[derive(Debug, Clone)]
pub struct ManualClock {
    day: Arc<Mutex<DayCode>>,
}

impl ManualClock {
    pub fn new(day: DayCode) -> Self {
        Self {
            day: Arc::new(Mutex::new(day)),
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self::new(DayCode::from_date(date))
    }

    pub fn set(&self, day: DayCode) {
        *self.day.lock().unwrap_or_else(PoisonError::into_inner) = day;
    }

    pub fn advance_days(&self, days: u64) {
        let mut guard = self.day.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(next) = guard.days_after(days) {
            *guard = next;
        }
    }
}

impl DayClock for ManualClock {
    fn today(&self) -> DayCode {
        *self.day.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
