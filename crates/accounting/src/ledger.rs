use log::{debug, warn};
use steps_core::{
    CounterObservation, DailyRecord, DayCode, DayState, SensorEvent, StepSnapshot,
    detected_increment,
};

use crate::store::StepStore;
use crate::types::Result;

/// Day-scoped step accounting over a reboot-resettable hardware counter.
///
/// The ledger never talks to hardware or clocks; callers pass in the current
/// day with every operation so a midnight boundary is always handled before
/// any day-scoped field is touched. Writes to the store are best-effort: a
/// failed write is logged and the in-memory value stays authoritative.
#[derive(Debug, Clone, PartialEq)]
pub struct StepLedger {
    day: DayCode,
    offset: Option<f64>,
    steps_today: u64,
    last_counter: Option<CounterObservation>,
}

impl StepLedger {
    /// Loads today's state, rebuilding the offset from the last counter
    /// reading when the process died after steps were already counted.
    pub fn restore(store: &dyn StepStore, today: DayCode) -> Self {
        let state = store
            .day_state(today)
            .unwrap_or_else(|err| {
                warn!("failed to load step state for {}: {}", today, err);
                None
            })
            .unwrap_or_default();
        let last_counter = store.last_counter().unwrap_or_else(|err| {
            warn!("failed to load last counter reading: {}", err);
            None
        });

        let mut ledger = Self {
            day: today,
            offset: state.calibration_offset,
            steps_today: state.steps_today,
            last_counter,
        };

        let same_day_counter = last_counter.filter(|last| last.day == today);
        if let (None, Some(last)) = (ledger.offset, same_day_counter) {
            let offset = (last.raw - ledger.steps_today as f64).max(0.0);
            debug!(
                "rebuilt calibration offset {} for {} from counter {} and {} steps",
                offset, today, last.raw, ledger.steps_today
            );
            ledger.offset = Some(offset);
            ledger.persist_day(store);
        }
        ledger
    }

    pub fn day(&self) -> DayCode {
        self.day
    }

    pub fn steps_today(&self) -> u64 {
        self.steps_today
    }

    pub fn calibration_offset(&self) -> Option<f64> {
        self.offset
    }

    pub fn last_counter(&self) -> Option<CounterObservation> {
        self.last_counter
    }

    pub fn snapshot(&self, stride_length_m: f64) -> StepSnapshot {
        StepSnapshot::new(self.day, self.steps_today, stride_length_m)
    }

    /// Switches to `today` if the cached day is stale. Returns true on rollover.
    ///
    /// The finished day's total is folded into the daily record, and the
    /// last counter reading is kept so a late reading from the previous day
    /// is not mistaken for a reboot.
    pub fn roll_over(&mut self, today: DayCode, store: &dyn StepStore) -> bool {
        if today == self.day {
            return false;
        }
        let ended = self.day;
        match store.daily_record() {
            Ok(record) => {
                let best = record.map(|record| record.steps).unwrap_or(0);
                if self.steps_today > best {
                    let record = DailyRecord {
                        steps: self.steps_today,
                        day: ended,
                    };
                    persist("daily record", store.put_daily_record(&record));
                }
            }
            Err(err) => warn!("skipping daily record update for {}: {}", ended, err),
        }
        debug!(
            "day rollover {} -> {} with {} steps",
            ended, today, self.steps_today
        );
        self.day = today;
        self.offset = None;
        self.steps_today = 0;
        true
    }

    /// Applies one sensor event. Returns true when the step count changed.
    pub fn ingest(&mut self, event: SensorEvent, today: DayCode, store: &dyn StepStore) -> bool {
        match event {
            SensorEvent::Counter(raw) => self.ingest_counter(raw, today, store),
            SensorEvent::Detected(steps) => self.ingest_detected(steps, today, store),
        }
    }

    pub fn ingest_counter(&mut self, raw: f64, today: DayCode, store: &dyn StepStore) -> bool {
        if !raw.is_finite() || raw < 0.0 {
            warn!("ignoring invalid step counter reading {}", raw);
            return false;
        }
        self.roll_over(today, store);

        let mut rebooted = false;
        let reset_from = self
            .last_counter
            .filter(|last| last.day == self.day && raw < last.raw);
        if let Some(last) = reset_from {
            // Known discontinuity: the count restarts from the post-reboot reading.
            let offset = (raw - self.steps_today as f64).max(0.0);
            debug!(
                "counter reset from {} to {}; recalibrating offset to {}",
                last.raw, raw, offset
            );
            self.offset = Some(offset);
            self.persist_day(store);
            rebooted = true;
        }

        let offset = match self.offset {
            Some(offset) => offset,
            None => {
                let baseline = raw - self.steps_today as f64;
                let offset = if baseline < 0.0 { raw } else { baseline };
                debug!("calibrated {} at counter offset {}", self.day, offset);
                self.offset = Some(offset);
                self.persist_day(store);
                offset
            }
        };

        let computed = (raw - offset).round().max(0.0) as u64;
        let next = if rebooted {
            computed
        } else {
            computed.max(self.steps_today)
        };
        let changed = next != self.steps_today;
        if changed {
            self.steps_today = next;
            self.persist_day(store);
        }

        let observation = CounterObservation { raw, day: self.day };
        self.last_counter = Some(observation);
        persist("last counter", store.put_last_counter(&observation));
        changed
    }

    pub fn ingest_detected(
        &mut self,
        steps: Option<u32>,
        today: DayCode,
        store: &dyn StepStore,
    ) -> bool {
        self.roll_over(today, store);
        self.steps_today = self.steps_today.saturating_add(detected_increment(steps));
        self.persist_day(store);
        true
    }

    fn persist_day(&self, store: &dyn StepStore) {
        let state = DayState {
            calibration_offset: self.offset,
            steps_today: self.steps_today,
        };
        persist("day state", store.put_day_state(self.day, &state));
    }
}

fn persist(what: &str, result: Result<()>) {
    if let Err(err) = result {
        warn!("failed to persist {}: {}", what, err);
    }
}
